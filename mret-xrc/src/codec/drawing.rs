use super::{AttributeReader, AttributeWriter, XrcCodec};
use crate::error::{CodecError, CodecResult};
use crate::path::AttributePath;
use mret_schema::{Drawing2dType, Drawing3dType, IdentifiableType, SceneObjectType};
use mret_types::{Color, Vector2, Vector3};

const RENDER_TYPE: &str = "RENDER_TYPE";
const UNITS: &str = "UNITS";
const WIDTH: &str = "WIDTH";
const COLOR: &str = "COLOR";
const POINTS: &str = "POINTS";

const F32_LEN: usize = std::mem::size_of::<f32>();

/// Packs 2D points as consecutive little-endian `f32` pairs.
#[must_use]
pub fn encode_points2(points: &[Vector2]) -> Vec<u8> {
    let mut out = Vec::with_capacity(points.len() * 2 * F32_LEN);
    for p in points {
        out.extend_from_slice(&p.x.to_le_bytes());
        out.extend_from_slice(&p.y.to_le_bytes());
    }
    out
}

/// Packs 3D points as consecutive little-endian `f32` triples.
#[must_use]
pub fn encode_points3(points: &[Vector3]) -> Vec<u8> {
    let mut out = Vec::with_capacity(points.len() * 3 * F32_LEN);
    for p in points {
        out.extend_from_slice(&p.x.to_le_bytes());
        out.extend_from_slice(&p.y.to_le_bytes());
        out.extend_from_slice(&p.z.to_le_bytes());
    }
    out
}

fn read_f32s(bytes: &[u8], stride: usize) -> Option<Vec<f32>> {
    if bytes.len() % (stride * F32_LEN) != 0 {
        return None;
    }
    Some(
        bytes
            .chunks_exact(F32_LEN)
            .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
            .collect(),
    )
}

/// Unpacks a blob written by [`encode_points2`]. `None` if its length is not a
/// whole number of points.
#[must_use]
pub fn decode_points2(bytes: &[u8]) -> Option<Vec<Vector2>> {
    let floats = read_f32s(bytes, 2)?;
    Some(
        floats
            .chunks_exact(2)
            .map(|c| Vector2::new(c[0], c[1]))
            .collect(),
    )
}

/// Unpacks a blob written by [`encode_points3`].
#[must_use]
pub fn decode_points3(bytes: &[u8]) -> Option<Vec<Vector3>> {
    let floats = read_f32s(bytes, 3)?;
    Some(
        floats
            .chunks_exact(3)
            .map(|c| Vector3::new(c[0], c[1], c[2]))
            .collect(),
    )
}

fn read_points<T>(
    reader: &AttributeReader<'_>,
    path: &AttributePath,
    decode: fn(&[u8]) -> Option<Vec<T>>,
) -> CodecResult<Vec<T>> {
    match reader.blob(path)? {
        None => Ok(Vec::new()),
        Some(bytes) => decode(&bytes).ok_or_else(|| CodecError::InvalidBlob {
            path: path.to_string(),
            len: bytes.len(),
        }),
    }
}

impl XrcCodec for Drawing2dType {
    fn to_xrc(&self, writer: &AttributeWriter<'_>, key: &AttributePath) -> CodecResult<()> {
        writer.set_float(&key.child(WIDTH), self.width)?;
        self.color.to_xrc(writer, &key.child(COLOR))?;
        writer.set_blob(&key.child(POINTS), encode_points2(&self.points))?;

        self.base.to_xrc(writer, key)
    }

    fn from_xrc(reader: &AttributeReader<'_>, key: &AttributePath) -> CodecResult<Self> {
        let base = IdentifiableType::from_xrc(reader, key)?;

        Ok(Self {
            base,
            width: reader.required_float(&key.child(WIDTH))?,
            color: Color::from_xrc(reader, &key.child(COLOR))?,
            points: read_points(reader, &key.child(POINTS), decode_points2)?,
        })
    }
}

impl XrcCodec for Drawing3dType {
    fn to_xrc(&self, writer: &AttributeWriter<'_>, key: &AttributePath) -> CodecResult<()> {
        writer.set_enum(&key.child(RENDER_TYPE), self.render_type)?;
        writer.set_enum(&key.child(UNITS), self.units)?;
        writer.set_float(&key.child(WIDTH), self.width)?;
        self.color.to_xrc(writer, &key.child(COLOR))?;
        writer.set_blob(&key.child(POINTS), encode_points3(&self.points))?;

        self.base.to_xrc(writer, key)
    }

    fn from_xrc(reader: &AttributeReader<'_>, key: &AttributePath) -> CodecResult<Self> {
        let base = SceneObjectType::from_xrc(reader, key)?;

        Ok(Self {
            base,
            render_type: reader.required_enum(&key.child(RENDER_TYPE))?,
            units: reader.required_enum(&key.child(UNITS))?,
            width: reader.required_float(&key.child(WIDTH))?,
            color: Color::from_xrc(reader, &key.child(COLOR))?,
            points: read_points(reader, &key.child(POINTS), decode_points3)?,
        })
    }
}
