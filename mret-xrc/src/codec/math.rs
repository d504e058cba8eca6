use super::{AttributeReader, AttributeWriter, XrcCodec};
use crate::error::CodecResult;
use crate::path::AttributePath;
use mret_types::{Color, Quaternion, Transform, Vector3};

const X: &str = "X";
const Y: &str = "Y";
const Z: &str = "Z";
const W: &str = "W";
const POSITION: &str = "POSITION";
const ROTATION: &str = "ROTATION";
const SCALE: &str = "SCALE";
const R: &str = "R";
const G: &str = "G";
const B: &str = "B";
const A: &str = "A";

impl XrcCodec for Vector3 {
    fn to_xrc(&self, writer: &AttributeWriter<'_>, key: &AttributePath) -> CodecResult<()> {
        writer.set_float(&key.child(X), self.x)?;
        writer.set_float(&key.child(Y), self.y)?;
        writer.set_float(&key.child(Z), self.z)
    }

    fn from_xrc(reader: &AttributeReader<'_>, key: &AttributePath) -> CodecResult<Self> {
        Ok(Self {
            x: reader.required_float(&key.child(X))?,
            y: reader.required_float(&key.child(Y))?,
            z: reader.required_float(&key.child(Z))?,
        })
    }
}

impl XrcCodec for Quaternion {
    fn to_xrc(&self, writer: &AttributeWriter<'_>, key: &AttributePath) -> CodecResult<()> {
        writer.set_float(&key.child(X), self.x)?;
        writer.set_float(&key.child(Y), self.y)?;
        writer.set_float(&key.child(Z), self.z)?;
        writer.set_float(&key.child(W), self.w)
    }

    fn from_xrc(reader: &AttributeReader<'_>, key: &AttributePath) -> CodecResult<Self> {
        Ok(Self {
            x: reader.required_float(&key.child(X))?,
            y: reader.required_float(&key.child(Y))?,
            z: reader.required_float(&key.child(Z))?,
            w: reader.required_float(&key.child(W))?,
        })
    }
}

impl XrcCodec for Transform {
    fn to_xrc(&self, writer: &AttributeWriter<'_>, key: &AttributePath) -> CodecResult<()> {
        self.position.to_xrc(writer, &key.child(POSITION))?;
        self.rotation.to_xrc(writer, &key.child(ROTATION))?;
        self.scale.to_xrc(writer, &key.child(SCALE))
    }

    fn from_xrc(reader: &AttributeReader<'_>, key: &AttributePath) -> CodecResult<Self> {
        Ok(Self {
            position: Vector3::from_xrc(reader, &key.child(POSITION))?,
            rotation: Quaternion::from_xrc(reader, &key.child(ROTATION))?,
            scale: Vector3::from_xrc(reader, &key.child(SCALE))?,
        })
    }
}

impl XrcCodec for Color {
    fn to_xrc(&self, writer: &AttributeWriter<'_>, key: &AttributePath) -> CodecResult<()> {
        writer.set_float(&key.child(R), self.r)?;
        writer.set_float(&key.child(G), self.g)?;
        writer.set_float(&key.child(B), self.b)?;
        writer.set_float(&key.child(A), self.a)
    }

    fn from_xrc(reader: &AttributeReader<'_>, key: &AttributePath) -> CodecResult<Self> {
        Ok(Self {
            r: reader.required_float(&key.child(R))?,
            g: reader.required_float(&key.child(G))?,
            b: reader.required_float(&key.child(B))?,
            a: reader.required_float(&key.child(A))?,
        })
    }
}
