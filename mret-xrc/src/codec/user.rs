use super::{AttributeReader, AttributeWriter, XrcCodec};
use crate::error::CodecResult;
use crate::path::AttributePath;
use mret_schema::{IdentifiableType, UserType};
use mret_types::Color;

const ALIAS: &str = "ALIAS";
const COLOR: &str = "COLOR";
const POSE: &str = "POSE";

impl XrcCodec for UserType {
    fn to_xrc(&self, writer: &AttributeWriter<'_>, key: &AttributePath) -> CodecResult<()> {
        writer.set_required_text(&key.child(ALIAS), &self.alias)?;
        self.color.to_xrc(writer, &key.child(COLOR))?;
        if let Some(pose) = &self.pose {
            writer.set_transform(&key.child(POSE), pose)?;
        }

        self.base.to_xrc(writer, key)
    }

    fn from_xrc(reader: &AttributeReader<'_>, key: &AttributePath) -> CodecResult<Self> {
        let base = IdentifiableType::from_xrc(reader, key)?;

        Ok(Self {
            base,
            alias: reader.required_text(&key.child(ALIAS))?,
            color: Color::from_xrc(reader, &key.child(COLOR))?,
            pose: reader.transform(&key.child(POSE))?,
        })
    }
}
