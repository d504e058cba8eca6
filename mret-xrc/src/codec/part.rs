use super::{AttributeReader, AttributeWriter, XrcCodec};
use crate::error::CodecResult;
use crate::path::AttributePath;
use mret_schema::{ModelType, PartType, PhysicalSceneObjectType};

const VENDOR: &str = "VENDOR";
const VERSION: &str = "VERSION";
const MODEL: &str = "MODEL";
const FILE: &str = "FILE";
const FORMAT: &str = "FORMAT";

impl XrcCodec for ModelType {
    fn to_xrc(&self, writer: &AttributeWriter<'_>, key: &AttributePath) -> CodecResult<()> {
        writer.set_required_text(&key.child(FILE), &self.file)?;
        writer.set_enum(&key.child(FORMAT), self.format)
    }

    fn from_xrc(reader: &AttributeReader<'_>, key: &AttributePath) -> CodecResult<Self> {
        Ok(Self {
            file: reader.required_text(&key.child(FILE))?,
            format: reader.required_enum(&key.child(FORMAT))?,
        })
    }
}

impl XrcCodec for PartType {
    fn to_xrc(&self, writer: &AttributeWriter<'_>, key: &AttributePath) -> CodecResult<()> {
        writer.set_optional_text(&key.child(VENDOR), self.vendor.as_deref())?;
        writer.set_optional_text(&key.child(VERSION), self.version.as_deref())?;

        let model_path = key.child(MODEL);
        writer.set_bool(&model_path, self.model.is_some())?;
        if let Some(model) = &self.model {
            model.to_xrc(writer, &model_path)?;
        }

        self.base.to_xrc(writer, key)
    }

    fn from_xrc(reader: &AttributeReader<'_>, key: &AttributePath) -> CodecResult<Self> {
        let base = PhysicalSceneObjectType::from_xrc(reader, key)?;

        let model_path = key.child(MODEL);
        let model = if reader.bool(&model_path)?.unwrap_or(false) {
            Some(ModelType::from_xrc(reader, &model_path)?)
        } else {
            None
        };

        Ok(Self {
            base,
            vendor: reader.optional_text(&key.child(VENDOR))?,
            version: reader.optional_text(&key.child(VERSION))?,
            model,
        })
    }
}
