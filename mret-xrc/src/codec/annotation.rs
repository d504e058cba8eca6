use super::{AttributeReader, AttributeWriter, XrcCodec};
use crate::error::CodecResult;
use crate::path::AttributePath;
use mret_schema::{AnnotationType, IdentifiableType, SourceAnnotationType, TextAnnotationType};

const ATTACH_TO: &str = "ATTACH_TO";
const START_DELAY: &str = "START_DELAY";
const DURATION: &str = "DURATION";
const TEXTS: &str = "TEXTS";
const TIME_PER_TEXT: &str = "TIME_PER_TEXT";
const SOURCE: &str = "SOURCE";
const SOURCE_TYPE: &str = "SOURCE_TYPE";

impl XrcCodec for AnnotationType {
    fn to_xrc(&self, writer: &AttributeWriter<'_>, key: &AttributePath) -> CodecResult<()> {
        writer.set_optional_text(&key.child(ATTACH_TO), self.attach_to.as_deref())?;
        writer.set_float(&key.child(START_DELAY), self.start_delay)?;
        writer.set_float(&key.child(DURATION), self.duration)?;

        self.base.to_xrc(writer, key)
    }

    fn from_xrc(reader: &AttributeReader<'_>, key: &AttributePath) -> CodecResult<Self> {
        let base = IdentifiableType::from_xrc(reader, key)?;

        Ok(Self {
            base,
            attach_to: reader.optional_text(&key.child(ATTACH_TO))?,
            start_delay: reader.required_float(&key.child(START_DELAY))?,
            duration: reader.required_float(&key.child(DURATION))?,
        })
    }
}

impl XrcCodec for TextAnnotationType {
    fn to_xrc(&self, writer: &AttributeWriter<'_>, key: &AttributePath) -> CodecResult<()> {
        writer.set_string_list(&key.child(TEXTS), &self.texts)?;
        writer.set_float(&key.child(TIME_PER_TEXT), self.time_per_text)?;

        self.base.to_xrc(writer, key)
    }

    fn from_xrc(reader: &AttributeReader<'_>, key: &AttributePath) -> CodecResult<Self> {
        let base = AnnotationType::from_xrc(reader, key)?;

        Ok(Self {
            base,
            texts: reader.string_list(&key.child(TEXTS))?,
            time_per_text: reader.required_float(&key.child(TIME_PER_TEXT))?,
        })
    }
}

impl XrcCodec for SourceAnnotationType {
    fn to_xrc(&self, writer: &AttributeWriter<'_>, key: &AttributePath) -> CodecResult<()> {
        writer.set_required_text(&key.child(SOURCE), &self.source)?;
        writer.set_enum(&key.child(SOURCE_TYPE), self.source_type)?;

        self.base.to_xrc(writer, key)
    }

    fn from_xrc(reader: &AttributeReader<'_>, key: &AttributePath) -> CodecResult<Self> {
        let base = AnnotationType::from_xrc(reader, key)?;

        Ok(Self {
            base,
            source: reader.required_text(&key.child(SOURCE))?,
            source_type: reader.required_enum(&key.child(SOURCE_TYPE))?,
        })
    }
}
