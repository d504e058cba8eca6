use super::{AttributeReader, AttributeWriter, XrcCodec};
use crate::error::CodecResult;
use crate::path::AttributePath;
use mret_schema::{InteractableSceneObjectType, NoteState, NoteType};

const TITLE: &str = "TITLE";
const CONTENT: &str = "CONTENT";
const STATE: &str = "STATE";

impl XrcCodec for NoteType {
    fn to_xrc(&self, writer: &AttributeWriter<'_>, key: &AttributePath) -> CodecResult<()> {
        writer.set_string(&key.child(TITLE), &self.title)?;
        writer.set_string_list(&key.child(CONTENT), &self.content)?;
        writer.set_enum(&key.child(STATE), self.state)?;

        self.base.to_xrc(writer, key)
    }

    fn from_xrc(reader: &AttributeReader<'_>, key: &AttributePath) -> CodecResult<Self> {
        let base = InteractableSceneObjectType::from_xrc(reader, key)?;

        Ok(Self {
            base,
            title: reader.required_string(&key.child(TITLE))?,
            content: reader.string_list(&key.child(CONTENT))?,
            state: reader
                .optional_enum::<NoteState>(&key.child(STATE))?
                .unwrap_or_default(),
        })
    }
}
