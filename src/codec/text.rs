use crate::codec::FieldCodec;
use crate::error::CodecError;

/// Strings written verbatim and read back without their padding.
#[derive(Debug, Clone, Copy, Default)]
pub struct Trimmed;

impl FieldCodec for Trimmed {
    type Value = String;

    fn encode(&self, value: &String) -> Result<String, CodecError> {
        Ok(value.clone())
    }

    fn decode(&self, text: &str) -> Result<String, CodecError> {
        Ok(text.trim().to_owned())
    }
}
