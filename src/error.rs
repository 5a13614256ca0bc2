use smol_str::SmolStr;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    Overflow,
    FieldEncode,
    Value,
    Format,
    Pattern,
    FieldDecode,
    EmptyCollection,
    CollectionLength,
    NoRecord,
    TrailingLines,
    Io,
    Layout,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorStage {
    Schema,
    Encode,
    Decode,
}

/// Failure raised by a [`FieldCodec`](crate::codec::FieldCodec).
///
/// Codecs only know the text they were handed; the engine wraps this with
/// the record, field and line it came from.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct CodecError {
    message: String,
}

impl CodecError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error("invalid schema for {record}: {message}")]
    Configuration { record: SmolStr, message: String },

    #[error("field {field} of {record} has overflown specified width of {width}. Value is {value}")]
    Overflow {
        record: SmolStr,
        field: SmolStr,
        width: usize,
        value: String,
    },

    #[error("cannot encode field {field} of {record}: {source}")]
    FieldEncode {
        record: SmolStr,
        field: SmolStr,
        #[source]
        source: CodecError,
    },

    #[error("cannot encode {record}: {message}")]
    Value { record: SmolStr, message: String },

    #[error("format does not match expected width on line {line}. Parsing object: {record}. Expected width: {expected}. Line in file: {text}")]
    Width {
        record: SmolStr,
        expected: usize,
        line: usize,
        text: String,
    },

    #[error("format does not match expected pattern on line {line}. Parsing object: {record}. Match pattern: {pattern}. Line in file: {text}")]
    Pattern {
        record: SmolStr,
        pattern: SmolStr,
        line: usize,
        text: String,
    },

    #[error("cannot decode field {field} of {record} on line {line} from {text:?}: {source}")]
    FieldDecode {
        record: SmolStr,
        field: SmolStr,
        line: usize,
        text: String,
        #[source]
        source: CodecError,
    },

    #[error("collection of {element} matched no lines")]
    EmptyCollection { element: SmolStr },

    #[error("collection of {element} expected exactly {expected} elements, found {found}")]
    CollectionLength {
        element: SmolStr,
        expected: usize,
        found: usize,
    },

    #[error("input contains no {record} record")]
    NoRecord { record: SmolStr },

    #[error("unexpected trailing content on line {line}: {text}")]
    TrailingLines { line: usize, text: String },

    #[error("read failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid utf-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    #[error("invalid layout: {0}")]
    Layout(#[from] serde_json::Error),
}

impl Error {
    pub fn configuration(record: impl Into<SmolStr>, message: impl Into<String>) -> Self {
        Error::Configuration {
            record: record.into(),
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Configuration { .. } => ErrorKind::Configuration,
            Error::Overflow { .. } => ErrorKind::Overflow,
            Error::FieldEncode { .. } => ErrorKind::FieldEncode,
            Error::Value { .. } => ErrorKind::Value,
            Error::Width { .. } => ErrorKind::Format,
            Error::Pattern { .. } => ErrorKind::Pattern,
            Error::FieldDecode { .. } => ErrorKind::FieldDecode,
            Error::EmptyCollection { .. } => ErrorKind::EmptyCollection,
            Error::CollectionLength { .. } => ErrorKind::CollectionLength,
            Error::NoRecord { .. } => ErrorKind::NoRecord,
            Error::TrailingLines { .. } => ErrorKind::TrailingLines,
            Error::Io(_) | Error::Utf8(_) => ErrorKind::Io,
            Error::Layout(_) => ErrorKind::Layout,
        }
    }

    pub fn stage(&self) -> ErrorStage {
        match self {
            Error::Configuration { .. } | Error::Layout(_) => ErrorStage::Schema,
            Error::Overflow { .. } | Error::FieldEncode { .. } | Error::Value { .. } => {
                ErrorStage::Encode
            }
            _ => ErrorStage::Decode,
        }
    }

    /// 1-based input line the error points at, when it came from the decoder.
    pub fn line(&self) -> Option<usize> {
        match self {
            Error::Width { line, .. }
            | Error::Pattern { line, .. }
            | Error::FieldDecode { line, .. }
            | Error::TrailingLines { line, .. } => Some(*line),
            _ => None,
        }
    }
}
