use crate::constants::DEFAULT_PARALLEL_THRESHOLD;

/// Separator written between sibling lines. Never written after the last line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineEnding {
    #[default]
    Lf,
    CrLf,
}

impl LineEnding {
    pub fn as_str(self) -> &'static str {
        match self {
            LineEnding::Lf => "\n",
            LineEnding::CrLf => "\r\n",
        }
    }
}

/// What a collection that matched zero lines means.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EmptyCollection {
    /// Fail with [`Error::EmptyCollection`](crate::Error::EmptyCollection).
    #[default]
    Reject,
    /// Report "nothing here" and leave the field at its default.
    Allow,
}

#[derive(Debug, Clone)]
pub struct EncodeOptions {
    pub line_ending: LineEnding,
    /// Sequences with at least this many elements are rendered on the rayon
    /// pool when the `parallel` feature is enabled.
    pub parallel_threshold: usize,
}

impl EncodeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_line_ending(mut self, line_ending: LineEnding) -> Self {
        self.line_ending = line_ending;
        self
    }

    pub fn with_parallel_threshold(mut self, parallel_threshold: usize) -> Self {
        self.parallel_threshold = parallel_threshold;
        self
    }
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            line_ending: LineEnding::default(),
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DecodeOptions {
    pub empty_collection: EmptyCollection,
    /// A composite attempted as a collection element whose nested slots all
    /// matched nothing ends the collection instead of producing an element.
    pub blank_composite_ends_collection: bool,
    /// Fail when lines remain after the root value has been read.
    pub deny_trailing_lines: bool,
}

impl DecodeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_empty_collection(mut self, empty_collection: EmptyCollection) -> Self {
        self.empty_collection = empty_collection;
        self
    }

    pub fn with_blank_composite_ends_collection(mut self, enabled: bool) -> Self {
        self.blank_composite_ends_collection = enabled;
        self
    }

    pub fn with_deny_trailing_lines(mut self, deny: bool) -> Self {
        self.deny_trailing_lines = deny;
        self
    }
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            empty_collection: EmptyCollection::default(),
            blank_composite_ends_collection: true,
            deny_trailing_lines: false,
        }
    }
}
