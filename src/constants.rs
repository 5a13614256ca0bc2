pub const DEFAULT_PAD: char = '0';

pub const DEFAULT_PARALLEL_THRESHOLD: usize = 256;

pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d";

