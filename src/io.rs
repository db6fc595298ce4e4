//! File input/output

mod text;

pub use text::{read_header, read_records, write_records, TextFiles};
