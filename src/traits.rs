//! Traits

mod source;

pub use source::ChunkSource;
