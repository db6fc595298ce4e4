//! Input for the file loader
use crate::{error::Result, types::Chunk};

pub trait ChunkSource {
    //! A set of files that can be read in chunks

    /// Type of a single value
    type Item;

    /// Number of files
    fn n_files(&self) -> usize;

    /// Number of values per element
    fn width(&self) -> usize {
        1
    }

    /// Number of elements in a file
    fn element_count(&mut self, file: usize) -> Result<usize>;

    /// Read the elements of a chunk
    ///
    /// `out` has room for `chunk.len * self.width()` values.
    fn read_chunk(&mut self, chunk: &Chunk, out: &mut [Self::Item]) -> Result<()>;
}
