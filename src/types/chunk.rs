//! Chunk

/// A contiguous range of elements inside one input file
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Chunk {
    /// Index of the file
    pub file: usize,
    /// Offset of the first element relative to the start of the file
    pub offset: usize,
    /// Number of elements
    pub len: usize,
}

impl Chunk {
    /// Create new
    pub fn new(file: usize, offset: usize, len: usize) -> Self {
        Self { file, offset, len }
    }

    /// Offset one past the last element, relative to the start of the file
    pub fn end(&self) -> usize {
        self.offset + self.len
    }
}

impl From<(usize, usize, usize)> for Chunk {
    fn from((file, offset, len): (usize, usize, usize)) -> Self {
        Self::new(file, offset, len)
    }
}
