//! Types

mod chunk;
mod csr;
pub use chunk::Chunk;
pub use csr::CsrArray;
