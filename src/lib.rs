//! Redistribution of distributed arrays
//!
//! A dataset is held by the ranks of an MPI communicator in a canonical, balanced
//! partition. This crate loads such a dataset from an arbitrary number of files, whatever
//! the split of elements over the files, and reorders it across ranks according to an
//! index set chosen at runtime.
#![cfg_attr(feature = "strict", deny(warnings), deny(unused_crate_dependencies))]
#![warn(missing_docs)]

pub mod chunks;
mod collective;
pub mod config;
pub mod displs;
pub mod error;
pub mod io;
pub mod loader;
pub mod partition;
pub mod scatter;
pub mod traits;
pub mod types;

pub use chunks::chunk_files;
pub use error::{RedistributeError, Result};
pub use loader::FileLoader;
pub use scatter::{permute, permutev, scatter, scatterv, ExchangePlan};
pub use types::{Chunk, CsrArray};
