//! Scatter and permute distributed arrays
//!
//! A distributed array of `n_elems` elements is held in the canonical partition (see
//! [`crate::partition`]). Each rank names the global indices it wants and receives those
//! elements, in the order it named them. Indices may refer to any rank, including the
//! calling one, and may repeat.
//!
//! All functions here are collective: every rank of the communicator must call them, also
//! ranks that request nothing.

pub(crate) mod layout;
mod plan;

pub use plan::{count_required, make_required, ExchangePlan, RequiredIndices};

use crate::types::CsrArray;
use mpi::traits::{Communicator, Equivalence};

/// Gather the elements at the global indices `idxs`.
///
/// `data` is this rank's part of a distributed array of `n_elems` elements.
pub fn scatter<T: Equivalence + Copy, C: Communicator>(
    comm: &C,
    n_elems: usize,
    idxs: &[usize],
    data: &[T],
) -> Vec<T> {
    ExchangePlan::new(comm, n_elems, idxs).scatter(data)
}

/// Gather the CSR elements at the global indices `idxs`.
///
/// `displs` and `data` are this rank's part of a distributed array of `n_elems` variable
/// length elements, with element `i` being `data[displs[i]..displs[i + 1]]`.
pub fn scatterv<T: Equivalence + Copy, C: Communicator>(
    comm: &C,
    n_elems: usize,
    displs: &[usize],
    idxs: &[usize],
    data: &[T],
) -> CsrArray<T> {
    ExchangePlan::new(comm, n_elems, idxs).scatterv(displs, data)
}

/// Replace `data` with the elements at the global indices `idxs`.
///
/// The input buffer is consumed and the rearranged buffer returned.
pub fn permute<T: Equivalence + Copy, C: Communicator>(
    comm: &C,
    n_elems: usize,
    idxs: &[usize],
    data: Vec<T>,
) -> Vec<T> {
    scatter(comm, n_elems, idxs, &data)
}

/// Replace CSR `data` with the elements at the global indices `idxs`.
///
/// The input array is consumed and the rearranged array returned.
pub fn permutev<T: Equivalence + Copy, C: Communicator>(
    comm: &C,
    n_elems: usize,
    idxs: &[usize],
    data: CsrArray<T>,
) -> CsrArray<T> {
    scatterv(comm, n_elems, data.displs(), idxs, data.data())
}
