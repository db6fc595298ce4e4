//! Per-peer indexed datatypes
use crate::collective::to_count;
use itertools::Itertools;
use mpi::{datatype::UserDatatype, ffi::MPI_Datatype, raw::AsRaw, traits::Equivalence};

/// One committed indexed datatype per process.
///
/// The datatypes are freed when the struct is dropped.
pub(crate) struct PeerLayouts {
    types: Vec<UserDatatype>,
}

impl PeerLayouts {
    /// Single elements of type `T`.
    ///
    /// The positions for process `p` are `positions[bounds[p]..bounds[p + 1]]`, measured in
    /// elements from the start of the buffer.
    pub fn fixed<T: Equivalence>(positions: &[usize], bounds: &[usize]) -> Self {
        let elem_type = T::equivalent_datatype();
        let types = bounds
            .iter()
            .tuple_windows()
            .map(|(&start, &end)| {
                let block_lengths = vec![1; end - start];
                let displacements = positions[start..end]
                    .iter()
                    .map(|&x| to_count(x))
                    .collect_vec();
                UserDatatype::indexed(&block_lengths, &displacements, &elem_type)
            })
            .collect_vec();
        Self { types }
    }

    /// Variable length blocks of type `T`.
    ///
    /// Block `i` of the buffer starts at `block_displs[i]` and holds `block_counts[i]`
    /// elements. Process `p` is addressed by the blocks `positions[bounds[p]..bounds[p + 1]]`.
    pub fn variable<T: Equivalence>(
        positions: &[usize],
        bounds: &[usize],
        block_displs: &[usize],
        block_counts: &[usize],
    ) -> Self {
        let elem_type = T::equivalent_datatype();
        let types = bounds
            .iter()
            .tuple_windows()
            .map(|(&start, &end)| {
                let (block_lengths, displacements): (Vec<_>, Vec<_>) = positions[start..end]
                    .iter()
                    .map(|&block| {
                        (
                            to_count(block_counts[block]),
                            to_count(block_displs[block]),
                        )
                    })
                    .unzip();
                UserDatatype::indexed(&block_lengths, &displacements, &elem_type)
            })
            .collect_vec();
        Self { types }
    }

    /// Number of processes covered
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Raw handles in process order
    pub fn raw(&self) -> Vec<MPI_Datatype> {
        self.types.iter().map(|t| t.as_raw()).collect_vec()
    }
}
