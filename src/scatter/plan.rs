//! Exchange plan
use super::layout::PeerLayouts;
use crate::{
    collective::{all_to_all_layouts, all_to_all_varcount},
    displs::{counts_from_displs, displs_from_counts},
    partition::{local_offset, local_size, locate_rank},
    types::CsrArray,
};
use log::{debug, trace};
use mpi::traits::{Communicator, Equivalence};

/// Desired indices bucketed by the rank that owns them
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequiredIndices {
    /// Number of indices owned by each rank
    pub counts: Vec<usize>,
    /// Start of each rank's bucket in `idxs`, with a trailing total
    pub displs: Vec<usize>,
    /// Global indices grouped by owner, in request order within each group
    pub idxs: Vec<usize>,
    /// Position in the request array of each entry of `idxs`
    pub local: Vec<usize>,
}

/// Count how many of `idxs` are owned by each of `n_ranks` ranks.
pub fn count_required(n_elems: usize, n_ranks: usize, idxs: &[usize]) -> Vec<usize> {
    let mut counts = vec![0; n_ranks];
    for &idx in idxs {
        counts[locate_rank(n_elems, n_ranks, idx)] += 1;
    }
    counts
}

/// Bucket `idxs` by owner while remembering where each index was requested.
pub fn make_required(n_elems: usize, n_ranks: usize, idxs: &[usize]) -> RequiredIndices {
    let counts = count_required(n_elems, n_ranks, idxs);
    let displs = displs_from_counts(&counts);

    let mut cursor = displs[..n_ranks].to_vec();
    let mut req_idxs = vec![0; idxs.len()];
    let mut local = vec![0; idxs.len()];
    for (pos, &idx) in idxs.iter().enumerate() {
        let rank = locate_rank(n_elems, n_ranks, idx);
        req_idxs[cursor[rank]] = idx;
        local[cursor[rank]] = pos;
        cursor[rank] += 1;
    }

    RequiredIndices {
        counts,
        displs,
        idxs: req_idxs,
        local,
    }
}

/// Who needs which element, for one set of desired indices.
///
/// Building the plan is collective: the desired indices are sent to the ranks that own
/// them. The plan can then move any number of arrays that share the partition of the
/// global array it was built for.
pub struct ExchangePlan<'a, C: Communicator> {
    comm: &'a C,
    n_elems: usize,
    n_local_elems: usize,
    required: RequiredIndices,
    // Local offsets of the elements this rank serves, grouped by requesting rank.
    out_idxs: Vec<usize>,
    out_displs: Vec<usize>,
}

impl<'a, C: Communicator> ExchangePlan<'a, C> {
    /// Create new
    ///
    /// `n_elems` is the global number of elements of the source array and `idxs` the
    /// global indices this rank wants, in the order it wants them.
    pub fn new(comm: &'a C, n_elems: usize, idxs: &[usize]) -> Self {
        let rank = comm.rank() as usize;
        let size = comm.size() as usize;

        // Sort the requests by owning rank.
        let required = make_required(n_elems, size, idxs);

        // Now send the requested global indices to their owners.
        let (out_counts, mut out_idxs) = all_to_all_varcount(comm, &required.counts, &required.idxs);
        let out_displs = displs_from_counts(&out_counts);

        // Turn the requests we received into offsets into our local data.
        let base = local_offset(n_elems, size, rank);
        let n_local_elems = local_size(n_elems, size, rank);
        for idx in out_idxs.iter_mut() {
            assert!(
                *idx >= base && *idx < base + n_local_elems,
                "Rank {rank} received a request for index {idx} outside of its range {base}..{}.",
                base + n_local_elems
            );
            *idx -= base;
        }

        debug!(
            "Rank {rank}: requesting {} elements, serving {} elements.",
            idxs.len(),
            out_idxs.len()
        );
        trace!(
            "Rank {rank}: requests per rank {:?}, served per rank {out_counts:?}.",
            required.counts
        );

        Self {
            comm,
            n_elems,
            n_local_elems,
            required,
            out_idxs,
            out_displs,
        }
    }

    /// Global number of elements of the source array
    pub fn n_elems(&self) -> usize {
        self.n_elems
    }

    /// Number of source elements held by this rank
    pub fn n_local_elems(&self) -> usize {
        self.n_local_elems
    }

    /// Number of elements this rank receives
    pub fn n_requested(&self) -> usize {
        self.required.local.len()
    }

    /// Number of elements this rank sends
    pub fn n_served(&self) -> usize {
        self.out_idxs.len()
    }

    /// The requests of this rank bucketed by owner
    pub fn required(&self) -> &RequiredIndices {
        &self.required
    }

    /// Gather the requested elements of `data`.
    ///
    /// `data` holds this rank's part of the source array. The result holds one element per
    /// desired index, in the order of the desired indices. Collective.
    pub fn scatter<T: Equivalence + Copy>(&self, data: &[T]) -> Vec<T> {
        assert_eq!(
            data.len(),
            self.n_local_elems,
            "Local data does not match the partition of {} elements.",
            self.n_elems
        );

        // Outgoing elements are read straight from their place in `data` and incoming
        // elements are written straight to the position they were requested at.
        let send_layouts = PeerLayouts::fixed::<T>(&self.out_idxs, &self.out_displs);
        let recv_layouts = PeerLayouts::fixed::<T>(&self.required.local, &self.required.displs);

        let n_recv = self.n_requested();
        let mut recv_data = Vec::<T>::with_capacity(n_recv);
        unsafe {
            all_to_all_layouts(
                self.comm,
                data,
                &send_layouts,
                recv_data.as_mut_ptr(),
                &recv_layouts,
            );
            // Every request position is covered by exactly one incoming block.
            recv_data.set_len(n_recv);
        }
        recv_data
    }

    /// Gather the requested elements of CSR data.
    ///
    /// `displs` has one entry more than the number of local elements and element `i` is
    /// `data[displs[i]..displs[i + 1]]`. Collective.
    pub fn scatterv<T: Equivalence + Copy>(&self, displs: &[usize], data: &[T]) -> CsrArray<T> {
        assert_eq!(
            displs.len(),
            self.n_local_elems + 1,
            "Displacements do not match the partition of {} elements.",
            self.n_elems
        );
        assert_eq!(displs[self.n_local_elems], data.len());

        // The lengths of the requested elements travel the same way as fixed size data.
        let elem_counts = counts_from_displs(displs);
        let recv_counts = self.scatter(&elem_counts);
        let recv_displs = displs_from_counts(&recv_counts);

        // Now address whole blocks instead of single elements.
        let send_layouts =
            PeerLayouts::variable::<T>(&self.out_idxs, &self.out_displs, displs, &elem_counts);
        let recv_layouts = PeerLayouts::variable::<T>(
            &self.required.local,
            &self.required.displs,
            &recv_displs,
            &recv_counts,
        );

        let n_recv = recv_displs[recv_counts.len()];
        let mut recv_data = Vec::<T>::with_capacity(n_recv);
        unsafe {
            all_to_all_layouts(
                self.comm,
                data,
                &send_layouts,
                recv_data.as_mut_ptr(),
                &recv_layouts,
            );
            // The incoming blocks tile the receive buffer.
            recv_data.set_len(n_recv);
        }

        debug!(
            "Rank {}: received {n_recv} entries for {} elements.",
            self.comm.rank(),
            recv_counts.len()
        );

        CsrArray::new(recv_data, recv_displs)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    // Rank `r` of `n_ranks` asks for the last element of the previous rank, the first
    // element of the next rank and its own middle element, with three elements per rank.
    fn neighbour_indices(rank: usize, n_ranks: usize) -> Vec<usize> {
        vec![
            ((rank + n_ranks - 1) % n_ranks) * 3 + 2,
            ((rank + 1) % n_ranks) * 3,
            rank * 3 + 1,
        ]
    }

    #[test]
    fn test_count_required_single_rank() {
        let counts = count_required(3, 1, &neighbour_indices(0, 1));
        assert_eq!(counts, vec![3]);
    }

    #[test]
    fn test_count_required_two_ranks() {
        for rank in 0..2 {
            let counts = count_required(6, 2, &neighbour_indices(rank, 2));
            assert_eq!(counts[rank], 1);
            assert_eq!(counts[(rank + 1) % 2], 2);
        }
    }

    #[test]
    fn test_count_required_many_ranks() {
        let n_ranks = 5;
        for rank in 0..n_ranks {
            let counts = count_required(3 * n_ranks, n_ranks, &neighbour_indices(rank, n_ranks));
            assert_eq!(counts[(rank + n_ranks - 1) % n_ranks], 1);
            assert_eq!(counts[(rank + 1) % n_ranks], 1);
            assert_eq!(counts[rank], 1);
            assert_eq!(counts.iter().sum::<usize>(), 3);
        }
    }

    #[test]
    fn test_make_required_single_rank() {
        let required = make_required(3, 1, &neighbour_indices(0, 1));
        assert_eq!(required.idxs, vec![2, 0, 1]);
        assert_eq!(required.local, vec![0, 1, 2]);
        assert_eq!(required.displs, vec![0, 3]);
    }

    #[test]
    fn test_make_required_two_ranks() {
        let required = make_required(6, 2, &neighbour_indices(0, 2));
        assert_eq!(required.idxs, vec![1, 5, 3]);
        assert_eq!(required.local, vec![2, 0, 1]);

        let required = make_required(6, 2, &neighbour_indices(1, 2));
        assert_eq!(required.idxs, vec![2, 0, 4]);
        assert_eq!(required.local, vec![0, 1, 2]);
    }

    #[test]
    fn test_make_required_duplicates() {
        let required = make_required(4, 2, &[3, 0, 3, 3]);
        assert_eq!(required.counts, vec![1, 3]);
        assert_eq!(required.idxs, vec![0, 3, 3, 3]);
        assert_eq!(required.local, vec![1, 0, 2, 3]);
    }

    #[test]
    fn test_make_required_empty() {
        let required = make_required(10, 3, &[]);
        assert_eq!(required.counts, vec![0, 0, 0]);
        assert_eq!(required.displs, vec![0, 0, 0, 0]);
        assert!(required.idxs.is_empty());
    }
}
