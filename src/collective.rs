//! Collective helpers shared by the planner, the loader and the scatter engine
use crate::scatter::layout::PeerLayouts;
use itertools::Itertools;
use mpi::{
    collective::SystemOperation,
    ffi,
    raw::AsRaw,
    traits::{Communicator, CommunicatorCollectives, Equivalence},
    Count,
};
use std::ffi::c_void;

/// Convert a buffer length or offset to an MPI count.
pub(crate) fn to_count(value: usize) -> Count {
    Count::try_from(value)
        .unwrap_or_else(|_| panic!("Value {value} exceeds the range of an MPI count."))
}

/// Exclusive prefix sum of `n_local` over the ranks of `comm`.
///
/// MPI leaves the result on rank 0 undefined, so it is set explicitly.
pub(crate) fn exclusive_offset(comm: &impl Communicator, n_local: usize) -> usize {
    let mut offset: usize = 0;
    comm.exclusive_scan_into(&n_local, &mut offset, SystemOperation::sum());
    if comm.rank() == 0 {
        0
    } else {
        offset
    }
}

/// Send one count to every process and receive one count from every process.
pub(crate) fn all_to_all_counts(comm: &impl Communicator, counts: &[usize]) -> Vec<usize> {
    assert_eq!(counts.len(), comm.size() as usize);
    let mut recv_counts = vec![0usize; counts.len()];
    comm.all_to_all_into(counts, &mut recv_counts[..]);
    recv_counts
}

/// Performs an all-to-all communication of variable length data.
///
/// `counts[p]` consecutive entries of `data` go to process `p`.
/// Returns the receive counts from each processor and the received data.
pub(crate) fn all_to_all_varcount<T: Equivalence>(
    comm: &impl Communicator,
    counts: &[usize],
    data: &[T],
) -> (Vec<usize>, Vec<T>) {
    let recv_counts = all_to_all_counts(comm, counts);

    // We need the counts and displacements as MPI counts.
    let send_counts = counts.iter().map(|&x| to_count(x)).collect_vec();
    let receive_counts = recv_counts.iter().map(|&x| to_count(x)).collect_vec();

    let send_displacements = send_counts
        .iter()
        .scan(0, |acc, &x| {
            let old = *acc;
            *acc += x;
            Some(old)
        })
        .collect_vec();

    let receive_displacements = receive_counts
        .iter()
        .scan(0, |acc, &x| {
            let old = *acc;
            *acc += x;
            Some(old)
        })
        .collect_vec();

    let n_recv = recv_counts.iter().sum::<usize>();
    let mut receive_data = Vec::<T>::with_capacity(n_recv);
    // This avoids having to pre-initialise the array. Every entry of the spare capacity
    // is written by the exchange, after which the length is set manually.
    let receive_buf: &mut [T] = unsafe { std::mem::transmute(receive_data.spare_capacity_mut()) };

    let send_partition = mpi::datatype::Partition::new(data, send_counts, send_displacements);
    let mut receive_partition = mpi::datatype::PartitionMut::new(
        &mut receive_buf[..n_recv],
        receive_counts,
        receive_displacements,
    );

    comm.all_to_all_varcount_into(&send_partition, &mut receive_partition);

    unsafe { receive_data.set_len(n_recv) };

    (recv_counts, receive_data)
}

/// Exchange data with every process through per-peer derived datatypes.
///
/// Process `p` receives one instance of `send_layouts[p]` read from `send`, and this
/// process stores one instance of `recv_layouts[p]` into `recv`. The layouts address
/// elements relative to the start of each buffer, so no packing takes place.
///
/// # Safety
///
/// Every layout must stay within its buffer. `recv` must be valid for writes
/// over the full extent addressed by the receive layouts.
pub(crate) unsafe fn all_to_all_layouts<T: Equivalence>(
    comm: &impl Communicator,
    send: &[T],
    send_layouts: &PeerLayouts,
    recv: *mut T,
    recv_layouts: &PeerLayouts,
) {
    let size = comm.size() as usize;
    assert_eq!(send_layouts.len(), size);
    assert_eq!(recv_layouts.len(), size);

    // One instance of each peer's layout, anchored at the start of the buffer.
    let ones: Vec<Count> = vec![1; size];
    let zeros: Vec<Count> = vec![0; size];
    let send_types = send_layouts.raw();
    let recv_types = recv_layouts.raw();

    let code = unsafe {
        ffi::MPI_Alltoallw(
            send.as_ptr() as *const c_void,
            ones.as_ptr(),
            zeros.as_ptr(),
            send_types.as_ptr(),
            recv as *mut c_void,
            ones.as_ptr(),
            zeros.as_ptr(),
            recv_types.as_ptr(),
            comm.as_raw(),
        )
    };
    debug_assert_eq!(
        code as i64,
        ffi::MPI_SUCCESS as i64,
        "MPI_Alltoallw failed with code {code}."
    );
}
