//! Conversions between counts and displacements
//!
//! The slice forms write into caller supplied storage and do not allocate.

/// Exclusive prefix sum of `counts` into `displs`.
///
/// Both slices have the same length; `displs[0] == 0`.
pub fn make_displs(counts: &[usize], displs: &mut [usize]) {
    assert_eq!(counts.len(), displs.len());
    let mut acc = 0;
    for (d, c) in displs.iter_mut().zip(counts) {
        *d = acc;
        acc += c;
    }
}

/// Exclusive prefix sum of `counts` with a trailing total.
///
/// `displs` must have one more entry than `counts`.
pub fn make_displs2(counts: &[usize], displs: &mut [usize]) {
    assert_eq!(counts.len() + 1, displs.len());
    let size = counts.len();
    make_displs(counts, &mut displs[..size]);
    displs[size] = if size == 0 {
        0
    } else {
        displs[size - 1] + counts[size - 1]
    };
}

/// Turn a buffer of counts into displacements in place.
///
/// The buffer holds `size + 1` entries. On entry the first `size` are counts
/// (the last entry is ignored); on exit the buffer holds the displacements
/// including the trailing total.
pub fn make_displs_inplace(buf: &mut [usize]) {
    assert!(!buf.is_empty());
    let mut acc = 0;
    let size = buf.len() - 1;
    for value in buf[..size].iter_mut() {
        let count = *value;
        *value = acc;
        acc += count;
    }
    buf[size] = acc;
}

/// Difference of consecutive displacements.
///
/// `displs` must have one more entry than `counts`.
pub fn make_counts(displs: &[usize], counts: &mut [usize]) {
    assert_eq!(counts.len() + 1, displs.len());
    for (c, w) in counts.iter_mut().zip(displs.windows(2)) {
        assert!(w[1] >= w[0], "Displacements must be non-decreasing.");
        *c = w[1] - w[0];
    }
}

/// Allocating form of [`make_displs2`].
pub fn displs_from_counts(counts: &[usize]) -> Vec<usize> {
    let mut displs = vec![0; counts.len() + 1];
    make_displs2(counts, &mut displs);
    displs
}

/// Allocating form of [`make_counts`].
pub fn counts_from_displs(displs: &[usize]) -> Vec<usize> {
    assert!(!displs.is_empty());
    let mut counts = vec![0; displs.len() - 1];
    make_counts(displs, &mut counts);
    counts
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_make_displs() {
        make_displs(&[], &mut []);

        let mut displs = [0; 3];
        make_displs(&[3, 4, 2], &mut displs);
        assert_eq!(displs, [0, 3, 7]);
    }

    #[test]
    fn test_make_displs2() {
        let mut displs = [7; 1];
        make_displs2(&[], &mut displs);
        assert_eq!(displs, [0]);

        let mut displs = [0; 4];
        make_displs2(&[3, 4, 2], &mut displs);
        assert_eq!(displs, [0, 3, 7, 9]);
    }

    #[test]
    fn test_make_displs_inplace() {
        let mut buf = [3, 0, 4, 2, 99];
        make_displs_inplace(&mut buf);
        assert_eq!(buf, [0, 3, 3, 7, 9]);

        let mut buf = [5];
        make_displs_inplace(&mut buf);
        assert_eq!(buf, [0]);
    }

    #[test]
    fn test_make_counts() {
        let mut counts = [0; 3];
        make_counts(&[0, 1, 3, 6], &mut counts);
        assert_eq!(counts, [1, 2, 3]);
        assert_eq!(counts_from_displs(&[0]), Vec::<usize>::new());
    }

    #[test]
    fn test_counts_displs_inverse() {
        let counts = vec![0, 5, 1, 0, 2];
        assert_eq!(counts_from_displs(&displs_from_counts(&counts)), counts);
    }

    #[test]
    #[should_panic]
    fn test_make_counts_decreasing() {
        counts_from_displs(&[0, 3, 2]);
    }
}
