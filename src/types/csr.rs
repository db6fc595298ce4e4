//! Variable length element groups in CSR layout
use crate::displs::{counts_from_displs, displs_from_counts};
use itertools::Itertools;

/// A flat payload array together with the displacements of its elements.
///
/// Element `i` is `data[displs[i]..displs[i + 1]]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsrArray<T> {
    data: Vec<T>,
    displs: Vec<usize>,
}

impl<T> CsrArray<T> {
    /// Create new
    ///
    /// Panics if `displs` is not a valid displacement array for `data`.
    pub fn new(data: Vec<T>, displs: Vec<usize>) -> Self {
        let csr = Self { data, displs };
        csr.validate();
        csr
    }

    /// Create from a payload and the number of entries in each element
    pub fn from_counts(data: Vec<T>, counts: &[usize]) -> Self {
        Self::new(data, displs_from_counts(counts))
    }

    /// Create an array with no elements
    pub fn empty() -> Self {
        Self {
            data: vec![],
            displs: vec![0],
        }
    }

    /// Check the CSR invariants
    ///
    /// The displacements start at zero, never decrease and end at the payload length.
    pub fn validate(&self) {
        assert!(
            !self.displs.is_empty(),
            "Displacement array needs at least one entry."
        );
        assert_eq!(self.displs[0], 0, "Displacements must start at zero.");
        assert!(
            self.displs.iter().tuple_windows().all(|(a, b)| a <= b),
            "Displacements must be non-decreasing."
        );
        assert_eq!(
            self.displs[self.displs.len() - 1],
            self.data.len(),
            "Last displacement must equal the payload length."
        );
    }

    /// Number of elements
    pub fn len(&self) -> usize {
        self.displs.len() - 1
    }

    /// Return true if there are no elements
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The entries of element `index`
    pub fn element(&self, index: usize) -> &[T] {
        &self.data[self.displs[index]..self.displs[index + 1]]
    }

    /// Iterate over the elements
    pub fn iter(&self) -> impl Iterator<Item = &[T]> + '_ {
        self.displs
            .iter()
            .tuple_windows()
            .map(|(&a, &b)| &self.data[a..b])
    }

    /// The flat payload
    pub fn data(&self) -> &[T] {
        &self.data
    }

    /// The displacements
    pub fn displs(&self) -> &[usize] {
        &self.displs
    }

    /// Number of entries in each element
    pub fn counts(&self) -> Vec<usize> {
        counts_from_displs(&self.displs)
    }

    /// Split into payload and displacements
    pub fn into_parts(self) -> (Vec<T>, Vec<usize>) {
        (self.data, self.displs)
    }
}

impl<T> Default for CsrArray<T> {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_elements() {
        let csr = CsrArray::new(vec![1, 2, 3, 4, 5, 6], vec![0, 1, 3, 3, 6]);
        assert_eq!(csr.len(), 4);
        assert_eq!(csr.element(0), &[1]);
        assert_eq!(csr.element(1), &[2, 3]);
        assert!(csr.element(2).is_empty());
        assert_eq!(csr.element(3), &[4, 5, 6]);
        assert_eq!(csr.iter().map(|e| e.len()).collect::<Vec<_>>(), csr.counts());
    }

    #[test]
    fn test_from_counts() {
        let csr = CsrArray::from_counts(vec![7, 8, 9], &[2, 0, 1]);
        assert_eq!(csr.displs(), &[0, 2, 2, 3]);
        assert_eq!(CsrArray::<u8>::empty().len(), 0);
        assert!(CsrArray::<u8>::default().is_empty());
    }

    #[test]
    #[should_panic]
    fn test_payload_mismatch() {
        CsrArray::new(vec![1, 2], vec![0, 1, 3]);
    }

    #[test]
    #[should_panic]
    fn test_nonzero_start() {
        CsrArray::new(vec![1, 2], vec![1, 2]);
    }
}
