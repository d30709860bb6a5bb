//! Harmonic offset table
//!
//! Entry `k` (1-indexed) is the distance in semitones from the fundamental to
//! its k-th harmonic, `round(12 * log2(k))`. Ties round away from zero, though
//! no integral `k` lands on one.

use crate::error::{Result, WandererError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarmonicTable {
    entries: Vec<i32>,
}

impl HarmonicTable {
    pub fn build(size: usize) -> Result<Self> {
        if size == 0 {
            return Err(WandererError::InvalidTableSize(size));
        }
        let entries = (1..=size)
            .map(|k| (12.0 * (k as f64).log2()).round() as i32)
            .collect();
        Ok(Self { entries })
    }

    pub fn get(&self, index: usize) -> Option<i32> {
        self.entries.get(index).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn as_slice(&self) -> &[i32] {
        &self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_of_eight() {
        let table = HarmonicTable::build(8).unwrap();
        assert_eq!(table.as_slice(), &[0, 12, 19, 24, 28, 31, 34, 36]);
    }

    #[test]
    fn test_table_shape() {
        let table = HarmonicTable::build(64).unwrap();
        assert_eq!(table.get(0), Some(0));
        assert!(table.as_slice().windows(2).all(|w| w[0] <= w[1]));
        // Octaves land exactly
        assert_eq!(table.get(15), Some(48));
        assert_eq!(table.get(63), Some(72));
    }

    #[test]
    fn test_single_entry() {
        assert_eq!(HarmonicTable::build(1).unwrap().as_slice(), &[0]);
    }

    #[test]
    fn test_zero_size_rejected() {
        assert!(matches!(HarmonicTable::build(0), Err(WandererError::InvalidTableSize(0))));
    }
}
