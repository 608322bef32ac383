//! Weighted random selection
//!
//! A cumulative-weight draw with bounded retries under an eligibility
//! predicate. Spell rolls and loot-style bonus tables share this primitive.

use rand::Rng;

use crate::error::SelectionError;

/// Redraws allowed after the first draw when none is given
pub const DEFAULT_RETRIES: usize = 10;

/// Immutable table of weighted entries
#[derive(Debug, Clone)]
pub struct WeightedTable<T> {
    entries: Vec<(T, u32)>,
    total_weight: u64,
}

impl<T> WeightedTable<T> {
    /// Build a table. Every weight must be positive.
    pub fn new(entries: Vec<(T, u32)>) -> Result<Self, SelectionError> {
        if entries.is_empty() {
            return Err(SelectionError::EmptyTable);
        }
        if let Some(index) = entries.iter().position(|(_, w)| *w == 0) {
            return Err(SelectionError::ZeroWeight { index });
        }
        let total_weight = entries.iter().map(|(_, w)| *w as u64).sum();
        Ok(Self {
            entries,
            total_weight,
        })
    }

    /// Sum of all weights
    pub fn total_weight(&self) -> u64 {
        self.total_weight
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate entries with their weights
    pub fn iter(&self) -> impl Iterator<Item = (&T, u32)> {
        self.entries.iter().map(|(item, w)| (item, *w))
    }

    /// Single cumulative draw with no eligibility check
    pub fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> &T {
        self.entry_at(rng.gen_range(0..self.total_weight))
    }

    /// Entry owning the point `r` of `[0, total_weight)`.
    ///
    /// The walk stops once the remainder goes negative, so entry `i` owns
    /// exactly `weight_i` points and `r == w0` already belongs to entry 1.
    fn entry_at(&self, r: u64) -> &T {
        let mut remaining = r as i64;
        for (item, weight) in &self.entries {
            remaining -= *weight as i64;
            if remaining < 0 {
                return item;
            }
        }
        // Unreachable for r below the total, kept as the documented fallback
        &self.entries[self.entries.len() - 1].0
    }

    /// Draw until `is_eligible` accepts, allowing `max_retries` redraws
    pub fn pick<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        is_eligible: impl Fn(&T) -> bool,
        max_retries: usize,
    ) -> Result<&T, SelectionError> {
        let attempts = max_retries + 1;
        for _ in 0..attempts {
            let candidate = self.draw(rng);
            if is_eligible(candidate) {
                return Ok(candidate);
            }
        }
        Err(SelectionError::RetriesExhausted { attempts })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_rejects_empty_and_zero_weight() {
        assert_eq!(
            WeightedTable::<u8>::new(vec![]).unwrap_err(),
            SelectionError::EmptyTable
        );
        assert_eq!(
            WeightedTable::new(vec![('a', 3), ('b', 0)]).unwrap_err(),
            SelectionError::ZeroWeight { index: 1 }
        );
    }

    #[test]
    fn test_total_weight() {
        let table = WeightedTable::new(vec![('a', 1), ('b', 3), ('c', 6)]).unwrap();
        assert_eq!(table.total_weight(), 10);
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn test_frequencies_converge_to_weights() {
        let table = WeightedTable::new(vec![(0usize, 1), (1, 3), (2, 6)]).unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        let mut counts = [0u32; 3];
        let draws = 100_000;
        for _ in 0..draws {
            counts[*table.draw(&mut rng)] += 1;
        }
        for (i, (_, weight)) in table.iter().enumerate() {
            let expected = weight as f64 / table.total_weight() as f64;
            let observed = counts[i] as f64 / draws as f64;
            assert!(
                (observed - expected).abs() < 0.01,
                "entry {i}: expected {expected}, observed {observed}"
            );
        }
    }

    #[test]
    fn test_boundary_point_belongs_to_next_entry() {
        let table = WeightedTable::new(vec![('a', 1), ('b', 3), ('c', 6)]).unwrap();
        assert_eq!(*table.entry_at(0), 'a');
        assert_eq!(*table.entry_at(1), 'b');
        assert_eq!(*table.entry_at(3), 'b');
        assert_eq!(*table.entry_at(4), 'c');
        assert_eq!(*table.entry_at(9), 'c');
        let owned: Vec<char> = (0..10).map(|r| *table.entry_at(r)).collect();
        assert_eq!(owned.iter().filter(|c| **c == 'a').count(), 1);
        assert_eq!(owned.iter().filter(|c| **c == 'c').count(), 6);
    }

    #[test]
    fn test_single_entry_always_drawn() {
        let table = WeightedTable::new(vec![("only", 5)]).unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..100 {
            assert_eq!(*table.draw(&mut rng), "only");
        }
    }

    #[test]
    fn test_pick_respects_eligibility() {
        let table = WeightedTable::new(vec![(1, 50), (2, 50)]).unwrap();
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..200 {
            let picked = table.pick(&mut rng, |v| *v == 2, 50).unwrap();
            assert_eq!(*picked, 2);
        }
    }

    #[test]
    fn test_pick_exhaustion_is_an_error() {
        let table = WeightedTable::new(vec![(1, 1), (2, 1)]).unwrap();
        let mut rng = StdRng::seed_from_u64(3);
        let err = table.pick(&mut rng, |_| false, DEFAULT_RETRIES).unwrap_err();
        assert_eq!(err, SelectionError::RetriesExhausted { attempts: 11 });
    }
}
