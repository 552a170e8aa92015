// Donor history index
//
// Maps each donor identity to the earliest year it has been seen in this run.
// The stored year only ever moves down, and entries are never removed.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use crate::types::DonorKey;

#[derive(Debug, Default)]
pub struct DonorHistoryIndex {
    earliest: HashMap<DonorKey, i32>,
}

impl DonorHistoryIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Classify a contribution and record it.
    ///
    /// Returns `true` only when the donor already has a strictly earlier year
    /// on record. A first appearance is never a repeat; an equal or earlier
    /// year lowers the stored earliest year and is not a repeat either.
    pub fn observe(&mut self, donor: &DonorKey, year: i32) -> bool {
        match self.earliest.entry(donor.clone()) {
            Entry::Vacant(slot) => {
                slot.insert(year);
                false
            }
            Entry::Occupied(mut slot) => {
                let earliest = slot.get_mut();
                if year > *earliest {
                    true
                } else {
                    *earliest = year;
                    false
                }
            }
        }
    }

    pub fn earliest_year(&self, donor: &DonorKey) -> Option<i32> {
        self.earliest.get(donor).copied()
    }

    /// Number of distinct donors seen.
    pub fn len(&self) -> usize {
        self.earliest.len()
    }

    pub fn is_empty(&self) -> bool {
        self.earliest.is_empty()
    }
}
