// Cohort order-statistics store
//
// One running state per (recipient, zip5, year). The percentile is answered with
// two heaps: `lower` holds exactly the `rank` smallest amounts (max on top) and
// `upper` holds the rest (min on top). Because the percentile is fixed for the
// run, the nearest rank grows by at most one per insertion, so rebalancing moves
// at most one element and each insertion is O(log n).

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

use crate::error::CoreError;
use crate::types::{Amount, CohortKey, CohortSnapshot, Percentile};

#[derive(Debug, Default)]
pub struct CohortState {
    lower: BinaryHeap<Amount>,
    upper: BinaryHeap<Reverse<Amount>>,
    count: u64,
    sum: Amount,
}

impl CohortState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn sum(&self) -> Amount {
        self.sum
    }

    /// Amount at the nearest rank for the current population, unrounded.
    pub fn percentile_amount(&self) -> Option<Amount> {
        self.lower.peek().copied()
    }

    /// Insert an amount and report the cohort statistics including it.
    ///
    /// Returns `None` without modifying the state if the running sum would overflow.
    pub fn insert(&mut self, amount: Amount, percentile: Percentile) -> Option<CohortSnapshot> {
        let sum = self.sum.checked_add(amount)?;

        match self.lower.peek() {
            Some(&top) if amount <= top => self.lower.push(amount),
            _ => self.upper.push(Reverse(amount)),
        }
        self.count += 1;
        self.sum = sum;
        self.rebalance(percentile.nearest_rank(self.len()));

        let value = self.percentile_amount()?;
        Some(CohortSnapshot {
            percentile_value: value.round_to_dollars(),
            sum: self.sum,
            count: self.count,
        })
    }

    fn len(&self) -> usize {
        self.lower.len() + self.upper.len()
    }

    fn rebalance(&mut self, rank: usize) {
        while self.lower.len() > rank {
            if let Some(top) = self.lower.pop() {
                self.upper.push(Reverse(top));
            }
        }
        while self.lower.len() < rank {
            match self.upper.pop() {
                Some(Reverse(next)) => self.lower.push(next),
                None => break,
            }
        }
    }
}

/// All cohort states for one run, created lazily and never evicted.
#[derive(Debug, Default)]
pub struct CohortStore {
    cohorts: HashMap<CohortKey, CohortState>,
}

impl CohortStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_and_query(
        &mut self,
        key: &CohortKey,
        amount: Amount,
        percentile: Percentile,
    ) -> Result<CohortSnapshot, CoreError> {
        self.cohorts
            .entry(key.clone())
            .or_default()
            .insert(amount, percentile)
            .ok_or_else(|| CoreError::SumOverflow {
                recipient_id: key.recipient_id.clone(),
                zip5: key.zip5.clone(),
                year: key.year,
            })
    }

    pub fn get(&self, key: &CohortKey) -> Option<&CohortState> {
        self.cohorts.get(key)
    }

    /// Number of cohorts created so far.
    pub fn len(&self) -> usize {
        self.cohorts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cohorts.is_empty()
    }
}
