use std::collections::HashMap;

use super::encoder::EncodedState;
use crate::game::RelativeAction;

/// Number of actions per state
pub const NUM_ACTIONS: usize = 3;

/// Action values for one state, indexed by [`RelativeAction::index`]
pub type ActionValues = [f64; NUM_ACTIONS];

/// Sparse table of action values keyed by encoded state
///
/// Rows are created lazily with all values at 0.0 the first time a state is
/// looked up through [`get`](Self::get).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QTable {
    values: HashMap<EncodedState, ActionValues>,
}

impl QTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from previously saved rows
    pub fn from_entries(entries: impl IntoIterator<Item = (EncodedState, ActionValues)>) -> Self {
        Self {
            values: entries.into_iter().collect(),
        }
    }

    /// Row for `state`, inserting a zero row if the state is new
    pub fn get(&mut self, state: EncodedState) -> &mut ActionValues {
        self.values.entry(state).or_insert([0.0; NUM_ACTIONS])
    }

    /// Row for `state` without inserting
    pub fn peek(&self, state: &EncodedState) -> Option<&ActionValues> {
        self.values.get(state)
    }

    /// Greedy action for `state`; ties go to the lowest index
    pub fn best_action(&mut self, state: EncodedState) -> RelativeAction {
        let row = self.get(state);
        let mut best = 0;
        for (idx, &value) in row.iter().enumerate().skip(1) {
            if value > row[best] {
                best = idx;
            }
        }

        RelativeAction::ALL[best]
    }

    /// Largest action value for `state`
    pub fn max_value(&mut self, state: EncodedState) -> f64 {
        self.get(state).iter().copied().fold(f64::NEG_INFINITY, f64::max)
    }

    pub fn contains(&self, state: &EncodedState) -> bool {
        self.values.contains_key(state)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&EncodedState, &ActionValues)> {
        self.values.iter()
    }
}
