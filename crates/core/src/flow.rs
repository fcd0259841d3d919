//! Flow version: the root container around a step tree.

use crate::model::Step;
use crate::traverse::get_all_steps;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum FlowState {
    #[serde(rename = "DRAFT")]
    Draft,
    #[serde(rename = "LOCKED")]
    Locked,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Flow {
    pub display_name: String,
    pub state: FlowState,
    pub trigger: Step,
    pub valid: bool,
}

impl Flow {
    /// Recomputes `valid` as the AND of every reachable step's `valid` flag.
    /// Called at the end of every `apply`.
    pub fn recompute_validity(&mut self) {
        self.valid = get_all_steps(&self.trigger).iter().all(|s| s.valid());
    }
}
