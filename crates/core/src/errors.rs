//! Error type for the flow-graph engine.
//!
//! A single closed enum (struct variants, one `#[error("...")]` message
//! each) rather than `anyhow`: callers need to distinguish "operation
//! invalid" from "step not found" programmatically, not just print a
//! message.

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum FlowError {
    /// A move with a missing source or destination, an add with a
    /// `step_location_relative_to_parent` incompatible with the parent
    /// kind, or a duplicate of a step that doesn't exist.
    #[error("flow operation invalid: {0}")]
    OperationInvalid(String),

    /// `get_step` / any handler lookup by name that found nothing.
    #[error("step not found: {0}")]
    StepNotFound(String),

    /// A router operation addressed a branch index past the end of
    /// `settings.branches` / `children`.
    #[error("router branch index {index} out of range (len {len})")]
    BranchIndexOutOfRange { index: usize, len: usize },

    /// `ADD_ACTION`/`MOVE_ACTION` targeted a step that is not the kind of
    /// composite the requested `step_location_relative_to_parent` expects
    /// (e.g. `INSIDE_LOOP` on a router).
    #[error("step '{name}' is not a valid parent for location {location}")]
    IncompatibleParent { name: String, location: String },
}

pub type Result<T> = std::result::Result<T, FlowError>;
