#![allow(clippy::result_large_err)]
//! flowgraph-core: the flow-graph transformation engine behind a visual
//! automation product's editor.
//!
//! A flow is a directed tree of [`Step`]s rooted at a single trigger.
//! [`apply`] takes an [`Operation`] and a [`Flow`] and returns a new flow
//! with the operation's effect applied -- the input is never mutated.
//!
//! # Public API
//!
//! - [`apply()`] / [`apply_with()`] -- apply one operation to a flow
//! - [`normalize()`] -- strip sample data/credentials, bump piece versions
//! - [`transfer()`] / [`transfer_async()`] -- structural rewrite primitive
//! - Query helpers: [`get_step`], [`get_used_pieces`], [`is_valid`],
//!   [`find_available_step_name`], [`update_flow_secrets`]
//! - Traversal: [`get_all_steps`], [`find_path_to_step`], [`is_child_of`]
//! - [`get_import_operations()`] -- linearize a subtree into replayable ops

pub mod apply;
pub mod config;
pub mod errors;
pub mod flow;
pub mod import_ops;
pub mod model;
pub mod naming;
pub mod normalize;
pub mod operation;
pub mod ops;
pub mod query;
pub mod transfer;
pub mod traverse;
pub mod validate;

pub use apply::{apply, apply_with};
pub use config::EngineConfig;
pub use errors::{FlowError, Result};
pub use flow::{Flow, FlowState};
pub use import_ops::get_import_operations;
pub use model::{
    BranchType, InputUiInfo, PieceSettings, RouterBranch, RouterSettings, Step, StepKind, StepMeta,
    StructuralSlot,
};
pub use normalize::normalize;
pub use operation::{NewStepKind, NewStepRequest, Operation, StepLocation};
pub use query::{find_available_step_name, get_step, get_used_pieces, is_valid, update_flow_secrets};
pub use transfer::{transfer, transfer_async};
pub use traverse::{find_path_to_step, get_all_steps, is_child_of, PathEntry};
pub use validate::{JsonSchemaValidator, SchemaValidator};
