//! The closed set of operations `apply` understands, and the request shape
//! callers use to describe a step they want built.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum StepLocation {
    #[serde(rename = "AFTER")]
    After,
    #[serde(rename = "INSIDE_LOOP")]
    InsideLoop,
    #[serde(rename = "INSIDE_TRUE_BRANCH")]
    InsideTrueBranch,
    #[serde(rename = "INSIDE_FALSE_BRANCH")]
    InsideFalseBranch,
    #[serde(rename = "INSIDE_BRANCH")]
    InsideBranch,
}

/// Tag identifying the kind of step a `NewStepRequest` builds, mirroring
/// `StepKind` but without a payload -- callers supply raw settings JSON.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum NewStepKind {
    #[serde(rename = "TRIGGER_EMPTY")]
    TriggerEmpty,
    #[serde(rename = "TRIGGER_PIECE")]
    TriggerPiece,
    #[serde(rename = "ACTION_PIECE")]
    ActionPiece,
    #[serde(rename = "ACTION_CODE")]
    ActionCode,
    #[serde(rename = "ACTION_BRANCH")]
    ActionBranch,
    #[serde(rename = "ACTION_LOOP")]
    ActionLoop,
    #[serde(rename = "ACTION_ROUTER")]
    ActionRouter,
}

/// What a caller sends to describe a step to build: identity is normally
/// assigned by the engine (fresh-name allocation) and structural children
/// are always empty on construction -- composites get their structure from
/// follow-up operations or import-operation replay.
///
/// `name` is `None` for an ordinary caller-issued `ADD_ACTION` (the engine
/// allocates a fresh name). Move and duplicate set it explicitly: move
/// must preserve the source's original name, and duplicate must reuse the
/// exact name its rename map already rewrote `{{...}}` references to --
/// letting the engine allocate independently here would desynchronize the
/// rewritten references from the step that actually gets inserted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewStepRequest {
    #[serde(default)]
    pub name: Option<String>,
    pub display_name: String,
    pub kind: NewStepKind,
    #[serde(default)]
    pub settings: serde_json::Value,
    #[serde(default)]
    pub valid: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum Operation {
    #[serde(rename = "MOVE_ACTION")]
    MoveAction {
        name: String,
        new_parent: String,
        relative: StepLocation,
        #[serde(default)]
        branch_index: Option<usize>,
    },
    #[serde(rename = "LOCK_FLOW")]
    LockFlow {},
    #[serde(rename = "CHANGE_NAME")]
    ChangeName { display_name: String },
    #[serde(rename = "DELETE_ACTION")]
    DeleteAction { name: String },
    #[serde(rename = "ADD_ACTION")]
    AddAction {
        parent: String,
        relative: StepLocation,
        #[serde(default)]
        branch_index: Option<usize>,
        /// Set only by the import-operation generator for a router child:
        /// overwrites `settings.branches[branch_index].branch_name` on the
        /// parent router, always `"Branch <i>"` regardless of the original
        /// name.
        #[serde(default)]
        branch_name: Option<String>,
        action: NewStepRequest,
    },
    #[serde(rename = "UPDATE_ACTION")]
    UpdateAction { name: String, new_step: NewStepRequest },
    #[serde(rename = "UPDATE_TRIGGER")]
    UpdateTrigger { new_trigger: NewStepRequest },
    #[serde(rename = "DUPLICATE_ACTION")]
    DuplicateAction { name: String },
    #[serde(rename = "DELETE_BRANCH")]
    DeleteBranch { name: String, branch_index: usize },
    #[serde(rename = "ADD_BRANCH")]
    AddBranch { name: String, branch_index: usize },
    #[serde(rename = "DUPLICATE_BRANCH")]
    DuplicateBranch { name: String, branch_index: usize },
}
