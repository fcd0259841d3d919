//! Shared step/flow types for the flow-graph engine.
//!
//! These types are produced and consumed by every operation handler, so
//! they live here rather than in any one handler module (mirrors tenor's
//! `ast.rs`, which plays the same role for `RawConstruct`/`RawStep`).

use crate::operation::{NewStepKind, NewStepRequest};
use serde::{Deserialize, Serialize};

// ──────────────────────────────────────────────
// Common step fields
// ──────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StepMeta {
    pub name: String,
    pub display_name: String,
    #[serde(default = "default_valid")]
    pub valid: bool,
}

fn default_valid() -> bool {
    true
}

// ──────────────────────────────────────────────
// Kind-specific settings
// ──────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct InputUiInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_selected_data: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample_data_file_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_test_date: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PieceSettings {
    pub piece_name: String,
    pub piece_version: String,
    #[serde(default)]
    pub input: serde_json::Value,
    #[serde(default)]
    pub input_ui_info: InputUiInfo,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum BranchType {
    #[serde(rename = "CONDITION")]
    Condition,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RouterBranch {
    pub conditions: serde_json::Value,
    pub branch_type: BranchType,
    pub branch_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RouterSettings {
    pub branches: Vec<RouterBranch>,
}

// ──────────────────────────────────────────────
// Step
// ──────────────────────────────────────────────

/// A node in a flow tree. Every composite step exclusively owns its
/// structural children and `next` -- there is no shared ownership and no
/// back-pointers (parent lookup is always recomputed from the root).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum Step {
    #[serde(rename = "TRIGGER_EMPTY")]
    TriggerEmpty {
        #[serde(flatten)]
        meta: StepMeta,
        #[serde(default)]
        settings: serde_json::Value,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        next: Option<Box<Step>>,
    },
    #[serde(rename = "TRIGGER_PIECE")]
    TriggerPiece {
        #[serde(flatten)]
        meta: StepMeta,
        settings: PieceSettings,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        next: Option<Box<Step>>,
    },
    #[serde(rename = "ACTION_PIECE")]
    ActionPiece {
        #[serde(flatten)]
        meta: StepMeta,
        settings: PieceSettings,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        next: Option<Box<Step>>,
    },
    #[serde(rename = "ACTION_CODE")]
    ActionCode {
        #[serde(flatten)]
        meta: StepMeta,
        #[serde(default)]
        settings: serde_json::Value,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        next: Option<Box<Step>>,
    },
    #[serde(rename = "ACTION_BRANCH")]
    ActionBranch {
        #[serde(flatten)]
        meta: StepMeta,
        #[serde(default)]
        settings: serde_json::Value,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        on_success: Option<Box<Step>>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        on_failure: Option<Box<Step>>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        next: Option<Box<Step>>,
    },
    #[serde(rename = "ACTION_LOOP")]
    ActionLoop {
        #[serde(flatten)]
        meta: StepMeta,
        #[serde(default)]
        settings: serde_json::Value,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        first_loop_action: Option<Box<Step>>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        next: Option<Box<Step>>,
    },
    #[serde(rename = "ACTION_ROUTER")]
    ActionRouter {
        #[serde(flatten)]
        meta: StepMeta,
        settings: RouterSettings,
        #[serde(default)]
        children: Vec<Option<Box<Step>>>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        next: Option<Box<Step>>,
    },
}

/// Unit tag for a step's kind, used where only the shape matters (error
/// messages, import-op replay, fresh-step construction).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepKind {
    TriggerEmpty,
    TriggerPiece,
    ActionPiece,
    ActionCode,
    ActionBranch,
    ActionLoop,
    ActionRouter,
}

impl StepKind {
    pub fn is_trigger(self) -> bool {
        matches!(self, StepKind::TriggerEmpty | StepKind::TriggerPiece)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            StepKind::TriggerEmpty => "TRIGGER_EMPTY",
            StepKind::TriggerPiece => "TRIGGER_PIECE",
            StepKind::ActionPiece => "ACTION_PIECE",
            StepKind::ActionCode => "ACTION_CODE",
            StepKind::ActionBranch => "ACTION_BRANCH",
            StepKind::ActionLoop => "ACTION_LOOP",
            StepKind::ActionRouter => "ACTION_ROUTER",
        }
    }
}

/// A named structural slot on a composite step, used by handlers that need
/// to address "the on_success chain" or "router branch 2" generically.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StructuralSlot {
    OnSuccess,
    OnFailure,
    FirstLoopAction,
    RouterChild(usize),
}

impl Step {
    pub fn meta(&self) -> &StepMeta {
        match self {
            Step::TriggerEmpty { meta, .. }
            | Step::TriggerPiece { meta, .. }
            | Step::ActionPiece { meta, .. }
            | Step::ActionCode { meta, .. }
            | Step::ActionBranch { meta, .. }
            | Step::ActionLoop { meta, .. }
            | Step::ActionRouter { meta, .. } => meta,
        }
    }

    pub fn meta_mut(&mut self) -> &mut StepMeta {
        match self {
            Step::TriggerEmpty { meta, .. }
            | Step::TriggerPiece { meta, .. }
            | Step::ActionPiece { meta, .. }
            | Step::ActionCode { meta, .. }
            | Step::ActionBranch { meta, .. }
            | Step::ActionLoop { meta, .. }
            | Step::ActionRouter { meta, .. } => meta,
        }
    }

    pub fn name(&self) -> &str {
        &self.meta().name
    }

    pub fn valid(&self) -> bool {
        self.meta().valid
    }

    pub fn set_valid(&mut self, valid: bool) {
        self.meta_mut().valid = valid;
    }

    pub fn kind(&self) -> StepKind {
        match self {
            Step::TriggerEmpty { .. } => StepKind::TriggerEmpty,
            Step::TriggerPiece { .. } => StepKind::TriggerPiece,
            Step::ActionPiece { .. } => StepKind::ActionPiece,
            Step::ActionCode { .. } => StepKind::ActionCode,
            Step::ActionBranch { .. } => StepKind::ActionBranch,
            Step::ActionLoop { .. } => StepKind::ActionLoop,
            Step::ActionRouter { .. } => StepKind::ActionRouter,
        }
    }

    pub fn is_piece(&self) -> bool {
        matches!(self, Step::ActionPiece { .. } | Step::TriggerPiece { .. })
    }

    pub fn piece_settings(&self) -> Option<&PieceSettings> {
        match self {
            Step::ActionPiece { settings, .. } | Step::TriggerPiece { settings, .. } => {
                Some(settings)
            }
            _ => None,
        }
    }

    pub fn piece_settings_mut(&mut self) -> Option<&mut PieceSettings> {
        match self {
            Step::ActionPiece { settings, .. } | Step::TriggerPiece { settings, .. } => {
                Some(settings)
            }
            _ => None,
        }
    }

    pub fn next(&self) -> Option<&Step> {
        match self {
            Step::TriggerEmpty { next, .. }
            | Step::TriggerPiece { next, .. }
            | Step::ActionPiece { next, .. }
            | Step::ActionCode { next, .. }
            | Step::ActionBranch { next, .. }
            | Step::ActionLoop { next, .. }
            | Step::ActionRouter { next, .. } => next.as_deref(),
        }
    }

    pub fn next_mut(&mut self) -> &mut Option<Box<Step>> {
        match self {
            Step::TriggerEmpty { next, .. }
            | Step::TriggerPiece { next, .. }
            | Step::ActionPiece { next, .. }
            | Step::ActionCode { next, .. }
            | Step::ActionBranch { next, .. }
            | Step::ActionLoop { next, .. }
            | Step::ActionRouter { next, .. } => next,
        }
    }

    pub fn take_next(&mut self) -> Option<Box<Step>> {
        self.next_mut().take()
    }

    pub fn set_next(&mut self, value: Option<Box<Step>>) {
        *self.next_mut() = value;
    }

    /// The structural slots a composite step owns, in canonical DFS order
    /// (success before failure, loop body, router children in index
    /// order). Leaves return an empty vec.
    pub fn structural_slots(&self) -> Vec<StructuralSlot> {
        match self {
            Step::ActionBranch { .. } => vec![StructuralSlot::OnSuccess, StructuralSlot::OnFailure],
            Step::ActionLoop { .. } => vec![StructuralSlot::FirstLoopAction],
            Step::ActionRouter { children, .. } => {
                (0..children.len()).map(StructuralSlot::RouterChild).collect()
            }
            _ => Vec::new(),
        }
    }

    pub fn get_slot(&self, slot: StructuralSlot) -> Option<&Step> {
        match (self, slot) {
            (Step::ActionBranch { on_success, .. }, StructuralSlot::OnSuccess) => {
                on_success.as_deref()
            }
            (Step::ActionBranch { on_failure, .. }, StructuralSlot::OnFailure) => {
                on_failure.as_deref()
            }
            (Step::ActionLoop { first_loop_action, .. }, StructuralSlot::FirstLoopAction) => {
                first_loop_action.as_deref()
            }
            (Step::ActionRouter { children, .. }, StructuralSlot::RouterChild(i)) => {
                children.get(i).and_then(|c| c.as_deref())
            }
            _ => None,
        }
    }

    pub fn get_slot_mut(&mut self, slot: StructuralSlot) -> Option<&mut Option<Box<Step>>> {
        match (self, slot) {
            (Step::ActionBranch { on_success, .. }, StructuralSlot::OnSuccess) => Some(on_success),
            (Step::ActionBranch { on_failure, .. }, StructuralSlot::OnFailure) => Some(on_failure),
            (Step::ActionLoop { first_loop_action, .. }, StructuralSlot::FirstLoopAction) => {
                Some(first_loop_action)
            }
            (Step::ActionRouter { children, .. }, StructuralSlot::RouterChild(i)) => {
                children.get_mut(i)
            }
            _ => None,
        }
    }

    /// Clears every structural slot and `next` on this step, keeping only
    /// its own identity/settings. Used by `get_import_operations`'s
    /// `copy_without_descendants` and by duplicate/move's chain-terminus
    /// clones.
    pub fn strip_descendants(&mut self) {
        self.set_next(None);
        for slot in self.structural_slots() {
            if let Some(s) = self.get_slot_mut(slot) {
                *s = None;
            }
        }
    }

    /// Builds a fresh, structurally empty step of the kind `request`
    /// describes, named `name`. Structural slots always start empty --
    /// callers that need a populated composite reach it through follow-up
    /// `ADD_ACTION`s or import-operation replay, never through this
    /// constructor.
    pub fn from_request(name: String, request: &NewStepRequest) -> Step {
        let meta = StepMeta {
            name,
            display_name: request.display_name.clone(),
            valid: request.valid.unwrap_or(true),
        };
        match request.kind {
            NewStepKind::TriggerEmpty => {
                Step::TriggerEmpty { meta, settings: request.settings.clone(), next: None }
            }
            NewStepKind::TriggerPiece => Step::TriggerPiece {
                meta,
                settings: piece_settings_from_value(&request.settings),
                next: None,
            },
            NewStepKind::ActionPiece => Step::ActionPiece {
                meta,
                settings: piece_settings_from_value(&request.settings),
                next: None,
            },
            NewStepKind::ActionCode => {
                Step::ActionCode { meta, settings: request.settings.clone(), next: None }
            }
            NewStepKind::ActionBranch => Step::ActionBranch {
                meta,
                settings: request.settings.clone(),
                on_success: None,
                on_failure: None,
                next: None,
            },
            NewStepKind::ActionLoop => Step::ActionLoop {
                meta,
                settings: request.settings.clone(),
                first_loop_action: None,
                next: None,
            },
            NewStepKind::ActionRouter => {
                let settings = router_settings_from_value(&request.settings);
                let children = vec![None; settings.branches.len()];
                Step::ActionRouter { meta, settings, children, next: None }
            }
        }
    }
}

/// Deserializes `PieceSettings` from caller-supplied JSON, falling back to
/// field-by-field extraction with empty defaults rather than erroring --
/// schema validation, not construction, is where a malformed piece step
/// is supposed to surface as invalid.
fn piece_settings_from_value(value: &serde_json::Value) -> PieceSettings {
    serde_json::from_value(value.clone()).unwrap_or_else(|_| PieceSettings {
        piece_name: value.get("piece_name").and_then(|v| v.as_str()).unwrap_or("").to_string(),
        piece_version: value.get("piece_version").and_then(|v| v.as_str()).unwrap_or("").to_string(),
        input: value.get("input").cloned().unwrap_or(serde_json::Value::Null),
        input_ui_info: Default::default(),
    })
}

/// Same leniency as [`piece_settings_from_value`]; a router built with no
/// recognizable `branches` gets the product's default two-branch shape.
fn router_settings_from_value(value: &serde_json::Value) -> RouterSettings {
    serde_json::from_value(value.clone()).unwrap_or_else(|_| RouterSettings {
        branches: vec![
            RouterBranch {
                conditions: serde_json::json!([[]]),
                branch_type: BranchType::Condition,
                branch_name: "Branch 1".to_string(),
            },
            RouterBranch {
                conditions: serde_json::json!([[]]),
                branch_type: BranchType::Condition,
                branch_name: "Branch 2".to_string(),
            },
        ],
    })
}
