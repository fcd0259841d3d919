//! Import-operation generator: linearizes a subtree into an ordered
//! sequence of `ADD_ACTION` operations that, replayed against a flow
//! where the root already exists, reconstruct the root's entire
//! descendant structure -- one ordered primitive op per node rather than
//! serializing the tree wholesale, needed because `ADD_ACTION` always
//! head-inserts and so cannot take a pre-wired subtree without
//! re-deriving the wiring one node at a time.

use crate::model::{Step, StepKind};
use crate::operation::{NewStepKind, NewStepRequest, Operation, StepLocation};

pub fn get_import_operations(root: &Step) -> Vec<Operation> {
    let mut ops = Vec::new();
    emit_next_chain(root, &mut ops);
    ops
}

fn emit_next_chain(node: &Step, ops: &mut Vec<Operation>) {
    if let Some(next) = node.next() {
        ops.push(Operation::AddAction {
            parent: node.name().to_string(),
            relative: StepLocation::After,
            branch_index: None,
            branch_name: None,
            action: to_new_step_request(next),
        });
        emit_next_chain(next, ops);
    }
    emit_structural(node, ops);
}

fn emit_structural(node: &Step, ops: &mut Vec<Operation>) {
    match node {
        Step::ActionBranch { on_success, on_failure, .. } => {
            if let Some(head) = on_success.as_deref() {
                ops.push(Operation::AddAction {
                    parent: node.name().to_string(),
                    relative: StepLocation::InsideTrueBranch,
                    branch_index: None,
                    branch_name: None,
                    action: to_new_step_request(head),
                });
                emit_next_chain(head, ops);
            }
            if let Some(head) = on_failure.as_deref() {
                ops.push(Operation::AddAction {
                    parent: node.name().to_string(),
                    relative: StepLocation::InsideFalseBranch,
                    branch_index: None,
                    branch_name: None,
                    action: to_new_step_request(head),
                });
                emit_next_chain(head, ops);
            }
        }
        Step::ActionLoop { first_loop_action, .. } => {
            if let Some(head) = first_loop_action.as_deref() {
                ops.push(Operation::AddAction {
                    parent: node.name().to_string(),
                    relative: StepLocation::InsideLoop,
                    branch_index: None,
                    branch_name: None,
                    action: to_new_step_request(head),
                });
                emit_next_chain(head, ops);
            }
        }
        Step::ActionRouter { children, .. } => {
            for (i, child) in children.iter().enumerate() {
                if let Some(head) = child.as_deref() {
                    ops.push(Operation::AddAction {
                        parent: node.name().to_string(),
                        relative: StepLocation::InsideBranch,
                        branch_index: Some(i),
                        branch_name: Some(format!("Branch {}", i + 1)),
                        action: to_new_step_request(head),
                    });
                    emit_next_chain(head, ops);
                }
            }
        }
        _ => {}
    }
}

/// Clones `step` and strips every structural slot and `next`, leaving only
/// its own identity and settings so replay re-adds descendants one at a
/// time instead of as a pre-wired tree.
pub fn copy_without_descendants(step: &Step) -> Step {
    let mut clone = step.clone();
    clone.strip_descendants();
    clone
}

/// Builds the `ADD_ACTION` payload for `step`, preserving its current name
/// (not reallocating one) so replay reproduces move/duplicate's
/// already-decided identity instead of drifting from the references a
/// rename pass may have rewritten against it.
pub(crate) fn to_new_step_request(step: &Step) -> NewStepRequest {
    let stripped = copy_without_descendants(step);
    let kind = match stripped.kind() {
        StepKind::TriggerEmpty => NewStepKind::TriggerEmpty,
        StepKind::TriggerPiece => NewStepKind::TriggerPiece,
        StepKind::ActionPiece => NewStepKind::ActionPiece,
        StepKind::ActionCode => NewStepKind::ActionCode,
        StepKind::ActionBranch => NewStepKind::ActionBranch,
        StepKind::ActionLoop => NewStepKind::ActionLoop,
        StepKind::ActionRouter => NewStepKind::ActionRouter,
    };
    let settings = match &stripped {
        Step::TriggerPiece { settings, .. } | Step::ActionPiece { settings, .. } => {
            serde_json::to_value(settings).unwrap_or(serde_json::Value::Null)
        }
        Step::ActionRouter { settings, .. } => {
            serde_json::to_value(settings).unwrap_or(serde_json::Value::Null)
        }
        Step::TriggerEmpty { settings, .. }
        | Step::ActionCode { settings, .. }
        | Step::ActionBranch { settings, .. }
        | Step::ActionLoop { settings, .. } => settings.clone(),
    };
    NewStepRequest {
        name: Some(stripped.name().to_string()),
        display_name: stripped.meta().display_name.clone(),
        kind,
        settings,
        valid: Some(stripped.valid()),
    }
}
