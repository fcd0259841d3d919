//! Top-level dispatcher: `apply(flow, operation) -> flow`.

use crate::config::EngineConfig;
use crate::errors::Result;
use crate::flow::Flow;
use crate::operation::Operation;
use crate::ops::{add, branch, delete, duplicate, flow_ops, move_, update};
use crate::transfer::transfer;
use crate::validate::{JsonSchemaValidator, SchemaValidator};

/// Applies `op` to `flow` with the default [`JsonSchemaValidator`].
pub fn apply(flow: &Flow, op: &Operation) -> Result<Flow> {
    apply_with(flow, op, &JsonSchemaValidator)
}

/// Same as [`apply`], but with a caller-supplied validator -- mirrors
/// an `elaborate()` / `elaborate_with_provider()`-style split, useful in
/// tests that want a validator stricter or looser than the default.
pub fn apply_with(flow: &Flow, op: &Operation, validator: &dyn SchemaValidator) -> Result<Flow> {
    let config = EngineConfig::default();
    let mut next = apply_operation(flow, &config, op)?;
    revalidate(&mut next, validator);
    next.recompute_validity();
    Ok(next)
}

/// Dispatches a single operation without the validity/schema recompute
/// pass -- used internally by handlers (move, duplicate) that replay a
/// sequence of `ADD_ACTION`s and only want the final `apply` to pay for
/// revalidation once.
pub(crate) fn apply_operation(flow: &Flow, config: &EngineConfig, op: &Operation) -> Result<Flow> {
    match op {
        Operation::MoveAction { name, new_parent, relative, branch_index } => {
            move_::move_action(flow, config, name, new_parent, *relative, *branch_index)
        }
        Operation::LockFlow {} => flow_ops::lock_flow(flow),
        Operation::ChangeName { display_name } => flow_ops::change_name(flow, display_name),
        Operation::DeleteAction { name } => delete::delete_action(flow, name),
        Operation::AddAction { parent, relative, branch_index, branch_name, action } => {
            add::add_action(flow, config, parent, *relative, *branch_index, branch_name.as_deref(), action)
        }
        Operation::UpdateAction { name, new_step } => update::update_action(flow, config, name, new_step),
        Operation::UpdateTrigger { new_trigger } => flow_ops::update_trigger(flow, config, new_trigger),
        Operation::DuplicateAction { name } => duplicate::duplicate_action(flow, config, name),
        Operation::DeleteBranch { name, branch_index } => branch::delete_branch(flow, name, *branch_index),
        Operation::AddBranch { name, branch_index } => branch::add_branch(flow, name, *branch_index),
        Operation::DuplicateBranch { name, branch_index } => {
            branch::duplicate_branch(flow, config, name, *branch_index)
        }
    }
}

/// Recomputes each step's `valid` flag as schema-validity AND the flag the
/// handler already set (a schema failure clears `valid` rather than
/// raising). Runs after every top-level `apply` so step validity always
/// reflects the current schema, regardless of which handler ran.
fn revalidate(flow: &mut Flow, validator: &dyn SchemaValidator) {
    let revalidated = transfer(flow, |mut step| {
        let schema_ok = validator.is_valid(&step);
        step.set_valid(schema_ok && step.valid());
        step
    });
    *flow = revalidated;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flow::FlowState;
    use crate::model::{PieceSettings, Step, StepMeta};
    use crate::operation::{NewStepKind, NewStepRequest, StepLocation};
    use crate::query::get_step;

    fn trigger_only_flow() -> Flow {
        Flow {
            display_name: "f".into(),
            state: FlowState::Draft,
            valid: true,
            trigger: Step::TriggerEmpty {
                meta: StepMeta { name: "trigger".into(), display_name: "Trigger".into(), valid: true },
                settings: serde_json::json!({}),
                next: None,
            },
        }
    }

    #[test]
    fn apply_never_mutates_its_input() {
        let flow = trigger_only_flow();
        let before = flow.clone();
        let op = Operation::ChangeName { display_name: "renamed".into() };
        let _ = apply(&flow, &op).unwrap();
        assert_eq!(flow, before);
    }

    #[test]
    fn add_action_upgrades_a_bare_piece_version() {
        let flow = trigger_only_flow();
        let op = Operation::AddAction {
            parent: "trigger".into(),
            relative: StepLocation::After,
            branch_index: None,
            branch_name: None,
            action: NewStepRequest {
                name: None,
                display_name: "Slack".into(),
                kind: NewStepKind::ActionPiece,
                settings: serde_json::to_value(PieceSettings {
                    piece_name: "slack".into(),
                    piece_version: "1.4.0".into(),
                    input: serde_json::json!({}),
                    input_ui_info: Default::default(),
                })
                .unwrap(),
                valid: None,
            },
        };
        let out = apply(&flow, &op).unwrap();
        let added = get_step(&out, "step_1").unwrap();
        assert_eq!(added.piece_settings().unwrap().piece_version, "^1.4.0");
    }

    #[test]
    fn delete_is_a_left_inverse_of_add_after_with_no_descendants() {
        let flow = trigger_only_flow();
        let op = Operation::AddAction {
            parent: "trigger".into(),
            relative: StepLocation::After,
            branch_index: None,
            branch_name: None,
            action: NewStepRequest {
                name: None,
                display_name: "A".into(),
                kind: NewStepKind::ActionCode,
                settings: serde_json::json!({}),
                valid: None,
            },
        };
        let added = apply(&flow, &op).unwrap();
        let deleted = apply(&added, &Operation::DeleteAction { name: "step_1".into() }).unwrap();
        assert_eq!(deleted, flow);
    }

    #[test]
    fn lock_then_change_name_compose() {
        let flow = trigger_only_flow();
        let locked = apply(&flow, &Operation::LockFlow {}).unwrap();
        assert_eq!(locked.state, FlowState::Locked);
        let renamed = apply(&locked, &Operation::ChangeName { display_name: "New Name".into() }).unwrap();
        assert_eq!(renamed.display_name, "New Name");
        assert_eq!(renamed.state, FlowState::Locked);
    }
}
