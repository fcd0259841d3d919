//! `ADD_ACTION`: insert a freshly built action as a child
//! of `parent`, head-inserted at the requested structural position.
//!
//! A structural mismatch between a composite parent and the requested
//! location (e.g. `INSIDE_TRUE_BRANCH` on a router) raises
//! `FLOW_OPERATION_INVALID`. A plain leaf parent has no structural slots
//! to mismatch against, so any requested location for it silently falls
//! through to `AFTER`.

use crate::config::EngineConfig;
use crate::errors::{FlowError, Result};
use crate::flow::Flow;
use crate::model::{Step, StructuralSlot};
use crate::naming::find_unused_name;
use crate::normalize::upgrade_piece;
use crate::operation::{NewStepRequest, StepLocation};
use crate::query::get_step;
use crate::traverse::get_all_steps;
use crate::transfer::transfer;
use std::collections::HashSet;

#[derive(Clone, Copy)]
enum Site {
    After,
    Slot(StructuralSlot),
}

fn resolve_site(parent: &Step, relative: StepLocation, branch_index: Option<usize>) -> Result<Site> {
    match parent {
        Step::ActionLoop { .. } => match relative {
            StepLocation::InsideLoop => Ok(Site::Slot(StructuralSlot::FirstLoopAction)),
            StepLocation::After => Ok(Site::After),
            other => Err(incompatible(parent.name(), other)),
        },
        Step::ActionBranch { .. } => match relative {
            StepLocation::InsideTrueBranch => Ok(Site::Slot(StructuralSlot::OnSuccess)),
            StepLocation::InsideFalseBranch => Ok(Site::Slot(StructuralSlot::OnFailure)),
            StepLocation::After => Ok(Site::After),
            other => Err(incompatible(parent.name(), other)),
        },
        Step::ActionRouter { children, .. } => match relative {
            StepLocation::InsideBranch => {
                let index = branch_index.ok_or_else(|| {
                    FlowError::OperationInvalid("INSIDE_BRANCH requires branch_index".to_string())
                })?;
                if index >= children.len() {
                    return Err(FlowError::BranchIndexOutOfRange { index, len: children.len() });
                }
                Ok(Site::Slot(StructuralSlot::RouterChild(index)))
            }
            StepLocation::After => Ok(Site::After),
            other => Err(incompatible(parent.name(), other)),
        },
        _ => Ok(Site::After),
    }
}

fn incompatible(name: &str, location: StepLocation) -> FlowError {
    FlowError::IncompatibleParent { name: name.to_string(), location: format!("{location:?}") }
}

#[allow(clippy::too_many_arguments)]
pub fn add_action(
    flow: &Flow,
    config: &EngineConfig,
    parent: &str,
    relative: StepLocation,
    branch_index: Option<usize>,
    branch_name: Option<&str>,
    request: &NewStepRequest,
) -> Result<Flow> {
    let parent_step = get_step(flow, parent)
        .ok_or_else(|| FlowError::OperationInvalid(format!("add: parent '{parent}' not found")))?;
    let site = resolve_site(parent_step, relative, branch_index)?;

    let name = match &request.name {
        Some(n) => n.clone(),
        None => {
            let existing: HashSet<String> =
                get_all_steps(&flow.trigger).into_iter().map(|s| s.name().to_string()).collect();
            find_unused_name(&existing, &config.default_name_prefix)
        }
    };
    let mut fresh = Step::from_request(name, request);
    upgrade_piece(&mut fresh, config);

    let parent_name = parent.to_string();
    let branch_label = branch_name.map(|s| s.to_string());
    let mut fresh_opt = Some(fresh);
    Ok(transfer(flow, move |mut step| {
        if step.name() != parent_name {
            return step;
        }
        let Some(mut new_step) = fresh_opt.take() else { return step };
        match site {
            Site::After => {
                new_step.set_next(step.take_next());
                step.set_next(Some(Box::new(new_step)));
            }
            Site::Slot(slot) => {
                if let Some(head) = step.get_slot_mut(slot) {
                    new_step.set_next(head.take());
                    *head = Some(Box::new(new_step));
                }
                if let (StructuralSlot::RouterChild(index), Some(label)) = (slot, &branch_label) {
                    if let Step::ActionRouter { settings, .. } = &mut step {
                        if let Some(branch) = settings.branches.get_mut(index) {
                            branch.branch_name = label.clone();
                        }
                    }
                }
            }
        }
        step
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flow::FlowState;
    use crate::model::StepMeta;
    use crate::operation::NewStepKind;

    fn empty_loop_flow() -> Flow {
        Flow {
            display_name: "f".into(),
            state: FlowState::Draft,
            valid: true,
            trigger: Step::TriggerEmpty {
                meta: StepMeta { name: "trigger".into(), display_name: "Trigger".into(), valid: true },
                settings: serde_json::json!({}),
                next: Some(Box::new(Step::ActionLoop {
                    meta: StepMeta { name: "l".into(), display_name: "L".into(), valid: true },
                    settings: serde_json::json!({}),
                    first_loop_action: None,
                    next: None,
                })),
            },
        }
    }

    fn request(display_name: &str) -> NewStepRequest {
        NewStepRequest {
            name: None,
            display_name: display_name.into(),
            kind: NewStepKind::ActionCode,
            settings: serde_json::json!({}),
            valid: None,
        }
    }

    #[test]
    fn inside_loop_on_loop_parent_fills_the_body_slot() {
        let flow = empty_loop_flow();
        let out = add_action(&flow, &EngineConfig::default(), "l", StepLocation::InsideLoop, None, None, &request("Body")).unwrap();
        match &out.trigger {
            Step::TriggerEmpty { next: Some(loop_step), .. } => match loop_step.as_ref() {
                Step::ActionLoop { first_loop_action: Some(body), .. } => {
                    assert_eq!(body.meta().display_name, "Body");
                }
                other => panic!("expected loop, got {other:?}"),
            },
            other => panic!("expected trigger, got {other:?}"),
        }
    }

    #[test]
    fn inside_true_branch_on_a_loop_parent_is_incompatible() {
        let flow = empty_loop_flow();
        let err = add_action(&flow, &EngineConfig::default(), "l", StepLocation::InsideTrueBranch, None, None, &request("Body"));
        assert!(matches!(err, Err(FlowError::IncompatibleParent { .. })));
    }

    #[test]
    fn inside_loop_on_a_plain_action_parent_falls_through_to_after() {
        let flow = empty_loop_flow();
        let with_leaf = add_action(&flow, &EngineConfig::default(), "l", StepLocation::InsideLoop, None, None, &request("Body")).unwrap();
        // now target the freshly added leaf ("Body" step, a plain ActionCode) with INSIDE_LOOP
        let leaf_name = match &with_leaf.trigger {
            Step::TriggerEmpty { next: Some(loop_step), .. } => match loop_step.as_ref() {
                Step::ActionLoop { first_loop_action: Some(body), .. } => body.name().to_string(),
                _ => panic!("missing body"),
            },
            _ => panic!("missing loop"),
        };
        let out = add_action(&with_leaf, &EngineConfig::default(), &leaf_name, StepLocation::InsideLoop, None, None, &request("After"));
        assert!(out.is_ok());
    }
}
