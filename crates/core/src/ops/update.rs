//! `UPDATE_ACTION`: replace the step named `N` with a
//! freshly built action, carrying over `next` unconditionally and the
//! other structural slots only where the old and new kind agree.

use crate::config::EngineConfig;
use crate::errors::{FlowError, Result};
use crate::flow::Flow;
use crate::model::Step;
use crate::normalize::upgrade_piece;
use crate::operation::NewStepRequest;
use crate::query::get_step;
use crate::transfer::transfer;

pub fn update_action(
    flow: &Flow,
    config: &EngineConfig,
    name: &str,
    request: &NewStepRequest,
) -> Result<Flow> {
    if get_step(flow, name).is_none() {
        return Err(FlowError::OperationInvalid(format!("update: step '{name}' not found")));
    }
    let target = name.to_string();
    let request = request.clone();
    Ok(transfer(flow, move |mut step| {
        if step.name() != target {
            return step;
        }
        let mut built = Step::from_request(target.clone(), &request);
        built.set_next(step.take_next());
        carry_matching_slots(&mut step, &mut built);
        upgrade_piece(&mut built, config);
        built
    }))
}

/// Moves structural payload from `old` into `new` when both sides are the
/// same composite kind. A kind change (e.g. branch -> loop) leaves `new`'s
/// freshly initialized empty slots alone -- a router replacing a branch
/// starts with its default empty branches rather than inheriting anything.
fn carry_matching_slots(old: &mut Step, new: &mut Step) {
    match (old, new) {
        (
            Step::ActionBranch { on_success, on_failure, .. },
            Step::ActionBranch { on_success: new_success, on_failure: new_failure, .. },
        ) => {
            *new_success = on_success.take();
            *new_failure = on_failure.take();
        }
        (
            Step::ActionLoop { first_loop_action, .. },
            Step::ActionLoop { first_loop_action: new_body, .. },
        ) => {
            *new_body = first_loop_action.take();
        }
        (
            Step::ActionRouter { children, settings, .. },
            Step::ActionRouter { children: new_children, settings: new_settings, .. },
        ) => {
            *new_children = std::mem::take(children);
            *new_settings = settings.clone();
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flow::FlowState;
    use crate::model::StepMeta;
    use crate::operation::NewStepKind;

    fn flow_with(trigger: Step) -> Flow {
        Flow { display_name: "f".into(), state: FlowState::Draft, valid: true, trigger }
    }

    fn leaf(name: &str) -> Step {
        Step::ActionCode {
            meta: StepMeta { name: name.into(), display_name: name.into(), valid: true },
            settings: serde_json::json!({}),
            next: None,
        }
    }

    #[test]
    fn kind_change_keeps_next_but_clears_mismatched_slots() {
        let branch = Step::ActionBranch {
            meta: StepMeta { name: "b".into(), display_name: "B".into(), valid: true },
            settings: serde_json::json!({}),
            on_success: Some(Box::new(leaf("s"))),
            on_failure: None,
            next: Some(Box::new(leaf("after"))),
        };
        let flow = flow_with(Step::TriggerEmpty {
            meta: StepMeta { name: "trigger".into(), display_name: "Trigger".into(), valid: true },
            settings: serde_json::json!({}),
            next: Some(Box::new(branch)),
        });
        let request = NewStepRequest {
            name: None,
            display_name: "Code now".into(),
            kind: NewStepKind::ActionCode,
            settings: serde_json::json!({}),
            valid: None,
        };
        let out = update_action(&flow, &EngineConfig::default(), "b", &request).unwrap();
        match &out.trigger {
            Step::TriggerEmpty { next: Some(replaced), .. } => {
                assert_eq!(replaced.name(), "b");
                assert_eq!(replaced.meta().display_name, "Code now");
                assert_eq!(replaced.next().map(|n| n.name()), Some("after"));
            }
            other => panic!("expected trigger, got {other:?}"),
        }
    }
}
