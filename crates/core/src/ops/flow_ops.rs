//! Flow-level operations: `LOCK_FLOW`, `CHANGE_NAME`,
//! `UPDATE_TRIGGER`. Unlike the other handlers these act on the `Flow`
//! wrapper itself rather than splicing a single named step.

use crate::config::EngineConfig;
use crate::errors::Result;
use crate::flow::{Flow, FlowState};
use crate::model::Step;
use crate::normalize::upgrade_piece;
use crate::operation::NewStepRequest;

pub fn lock_flow(flow: &Flow) -> Result<Flow> {
    let mut next = flow.clone();
    next.state = FlowState::Locked;
    Ok(next)
}

pub fn change_name(flow: &Flow, display_name: &str) -> Result<Flow> {
    let mut next = flow.clone();
    next.display_name = display_name.to_string();
    Ok(next)
}

/// Rebuilds the trigger in place, preserving its `name` and `next`
/// Piece-version upgrade runs on the rebuilt trigger the same way it
/// does for `ADD_ACTION`/`UPDATE_ACTION`.
pub fn update_trigger(flow: &Flow, config: &EngineConfig, request: &NewStepRequest) -> Result<Flow> {
    let mut next = flow.clone();
    let name = next.trigger.name().to_string();
    let old_next = next.trigger.take_next();
    let mut built = Step::from_request(name, request);
    built.set_next(old_next);
    upgrade_piece(&mut built, config);
    next.trigger = built;
    Ok(next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::StepMeta;
    use crate::operation::NewStepKind;

    fn flow_with(trigger: Step) -> Flow {
        Flow { display_name: "f".into(), state: FlowState::Draft, valid: true, trigger }
    }

    #[test]
    fn update_trigger_preserves_name_and_next() {
        let flow = flow_with(Step::TriggerEmpty {
            meta: StepMeta { name: "trigger".into(), display_name: "Old".into(), valid: true },
            settings: serde_json::json!({}),
            next: Some(Box::new(Step::ActionCode {
                meta: StepMeta { name: "a".into(), display_name: "A".into(), valid: true },
                settings: serde_json::json!({}),
                next: None,
            })),
        });
        let request = NewStepRequest {
            name: None,
            display_name: "New".into(),
            kind: NewStepKind::TriggerEmpty,
            settings: serde_json::json!({}),
            valid: None,
        };
        let out = update_trigger(&flow, &EngineConfig::default(), &request).unwrap();
        assert_eq!(out.trigger.name(), "trigger");
        assert_eq!(out.trigger.meta().display_name, "New");
        assert_eq!(out.trigger.next().map(|n| n.name()), Some("a"));
    }
}
