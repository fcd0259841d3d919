//! `MOVE_ACTION`: delete the source subtree, re-add a
//! structurally empty clone under the destination, then rebuild the
//! descendants deletion dropped.
//!
//! `next` is cleared before import-operation generation only for
//! loop/branch sources, not routers -- a router's branches live in
//! independent slots with nothing for a stray `next` to corrupt, so only
//! the single-chain composites need the clear.

use crate::apply::apply_operation;
use crate::config::EngineConfig;
use crate::errors::{FlowError, Result};
use crate::flow::Flow;
use crate::import_ops::{get_import_operations, to_new_step_request};
use crate::model::Step;
use crate::operation::StepLocation;
use crate::ops::add::add_action;
use crate::ops::delete::delete_action;
use crate::query::get_step;
use crate::transfer::transfer;

pub fn move_action(
    flow: &Flow,
    config: &EngineConfig,
    name: &str,
    new_parent: &str,
    relative: StepLocation,
    branch_index: Option<usize>,
) -> Result<Flow> {
    let source = get_step(flow, name)
        .ok_or_else(|| FlowError::OperationInvalid(format!("move: source '{name}' not found")))?
        .clone();
    if source.kind().is_trigger() {
        return Err(FlowError::OperationInvalid(format!("move: '{name}' is a trigger, not an action")));
    }
    if get_step(flow, new_parent).is_none() {
        return Err(FlowError::OperationInvalid(format!("move: destination '{new_parent}' not found")));
    }

    let mut import_source = source.clone();
    if matches!(source, Step::ActionLoop { .. } | Step::ActionBranch { .. }) {
        import_source.set_next(None);
    }
    let replay_ops = get_import_operations(&import_source);

    let mut working = delete_action(flow, name)?;

    let request = to_new_step_request(&source);
    working = add_action(&working, config, new_parent, relative, branch_index, None, &request)?;

    if let Step::ActionRouter { children, settings, .. } = &source {
        // Router moves carry children directly: each branch lives in its
        // own slot, so there is no head-insertion order to protect the way
        // there is for a single loop/branch chain, and direct assignment
        // keeps `children`/`settings.branches` trivially aligned.
        let target = name.to_string();
        let children = children.clone();
        let settings = settings.clone();
        return Ok(transfer(&working, move |mut step| {
            if step.name() == target {
                if let Step::ActionRouter { children: c, settings: s, .. } = &mut step {
                    *c = children.clone();
                    *s = settings.clone();
                }
            }
            step
        }));
    }

    for op in replay_ops {
        working = apply_operation(&working, config, &op)?;
    }
    Ok(working)
}
