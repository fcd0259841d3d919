//! `DELETE_ACTION`: splice the deleted step's `next` into
//! whatever slot referenced it. The deleted step's own structural children
//! are not reattached anywhere -- they are lost with it, by design
//! (callers that want to preserve them must move first).

use crate::errors::{FlowError, Result};
use crate::flow::Flow;
use crate::query::get_step;
use crate::transfer::transfer;

pub fn delete_action(flow: &Flow, name: &str) -> Result<Flow> {
    if get_step(flow, name).is_none() {
        return Err(FlowError::OperationInvalid(format!("delete: step '{name}' not found")));
    }
    let target = name.to_string();
    Ok(transfer(flow, move |mut step| {
        if step.next().map(|n| n.name()) == Some(target.as_str()) {
            let mut removed = step.take_next().expect("checked above");
            step.set_next(removed.take_next());
        }
        for slot in step.structural_slots() {
            if step.get_slot(slot).map(|s| s.name()) == Some(target.as_str()) {
                if let Some(head) = step.get_slot_mut(slot) {
                    let mut removed = head.take().expect("checked above");
                    *head = removed.take_next();
                }
            }
        }
        step
    }))
}
