//! Structural rewrite: deep-clone-and-rewrite over the whole tree.
//! Handler code expresses "rewrite the step whose
//! `name == X`" without re-implementing tree recursion.

use crate::flow::Flow;
use crate::model::Step;
use std::future::Future;
use std::pin::Pin;

/// Returns a new flow whose trigger is obtained by applying `f` to every
/// step. `f` runs on the current node first, then recursion continues into
/// its structural children and `next` using the *updated* node -- callers
/// that replace a node's kind still get correct recursion into whatever
/// slots the replacement has. Operates on a deep clone of `flow`; the
/// caller's input is never mutated.
pub fn transfer<F>(flow: &Flow, mut f: F) -> Flow
where
    F: FnMut(Step) -> Step,
{
    let mut new_flow = flow.clone();
    new_flow.trigger = rewrite_tree(new_flow.trigger, &mut f);
    new_flow
}

/// Applies `f` to every step of a bare (not flow-wrapped) subtree, same
/// recursion shape as [`transfer`]. Shared with `naming::apply_rename`,
/// which rewrites a freshly cloned subtree before it's spliced into a flow.
pub(crate) fn rewrite_tree<F>(step: Step, f: &mut F) -> Step
where
    F: FnMut(Step) -> Step,
{
    let mut updated = f(step);
    for slot in updated.structural_slots() {
        if let Some(child) = updated.get_slot_mut(slot).and_then(|s| s.take()) {
            let rewritten = rewrite_tree(*child, f);
            if let Some(s) = updated.get_slot_mut(slot) {
                *s = Some(Box::new(rewritten));
            }
        }
    }
    if let Some(next) = updated.take_next() {
        let rewritten = rewrite_tree(*next, f);
        updated.set_next(Some(Box::new(rewritten)));
    }
    updated
}

/// Async form of [`transfer`]: `f` returns a future, awaited at each node
/// before recursing. Recursion is sequential -- there is no parallelism
/// across sibling nodes -- so DFS order stays deterministic even when `f`
/// suspends.
pub async fn transfer_async<F, Fut>(flow: &Flow, f: F) -> Flow
where
    F: Fn(Step) -> Fut + Clone + 'static,
    Fut: Future<Output = Step> + 'static,
{
    let mut new_flow = flow.clone();
    new_flow.trigger = transfer_step_async(new_flow.trigger, f).await;
    new_flow
}

fn transfer_step_async<F, Fut>(step: Step, f: F) -> Pin<Box<dyn Future<Output = Step>>>
where
    F: Fn(Step) -> Fut + Clone + 'static,
    Fut: Future<Output = Step> + 'static,
{
    Box::pin(async move {
        let mut updated = f.clone()(step).await;
        for slot in updated.structural_slots() {
            if let Some(child) = updated.get_slot_mut(slot).and_then(|s| s.take()) {
                let rewritten = transfer_step_async(*child, f.clone()).await;
                if let Some(s) = updated.get_slot_mut(slot) {
                    *s = Some(Box::new(rewritten));
                }
            }
        }
        if let Some(next) = updated.take_next() {
            let rewritten = transfer_step_async(*next, f.clone()).await;
            updated.set_next(Some(Box::new(rewritten)));
        }
        updated
    })
}
