//! Router branch operations: `ADD_BRANCH`, `DELETE_BRANCH`,
//! `DUPLICATE_BRANCH`.

use crate::apply::apply_operation;
use crate::config::EngineConfig;
use crate::errors::{FlowError, Result};
use crate::flow::Flow;
use crate::import_ops::get_import_operations;
use crate::model::{BranchType, RouterBranch, Step};
use crate::naming::{apply_rename, build_rename_map, collect_names};
use crate::query::get_step;
use crate::transfer::transfer;

fn router_len(flow: &Flow, name: &str) -> Result<usize> {
    match get_step(flow, name) {
        Some(Step::ActionRouter { children, .. }) => Ok(children.len()),
        Some(_) => Err(FlowError::OperationInvalid(format!("branch op: step '{name}' is not a router"))),
        None => Err(FlowError::OperationInvalid(format!("branch op: step '{name}' not found"))),
    }
}

pub fn add_branch(flow: &Flow, name: &str, index: usize) -> Result<Flow> {
    let len = router_len(flow, name)?;
    if index > len {
        return Err(FlowError::BranchIndexOutOfRange { index, len });
    }
    let target = name.to_string();
    Ok(transfer(flow, move |mut step| {
        if step.name() != target {
            return step;
        }
        if let Step::ActionRouter { children, settings, .. } = &mut step {
            children.insert(index, None);
            settings.branches.insert(
                index,
                RouterBranch {
                    conditions: serde_json::json!([[]]),
                    branch_type: BranchType::Condition,
                    branch_name: format!("Branch {}", children.len()),
                },
            );
        }
        step
    }))
}

pub fn delete_branch(flow: &Flow, name: &str, index: usize) -> Result<Flow> {
    let len = router_len(flow, name)?;
    if index >= len {
        return Err(FlowError::BranchIndexOutOfRange { index, len });
    }
    let target = name.to_string();
    Ok(transfer(flow, move |mut step| {
        if step.name() != target {
            return step;
        }
        if let Step::ActionRouter { children, settings, .. } = &mut step {
            children.remove(index);
            settings.branches.remove(index);
        }
        step
    }))
}

/// Clones branch `index`'s child subtree and metadata, renaming the clone's
/// steps and rewriting their `{{...}}` references as in `DUPLICATE_ACTION`.
/// Inserted at `length - 1` (the penultimate position), not adjacent to the
/// source index -- this is the product's documented behavior, not a
/// naming mismatch to correct.
pub fn duplicate_branch(flow: &Flow, config: &EngineConfig, name: &str, index: usize) -> Result<Flow> {
    let (child, branch, len) = match get_step(flow, name) {
        Some(Step::ActionRouter { children, settings, .. }) => {
            let len = children.len();
            if index >= len {
                return Err(FlowError::BranchIndexOutOfRange { index, len });
            }
            (children[index].clone(), settings.branches[index].clone(), len)
        }
        Some(_) => return Err(FlowError::OperationInvalid(format!("branch op: step '{name}' is not a router"))),
        None => return Err(FlowError::OperationInvalid(format!("branch op: step '{name}' not found"))),
    };

    let insert_at = len.saturating_sub(1);
    let mut new_branch = branch.clone();
    new_branch.branch_name = format!("{} Copy", branch.branch_name);

    let existing = collect_names(&flow.trigger);
    let renamed_child = child.map(|boxed| {
        let bare = (*boxed).clone();
        let map = build_rename_map(&bare, &existing, &config.default_name_prefix);
        apply_rename(bare, &map)
    });
    let stripped_head = renamed_child.as_ref().map(|head| {
        let mut copy = head.clone();
        copy.strip_descendants();
        copy
    });

    let target = name.to_string();
    let mut working = transfer(flow, move |mut step| {
        if step.name() != target {
            return step;
        }
        if let Step::ActionRouter { children, settings, .. } = &mut step {
            children.insert(insert_at, stripped_head.clone().map(Box::new));
            settings.branches.insert(insert_at, new_branch.clone());
        }
        step
    });

    if let Some(head) = renamed_child {
        for op in get_import_operations(&head) {
            working = apply_operation(&working, config, &op)?;
        }
    }
    Ok(working)
}
