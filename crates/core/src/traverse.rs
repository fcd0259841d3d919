//! DFS enumeration, direct-children, parent lookup.
//!
//! This is the canonical linearization every other module builds on:
//! `get_all_steps` defines the order `find_path_to_step` and
//! name-uniqueness checks rely on -- a graph walked depth-first while
//! threading a path/visited set, the same shape `find_path_to_step` below
//! uses.

use crate::model::Step;

/// Node itself, then its structural children (success before failure, loop
/// body, router children in index order), then the node reached via
/// `next`. This order is the crate-wide contract; everything that needs a
/// stable linearization of a step tree reuses this function rather than
/// re-walking the tree its own way.
pub fn get_all_steps(root: &Step) -> Vec<&Step> {
    let mut out = Vec::new();
    collect(root, &mut out);
    out
}

fn collect<'a>(step: &'a Step, out: &mut Vec<&'a Step>) {
    out.push(step);
    for slot in step.structural_slots() {
        if let Some(child) = step.get_slot(slot) {
            collect(child, out);
        }
    }
    if let Some(next) = step.next() {
        collect(next, out);
    }
}

/// The chain reached by walking `next` from a structural slot's head.
pub fn direct_children(head: Option<&Step>) -> Vec<&Step> {
    let mut out = Vec::new();
    let mut cur = head;
    while let Some(s) = cur {
        out.push(s);
        cur = s.next();
    }
    out
}

/// Whether a step named `name` is reachable as a descendant of `composite`
/// through its structural slots (and their `next` chains). Used to gate
/// `get_direct_parent_step`'s recursion into a subtree that can't possibly
/// contain the target.
pub fn is_child_of(composite: &Step, name: &str) -> bool {
    for slot in composite.structural_slots() {
        let mut cur = composite.get_slot(slot);
        while let Some(s) = cur {
            if s.name() == name || is_child_of(s, name) {
                return true;
            }
            cur = s.next();
        }
    }
    false
}

/// The unique step whose `next` or structural slot points at `name`.
pub fn get_direct_parent_step<'a>(root: &'a Step, name: &str) -> Option<&'a Step> {
    if let Some(n) = root.next() {
        if n.name() == name {
            return Some(root);
        }
    }
    for slot in root.structural_slots() {
        if let Some(head) = root.get_slot(slot) {
            if head.name() == name {
                return Some(root);
            }
        }
    }
    for slot in root.structural_slots() {
        if let Some(head) = root.get_slot(slot) {
            if is_child_of(head, name) {
                return get_direct_parent_step(head, name);
            }
        }
    }
    root.next().and_then(|n| get_direct_parent_step(n, name))
}

/// One step on the ancestor path, tagged with its position in the global
/// DFS ordering (`get_all_steps` would assign it the same index).
pub struct PathEntry<'a> {
    pub step: &'a Step,
    pub dfs_index: usize,
}

/// The ancestor chain from `trigger` down to (and including) the step
/// named `target`, each tagged with its DFS index. `None` if `target`
/// isn't reachable.
pub fn find_path_to_step<'a>(trigger: &'a Step, target: &str) -> Option<Vec<PathEntry<'a>>> {
    let mut index = 0usize;
    let mut path = Vec::new();
    if walk(trigger, target, &mut index, &mut path) {
        Some(path)
    } else {
        None
    }
}

fn walk<'a>(node: &'a Step, target: &str, index: &mut usize, path: &mut Vec<PathEntry<'a>>) -> bool {
    let dfs_index = *index;
    *index += 1;
    path.push(PathEntry { step: node, dfs_index });
    if node.name() == target {
        return true;
    }
    for slot in node.structural_slots() {
        if let Some(head) = node.get_slot(slot) {
            if walk(head, target, index, path) {
                return true;
            }
        }
    }
    if let Some(n) = node.next() {
        if walk(n, target, index, path) {
            return true;
        }
    }
    path.pop();
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::StepMeta;

    fn leaf(name: &str, next: Option<Box<Step>>) -> Step {
        Step::ActionCode {
            meta: StepMeta { name: name.into(), display_name: name.into(), valid: true },
            settings: serde_json::json!({}),
            next,
        }
    }

    #[test]
    fn dfs_visits_structural_children_before_next() {
        let branch = Step::ActionBranch {
            meta: StepMeta { name: "b".into(), display_name: "B".into(), valid: true },
            settings: serde_json::json!({}),
            on_success: Some(Box::new(leaf("s", None))),
            on_failure: Some(Box::new(leaf("f", None))),
            next: Some(Box::new(leaf("after", None))),
        };
        let names: Vec<&str> = get_all_steps(&branch).iter().map(|s| s.name()).collect();
        assert_eq!(names, vec!["b", "s", "f", "after"]);
    }

    #[test]
    fn parent_lookup_finds_structural_slot_owner() {
        let branch = Step::ActionBranch {
            meta: StepMeta { name: "b".into(), display_name: "B".into(), valid: true },
            settings: serde_json::json!({}),
            on_success: Some(Box::new(leaf("s", None))),
            on_failure: None,
            next: None,
        };
        let parent = get_direct_parent_step(&branch, "s").unwrap();
        assert_eq!(parent.name(), "b");
        assert!(get_direct_parent_step(&branch, "nope").is_none());
    }

    #[test]
    fn path_to_step_includes_dfs_indices() {
        let branch = Step::ActionBranch {
            meta: StepMeta { name: "b".into(), display_name: "B".into(), valid: true },
            settings: serde_json::json!({}),
            on_success: Some(Box::new(leaf("s", None))),
            on_failure: None,
            next: None,
        };
        let path = find_path_to_step(&branch, "s").unwrap();
        assert_eq!(path.len(), 2);
        assert_eq!(path[0].step.name(), "b");
        assert_eq!(path[0].dfs_index, 0);
        assert_eq!(path[1].step.name(), "s");
        assert_eq!(path[1].dfs_index, 1);
    }
}
