//! Fresh-name allocation and `{{...}}` template reference rewriting.
//! `regex` is the ecosystem's standard tool for "find a delimited span,
//! then do a bounded substitution inside it" -- simpler than a hand-rolled
//! character scanner, which would exist to tokenize a full grammar, not
//! to patch one identifier.

use crate::model::Step;
use crate::traverse::get_all_steps;
use crate::transfer::rewrite_tree;
use regex::Regex;
use std::collections::{HashMap, HashSet};

/// Every step name reachable from `root`.
pub fn collect_names(root: &Step) -> HashSet<String> {
    get_all_steps(root).into_iter().map(|s| s.name().to_string()).collect()
}

/// Smallest `prefix_K` (K >= 1) not present in `existing`.
pub fn find_unused_name(existing: &HashSet<String>, prefix: &str) -> String {
    let mut k: u64 = 1;
    loop {
        let candidate = format!("{prefix}_{k}");
        if !existing.contains(&candidate) {
            return candidate;
        }
        k += 1;
    }
}

/// Builds an old-name -> fresh-name map for every step in `subtree`,
/// drawing fresh names from `prefix` so they collide with neither
/// `existing` (the flow's current names) nor names already allocated
/// earlier in this same map.
pub fn build_rename_map(subtree: &Step, existing: &HashSet<String>, prefix: &str) -> HashMap<String, String> {
    let mut taken = existing.clone();
    let mut map = HashMap::new();
    for step in get_all_steps(subtree) {
        let fresh = find_unused_name(&taken, prefix);
        taken.insert(fresh.clone());
        map.insert(step.name().to_string(), fresh);
    }
    map
}

/// Renames every step in `subtree` per `map`, suffixes `display_name` with
/// " Copy", clears sample-data metadata, and rewrites every `{{...}}`
/// template reference in `settings.input` using the same map.
pub fn apply_rename(subtree: Step, map: &HashMap<String, String>) -> Step {
    rewrite_tree(subtree, &mut |mut step| {
        if let Some(fresh) = map.get(step.name()) {
            step.meta_mut().name = fresh.clone();
        }
        step.meta_mut().display_name = format!("{} Copy", step.meta_mut().display_name);
        if let Some(settings) = step.piece_settings_mut() {
            settings.input_ui_info = Default::default();
            for (old, new) in map {
                settings.input = rewrite_references(&settings.input, old, new);
            }
        } else if let Step::ActionCode { settings, .. } = &mut step {
            for (old, new) in map {
                *settings = rewrite_references(settings, old, new);
            }
        }
        step
    })
}

/// Scans `value` for `{{...}}` spans and, within each span, replaces the
/// identifier `old` (matched as a whole word) with `new`. Strings outside
/// template braces are untouched; non-string JSON values recurse
/// structurally.
pub fn rewrite_references(value: &serde_json::Value, old: &str, new: &str) -> serde_json::Value {
    use serde_json::Value;
    match value {
        Value::String(s) => Value::String(rewrite_string(s, old, new)),
        Value::Array(items) => {
            Value::Array(items.iter().map(|v| rewrite_references(v, old, new)).collect())
        }
        Value::Object(map) => Value::Object(
            map.iter().map(|(k, v)| (k.clone(), rewrite_references(v, old, new))).collect(),
        ),
        other => other.clone(),
    }
}

fn rewrite_string(s: &str, old: &str, new: &str) -> String {
    let span_re = Regex::new(r"\{\{[^}]*\}\}").expect("static template-span pattern");
    let word_re = Regex::new(&format!(r"\b{}\b", regex::escape(old))).expect("escaped identifier pattern");
    span_re
        .replace_all(s, |caps: &regex::Captures| word_re.replace_all(&caps[0], new).into_owned())
        .into_owned()
}
