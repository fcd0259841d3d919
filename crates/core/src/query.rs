//! Pure query helpers over a flow: `get_step`, `get_used_pieces`,
//! `is_valid`, `find_available_step_name`, `update_flow_secrets`.

use crate::flow::Flow;
use crate::model::Step;
use crate::naming::find_unused_name;
use crate::traverse::get_all_steps;
use std::collections::{HashMap, HashSet};

pub fn get_step<'a>(flow: &'a Flow, name: &str) -> Option<&'a Step> {
    get_all_steps(&flow.trigger).into_iter().find(|s| s.name() == name)
}

/// Every piece name reachable from `trigger`, de-duplicated, in first-seen
/// DFS order.
pub fn get_used_pieces(trigger: &Step) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for step in get_all_steps(trigger) {
        if let Some(settings) = step.piece_settings() {
            if seen.insert(settings.piece_name.clone()) {
                out.push(settings.piece_name.clone());
            }
        }
    }
    out
}

pub fn is_valid(flow: &Flow) -> bool {
    flow.valid
}

pub fn find_available_step_name(flow: &Flow, prefix: &str) -> String {
    let existing: HashSet<String> =
        get_all_steps(&flow.trigger).into_iter().map(|s| s.name().to_string()).collect();
    find_unused_name(&existing, prefix)
}

/// Carries `settings.input.auth` forward from `old_flow` into `new_flow`
/// for every step name present in both. Operations that rebuild a piece
/// step's settings (`UPDATE_ACTION`, `UPDATE_TRIGGER`) don't themselves
/// know the caller's stored credential; this reattaches it after the fact
/// rather than threading a secret store through every handler.
pub fn update_flow_secrets(old_flow: &Flow, new_flow: &Flow) -> Flow {
    let old_auth: HashMap<String, serde_json::Value> = get_all_steps(&old_flow.trigger)
        .into_iter()
        .filter_map(|s| {
            s.piece_settings()
                .and_then(|ps| ps.input.get("auth"))
                .map(|auth| (s.name().to_string(), auth.clone()))
        })
        .collect();

    crate::transfer::transfer(new_flow, move |mut step| {
        if let Some(auth) = old_auth.get(step.name()) {
            if let Some(settings) = step.piece_settings_mut() {
                match &mut settings.input {
                    serde_json::Value::Object(map) => {
                        map.insert("auth".to_string(), auth.clone());
                    }
                    other => *other = serde_json::json!({ "auth": auth }),
                }
            }
        }
        step
    })
}
