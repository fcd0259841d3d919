//! `DUPLICATE_ACTION`: clone a subtree, give every cloned
//! step a fresh name, rewrite `{{...}}` references inside the clone to
//! match, splice the renamed clone in immediately after the source, then
//! replay its structure via import-operations.

use crate::apply::apply_operation;
use crate::config::EngineConfig;
use crate::errors::{FlowError, Result};
use crate::import_ops::{get_import_operations, to_new_step_request};
use crate::naming::{apply_rename, build_rename_map, collect_names};
use crate::operation::StepLocation;
use crate::ops::add::add_action;
use crate::query::get_step;
use crate::flow::Flow;

pub fn duplicate_action(flow: &Flow, config: &EngineConfig, name: &str) -> Result<Flow> {
    let source = get_step(flow, name)
        .ok_or_else(|| FlowError::OperationInvalid(format!("duplicate: step '{name}' not found")))?
        .clone();

    let mut clone = source.clone();
    clone.set_next(None);

    let existing = collect_names(&flow.trigger);
    let rename_map = build_rename_map(&clone, &existing, &config.default_name_prefix);
    let renamed = apply_rename(clone, &rename_map);

    let request = to_new_step_request(&renamed);
    let mut working = add_action(flow, config, name, StepLocation::After, None, None, &request)?;

    for op in get_import_operations(&renamed) {
        working = apply_operation(&working, config, &op)?;
    }
    Ok(working)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flow::FlowState;
    use crate::model::{InputUiInfo, PieceSettings, Step, StepMeta};
    use crate::traverse::get_all_steps;

    #[test]
    fn duplicating_a_piece_step_renames_and_rewrites_self_reference() {
        // trigger -> P (name=step_1, input: "hello {{step_1.name}}")
        let flow = Flow {
            display_name: "f".into(),
            state: FlowState::Draft,
            valid: true,
            trigger: Step::TriggerEmpty {
                meta: StepMeta { name: "trigger".into(), display_name: "Trigger".into(), valid: true },
                settings: serde_json::json!({}),
                next: Some(Box::new(Step::ActionPiece {
                    meta: StepMeta { name: "step_1".into(), display_name: "P".into(), valid: true },
                    settings: PieceSettings {
                        piece_name: "slack".into(),
                        piece_version: "1.0.0".into(),
                        input: serde_json::json!("hello {{step_1.name}}"),
                        input_ui_info: InputUiInfo::default(),
                    },
                    next: None,
                })),
            },
        };
        let out = duplicate_action(&flow, &EngineConfig::default(), "step_1").unwrap();
        let names: Vec<&str> = get_all_steps(&out.trigger).iter().map(|s| s.name()).collect();
        assert_eq!(names, vec!["trigger", "step_1", "step_2"]);

        let original = get_step(&out, "step_1").unwrap();
        assert_eq!(original.piece_settings().unwrap().input, serde_json::json!("hello {{step_1.name}}"));

        let duplicate = get_step(&out, "step_2").unwrap();
        assert_eq!(duplicate.meta().display_name, "P Copy");
        assert_eq!(duplicate.piece_settings().unwrap().input, serde_json::json!("hello {{step_2.name}}"));
    }
}
