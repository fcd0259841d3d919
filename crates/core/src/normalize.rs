//! `normalize` and `upgrade_piece`: strip sample data and
//! credentials, bump piece-version constraints. Run before publishing a
//! flow, and after every dispatcher call that rebuilds a piece step.

use crate::config::EngineConfig;
use crate::flow::Flow;
use crate::model::Step;
use crate::transfer::transfer;
use semver::Version;

/// Resets sample-data metadata and wipes credentials on every piece step,
/// then upgrades every piece's version constraint. Idempotent: a second
/// call is a no-op because the version check below short-circuits once a
/// version is already pinned.
pub fn normalize(flow: &Flow, config: &EngineConfig) -> Flow {
    transfer(flow, |mut step| {
        if let Some(settings) = step.piece_settings_mut() {
            settings.input_ui_info = Default::default();
            match &mut settings.input {
                serde_json::Value::Object(map) => {
                    map.insert("auth".to_string(), serde_json::Value::String(String::new()));
                }
                other => *other = serde_json::json!({ "auth": "" }),
            }
        }
        upgrade_piece(&mut step, config);
        step
    })
}

/// Rewrites a piece step's `piece_version` into a pinned range, unless the
/// piece is legacy-exempt for its current version or already pinned.
/// Non-piece steps are untouched.
pub fn upgrade_piece(step: &mut Step, config: &EngineConfig) {
    let Some(settings) = step.piece_settings_mut() else { return };

    let is_legacy = config.legacy_pieces.iter().any(|legacy| {
        legacy.name == settings.piece_name
            && Version::parse(&settings.piece_version)
                .ok()
                .zip(Version::parse(legacy.min_version).ok())
                .is_some_and(|(current, min)| current < min)
    });
    if is_legacy {
        return;
    }
    if settings.piece_version.starts_with('^') || settings.piece_version.starts_with('~') {
        return;
    }
    let Ok(version) = Version::parse(&settings.piece_version) else { return };
    settings.piece_version = if version.major == 0 {
        format!("~{}", settings.piece_version)
    } else {
        format!("^{}", settings.piece_version)
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flow::FlowState;
    use crate::model::{InputUiInfo, PieceSettings, StepMeta};

    fn piece_flow(piece_name: &str, version: &str) -> Flow {
        Flow {
            display_name: "f".into(),
            state: FlowState::Draft,
            valid: true,
            trigger: Step::TriggerPiece {
                meta: StepMeta { name: "t".into(), display_name: "T".into(), valid: true },
                settings: PieceSettings {
                    piece_name: piece_name.into(),
                    piece_version: version.into(),
                    input: serde_json::json!({ "auth": "secret" }),
                    input_ui_info: InputUiInfo { sample_data_file_id: Some("f1".into()), ..Default::default() },
                },
                next: None,
            },
        }
    }

    fn version_of(flow: &Flow) -> String {
        flow.trigger.piece_settings().unwrap().piece_version.clone()
    }

    #[test]
    fn sub_1_0_0_gets_tilde_pin() {
        assert_eq!(version_of(&normalize(&piece_flow("x", "0.4.2"), &EngineConfig::default())), "~0.4.2");
    }

    #[test]
    fn gte_1_0_0_gets_caret_pin() {
        assert_eq!(version_of(&normalize(&piece_flow("x", "1.2.0"), &EngineConfig::default())), "^1.2.0");
    }

    #[test]
    fn already_pinned_is_untouched() {
        assert_eq!(version_of(&normalize(&piece_flow("x", "^2.0.0"), &EngineConfig::default())), "^2.0.0");
    }

    #[test]
    fn legacy_piece_below_min_version_is_untouched() {
        assert_eq!(version_of(&normalize(&piece_flow("gmail", "0.2.0"), &EngineConfig::default())), "0.2.0");
    }

    #[test]
    fn normalize_wipes_credentials_and_sample_data() {
        let out = normalize(&piece_flow("x", "1.0.0"), &EngineConfig::default());
        let settings = out.trigger.piece_settings().unwrap();
        assert_eq!(settings.input["auth"], "");
        assert_eq!(settings.input_ui_info, InputUiInfo::default());
    }

    #[test]
    fn normalize_is_idempotent() {
        let config = EngineConfig::default();
        let once = normalize(&piece_flow("x", "0.4.2"), &config);
        let twice = normalize(&once, &config);
        assert_eq!(once, twice);
    }
}
