//! Schema validation boundary.
//!
//! The engine only consumes a schema validator for steps/triggers, never
//! implements one. `SchemaValidator` is that seam; `JsonSchemaValidator`
//! is the concrete default (`jsonschema::validator_for`, recompiled per
//! call rather than cached -- the schema is small and this keeps the
//! validator stateless).

use crate::model::Step;

static STEP_SCHEMA_STR: &str = include_str!("../schema/step-schema.json");

pub trait SchemaValidator {
    /// Returns whether `step` satisfies the schema for its declared kind.
    /// Never returns an error: a schema mismatch clears the step's `valid`
    /// flag rather than aborting the operation.
    fn is_valid(&self, step: &Step) -> bool;
}

pub struct JsonSchemaValidator;

impl SchemaValidator for JsonSchemaValidator {
    fn is_valid(&self, step: &Step) -> bool {
        let schema: serde_json::Value = match serde_json::from_str(STEP_SCHEMA_STR) {
            Ok(s) => s,
            Err(_) => return false,
        };
        let validator = match jsonschema::validator_for(&schema) {
            Ok(v) => v,
            Err(_) => return false,
        };
        let instance = match serde_json::to_value(step) {
            Ok(v) => v,
            Err(_) => return false,
        };
        validator.is_valid(&instance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{PieceSettings, StepMeta};

    fn piece_step(piece_name: &str) -> Step {
        Step::ActionPiece {
            meta: StepMeta { name: "step_1".into(), display_name: "P".into(), valid: true },
            settings: PieceSettings {
                piece_name: piece_name.into(),
                piece_version: "1.0.0".into(),
                input: serde_json::json!({}),
                input_ui_info: Default::default(),
            },
            next: None,
        }
    }

    #[test]
    fn accepts_well_formed_piece_step() {
        assert!(JsonSchemaValidator.is_valid(&piece_step("slack")));
    }

    #[test]
    fn rejects_piece_step_with_empty_name() {
        assert!(!JsonSchemaValidator.is_valid(&piece_step("")));
    }
}
