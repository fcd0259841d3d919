//! Engine-wide tunables, collected into one small struct now that there
//! is more than one knob to carry.

/// A piece exempt from the version-constraint upgrade in `normalize`
/// because its existing version predates the semver convention
/// (a "legacy piece").
#[derive(Debug, Clone, PartialEq)]
pub struct LegacyPiece {
    pub name: &'static str,
    pub min_version: &'static str,
}

#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Prefix used by `find_unused_name` when no prefix is supplied by the
    /// caller (duplication always supplies `"step"`).
    pub default_name_prefix: String,
    /// Pieces whose current version, if below `min_version`, is left
    /// untouched by `upgrade_piece` rather than rewritten to a caret/tilde
    /// range.
    pub legacy_pieces: Vec<LegacyPiece>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            default_name_prefix: "step".to_string(),
            legacy_pieces: vec![
                LegacyPiece { name: "google-sheets", min_version: "0.3.0" },
                LegacyPiece { name: "gmail", min_version: "0.3.0" },
            ],
        }
    }
}
