//! Run directory naming.
//!
//! Every evaluation run gets a sortable, human-readable directory name derived
//! from its start time and the model identifier. Model identifiers routinely
//! contain provider separators ("openai/gpt-4"), so every path separator is
//! replaced before the name is used as a directory segment.
//!
//! Two runs started in the same wall-clock second with the same model collide
//! by design; the name is deterministic from its inputs only.

use chrono::{DateTime, Utc};

/// Derives the run directory name: `run-<YYYYMMDD>-<HHMMSS>-<sanitizedModel>`.
pub fn run_dir_name(model: &str, timestamp: DateTime<Utc>) -> String {
    format!(
        "run-{}-{}",
        timestamp.format("%Y%m%d-%H%M%S"),
        sanitize_model(model)
    )
}

/// Replaces every path-separator character in a model identifier with a dash.
fn sanitize_model(model: &str) -> String {
    model
        .chars()
        .map(|c| if c == '/' || c == '\\' { '-' } else { c })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 8, 5, 14, 30, 59).unwrap()
    }

    #[test]
    fn test_name_format() {
        let name = run_dir_name("gpt-4", fixed_time());
        assert_eq!(name, "run-20260805-143059-gpt-4");
    }

    #[test]
    fn test_name_is_separator_free() {
        let name = run_dir_name("a/b-model", fixed_time());
        assert!(!name.contains('/'));
        assert!(!name.contains('\\'));
        assert_eq!(name, "run-20260805-143059-a-b-model");

        let name = run_dir_name("org\\family/variant", fixed_time());
        assert!(!name.contains('/') && !name.contains('\\'));
    }

    #[test]
    fn test_name_is_deterministic() {
        let a = run_dir_name("anthropic/claude", fixed_time());
        let b = run_dir_name("anthropic/claude", fixed_time());
        assert_eq!(a, b);
    }
}
