//! Snapshot time extraction from a line prefix.

use json_event_parser::JsonEvent;
use tracing::{trace, warn};

use crate::domain::SystemTime;
use crate::scan::{ScanError, Scanner, scalar_value};

const SYSTEM_TIME_KEY: &str = "system_time";

/// Recover `system_time` from the first bytes of a line.
///
/// The prefix is usually cut in the middle of a token, so the first parse
/// error simply ends the search. Every `system_time` key seen before that
/// point overwrites the previous one, so the last complete occurrence wins.
/// A non-numeric value resets the result to unknown. Fractional seconds are
/// truncated toward zero, since [`SystemTime`] counts whole seconds.
pub fn extract_system_time(prefix: &[u8]) -> Option<SystemTime> {
    let text = String::from_utf8_lossy(prefix);
    let mut scanner = Scanner::new();
    let mut awaiting_value = false;
    let mut system_time = None;

    let result = scanner.feed(text.as_bytes(), |event, _depth| {
        match event {
            JsonEvent::ObjectKey(key) => awaiting_value = key == SYSTEM_TIME_KEY,
            JsonEvent::Number(text) if awaiting_value => {
                awaiting_value = false;
                system_time = seconds(&text);
            }
            scalar if awaiting_value => {
                awaiting_value = false;
                system_time = None;
                warn!(value = ?scalar_value(&scalar), "system_time is not a number");
            }
            _ => awaiting_value = false,
        }
        Ok::<_, ScanError>(())
    });

    if let Err(err) = result {
        trace!(%err, "prefix scan stopped");
    }
    system_time
}

fn seconds(text: &str) -> Option<SystemTime> {
    text.parse::<i64>()
        .ok()
        .or_else(|| text.parse::<f64>().ok().map(|f| f.trunc() as i64))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_top_level_time() {
        let line = br#"{"system_time": 1600000000, "trips": []}"#;
        assert_eq!(extract_system_time(line), Some(1_600_000_000));
    }

    #[test]
    fn finds_first_key_of_nested_object() {
        let line = br#"{"destination": {"type": "Topic"}, "content": {"system_time": 1600003600, "universe": 0"#;
        assert_eq!(extract_system_time(line), Some(1_600_003_600));
    }

    #[test]
    fn tolerates_truncated_prefix() {
        let line = br#"{"content": {"universe": 0, "system_time": 1600000000, "trips": [{"tri"#;
        assert_eq!(extract_system_time(line), Some(1_600_000_000));
    }

    #[test]
    fn tolerates_cut_multibyte_character() {
        let line = "{\"system_time\": 7, \"name\": \"Zü".as_bytes();
        let cut = &line[..line.len() - 1];
        assert_eq!(extract_system_time(cut), Some(7));
    }

    #[test]
    fn missing_when_cut_before_value() {
        assert_eq!(extract_system_time(br#"{"content": {"system_ti"#), None);
        assert_eq!(extract_system_time(br#"{"system_time": 16000"#), None);
        assert_eq!(extract_system_time(b""), None);
    }

    #[test]
    fn missing_when_key_absent() {
        assert_eq!(extract_system_time(br#"{"time": 5, "other": {"a": 1}}"#), None);
    }

    #[test]
    fn last_occurrence_wins() {
        let line = br#"{"system_time": 100, "content": {"system_time": 200, "trips": ["#;
        assert_eq!(extract_system_time(line), Some(200));
    }

    #[test]
    fn later_non_numeric_occurrence_clears_time() {
        let line = br#"{"system_time": 100, "content": {"system_time": null}}"#;
        assert_eq!(extract_system_time(line), None);
    }

    #[test]
    fn fractional_seconds_are_truncated() {
        assert_eq!(extract_system_time(br#"{"system_time": 1600000000.9}"#), Some(1_600_000_000));
        assert_eq!(extract_system_time(br#"{"system_time": 1.6e9}"#), Some(1_600_000_000));
    }

    #[test]
    fn stops_at_first_syntax_error() {
        let line = br#"{"system_time": 5, "x" ! "system_time": 9}"#;
        assert_eq!(extract_system_time(line), Some(5));
    }

    #[test]
    fn value_must_follow_key() {
        let line = br#"{"system_time": {"nested": 5}, "x": 1}"#;
        assert_eq!(extract_system_time(line), None);
    }

    #[test]
    fn invalid_json_yields_none() {
        assert_eq!(extract_system_time(b"not json at all"), None);
        assert_eq!(extract_system_time(br#"{"system_time": "soon"}"#), None);
    }
}
