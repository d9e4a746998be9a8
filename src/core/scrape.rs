use crate::domain::model::StartupTime;
use crate::utils::error::{BenchError, Result};
use regex::Regex;

/// Paper prints `Done (16.047s)! For help, type "help"` once the world is loaded.
pub const DEFAULT_READY_PATTERN: &str = r"Done \(([\d.]+)s\)!";

/// Recognises the server's "ready" console line and pulls out its seconds.
#[derive(Debug, Clone)]
pub struct StartupPattern {
    regex: Regex,
}

impl StartupPattern {
    pub fn new(pattern: &str) -> Result<Self> {
        let regex = Regex::new(pattern)?;
        if regex.captures_len() < 2 {
            return Err(BenchError::InvalidConfigValueError {
                field: "run.ready_pattern".to_string(),
                value: pattern.to_string(),
                reason: "Pattern needs a capture group around the seconds value".to_string(),
            });
        }
        Ok(Self { regex })
    }

    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    /// `None` for lines that don't match or whose number doesn't parse.
    pub fn extract(&self, line: &str) -> Option<StartupTime> {
        let caps = self.regex.captures(line)?;
        let secs: f64 = caps.get(1)?.as_str().parse().ok()?;
        StartupTime::from_secs(secs)
    }
}

impl Default for StartupPattern {
    fn default() -> Self {
        Self {
            regex: Regex::new(DEFAULT_READY_PATTERN).expect("default ready pattern is valid"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_seconds() {
        let pattern = StartupPattern::default();
        let time = pattern.extract("Done (12.345s)!").unwrap();
        assert_eq!(time.as_secs(), 12.345);
    }

    #[test]
    fn test_extracts_from_full_log_line() {
        let pattern = StartupPattern::default();
        let line = r#"[14:02:11 INFO]: Done (16.047s)! For help, type "help""#;
        assert_eq!(pattern.extract(line).unwrap().as_secs(), 16.047);
        assert_eq!(pattern.extract("Done (3s)!").unwrap().as_secs(), 3.0);
    }

    #[test]
    fn test_rejects_malformed_lines() {
        let pattern = StartupPattern::default();
        for line in [
            "Done (1.2.3s)!",
            "Done (s)!",
            "Done (12.345s)",
            "Done 12.345s!",
            "Done (12.345 s)!",
            "done (12.345s)!",
            "Done (abc s)!",
            "Preparing spawn area: 84%",
            "",
        ] {
            assert!(pattern.extract(line).is_none(), "should reject {:?}", line);
        }
    }

    #[test]
    fn test_custom_pattern() {
        let pattern = StartupPattern::new(r"ready in ([\d.]+) seconds").unwrap();
        assert_eq!(pattern.extract("server ready in 8.5 seconds").unwrap().as_secs(), 8.5);
        assert!(pattern.extract("Done (8.5s)!").is_none());
    }

    #[test]
    fn test_pattern_without_capture_group_rejected() {
        assert!(StartupPattern::new(r"Done \([\d.]+s\)!").is_err());
        assert!(StartupPattern::new(r"Done \((").is_err());
    }
}
