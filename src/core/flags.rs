use crate::core::FlagStore;
use crate::utils::error::Result;
use regex::{Captures, Regex};

/// Keys toggled when nothing else is configured: `optimizations.chunk-ticking`,
/// `ai-throttling` and every `multithreading.*.enabled` switch.
pub const DEFAULT_FLAG_KEYS: &[&str] = &["chunk-ticking", "ai-throttling", "enabled"];

#[derive(Debug, Clone, PartialEq)]
pub struct FlagEdit {
    pub content: String,
    /// Number of lines rewritten per key, in the order the keys were given.
    pub matches: Vec<(String, usize)>,
}

impl FlagEdit {
    pub fn total_matches(&self) -> usize {
        self.matches.iter().map(|(_, count)| count).sum()
    }

    pub fn unmatched_keys(&self) -> impl Iterator<Item = &str> {
        self.matches
            .iter()
            .filter(|(_, count)| *count == 0)
            .map(|(key, _)| key.as_str())
    }
}

fn key_pattern(key: &str) -> Result<Regex> {
    // 只替換整個值，保留縮排、行尾註解與換行符號
    let pattern = format!(
        r"(?m)^([ \t]*(?:-[ \t]+)?{}[ \t]*:[ \t]+)[^\s#](?:[^#\r\n]*[^\s#])?",
        regex::escape(key)
    );
    Ok(Regex::new(&pattern)?)
}

/// Rewrites `key: <value>` lines to `key: true|false`.
///
/// Lines whose key is not listed are left byte-for-byte as they were. Keys
/// without a value on the same line (mapping parents) are never touched.
pub fn set_flags(content: &str, keys: &[String], enabled: bool) -> Result<FlagEdit> {
    let value = if enabled { "true" } else { "false" };
    let mut text = content.to_string();
    let mut matches = Vec::with_capacity(keys.len());

    for key in keys {
        let re = key_pattern(key)?;
        let mut count = 0usize;
        let replaced = re.replace_all(&text, |caps: &Captures| {
            count += 1;
            format!("{}{}", &caps[1], value)
        });
        let replaced = replaced.into_owned();
        text = replaced;
        matches.push((key.clone(), count));
    }

    Ok(FlagEdit {
        content: text,
        matches,
    })
}

/// Reads the server config from `store`, sets every flag and writes it back.
pub async fn apply_flags<S: FlagStore>(store: &S, keys: &[String], enabled: bool) -> Result<FlagEdit> {
    let original = store.read_config().await?;
    let edit = set_flags(&original, keys, enabled)?;

    for key in edit.unmatched_keys() {
        tracing::warn!("⚠️ Flag '{}' not found in {}", key, store.describe());
    }

    if edit.content != original {
        store.write_config(&edit.content).await?;
    }
    tracing::debug!(
        "Rewrote {} flag line(s) in {}",
        edit.total_matches(),
        store.describe()
    );

    Ok(edit)
}

#[cfg(test)]
mod tests {
    use super::*;

    const METAL_YML: &str = "\
# MetalMC Configuration File
config-version: 1
optimizations:
  chunk-ticking: true
  ai-throttling: true
multithreading:
  async-chunk-loading:
    enabled: true
    threads: 4
    prioritize-player-chunks: true
  async-entity-processing:
    enabled: true # keep in sync with the scheduler
    async-collision-detection: false
";

    fn default_keys() -> Vec<String> {
        DEFAULT_FLAG_KEYS.iter().map(|k| k.to_string()).collect()
    }

    #[test]
    fn test_disable_flags() {
        let edit = set_flags(METAL_YML, &default_keys(), false).unwrap();

        assert!(edit.content.contains("  chunk-ticking: false\n"));
        assert!(edit.content.contains("  ai-throttling: false\n"));
        assert!(edit.content.contains("    enabled: false\n"));
        assert!(edit
            .content
            .contains("    enabled: false # keep in sync with the scheduler\n"));
        assert_eq!(
            edit.matches,
            vec![
                ("chunk-ticking".to_string(), 1),
                ("ai-throttling".to_string(), 1),
                ("enabled".to_string(), 2),
            ]
        );
    }

    #[test]
    fn test_untargeted_lines_unchanged() {
        let edit = set_flags(METAL_YML, &default_keys(), false).unwrap();

        let before: Vec<&str> = METAL_YML.split_inclusive('\n').collect();
        let after: Vec<&str> = edit.content.split_inclusive('\n').collect();
        assert_eq!(before.len(), after.len());

        for (old, new) in before.iter().zip(after.iter()) {
            let targeted = ["chunk-ticking:", "ai-throttling:", "enabled:"]
                .iter()
                .any(|k| old.trim_start().starts_with(k));
            if !targeted {
                assert_eq!(old, new);
            }
        }
        assert!(edit.content.contains("    prioritize-player-chunks: true\n"));
        assert!(edit.content.contains("    async-collision-detection: false\n"));
    }

    #[test]
    fn test_toggle_restores_original() {
        let keys = default_keys();
        let off = set_flags(METAL_YML, &keys, true).unwrap();
        let off = set_flags(&off.content, &keys, false).unwrap();
        let on = set_flags(&off.content, &keys, true).unwrap();
        assert_eq!(on.content, METAL_YML);
    }

    #[test]
    fn test_crlf_line_endings_preserved() {
        let content = "optimizations:\r\n  chunk-ticking: true\r\n  view-distance: 10\r\n";
        let edit = set_flags(content, &default_keys(), false).unwrap();
        assert_eq!(
            edit.content,
            "optimizations:\r\n  chunk-ticking: false\r\n  view-distance: 10\r\n"
        );
    }

    #[test]
    fn test_mapping_parent_not_touched() {
        let keys = vec!["optimizations".to_string()];
        let edit = set_flags(METAL_YML, &keys, false).unwrap();
        assert_eq!(edit.content, METAL_YML);
        assert_eq!(edit.unmatched_keys().collect::<Vec<_>>(), vec!["optimizations"]);
    }

    #[test]
    fn test_key_is_not_a_substring_match() {
        let content = "dab-enabled: true\n# enabled: true\nenabled: true\n";
        let keys = vec!["enabled".to_string()];
        let edit = set_flags(content, &keys, false).unwrap();
        assert_eq!(edit.content, "dab-enabled: true\n# enabled: true\nenabled: false\n");
    }

    #[test]
    fn test_multi_word_value_replaced_whole() {
        let content = "chunk-ticking: yes please\r\nai-throttling: on for now   # later\n";
        let edit = set_flags(content, &default_keys(), false).unwrap();
        assert_eq!(
            edit.content,
            "chunk-ticking: false\r\nai-throttling: false   # later\n"
        );
    }

    #[test]
    fn test_regex_metacharacters_in_key() {
        let content = "a.b: true\naxb: true\n";
        let keys = vec!["a.b".to_string()];
        let edit = set_flags(content, &keys, false).unwrap();
        assert_eq!(edit.content, "a.b: false\naxb: true\n");
    }
}
