//! Output file naming.
//!
//! Production names may hold characters that are awkward in file names and
//! may differ only in case or punctuation, so every name is sanitized,
//! truncated and made unique before it becomes a file stem.

use std::collections::HashSet;

/// Longest file stem handed out, in characters.
pub const MAX_STEM_LENGTH: usize = 64;

/// Hands out distinct file stems for production names.
#[derive(Debug)]
pub struct FileNamer {
    max_length: usize,
    used: HashSet<String>,
}

impl FileNamer {
    pub fn new(max_length: usize) -> Self {
        Self {
            max_length: max_length.max(1),
            used: HashSet::new(),
        }
    }

    /// Returns a stem for `name` that no earlier call returned.
    ///
    /// Characters outside `[A-Za-z0-9_-]` become `_`. On a clash a counter
    /// is appended, shortening the base so the result still fits.
    pub fn stem(&mut self, name: &str) -> String {
        let sanitized = sanitize(name);
        let mut candidate: String = sanitized.chars().take(self.max_length).collect();

        if self.used.contains(&candidate) {
            let mut base = candidate.clone();
            let mut counter = 0usize;
            loop {
                let suffix = counter.to_string();
                if base.chars().count() + suffix.len() > self.max_length {
                    if base.pop().is_none() {
                        // Counter alone is longer than the limit.
                        candidate = suffix;
                        if !self.used.contains(&candidate) {
                            break;
                        }
                        counter += 1;
                        continue;
                    }
                    continue;
                }
                candidate = format!("{base}{suffix}");
                if !self.used.contains(&candidate) {
                    break;
                }
                counter += 1;
            }
        }

        self.used.insert(candidate.clone());
        candidate
    }
}

impl Default for FileNamer {
    fn default() -> Self {
        Self::new(MAX_STEM_LENGTH)
    }
}

fn sanitize(name: &str) -> String {
    let sanitized: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if sanitized.is_empty() {
        "diagram".to_string()
    } else {
        sanitized
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_name_kept() {
        let mut namer = FileNamer::default();
        assert_eq!(namer.stem("expression"), "expression");
    }

    #[test]
    fn test_awkward_characters_replaced() {
        let mut namer = FileNamer::default();
        assert_eq!(namer.stem("select list/item"), "select_list_item");
        assert_eq!(namer.stem(""), "diagram");
    }

    #[test]
    fn test_clash_gets_counter() {
        let mut namer = FileNamer::default();
        assert_eq!(namer.stem("a b"), "a_b");
        assert_eq!(namer.stem("a/b"), "a_b0");
        assert_eq!(namer.stem("a.b"), "a_b1");
    }

    #[test]
    fn test_truncated_clash_stays_within_limit() {
        let mut namer = FileNamer::new(4);
        assert_eq!(namer.stem("abcdef"), "abcd");
        assert_eq!(namer.stem("abcdxyz"), "abc0");
        assert_eq!(namer.stem("abcd"), "abc1");
    }
}
