//! Reader for the engine's `[section]` / `key=value` configuration files
//! (`project.godot`, `export_presets.cfg`).
//!
//! Values are kept verbatim. Values opening a bracket or a string that is not closed on the same
//! line continue on the following lines.

use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LookupError {
    #[error("section [{0}] not found")]
    MissingSection(String),
    #[error("key `{key}` not found in section [{section}]")]
    MissingKey { section: String, key: String },
}

#[derive(Debug, Default, Clone)]
pub struct ConfigFile {
    sections: HashMap<String, HashMap<String, String>>,
}

impl ConfigFile {
    pub async fn load(path: &Path) -> std::io::Result<Self> {
        let text = tokio::fs::read_to_string(path).await?;
        Ok(Self::parse(&text))
    }

    pub fn parse(text: &str) -> Self {
        let mut sections: HashMap<String, HashMap<String, String>> = HashMap::new();
        let mut section = String::new();
        let mut pending: Option<(String, String, ValueScanner)> = None;

        for line in text.lines() {
            if let Some((key, mut value, mut scanner)) = pending.take() {
                value.push('\n');
                value.push_str(line);
                scanner.feed(line);
                if scanner.is_complete() {
                    sections
                        .entry(section.clone())
                        .or_default()
                        .insert(key, value.trim().to_string());
                } else {
                    pending = Some((key, value, scanner));
                }
                continue;
            }

            let line = line.trim();
            if line.is_empty() || line.starts_with(';') || line.starts_with('#') {
                continue;
            }

            if let Some(name) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
                section = name.trim().to_string();
                sections.entry(section.clone()).or_default();
                continue;
            }

            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let (key, value) = (key.trim().to_string(), value.trim().to_string());

            let mut scanner = ValueScanner::default();
            scanner.feed(&value);
            if scanner.is_complete() {
                sections.entry(section.clone()).or_default().insert(key, value);
            } else {
                pending = Some((key, value, scanner));
            }
        }

        // unterminated value at end of file
        if let Some((key, value, _)) = pending {
            sections
                .entry(section)
                .or_default()
                .insert(key, value.trim().to_string());
        }

        Self { sections }
    }

    pub fn has_section(&self, section: &str) -> bool {
        self.sections.contains_key(section)
    }

    /// The raw value of `key` in `section`. Keys before the first header live in section `""`.
    pub fn get(&self, section: &str, key: &str) -> Result<&str, LookupError> {
        self.sections
            .get(section)
            .ok_or_else(|| LookupError::MissingSection(section.to_string()))?
            .get(key)
            .map(String::as_str)
            .ok_or_else(|| LookupError::MissingKey {
                section: section.to_string(),
                key: key.to_string(),
            })
    }

    /// Like [`get`](Self::get), with surrounding quotes and escapes of a string value removed.
    pub fn get_string(&self, section: &str, key: &str) -> Result<String, LookupError> {
        self.get(section, key).map(unquote)
    }
}

fn unquote(value: &str) -> String {
    let Some(inner) = value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
    else {
        return value.to_string();
    };

    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some('n') => out.push('\n'),
                Some('t') => out.push('\t'),
                Some(other) => out.push(other),
                None => out.push('\\'),
            }
        } else {
            out.push(c);
        }
    }
    out
}

/// Tracks open brackets and strings across the lines of one value.
#[derive(Debug, Default, Clone, Copy)]
struct ValueScanner {
    depth: i32,
    in_string: bool,
    escaped: bool,
}

impl ValueScanner {
    fn feed(&mut self, text: &str) {
        for c in text.chars() {
            if self.in_string {
                match c {
                    _ if self.escaped => self.escaped = false,
                    '\\' => self.escaped = true,
                    '"' => self.in_string = false,
                    _ => {}
                }
                continue;
            }

            match c {
                '"' => self.in_string = true,
                '{' | '[' | '(' => self.depth += 1,
                '}' | ']' | ')' => self.depth -= 1,
                _ => {}
            }
        }
    }

    fn is_complete(&self) -> bool {
        !self.in_string && self.depth <= 0
    }
}
