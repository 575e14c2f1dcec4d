//! Minimal INI reader for WireGuard configuration files.
//!
//! Supports `[Section]` headers, `Key = Value` pairs and `#`/`;` comment
//! lines. Keys outside any section belong to an unnamed section. Lookups
//! are case-sensitive and the first occurrence of a key wins.

/// Error parsing INI content.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IniError {
    #[error("key-value delimiter not found: {line}")]
    DelimiterNotFound { line: String },

    #[error("unclosed section header: {line}")]
    UnclosedSection { line: String },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Section {
    name: String,
    entries: Vec<(String, String)>,
}

impl Section {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ini {
    sections: Vec<Section>,
}

impl Ini {
    pub fn parse(content: &str) -> Result<Self, IniError> {
        let mut sections = vec![Section::default()];

        for raw in content.lines() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
                continue;
            }

            if let Some(header) = line.strip_prefix('[') {
                let name = header
                    .strip_suffix(']')
                    .ok_or_else(|| IniError::UnclosedSection {
                        line: line.to_string(),
                    })?;
                sections.push(Section {
                    name: name.trim().to_string(),
                    entries: Vec::new(),
                });
                continue;
            }

            let (key, value) = line
                .split_once('=')
                .ok_or_else(|| IniError::DelimiterNotFound {
                    line: line.to_string(),
                })?;
            if let Some(section) = sections.last_mut() {
                section
                    .entries
                    .push((key.trim().to_string(), value.trim().to_string()));
            }
        }

        Ok(Self { sections })
    }

    /// The first section called `name`.
    pub fn section(&self, name: &str) -> Option<&Section> {
        self.sections.iter().find(|section| section.name == name)
    }
}
