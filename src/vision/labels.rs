// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Class label table shipped alongside the detection model
//!
//! Accepted file layouts:
//! - JSON array: `["person", "bicycle", ...]`
//! - JSON object: `{"0": "person", "1": "bicycle", ...}`
//! - Text, one name per line, optionally prefixed `index: name`
//! - Ultralytics dataset YAML: only the indented block under a top-level
//!   `names:` key is read, in `index: name` or `- name` form. Inline
//!   `names: [...]` lists are not supported.

use std::collections::BTreeMap;
use std::path::Path;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LabelError {
    #[error("Failed to read label file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid label file: {0}")]
    Parse(String),

    #[error("Label table is empty")]
    Empty,

    #[error("Label for class {0} is empty")]
    EmptyName(u32),

    #[error("Label table does not cover class {class_id} (model has {num_classes} classes)")]
    Incomplete { class_id: u32, num_classes: usize },
}

/// Immutable class index -> name mapping
#[derive(Debug, Clone, PartialEq)]
pub struct ClassLabels {
    names: BTreeMap<u32, String>,
}

impl ClassLabels {
    pub fn new(names: BTreeMap<u32, String>) -> Result<Self, LabelError> {
        if names.is_empty() {
            return Err(LabelError::Empty);
        }
        if let Some((id, _)) = names.iter().find(|(_, name)| name.trim().is_empty()) {
            return Err(LabelError::EmptyName(*id));
        }
        Ok(Self { names })
    }

    /// Build from names listed in class index order
    pub fn from_names<I, S>(names: I) -> Result<Self, LabelError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(
            names
                .into_iter()
                .enumerate()
                .map(|(i, name)| (i as u32, name.into()))
                .collect(),
        )
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, LabelError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| LabelError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse(&contents)
    }

    pub fn parse(contents: &str) -> Result<Self, LabelError> {
        let trimmed = contents.trim_start();
        if trimmed.starts_with('[') || trimmed.starts_with('{') {
            Self::parse_json(trimmed)
        } else {
            Self::parse_lines(contents)
        }
    }

    fn parse_json(contents: &str) -> Result<Self, LabelError> {
        let value: serde_json::Value =
            serde_json::from_str(contents).map_err(|e| LabelError::Parse(e.to_string()))?;

        match value {
            serde_json::Value::Array(items) => {
                let names = items
                    .into_iter()
                    .map(|item| match item {
                        serde_json::Value::String(s) => Ok(s),
                        other => Err(LabelError::Parse(format!(
                            "expected string label, got {}",
                            other
                        ))),
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                Self::from_names(names)
            }
            serde_json::Value::Object(map) => {
                let mut names = BTreeMap::new();
                for (key, item) in map {
                    let id = key
                        .trim()
                        .parse::<u32>()
                        .map_err(|_| LabelError::Parse(format!("invalid class index '{}'", key)))?;
                    let name = item
                        .as_str()
                        .ok_or_else(|| LabelError::Parse(format!("label for {} is not a string", id)))?;
                    names.insert(id, name.to_string());
                }
                Self::new(names)
            }
            _ => Err(LabelError::Parse(
                "expected a JSON array or object".to_string(),
            )),
        }
    }

    fn parse_lines(contents: &str) -> Result<Self, LabelError> {
        let lines: Vec<&str> = match contents.lines().position(|l| l.trim_end() == "names:") {
            Some(header) => contents
                .lines()
                .skip(header + 1)
                .take_while(|l| l.trim().is_empty() || l.starts_with(char::is_whitespace))
                .collect(),
            None => contents.lines().collect(),
        };

        let mut names = BTreeMap::new();
        let mut next_id = 0u32;

        for line in lines {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let line = line.strip_prefix("- ").unwrap_or(line);

            let (id, name) = line
                .split_once(':')
                .and_then(|(index, name)| index.trim().parse::<u32>().ok().map(|id| (id, name)))
                .unwrap_or((next_id, line));

            let name = name.trim().trim_matches(|c| c == '\'' || c == '"');
            names.insert(id, name.to_string());
            next_id = id.saturating_add(1);
        }

        Self::new(names)
    }

    pub fn get(&self, class_id: u32) -> Option<&str> {
        self.names.get(&class_id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Verify every class index of a model with `num_classes` classes resolves
    pub fn ensure_covers(&self, num_classes: usize) -> Result<(), LabelError> {
        match (0..num_classes as u32).find(|id| !self.names.contains_key(id)) {
            Some(class_id) => Err(LabelError::Incomplete {
                class_id,
                num_classes,
            }),
            None => Ok(()),
        }
    }
}
