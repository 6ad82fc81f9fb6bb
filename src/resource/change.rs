//! Attribute change directives.
//!
//! A batch of [`Change`]s is applied by the directory against one entry as a
//! single request; atomicity is the directory's guarantee, not ours.

use super::resource::{OBJECT_ID, OBJECT_TYPE, Resource};
use crate::error::{ValidationError, ValidationResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// How a change is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChangeMode {
    /// Replace the value of a single-valued attribute
    Replace,
    /// Add a value to a multi-valued attribute
    Add,
    /// Remove a value from a multi-valued attribute
    Delete,
}

impl fmt::Display for ChangeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Replace => write!(f, "Replace"),
            Self::Add => write!(f, "Add"),
            Self::Delete => write!(f, "Delete"),
        }
    }
}

/// A single mutation directive against one attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Change {
    pub mode: ChangeMode,
    pub attribute_name: String,
    pub value: String,
}

impl Change {
    pub fn replace(attribute_name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(ChangeMode::Replace, attribute_name, value)
    }

    pub fn add(attribute_name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(ChangeMode::Add, attribute_name, value)
    }

    pub fn delete(attribute_name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(ChangeMode::Delete, attribute_name, value)
    }

    pub fn new(
        mode: ChangeMode,
        attribute_name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            mode,
            attribute_name: attribute_name.into(),
            value: value.into(),
        }
    }

    /// Reject changes the gateway can tell are invalid without asking the
    /// directory.
    pub fn validate(&self) -> ValidationResult<()> {
        let name = self.attribute_name.trim();
        if name.is_empty() {
            return Err(ValidationError::InvalidChange {
                attribute: self.attribute_name.clone(),
                message: "attribute name is empty".to_string(),
            });
        }
        if name == OBJECT_ID || name == OBJECT_TYPE {
            return Err(ValidationError::InvalidChange {
                attribute: self.attribute_name.clone(),
                message: "identity attributes cannot be changed".to_string(),
            });
        }
        Ok(())
    }

    /// Apply the change to an in-memory copy of an entry.
    ///
    /// Returns `false` if a `Delete` targeted a value that was not present.
    pub fn apply_to(&self, resource: &mut Resource) -> bool {
        match self.mode {
            ChangeMode::Replace => {
                resource.set_scalar(self.attribute_name.clone(), self.value.clone());
                true
            }
            ChangeMode::Add => {
                resource.add_value(&self.attribute_name, self.value.clone());
                true
            }
            ChangeMode::Delete => resource.remove_value(&self.attribute_name, &self.value),
        }
    }
}

/// Validate a whole batch before it is sent anywhere.
pub fn validate_changes(changes: &[Change]) -> ValidationResult<()> {
    if changes.is_empty() {
        return Err(ValidationError::custom("change batch must not be empty"));
    }
    changes.iter().try_for_each(Change::validate)
}
