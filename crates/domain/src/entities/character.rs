//! Character entity - the sheet a formula is rolled against

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::ids::CharacterId;
use crate::value_objects::attributes::{Attribute, AttributeSet};
use crate::value_objects::formula::FormulaContext;

/// A managed character: identity, level, attributes, and the key
/// attributes its class designates for the `KEY` formula variable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Character {
    pub id: CharacterId,
    pub name: String,
    /// Display-only class label (e.g. "Berserker"). Content repositories
    /// are out of scope; the class only matters here for key attributes.
    pub class_name: Option<String>,
    pub level: i32,
    pub attributes: AttributeSet,
    /// Commonly one or two attributes, set by the class.
    pub key_attributes: Vec<Attribute>,

    // Metadata
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Character {
    /// Create a new level-1 character with zeroed attributes.
    pub fn new(name: impl Into<String>) -> Result<Self, DomainError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::validation("Character name cannot be empty"));
        }
        let now = Utc::now();
        Ok(Self {
            id: CharacterId::new(),
            name,
            class_name: None,
            level: 1,
            attributes: AttributeSet::default(),
            key_attributes: Vec::new(),
            created_at: now,
            updated_at: now,
        })
    }

    /// Set the attribute block.
    pub fn with_attributes(mut self, attributes: AttributeSet) -> Self {
        self.attributes = attributes;
        self
    }

    /// Set the class label and its key attributes.
    pub fn with_class(
        mut self,
        class_name: impl Into<String>,
        key_attributes: Vec<Attribute>,
    ) -> Self {
        self.class_name = Some(class_name.into());
        self.key_attributes = key_attributes;
        self
    }

    /// Set the character level.
    pub fn with_level(mut self, level: i32) -> Self {
        self.level = level;
        self
    }

    /// Update a single attribute value.
    pub fn set_attribute(&mut self, attribute: Attribute, value: i32) {
        self.attributes.set(attribute, value);
        self.updated_at = Utc::now();
    }

    /// Advance to a new level.
    pub fn set_level(&mut self, level: i32) -> Result<(), DomainError> {
        if level < 1 {
            return Err(DomainError::validation("Level must be at least 1"));
        }
        self.level = level;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// The formula-engine view of this character.
    pub fn formula_context(&self) -> FormulaContext {
        FormulaContext::new(self.attributes, self.level, self.key_attributes.clone())
    }
}
