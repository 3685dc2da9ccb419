//! Character attributes - the four core stats driving formula variables
//!
//! Formulas reference attributes by abbreviation (`STR`) or full name
//! (`STRENGTH`), and a character's class designates one or two of them
//! as "key attributes" resolved by the `KEY` variable.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// One of the four character attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Attribute {
    Strength,
    Dexterity,
    Intelligence,
    Will,
}

impl Attribute {
    /// All attributes in canonical order.
    pub const ALL: [Attribute; 4] = [
        Attribute::Strength,
        Attribute::Dexterity,
        Attribute::Intelligence,
        Attribute::Will,
    ];

    /// Three-letter abbreviation used in formulas (e.g. `STR`).
    pub fn abbreviation(&self) -> &'static str {
        match self {
            Attribute::Strength => "STR",
            Attribute::Dexterity => "DEX",
            Attribute::Intelligence => "INT",
            Attribute::Will => "WIL",
        }
    }

    /// Full formula name (e.g. `STRENGTH`).
    pub fn full_name(&self) -> &'static str {
        match self {
            Attribute::Strength => "STRENGTH",
            Attribute::Dexterity => "DEXTERITY",
            Attribute::Intelligence => "INTELLIGENCE",
            Attribute::Will => "WILL",
        }
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.abbreviation())
    }
}

impl FromStr for Attribute {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "STR" | "STRENGTH" => Ok(Self::Strength),
            "DEX" | "DEXTERITY" => Ok(Self::Dexterity),
            "INT" | "INTELLIGENCE" => Ok(Self::Intelligence),
            "WIL" | "WILL" => Ok(Self::Will),
            _ => Err(DomainError::parse(format!("Unknown attribute: {}", s))),
        }
    }
}

/// The signed values of all four attributes.
///
/// This is an immutable-by-convention value object; use `set` sparingly,
/// from entity methods that also touch the entity's timestamps.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributeSet {
    pub strength: i32,
    pub dexterity: i32,
    pub intelligence: i32,
    pub will: i32,
}

impl AttributeSet {
    pub fn new(strength: i32, dexterity: i32, intelligence: i32, will: i32) -> Self {
        Self {
            strength,
            dexterity,
            intelligence,
            will,
        }
    }

    pub fn get(&self, attribute: Attribute) -> i32 {
        match attribute {
            Attribute::Strength => self.strength,
            Attribute::Dexterity => self.dexterity,
            Attribute::Intelligence => self.intelligence,
            Attribute::Will => self.will,
        }
    }

    pub fn set(&mut self, attribute: Attribute, value: i32) {
        match attribute {
            Attribute::Strength => self.strength = value,
            Attribute::Dexterity => self.dexterity = value,
            Attribute::Intelligence => self.intelligence = value,
            Attribute::Will => self.will = value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_short_and_long_names() {
        assert_eq!("STR".parse::<Attribute>().unwrap(), Attribute::Strength);
        assert_eq!(
            "strength".parse::<Attribute>().unwrap(),
            Attribute::Strength
        );
        assert_eq!("Wil".parse::<Attribute>().unwrap(), Attribute::Will);
        assert!("CHA".parse::<Attribute>().is_err());
    }

    #[test]
    fn get_and_set_cover_all_attributes() {
        let mut set = AttributeSet::default();
        for (i, attr) in Attribute::ALL.iter().enumerate() {
            set.set(*attr, i as i32 + 1);
        }
        assert_eq!(set.get(Attribute::Strength), 1);
        assert_eq!(set.get(Attribute::Dexterity), 2);
        assert_eq!(set.get(Attribute::Intelligence), 3);
        assert_eq!(set.get(Attribute::Will), 4);
    }

    #[test]
    fn serializes_camel_case() {
        let set = AttributeSet::new(2, -1, 0, 3);
        let json = serde_json::to_value(&set).unwrap();
        assert_eq!(json["strength"], 2);
        assert_eq!(json["dexterity"], -1);
    }
}
