//! Variable substitution - replaces attribute tokens with numeric values
//!
//! Operates on sanitized text, where variables are maximal runs of uppercase
//! letters and dice notation keeps a lowercase `d`. That invariant makes the
//! dice-count position (`STRd6`) fall out of plain token scanning: the `STR`
//! run ends exactly where the `d6` begins.

use crate::value_objects::attributes::{Attribute, AttributeSet};

/// Replace recognized variable tokens with their numeric values.
///
/// Recognized tokens: `STR|STRENGTH`, `DEX|DEXTERITY`, `INT|INTELLIGENCE`,
/// `WIL|WILL`, `LEVEL|LVL`, and `KEY` (the maximum across the character's
/// key attributes). `KEY` is left in place when no key attributes are
/// configured: downstream evaluation then fails with an unknown-token error
/// rather than silently defaulting.
///
/// Returns the substituted text and whether any substitution happened.
pub fn substitute(
    text: &str,
    attributes: &AttributeSet,
    level: i32,
    key_attributes: &[Attribute],
) -> (String, bool) {
    let key_value = key_attributes
        .iter()
        .map(|a| attributes.get(*a))
        .max();

    let mut out = String::with_capacity(text.len());
    let mut substituted = false;
    let mut token = String::new();

    let mut flush = |token: &mut String, out: &mut String, substituted: &mut bool| {
        if token.is_empty() {
            return;
        }
        match resolve(token, attributes, level, key_value) {
            Some(value) => {
                out.push_str(&value.to_string());
                *substituted = true;
            }
            None => out.push_str(token),
        }
        token.clear();
    };

    for c in text.chars() {
        if c.is_ascii_uppercase() {
            token.push(c);
        } else {
            flush(&mut token, &mut out, &mut substituted);
            out.push(c);
        }
    }
    flush(&mut token, &mut out, &mut substituted);

    (out, substituted)
}

fn resolve(
    token: &str,
    attributes: &AttributeSet,
    level: i32,
    key_value: Option<i32>,
) -> Option<i32> {
    match token {
        "STR" | "STRENGTH" => Some(attributes.strength),
        "DEX" | "DEXTERITY" => Some(attributes.dexterity),
        "INT" | "INTELLIGENCE" => Some(attributes.intelligence),
        "WIL" | "WILL" => Some(attributes.will),
        "LEVEL" | "LVL" => Some(level),
        "KEY" => key_value,
        _ => None,
    }
}
