//! Dice notation scanning
//!
//! Finds every dice term in substituted formula text - the grammar is
//! `(-?\d+)?d(\d+)([!v]+)?` - and splits the formula into an ordered list
//! of literal and dice segments. Rendering and evaluation later fold over
//! that list, so there is no index-based string surgery anywhere.

use serde::{Deserialize, Serialize};

use super::FormulaError;

/// Die sizes rolled as a single die.
pub const SINGLE_DICE: [u32; 7] = [4, 6, 8, 10, 12, 20, 100];

/// Composite two-digit dice: one base die for the tens digit, one for the ones.
pub const DOUBLE_DIGIT_DICE: [u32; 3] = [44, 66, 88];

/// One parsed dice term. Produced once per scan, consumed once by the roller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiceNotation {
    /// Number of dice to roll (defaults to 1 for bare `d6`). May be negative
    /// after variable substitution; the roller rejects counts below 1.
    pub count: i64,
    /// Die size (`d20` → 20). Validated against the accepted sets.
    pub sides: u32,
    /// Byte offset and length of the term within the scanned text.
    pub span: (usize, usize),
    /// `!` postfix - exploding criticals enabled for this term.
    pub explodes: bool,
    /// `v` postfix - vicious bonus dice enabled for this term.
    pub vicious: bool,
}

impl DiceNotation {
    /// Whether this is a composite two-digit die (d44/d66/d88).
    pub fn is_double_digit(&self) -> bool {
        DOUBLE_DIGIT_DICE.contains(&self.sides)
    }

    /// The per-digit base die of a double-digit term (d66 → d6).
    pub fn base_die(&self) -> u32 {
        self.sides / 11
    }
}

/// A formula decomposed into literal text and dice terms, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    Literal(String),
    Dice(DiceNotation),
}

/// Scan `text` for all dice terms, left to right.
pub fn find_dice_terms(text: &str) -> Result<Vec<DiceNotation>, FormulaError> {
    let chars: Vec<char> = text.chars().collect();
    let mut terms = Vec::new();
    let mut i = 0;
    // End of the previous term; the backward count scan never crosses it.
    let mut last_end = 0;

    while i < chars.len() {
        if chars[i] == 'd' && i + 1 < chars.len() && chars[i + 1].is_ascii_digit() {
            // Sides.
            let mut j = i + 1;
            while j < chars.len() && chars[j].is_ascii_digit() {
                j += 1;
            }
            let sides_text: String = chars[i + 1..j].iter().collect();

            // Postfix flags, in any order and multiplicity.
            let mut explodes = false;
            let mut vicious = false;
            while j < chars.len() && (chars[j] == '!' || chars[j] == 'v') {
                if chars[j] == '!' {
                    explodes = true;
                } else {
                    vicious = true;
                }
                j += 1;
            }

            // Count: digits directly before the 'd', with one adjacent leading
            // minus sign absorbed into the count (mirrors `(-?\d+)?d`).
            let mut start = i;
            while start > last_end && chars[start - 1].is_ascii_digit() {
                start -= 1;
            }
            let mut negative = false;
            if start < i && start > last_end && chars[start - 1] == '-' {
                negative = true;
                start -= 1;
            }

            let sides: u32 = sides_text
                .parse()
                .map_err(|_| FormulaError::InvalidDiceType(format!("d{}", sides_text)))?;
            if !SINGLE_DICE.contains(&sides) && !DOUBLE_DIGIT_DICE.contains(&sides) {
                return Err(FormulaError::InvalidDiceType(format!("d{}", sides)));
            }

            let digits_start = if negative { start + 1 } else { start };
            let count: i64 = if digits_start == i {
                1
            } else {
                let digits: String = chars[digits_start..i].iter().collect();
                let magnitude: i64 = digits
                    .parse()
                    .map_err(|_| FormulaError::InvalidDiceCount(0))?;
                if negative {
                    -magnitude
                } else {
                    magnitude
                }
            };

            // Spans are char offsets == byte offsets here: the scanner only
            // fires on ASCII runs.
            let byte_start: usize = chars[..start].iter().map(|c| c.len_utf8()).sum();
            let byte_len: usize = chars[start..j].iter().map(|c| c.len_utf8()).sum();

            terms.push(DiceNotation {
                count,
                sides,
                span: (byte_start, byte_len),
                explodes,
                vicious,
            });
            last_end = j;
            i = j;
        } else {
            i += 1;
        }
    }

    Ok(terms)
}

/// Split `text` into ordered literal/dice segments.
pub fn split_segments(text: &str) -> Result<Vec<Segment>, FormulaError> {
    let terms = find_dice_terms(text)?;
    let mut segments = Vec::with_capacity(terms.len() * 2 + 1);
    let mut cursor = 0;

    for term in terms {
        let (start, len) = term.span;
        if start > cursor {
            segments.push(Segment::Literal(text[cursor..start].to_string()));
        }
        cursor = start + len;
        segments.push(Segment::Dice(term));
    }
    if cursor < text.len() {
        segments.push(Segment::Literal(text[cursor..].to_string()));
    }

    Ok(segments)
}
