//! Input sanitization for dice formulas
//!
//! Normalizes raw formula text and rejects dangerous constructs before
//! anything downstream looks at it. Variable names are uppercased while
//! dice notation keeps its lowercase `d` and postfix letters, which is
//! how the substituter later tells the two apart.

use super::FormulaError;

/// Characters that never appear in a legitimate formula. Each is reported
/// back to the caller as the offending pattern.
const FORBIDDEN_CHARS: [char; 9] = ['[', ']', '{', '}', ';', ':', '=', '.', '`'];

/// Normalize and validate raw formula text.
///
/// - Collapses runs of whitespace to single spaces and trims the ends.
/// - Uppercases letters so variable tokens are canonical, then re-lowercases
///   the `d` of each dice term and its `!`/`v` postfixes (`2D6!V` → `2d6!v`).
/// - Scans for a blacklist of dangerous shapes: function-call syntax
///   (identifier directly followed by `(`), brackets, braces, statement
///   separators, assignment, member access.
///
/// This is a pre-filter; the expression evaluator enforces its own closed
/// grammar as the final boundary.
pub fn sanitize(raw: &str) -> Result<String, FormulaError> {
    let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");

    let mut chars: Vec<char> = collapsed
        .chars()
        .map(|c| c.to_ascii_uppercase())
        .collect();
    restore_dice_notation(&mut chars);

    check_blacklist(&chars)?;

    Ok(chars.into_iter().collect())
}

/// Re-lowercase dice-notation letters in a fully uppercased buffer.
///
/// A dice term is a `D` directly followed by a digit, optionally followed by
/// `!`/`V` postfix flags. Everything else stays uppercase.
fn restore_dice_notation(chars: &mut [char]) {
    let mut i = 0;
    while i < chars.len() {
        if chars[i] == 'D' && i + 1 < chars.len() && chars[i + 1].is_ascii_digit() {
            chars[i] = 'd';
            i += 1;
            while i < chars.len() && chars[i].is_ascii_digit() {
                i += 1;
            }
            while i < chars.len() && (chars[i] == '!' || chars[i] == 'V') {
                if chars[i] == 'V' {
                    chars[i] = 'v';
                }
                i += 1;
            }
        } else {
            i += 1;
        }
    }
}

fn check_blacklist(chars: &[char]) -> Result<(), FormulaError> {
    for (i, &c) in chars.iter().enumerate() {
        if FORBIDDEN_CHARS.contains(&c) {
            return Err(FormulaError::UnsafeInput {
                pattern: c.to_string(),
            });
        }
        // Identifier directly followed by '(' looks like a function call.
        if c == '(' && i > 0 {
            let prev = chars[i - 1];
            if prev.is_alphanumeric() || prev == '_' {
                let start = chars[..i]
                    .iter()
                    .rposition(|p| !(p.is_alphanumeric() || *p == '_'))
                    .map(|p| p + 1)
                    .unwrap_or(0);
                let mut pattern: String = chars[start..i].iter().collect();
                pattern.push('(');
                return Err(FormulaError::UnsafeInput { pattern });
            }
        }
    }
    Ok(())
}
