//! Arithmetic evaluation of the fully substituted expression
//!
//! By the time text reaches this module every dice term has been replaced
//! by its kept sum, so the only legal tokens are integers, the four binary
//! operators, and parentheses. A hand-written recursive-descent parser over
//! that closed set is the last line of defense after the sanitizer: anything
//! else fails closed.
//!
//! Arithmetic runs in f64 and the result is floored once at the end, so
//! `7 / 2 * 2` evaluates to 7, not 6.

use super::FormulaError;

/// Evaluate a pure arithmetic expression to a floored integer.
pub fn evaluate(text: &str) -> Result<i64, FormulaError> {
    for c in text.chars() {
        let allowed = c.is_ascii_digit() || c.is_whitespace() || "+-*/()".contains(c);
        if !allowed {
            return Err(FormulaError::InvalidExpressionCharacters(text.to_string()));
        }
    }

    let mut parser = Parser {
        chars: text.chars().collect(),
        pos: 0,
    };
    parser.skip_whitespace();
    let value = parser.expression()?;
    parser.skip_whitespace();
    if parser.pos < parser.chars.len() {
        return Err(FormulaError::MalformedExpression(text.to_string()));
    }

    if !value.is_finite() {
        return Err(FormulaError::NonFiniteResult(text.to_string()));
    }
    Ok(value.floor() as i64)
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
}

impl Parser {
    fn expression(&mut self) -> Result<f64, FormulaError> {
        let mut value = self.term()?;
        loop {
            self.skip_whitespace();
            match self.peek() {
                Some('+') => {
                    self.pos += 1;
                    value += self.term()?;
                }
                Some('-') => {
                    self.pos += 1;
                    value -= self.term()?;
                }
                _ => return Ok(value),
            }
        }
    }

    fn term(&mut self) -> Result<f64, FormulaError> {
        let mut value = self.unary()?;
        loop {
            self.skip_whitespace();
            match self.peek() {
                Some('*') => {
                    self.pos += 1;
                    value *= self.unary()?;
                }
                Some('/') => {
                    self.pos += 1;
                    value /= self.unary()?;
                }
                _ => return Ok(value),
            }
        }
    }

    fn unary(&mut self) -> Result<f64, FormulaError> {
        self.skip_whitespace();
        if self.peek() == Some('-') {
            self.pos += 1;
            return Ok(-self.unary()?);
        }
        self.primary()
    }

    fn primary(&mut self) -> Result<f64, FormulaError> {
        self.skip_whitespace();
        match self.peek() {
            Some('(') => {
                self.pos += 1;
                let value = self.expression()?;
                self.skip_whitespace();
                if self.peek() != Some(')') {
                    return Err(self.malformed());
                }
                self.pos += 1;
                Ok(value)
            }
            Some(c) if c.is_ascii_digit() => self.number(),
            _ => Err(self.malformed()),
        }
    }

    fn number(&mut self) -> Result<f64, FormulaError> {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
            self.pos += 1;
        }
        let digits: String = self.chars[start..self.pos].iter().collect();
        digits.parse::<f64>().map_err(|_| self.malformed())
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.pos += 1;
        }
    }

    fn malformed(&self) -> FormulaError {
        FormulaError::MalformedExpression(self.chars.iter().collect())
    }
}
