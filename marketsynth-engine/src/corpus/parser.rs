//! Object-literal parser for corpus files.
//!
//! Accepts the subset of literal syntax the corpus uses: bare or quoted keys,
//! single- or double-quoted strings with escapes, numbers, booleans, `null`,
//! nested objects and arrays, line and block comments, and trailing commas.
//! Values are produced as `serde_json::Value` with key order preserved.
use regex::Regex;
use serde_json::{Map, Number, Value};
use std::sync::OnceLock;

use super::CorpusError;

fn declaration_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| {
            Regex::new(r"export\s+const\s+([A-Za-z_$][A-Za-z0-9_$]*)\s*(?::[^=]*)?=\s*").ok()
        })
        .as_ref()
}

/// Location and name of the `export const NAME = ` declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Declaration {
    pub binding: String,
    /// Byte offset just past the `=` and any following whitespace.
    pub body_start: usize,
}

pub(crate) fn find_declaration(text: &str) -> Result<Declaration, CorpusError> {
    let pattern = declaration_pattern().ok_or(CorpusError::MissingDeclaration)?;
    let captures = pattern
        .captures(text)
        .ok_or(CorpusError::MissingDeclaration)?;
    let whole = captures.get(0).ok_or(CorpusError::MissingDeclaration)?;
    let binding = captures
        .get(1)
        .map(|m| m.as_str().to_string())
        .unwrap_or_default();
    Ok(Declaration {
        binding,
        body_start: whole.end(),
    })
}

/// Parse a complete literal value from `text`, ignoring surrounding whitespace.
///
/// # Errors
///
/// Returns `CorpusError::Syntax` on malformed input or trailing content.
pub fn parse_literal(text: &str) -> Result<Value, CorpusError> {
    let mut parser = Parser::new(text, 0);
    let value = parser.value()?;
    parser.skip_trivia()?;
    if parser.pos < parser.bytes.len() {
        return Err(parser.error("unexpected trailing content"));
    }
    Ok(value)
}

/// Parse the object starting at `offset` as ordered members, keeping repeated keys.
///
/// Returns the members with the offset just past the closing brace.
pub(crate) fn parse_entries_at(
    text: &str,
    offset: usize,
) -> Result<(Vec<(String, Value)>, usize), CorpusError> {
    let mut parser = Parser::new(text, offset);
    parser.skip_trivia()?;
    if parser.peek() != Some(b'{') {
        return Err(CorpusError::NotAnObject);
    }
    let entries = parser.entries()?;
    Ok((entries, parser.pos))
}

struct Parser<'a> {
    text: &'a str,
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Parser<'a> {
    const fn new(text: &'a str, pos: usize) -> Self {
        Self {
            text,
            bytes: text.as_bytes(),
            pos,
        }
    }

    fn error(&self, message: impl Into<String>) -> CorpusError {
        let consumed = &self.bytes[..self.pos.min(self.bytes.len())];
        let line = consumed.iter().filter(|b| **b == b'\n').count() + 1;
        let column = consumed
            .iter()
            .rev()
            .take_while(|b| **b != b'\n')
            .count()
            + 1;
        CorpusError::Syntax {
            line,
            column,
            message: message.into(),
        }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn skip_trivia(&mut self) -> Result<(), CorpusError> {
        loop {
            match self.peek() {
                Some(b) if b.is_ascii_whitespace() => self.pos += 1,
                Some(b'/') => match self.bytes.get(self.pos + 1) {
                    Some(b'/') => {
                        while let Some(b) = self.peek() {
                            if b == b'\n' {
                                break;
                            }
                            self.pos += 1;
                        }
                    }
                    Some(b'*') => {
                        let text = self.text;
                        let rest = &text[self.pos + 2..];
                        let close = rest
                            .find("*/")
                            .ok_or_else(|| self.error("unterminated block comment"))?;
                        self.pos += 2 + close + 2;
                    }
                    _ => return Ok(()),
                },
                _ => return Ok(()),
            }
        }
    }

    fn expect(&mut self, byte: u8) -> Result<(), CorpusError> {
        self.skip_trivia()?;
        if self.peek() == Some(byte) {
            self.pos += 1;
            Ok(())
        } else {
            Err(self.error(format!("expected '{}'", char::from(byte))))
        }
    }

    fn value(&mut self) -> Result<Value, CorpusError> {
        self.skip_trivia()?;
        match self.peek() {
            Some(b'{') => self.object(),
            Some(b'[') => self.array(),
            Some(quote @ (b'\'' | b'"')) => self.string(quote).map(Value::String),
            Some(b'-' | b'+' | b'.' | b'0'..=b'9') => self.number(),
            Some(b) if is_ident_start(b) => {
                let word = self.identifier();
                match word {
                    "true" => Ok(Value::Bool(true)),
                    "false" => Ok(Value::Bool(false)),
                    "null" | "undefined" => Ok(Value::Null),
                    other => Err(self.error(format!("unexpected identifier `{other}`"))),
                }
            }
            Some(_) => Err(self.error("unexpected character")),
            None => Err(self.error("unexpected end of input")),
        }
    }

    fn object(&mut self) -> Result<Value, CorpusError> {
        let fields: Map<String, Value> = self.entries()?.into_iter().collect();
        Ok(Value::Object(fields))
    }

    /// Object members in source order; repeated keys are all kept.
    fn entries(&mut self) -> Result<Vec<(String, Value)>, CorpusError> {
        self.expect(b'{')?;
        let mut entries = Vec::new();
        loop {
            self.skip_trivia()?;
            if self.peek() == Some(b'}') {
                self.pos += 1;
                return Ok(entries);
            }
            let key = self.key()?;
            self.expect(b':')?;
            let value = self.value()?;
            entries.push((key, value));
            self.skip_trivia()?;
            match self.peek() {
                Some(b',') => self.pos += 1,
                Some(b'}') => {}
                _ => return Err(self.error("expected ',' or '}'")),
            }
        }
    }

    fn array(&mut self) -> Result<Value, CorpusError> {
        self.expect(b'[')?;
        let mut items = Vec::new();
        loop {
            self.skip_trivia()?;
            if self.peek() == Some(b']') {
                self.pos += 1;
                return Ok(Value::Array(items));
            }
            items.push(self.value()?);
            self.skip_trivia()?;
            match self.peek() {
                Some(b',') => self.pos += 1,
                Some(b']') => {}
                _ => return Err(self.error("expected ',' or ']'")),
            }
        }
    }

    fn key(&mut self) -> Result<String, CorpusError> {
        match self.peek() {
            Some(quote @ (b'\'' | b'"')) => self.string(quote),
            Some(b) if is_ident_start(b) => Ok(self.identifier().to_string()),
            Some(b'0'..=b'9') => {
                let start = self.pos;
                while self.peek().is_some_and(|b| b.is_ascii_digit()) {
                    self.pos += 1;
                }
                Ok(self.text[start..self.pos].to_string())
            }
            _ => Err(self.error("expected a property key")),
        }
    }

    fn identifier(&mut self) -> &'a str {
        let start = self.pos;
        while self.peek().is_some_and(is_ident_continue) {
            self.pos += 1;
        }
        &self.text[start..self.pos]
    }

    fn string(&mut self, quote: u8) -> Result<String, CorpusError> {
        self.pos += 1;
        let mut out = String::new();
        let text = self.text;
        loop {
            let rest = &text[self.pos..];
            let stop = rest
                .find(|c: char| c == char::from(quote) || c == '\\' || c == '\n')
                .ok_or_else(|| self.error("unterminated string"))?;
            out.push_str(&rest[..stop]);
            self.pos += stop;
            match self.peek() {
                Some(b'\\') => {
                    self.pos += 1;
                    self.escape(&mut out)?;
                }
                Some(b'\n') => return Err(self.error("newline in string")),
                _ => {
                    self.pos += 1;
                    return Ok(out);
                }
            }
        }
    }

    fn escape(&mut self, out: &mut String) -> Result<(), CorpusError> {
        let Some(escaped) = self.text[self.pos..].chars().next() else {
            return Err(self.error("unterminated escape"));
        };
        self.pos += escaped.len_utf8();
        match escaped {
            'n' => out.push('\n'),
            'r' => out.push('\r'),
            't' => out.push('\t'),
            'b' => out.push('\u{8}'),
            'f' => out.push('\u{c}'),
            '0' => out.push('\0'),
            'u' => {
                let digits = self
                    .text
                    .get(self.pos..self.pos + 4)
                    .ok_or_else(|| self.error("truncated unicode escape"))?;
                let code = u32::from_str_radix(digits, 16)
                    .map_err(|_| self.error("invalid unicode escape"))?;
                out.push(char::from_u32(code).unwrap_or(char::REPLACEMENT_CHARACTER));
                self.pos += 4;
            }
            '\n' => {}
            other => out.push(other),
        }
        Ok(())
    }

    fn number(&mut self) -> Result<Value, CorpusError> {
        let start = self.pos;
        if matches!(self.peek(), Some(b'-' | b'+')) {
            self.pos += 1;
        }
        let mut fractional = false;
        while let Some(b) = self.peek() {
            match b {
                b'0'..=b'9' | b'_' => {}
                b'.' | b'e' | b'E' => fractional = true,
                b'-' | b'+'
                    if matches!(
                        self.pos.checked_sub(1).and_then(|i| self.bytes.get(i)),
                        Some(b'e' | b'E')
                    ) => {}
                _ => break,
            }
            self.pos += 1;
        }
        let literal: String = self.text[start..self.pos]
            .chars()
            .filter(|c| *c != '_' && *c != '+')
            .collect();
        if !fractional {
            if let Ok(integer) = literal.parse::<i64>() {
                return Ok(Value::from(integer));
            }
            if let Ok(integer) = literal.parse::<u64>() {
                return Ok(Value::from(integer));
            }
        }
        literal
            .parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map(Value::Number)
            .ok_or_else(|| self.error(format!("invalid number `{literal}`")))
    }
}

const fn is_ident_start(byte: u8) -> bool {
    byte.is_ascii_alphabetic() || byte == b'_' || byte == b'$'
}

const fn is_ident_continue(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || byte == b'_' || byte == b'$'
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_bare_keys_and_mixed_quotes() {
        let value = parse_literal(r#"{ id: 'wv-oak-hill', "name": "Oak Hill", rpr: 0.183, dsi: true }"#)
            .unwrap();
        assert_eq!(
            value,
            json!({ "id": "wv-oak-hill", "name": "Oak Hill", "rpr": 0.183, "dsi": true })
        );
    }

    #[test]
    fn keeps_integer_and_float_distinction() {
        let value = parse_literal("[5.0, 5, -3, 1e3]").unwrap();
        assert!(value[0].is_f64());
        assert!(value[1].is_i64());
        assert_eq!(value[2], json!(-3));
        assert!((value[3].as_f64().unwrap() - 1_000.0).abs() < f64::EPSILON);
    }

    #[test]
    fn decodes_escapes() {
        let value = parse_literal(r"['Coeur d\'Alene', 'back\\slash', 'tab\there', 'é']").unwrap();
        assert_eq!(value, json!(["Coeur d'Alene", "back\\slash", "tab\there", "é"]));
    }

    #[test]
    fn skips_comments_and_trailing_commas() {
        let text = "{\n  // leading comment\n  WV: [ /* inline */ { id: 'a', }, ],\n}";
        assert_eq!(parse_literal(text).unwrap(), json!({ "WV": [{ "id": "a" }] }));
    }

    #[test]
    fn entries_keep_repeated_keys_in_order() {
        let text = "{ WV: [1], FL: [], 'WV': [2] } ;";
        let (entries, end) = parse_entries_at(text, 0).unwrap();
        let keys: Vec<&str> = entries.iter().map(|(key, _)| key.as_str()).collect();
        assert_eq!(keys, ["WV", "FL", "WV"]);
        assert_eq!(entries[2].1, json!([2]));
        assert_eq!(&text[end..], " ;");
        assert!(matches!(
            parse_entries_at("[1]", 0),
            Err(CorpusError::NotAnObject)
        ));
    }

    #[test]
    fn preserves_key_order() {
        let value = parse_literal("{ zeta: 1, alpha: 2, mid: 3 }").unwrap();
        let keys: Vec<&str> = value.as_object().unwrap().keys().map(String::as_str).collect();
        assert_eq!(keys, ["zeta", "alpha", "mid"]);
    }

    #[test]
    fn reports_position_of_syntax_errors() {
        let err = parse_literal("{\n  id: 'open\n}").unwrap_err();
        assert!(matches!(err, CorpusError::Syntax { line: 2, .. }), "{err}");
        assert!(parse_literal("{ id: 1 } extra").is_err());
        assert!(parse_literal("{ id: nope }").is_err());
    }

    #[test]
    fn finds_typed_declarations() {
        let text = "import x from 'y';\nexport const cityData: Record<string, CityData[]> = {\n};\n";
        let declaration = find_declaration(text).unwrap();
        assert_eq!(declaration.binding, "cityData");
        assert_eq!(&text[declaration.body_start..declaration.body_start + 1], "{");
        assert!(matches!(
            find_declaration("const nothing = {};"),
            Err(CorpusError::MissingDeclaration)
        ));
    }
}
