//! BibTeX document scanner.
//!
//! # Responsibility
//! - Split a document into entries with a citation key and named fields.
//! - Resolve `@string` macros and `#` concatenation.
//!
//! # Invariants
//! - Field names are lower-cased; values have braces removed and whitespace
//!   collapsed.
//! - A broken entry is skipped and counted; only an unterminated construct at
//!   end of input fails the whole document.

use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

const MONTH_MACROS: &[(&str, &str)] = &[
    ("jan", "January"),
    ("feb", "February"),
    ("mar", "March"),
    ("apr", "April"),
    ("may", "May"),
    ("jun", "June"),
    ("jul", "July"),
    ("aug", "August"),
    ("sep", "September"),
    ("oct", "October"),
    ("nov", "November"),
    ("dec", "December"),
];

/// Document-level parse failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BibParseError {
    /// Input ended inside an entry or a delimited value.
    Unterminated { line: usize },
}

impl Display for BibParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unterminated { line } => {
                write!(f, "unterminated bibliography entry starting at line {line}")
            }
        }
    }
}

impl Error for BibParseError {}

/// One parsed entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BibEntry {
    /// Lower-cased entry type (`article`, `inproceedings`, ...).
    pub entry_type: String,
    /// Citation key; may be empty.
    pub key: String,
    /// Lower-cased field name → normalized value.
    pub fields: BTreeMap<String, String>,
}

impl BibEntry {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }
}

/// Entries of one document plus the number of broken entries skipped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BibDocument {
    pub entries: Vec<BibEntry>,
    pub skipped_entries: usize,
}

/// Parses a BibTeX document.
pub fn parse_bibtex(text: &str) -> Result<BibDocument, BibParseError> {
    Scanner::new(text).document()
}

/// Entry-level failure; `Eof` escalates to a document failure.
enum EntryError {
    Malformed,
    Eof,
}

struct Scanner {
    chars: Vec<char>,
    pos: usize,
    macros: BTreeMap<String, String>,
}

impl Scanner {
    fn new(text: &str) -> Self {
        Self {
            chars: text.chars().collect(),
            pos: 0,
            macros: MONTH_MACROS
                .iter()
                .map(|(name, value)| (name.to_string(), value.to_string()))
                .collect(),
        }
    }

    fn document(mut self) -> Result<BibDocument, BibParseError> {
        let mut document = BibDocument::default();

        while self.seek_entry_start() {
            let start = self.pos;
            self.pos += 1;
            match self.entry() {
                Ok(Some(entry)) => document.entries.push(entry),
                Ok(None) => {}
                Err(EntryError::Malformed) => {
                    document.skipped_entries += 1;
                    self.pos = start + 1;
                }
                Err(EntryError::Eof) => {
                    return Err(BibParseError::Unterminated {
                        line: self.line_of(start),
                    });
                }
            }
        }

        Ok(document)
    }

    fn seek_entry_start(&mut self) -> bool {
        while let Some(c) = self.peek() {
            if c == '@' {
                return true;
            }
            self.pos += 1;
        }
        false
    }

    /// Parses after `@`. `Ok(None)` for non-entry blocks and stray `@`.
    fn entry(&mut self) -> Result<Option<BibEntry>, EntryError> {
        let entry_type = self.identifier().to_ascii_lowercase();
        if entry_type.is_empty() {
            return Ok(None);
        }
        self.skip_whitespace();
        // Without an opening delimiter this is a stray `@` in free text.
        let close = match self.peek() {
            Some('{') => '}',
            Some('(') => ')',
            _ => return Ok(None),
        };
        self.pos += 1;

        match entry_type.as_str() {
            "comment" | "preamble" => {
                self.skip_balanced(close)?;
                Ok(None)
            }
            "string" => {
                self.string_macro(close)?;
                Ok(None)
            }
            _ => self.regular_entry(entry_type, close).map(Some),
        }
    }

    fn regular_entry(&mut self, entry_type: String, close: char) -> Result<BibEntry, EntryError> {
        self.skip_whitespace();
        let mut key = String::new();
        loop {
            match self.peek() {
                None => return Err(EntryError::Eof),
                Some(',') => {
                    self.pos += 1;
                    break;
                }
                Some(c) if c == close => break,
                Some('@') => return Err(EntryError::Malformed),
                Some(c) => {
                    key.push(c);
                    self.pos += 1;
                }
            }
        }

        let mut fields = BTreeMap::new();
        loop {
            self.skip_whitespace_and_commas();
            match self.peek() {
                None => return Err(EntryError::Eof),
                Some(c) if c == close => {
                    self.pos += 1;
                    break;
                }
                Some(_) => {}
            }

            let name = self.identifier().to_ascii_lowercase();
            if name.is_empty() {
                return Err(EntryError::Malformed);
            }
            self.skip_whitespace();
            if !self.eat('=') {
                return Err(EntryError::Malformed);
            }
            let value = self.value(close)?;
            fields.entry(name).or_insert(value);
        }

        Ok(BibEntry {
            entry_type,
            key: key.trim().to_string(),
            fields,
        })
    }

    fn string_macro(&mut self, close: char) -> Result<(), EntryError> {
        self.skip_whitespace();
        let name = self.identifier().to_ascii_lowercase();
        self.skip_whitespace();
        if name.is_empty() || !self.eat('=') {
            return Err(EntryError::Malformed);
        }
        let value = self.value(close)?;
        self.skip_whitespace();
        if !self.eat(close) {
            return Err(EntryError::Malformed);
        }
        self.macros.insert(name, value);
        Ok(())
    }

    /// Parses `part (# part)*` and normalizes the result.
    fn value(&mut self, close: char) -> Result<String, EntryError> {
        let mut raw = String::new();
        loop {
            self.skip_whitespace();
            match self.peek() {
                None => return Err(EntryError::Eof),
                Some('{') => {
                    self.pos += 1;
                    raw.push_str(&self.braced()?);
                }
                Some('"') => {
                    self.pos += 1;
                    raw.push_str(&self.quoted()?);
                }
                Some(c) if c.is_ascii_digit() => {
                    while let Some(d) = self.peek().filter(char::is_ascii_digit) {
                        raw.push(d);
                        self.pos += 1;
                    }
                }
                Some(c) if is_identifier_char(c) => {
                    let name = self.identifier().to_ascii_lowercase();
                    let expanded = self.macros.get(&name).cloned().unwrap_or(name);
                    raw.push_str(&expanded);
                }
                Some(c) if c == close || c == ',' => break,
                Some(_) => return Err(EntryError::Malformed),
            }
            self.skip_whitespace();
            if !self.eat('#') {
                break;
            }
        }
        Ok(normalize_value(&raw))
    }

    /// Reads after an opening `{` through its matching `}`.
    fn braced(&mut self) -> Result<String, EntryError> {
        let mut depth = 1usize;
        let mut out = String::new();
        while let Some(c) = self.bump() {
            match c {
                '{' => depth += 1,
                '}' => {
                    depth -= 1;
                    if depth == 0 {
                        return Ok(out);
                    }
                }
                _ => {}
            }
            out.push(c);
        }
        Err(EntryError::Eof)
    }

    /// Reads after an opening `"` through the next `"` outside braces.
    fn quoted(&mut self) -> Result<String, EntryError> {
        let mut depth = 0usize;
        let mut out = String::new();
        while let Some(c) = self.bump() {
            match c {
                '{' => depth += 1,
                '}' => depth = depth.saturating_sub(1),
                '"' if depth == 0 => return Ok(out),
                _ => {}
            }
            out.push(c);
        }
        Err(EntryError::Eof)
    }

    fn skip_balanced(&mut self, close: char) -> Result<(), EntryError> {
        let open = if close == '}' { '{' } else { '(' };
        let mut depth = 1usize;
        while let Some(c) = self.bump() {
            if c == open {
                depth += 1;
            } else if c == close {
                depth -= 1;
                if depth == 0 {
                    return Ok(());
                }
            }
        }
        Err(EntryError::Eof)
    }

    fn identifier(&mut self) -> String {
        let mut out = String::new();
        while let Some(c) = self.peek().filter(|c| is_identifier_char(*c)) {
            out.push(c);
            self.pos += 1;
        }
        out
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
    }

    fn skip_whitespace_and_commas(&mut self) {
        while self.peek().is_some_and(|c| c.is_whitespace() || c == ',') {
            self.pos += 1;
        }
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            return true;
        }
        false
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        Some(c)
    }

    fn line_of(&self, pos: usize) -> usize {
        self.chars[..pos.min(self.chars.len())]
            .iter()
            .filter(|c| **c == '\n')
            .count()
            + 1
    }
}

fn is_identifier_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '-' | ':' | '.' | '+' | '/')
}

fn normalize_value(raw: &str) -> String {
    raw.chars()
        .filter(|c| *c != '{' && *c != '}')
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::{normalize_value, parse_bibtex, BibParseError};

    #[test]
    fn parses_braced_quoted_and_numeric_values() {
        let doc = parse_bibtex(
            r#"@Article{smith2020,
                Title = {Deep {L}earning
                         at Scale},
                journal = "Nature {"}Briefs{"}",
                year = 2020
            }"#,
        )
        .unwrap();

        assert_eq!(doc.entries.len(), 1);
        let entry = &doc.entries[0];
        assert_eq!(entry.entry_type, "article");
        assert_eq!(entry.key, "smith2020");
        assert_eq!(entry.field("title"), Some("Deep Learning at Scale"));
        assert_eq!(entry.field("journal"), Some("Nature \"Briefs\""));
        assert_eq!(entry.field("year"), Some("2020"));
    }

    #[test]
    fn expands_string_macros_and_concatenation() {
        let doc = parse_bibtex(
            r#"@string{proc = "Proceedings of"}
               @inproceedings(k1, booktitle = proc # " ICML", month = mar)"#,
        )
        .unwrap();

        let entry = &doc.entries[0];
        assert_eq!(entry.field("booktitle"), Some("Proceedings of ICML"));
        assert_eq!(entry.field("month"), Some("March"));
    }

    #[test]
    fn skips_comments_and_text_between_entries() {
        let doc = parse_bibtex(
            "free text with mail@example.org\n@comment{ignored {nested}}\n@misc{only,}",
        )
        .unwrap();
        assert_eq!(doc.entries.len(), 1);
        assert_eq!(doc.entries[0].key, "only");
    }

    #[test]
    fn trailing_at_sign_at_end_of_input_is_free_text() {
        let doc = parse_bibtex("@misc{only,}\n% contact: someone@example").unwrap();
        assert_eq!(doc.entries.len(), 1);
        assert_eq!(doc.skipped_entries, 0);
    }

    #[test]
    fn broken_entry_is_skipped_and_siblings_survive() {
        let doc = parse_bibtex("@article{bad, title {missing equals}}\n@article{good, title={Ok}}")
            .unwrap();
        assert_eq!(doc.skipped_entries, 1);
        assert_eq!(doc.entries.len(), 1);
        assert_eq!(doc.entries[0].key, "good");
    }

    #[test]
    fn unterminated_entry_fails_document() {
        let err = parse_bibtex("\n\n@article{k, title = {never closed").unwrap_err();
        assert_eq!(err, BibParseError::Unterminated { line: 3 });
    }

    #[test]
    fn normalize_value_strips_braces_and_collapses_whitespace() {
        assert_eq!(normalize_value("  {A}  b\n\tc "), "A b c");
    }
}
