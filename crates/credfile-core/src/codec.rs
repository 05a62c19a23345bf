//! CSV row codec for credential records.
//!
//! One record per row, four comma-separated fields in the order
//! `name,username,email,password`, each row terminated by `\n`. A field that
//! contains a comma, a double quote or a line break is wrapped in quotes with
//! embedded quotes doubled; every other field is written bare. No header row.
//!
//! Reading is lenient where it costs nothing: `\r\n` terminators are accepted
//! and a quote inside an unquoted field is taken literally.

use std::iter::Peekable;
use std::str::Chars;

use crate::error::CodecError;
use crate::types::Record;

pub const FIELD_COUNT: usize = 4;

const DELIMITER: char = ',';
const QUOTE: char = '"';

// ==============================================================================
// Encoding
// ==============================================================================

/// Encode a record as one complete row, including the trailing `\n`.
pub fn encode(record: &Record) -> String {
    let fields = record.fields();
    let mut row = String::with_capacity(fields.iter().map(|f| f.len() + 3).sum());

    for (i, field) in fields.into_iter().enumerate() {
        if i > 0 {
            row.push(DELIMITER);
        }
        push_field(&mut row, field);
    }
    row.push('\n');
    row
}

fn push_field(row: &mut String, field: &str) {
    if !field.contains([DELIMITER, QUOTE, '\n', '\r']) {
        row.push_str(field);
        return;
    }

    row.push(QUOTE);
    for c in field.chars() {
        if c == QUOTE {
            row.push(QUOTE);
        }
        row.push(c);
    }
    row.push(QUOTE);
}

// ==============================================================================
// Decoding
// ==============================================================================

/// Decode one row into a record. A single trailing `\n` or `\r\n` is ignored.
pub fn decode(row: &str) -> Result<Record, CodecError> {
    let fields = parse_fields(strip_terminator(row))?;
    let [name, username, email, password]: [String; FIELD_COUNT] = fields
        .try_into()
        .map_err(|fields: Vec<String>| CodecError::FieldCount {
            found: fields.len(),
        })?;

    Ok(Record {
        name,
        username,
        email,
        password,
    })
}

/// Decode a row read straight from the file. Rows that are not UTF-8 fail
/// with [`CodecError::InvalidUtf8`].
pub fn decode_bytes(row: &[u8]) -> Result<Record, CodecError> {
    let row = std::str::from_utf8(row).map_err(|_| CodecError::InvalidUtf8)?;
    decode(row)
}

/// Remove exactly one line terminator from the end of `row`, if present.
pub fn strip_terminator(row: &str) -> &str {
    match row.strip_suffix('\n') {
        Some(rest) => rest.strip_suffix('\r').unwrap_or(rest),
        None => row,
    }
}

fn parse_fields(row: &str) -> Result<Vec<String>, CodecError> {
    let mut fields = Vec::with_capacity(FIELD_COUNT);
    let mut chars = row.chars().peekable();

    loop {
        let field = if chars.next_if_eq(&QUOTE).is_some() {
            parse_quoted(&mut chars)?
        } else {
            let mut field = String::new();
            while let Some(c) = chars.next_if(|&c| c != DELIMITER) {
                field.push(c);
            }
            field
        };
        fields.push(field);

        match chars.next() {
            None => return Ok(fields),
            Some(DELIMITER) => {}
            Some(_) => return Err(CodecError::Syntax("unexpected text after closing quote")),
        }
    }
}

/// Parse the body of a quoted field; the opening quote is already consumed.
fn parse_quoted(chars: &mut Peekable<Chars<'_>>) -> Result<String, CodecError> {
    let mut field = String::new();

    while let Some(c) = chars.next() {
        if c != QUOTE {
            field.push(c);
        } else if chars.next_if_eq(&QUOTE).is_some() {
            field.push(QUOTE);
        } else {
            return Ok(field);
        }
    }

    Err(CodecError::Syntax("quoted field is never closed"))
}

// ==============================================================================
// Row Splitting
// ==============================================================================

/// One undecoded row as it appears in the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawRow<'a> {
    /// 1-based physical line where the row starts.
    pub line: usize,
    /// Row bytes including the terminator, if it had one.
    pub bytes: &'a [u8],
}

impl RawRow<'_> {
    /// Row text without its terminator, with invalid UTF-8 replaced.
    pub fn display_text(&self) -> String {
        String::from_utf8_lossy(strip_terminator_bytes(self.bytes)).into_owned()
    }
}

#[derive(Clone, Copy)]
enum Scan {
    FieldStart,
    Unquoted,
    Quoted,
    /// Just saw a quote inside a quoted field: either an escaped quote or
    /// the closing one.
    QuoteInQuoted,
}

/// Split file content into rows. Line breaks inside quoted fields stay in
/// their row. Blank lines are not rows.
///
/// A row spanning several lines that does not decode is cut back to its
/// first line, and splitting resumes on the next one. A stray opening quote
/// therefore costs one malformed row, never the rows after it.
pub fn split_rows(bytes: &[u8]) -> Vec<RawRow<'_>> {
    let mut rows = Vec::new();
    let mut start = 0;
    let mut line = 1;

    while start < bytes.len() {
        let rest = &bytes[start..];
        let candidate = &rest[..row_len(rest)];
        let len = if strip_terminator_bytes(candidate).contains(&b'\n')
            && decode_bytes(candidate).is_err()
        {
            first_line_len(rest)
        } else {
            candidate.len()
        };

        let text = &rest[..len];
        if !strip_terminator_bytes(text).is_empty() {
            rows.push(RawRow { line, bytes: text });
        }
        line += text.iter().filter(|&&b| b == b'\n').count();
        start += len;
    }
    rows
}

/// Length of the quote-aware row at the start of `bytes`, terminator
/// included. Runs to the end of input when a quoted field never closes.
fn row_len(bytes: &[u8]) -> usize {
    let mut state = Scan::FieldStart;

    for (i, &byte) in bytes.iter().enumerate() {
        state = match (state, byte) {
            (Scan::Quoted, b'"') => Scan::QuoteInQuoted,
            (Scan::Quoted, _) => Scan::Quoted,
            (Scan::QuoteInQuoted, b'"') => Scan::Quoted,
            (Scan::FieldStart, b'"') => Scan::Quoted,
            (_, b',') => Scan::FieldStart,
            (_, b'\n') => return i + 1,
            _ => Scan::Unquoted,
        };
    }
    bytes.len()
}

fn first_line_len(bytes: &[u8]) -> usize {
    bytes
        .iter()
        .position(|&b| b == b'\n')
        .map_or(bytes.len(), |i| i + 1)
}

pub(crate) fn strip_terminator_bytes(row: &[u8]) -> &[u8] {
    match row.strip_suffix(b"\n") {
        Some(rest) => rest.strip_suffix(b"\r").unwrap_or(rest),
        None => row,
    }
}
