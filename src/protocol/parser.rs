//! Line protocol decoder
//!
//! ```text
//! measurement[,tag=value...] field=value[,field=value...] [timestamp]
//! ```
//!
//! The decoder is a single forward scan. A double quote opens a quoted token
//! only at the start of a measurement, tag value or field value; inside it
//! `\"` does not close the token and every other byte is literal.

use crate::protocol::error::{CodecError, CodecResult};
use crate::protocol::record::Record;
use crate::protocol::value::FieldValue;

/// Byte cursor over one line
struct Scanner<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Scanner<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn peek(&self) -> Option<u8> {
        self.input.as_bytes().get(self.pos).copied()
    }

    fn bump(&mut self) {
        self.pos += 1;
    }

    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn slice_from(&self, start: usize) -> &'a str {
        &self.input[start..self.pos]
    }

    /// Consume a quoted token starting at the current `"`, quotes included
    fn take_quoted(&mut self) -> CodecResult<&'a str> {
        let bytes = self.input.as_bytes();
        let start = self.pos;
        let mut i = start + 1;

        while i < bytes.len() {
            match bytes[i] {
                b'\\' if bytes.get(i + 1) == Some(&b'"') => i += 2,
                b'"' => {
                    self.pos = i + 1;
                    return Ok(self.slice_from(start));
                }
                _ => i += 1,
            }
        }

        Err(CodecError::UnterminatedQuote(self.input[start..].to_string()))
    }

    /// Consume up to, not including, the first byte in `stops`.
    ///
    /// Stops are ASCII so the cursor always lands on a char boundary.
    fn take_until(&mut self, stops: &[u8]) -> &'a str {
        let start = self.pos;
        while let Some(b) = self.peek() {
            if stops.contains(&b) {
                break;
            }
            self.bump();
        }
        self.slice_from(start)
    }

    /// A value token: an optional leading quoted part plus any unquoted tail
    fn take_value(&mut self, stops: &[u8]) -> CodecResult<&'a str> {
        let start = self.pos;
        if self.peek() == Some(b'"') {
            self.take_quoted()?;
        }
        self.take_until(stops);
        Ok(self.slice_from(start))
    }
}

/// Decode one line of line protocol into a [`Record`]
pub fn parse_line(line: &str) -> CodecResult<Record> {
    let line = line.trim();
    let mut scanner = Scanner::new(line);

    // Measurement
    let measurement = if scanner.peek() == Some(b'"') {
        let quoted = scanner.take_quoted()?;
        if !matches!(scanner.peek(), None | Some(b' ') | Some(b',')) {
            return Err(CodecError::InvalidTagFormat(line.to_string()));
        }
        quoted[1..quoted.len() - 1].replace("\\\"", "\"")
    } else {
        scanner.take_until(b", ").to_string()
    };

    // Raw tag pairs, validated once the segment is known to be complete
    let mut raw_tags = Vec::new();
    while scanner.peek() == Some(b',') {
        scanner.bump();
        let start = scanner.pos;
        scanner.take_until(b"=, ");
        if scanner.peek() == Some(b'=') {
            scanner.bump();
            scanner.take_value(b", ")?;
        }
        raw_tags.push(scanner.slice_from(start));
    }

    if scanner.peek() != Some(b' ') {
        return Err(CodecError::InvalidFormat(line.to_string()));
    }
    scanner.bump();

    if measurement.is_empty() {
        return Err(CodecError::EmptyMeasurement(line.to_string()));
    }

    let mut record = Record::new(measurement);
    for pair in raw_tags {
        let (key, value) = parse_tag(pair)?;
        record.push_tag(key, value);
    }

    // Fields
    if matches!(scanner.peek(), None | Some(b' ')) {
        return Err(CodecError::MissingFields(line.to_string()));
    }

    loop {
        let start = scanner.pos;
        let key = scanner.take_until(b"=, ");
        if scanner.peek() != Some(b'=') {
            return Err(CodecError::InvalidFieldFormat(
                scanner.slice_from(start).to_string(),
            ));
        }
        scanner.bump();
        let value = scanner.take_value(b", ")?;

        let key = key.trim();
        if key.is_empty() {
            return Err(CodecError::EmptyFieldKey(scanner.slice_from(start).to_string()));
        }
        record.insert_field(key, FieldValue::classify(value.trim())?);

        if scanner.peek() == Some(b',') {
            scanner.bump();
        } else {
            break;
        }
    }

    // Timestamp, separated by exactly one space
    if scanner.peek() == Some(b' ') {
        scanner.bump();
        let raw = scanner.rest();
        record.timestamp = raw
            .parse::<i64>()
            .map_err(|_| CodecError::InvalidTimestamp(raw.to_string()))?;
    }

    Ok(record)
}

/// Split a `key=value` tag pair. Surrounding quotes are stripped from the
/// value as-is; escapes inside are left untouched.
fn parse_tag(pair: &str) -> CodecResult<(&str, &str)> {
    let (key, value) = pair
        .split_once('=')
        .ok_or_else(|| CodecError::InvalidTagFormat(pair.to_string()))?;

    let key = key.trim();
    let mut value = value.trim();
    if value.len() >= 2 && value.starts_with('"') && value.ends_with('"') {
        value = &value[1..value.len() - 1];
    }

    if key.is_empty() {
        return Err(CodecError::EmptyTagKey(pair.to_string()));
    }
    if value.is_empty() {
        return Err(CodecError::EmptyTagValue(pair.to_string()));
    }

    Ok((key, value))
}
