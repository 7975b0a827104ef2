//! Line protocol encoder

use crate::protocol::record::Record;
use std::fmt::{self, Write};

/// Encode a record as one line of line protocol, without a trailing newline.
///
/// The measurement and tag values are quoted when they contain a space or
/// comma, with inner quotes escaped as `\"`. Field literals are written
/// exactly as stored. The timestamp is appended only when positive.
///
/// The decoder strips one pair of quotes from a tag value without
/// unescaping, so a quoted tag value containing `"` decodes with the `\"`
/// escapes still in it. Tag values that already start and end with `"` do
/// not round-trip either.
pub fn write_line(record: &Record) -> String {
    let mut out = String::with_capacity(64);
    // Writing to a String cannot fail
    let _ = write_record(&mut out, record);
    out
}

fn write_record<W: Write>(out: &mut W, record: &Record) -> fmt::Result {
    if needs_quotes(&record.measurement) {
        write!(out, "\"{}\"", record.measurement.replace('"', "\\\""))?;
    } else {
        out.write_str(&record.measurement)?;
    }

    for (key, value) in record.tags() {
        if needs_quotes(value) {
            write!(out, ",{}=\"{}\"", key, value.replace('"', "\\\""))?;
        } else {
            write!(out, ",{}={}", key, value)?;
        }
    }

    for (i, (key, value)) in record.fields().iter().enumerate() {
        let sep = if i == 0 { ' ' } else { ',' };
        write!(out, "{}{}={}", sep, key, value.literal())?;
    }

    if record.timestamp > 0 {
        write!(out, " {}", record.timestamp)?;
    }

    Ok(())
}

fn needs_quotes(text: &str) -> bool {
    text.contains(' ') || text.contains(',')
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_record(f, self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::parser::parse_line;
    use crate::protocol::value::FieldValue;

    #[test]
    fn test_encode_basic() {
        let record = Record::new("cpu")
            .with_tag("host", "server1")
            .with_field("value", FieldValue::Float("42".to_string()))
            .with_timestamp(1465839830100400200);

        assert_eq!(
            write_line(&record),
            "cpu,host=server1 value=42 1465839830100400200"
        );
    }

    #[test]
    fn test_encode_keeps_literals() {
        let record = Record::new("cpu")
            .with_field("a", FieldValue::Integer("42i".to_string()))
            .with_field("b", FieldValue::String("\"42\"".to_string()))
            .with_field("c", FieldValue::Float("1.50".to_string()));

        assert_eq!(write_line(&record), "cpu a=42i,b=\"42\",c=1.50");
    }

    #[test]
    fn test_encode_quotes_measurement_and_tags() {
        let record = Record::new("my measurement")
            .with_tag("host", "server 1")
            .with_tag("dc", "a,b")
            .with_field("v", FieldValue::Float("1".to_string()));

        assert_eq!(
            write_line(&record),
            "\"my measurement\",host=\"server 1\",dc=\"a,b\" v=1"
        );
    }

    #[test]
    fn test_encode_escapes_measurement_quotes() {
        let record = Record::new("say \"hi\", ok")
            .with_field("v", FieldValue::Float("1".to_string()));
        assert_eq!(write_line(&record), r#""say \"hi\", ok" v=1"#);
    }

    #[test]
    fn test_encode_escapes_quoted_tag_values() {
        let record = Record::new("cpu")
            .with_tag("host", "say \"hi\" now")
            .with_tag("rack", "a\" b")
            .with_field("v", FieldValue::Float("1".to_string()));

        let line = write_line(&record);
        assert_eq!(line, r#"cpu,host="say \"hi\" now",rack="a\" b" v=1"#);

        // Re-decodes; tag escapes are kept as written
        let decoded = parse_line(&line).unwrap();
        assert_eq!(decoded.tag("host"), Some(r#"say \"hi\" now"#));
        assert_eq!(decoded.tag("rack"), Some(r#"a\" b"#));
        assert_eq!(decoded.field("v"), Some(&FieldValue::Float("1".to_string())));
    }

    #[test]
    fn test_encode_skips_non_positive_timestamp() {
        let record = Record::new("cpu").with_field("v", FieldValue::Float("1".to_string()));
        assert_eq!(write_line(&record.clone().with_timestamp(0)), "cpu v=1");
        assert_eq!(write_line(&record.with_timestamp(-5)), "cpu v=1");
    }

    #[test]
    fn test_display_matches_write_line() {
        let record = Record::new("cpu")
            .with_field("v", FieldValue::Boolean("true".to_string()))
            .with_timestamp(7);
        assert_eq!(record.to_string(), write_line(&record));
    }

    #[test]
    fn test_canonical_lines_are_byte_identical() {
        let lines = [
            "cpu value=42",
            "cpu value=42i",
            "cpu,host=server1,region=us-west value=42,load=0.5 1465839830100400200",
            "cpu,host=\"server 1\" value=42",
            "\"my measurement\",foo=bar value=\"string field\"",
            "weather,location=us-midwest temperature=82,raining=true 1465839830100400200",
        ];

        for line in lines {
            let record = parse_line(line).unwrap();
            assert_eq!(write_line(&record), line);
        }
    }

    #[test]
    fn test_round_trip_of_built_records() {
        let records = vec![
            Record::new("cpu")
                .with_tag("host", "a b")
                .with_field("x", FieldValue::Integer("-3i".to_string()))
                .with_field("msg", FieldValue::String("\"hi, there\"".to_string()))
                .with_timestamp(99),
            Record::new("disk,io")
                .with_tag("dev", "sda,1")
                .with_field("busy", FieldValue::Boolean("false".to_string())),
        ];

        for record in records {
            assert_eq!(parse_line(&write_line(&record)).unwrap(), record);
        }
    }
}
