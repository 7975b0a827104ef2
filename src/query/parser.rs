//! Query Parser
//!
//! Parses the InfluxQL-style query surface into a [`QueryDescriptor`].
//!
//! # Supported Syntax
//!
//! ```text
//! SHOW DATABASES
//! SHOW MEASUREMENTS
//! CREATE DATABASE <name>
//! USE <name>
//! SELECT <selector> FROM <measurement>
//!     [WHERE time >= T1[ms] and time <= T2[ms]]
//!     [GROUP BY time(Nm)]
//! ```
//!
//! `<selector>` is `*`, a field name, or `mean|sum|count|min|max(<field>)`.
//! Keywords are case-insensitive; names keep their case. Surrounding runs of
//! `"` and `\` are stripped from names, which covers both plain quoting and
//! the escaped-quote form some clients send.
//!
//! A SELECT is split into clauses by a whitespace tokenizer that keeps quoted
//! names whole; each clause is then parsed with nom.

use nom::{
    branch::alt,
    bytes::complete::tag_no_case,
    character::complete::{char, digit1, multispace0, multispace1, satisfy},
    combinator::{all_consuming, map_res, not, opt, recognize, value},
    sequence::{pair, preceded, terminated, tuple},
    IResult,
};

use crate::query::ast::*;
use crate::query::error::{QueryError, QueryResult};
use crate::storage::now_nanos;

/// Interpret a query string, defaulting the end of a time range to now
pub fn interpret(input: &str) -> QueryResult<QueryDescriptor> {
    interpret_at(input, now_nanos())
}

/// Interpret a query string with an explicit "now" in nanoseconds
pub fn interpret_at(input: &str, now_ns: i64) -> QueryResult<QueryDescriptor> {
    let query = input.trim();
    if query.is_empty() {
        return Err(QueryError::InvalidQuery("empty query".to_string()));
    }

    if let Ok((_, descriptor)) = parse_show(query) {
        return Ok(descriptor);
    }
    if let Ok((rest, _)) = keyword("create")(query) {
        return parse_create(rest, query);
    }
    if let Ok((rest, _)) = keyword("use")(query) {
        return parse_use(rest, query);
    }
    if let Ok((rest, _)) = keyword("select")(query) {
        return parse_select(rest, query, now_ns).map(QueryDescriptor::SelectPoints);
    }

    Err(QueryError::InvalidQuery(query.to_string()))
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Case-insensitive keyword that must not run into an identifier
fn keyword<'a>(word: &'static str) -> impl FnMut(&'a str) -> IResult<&'a str, &'a str> {
    terminated(tag_no_case(word), not(satisfy(is_ident_char)))
}

/// Strip surrounding runs of `"` and `\` left by client quoting
fn strip_quote_artifacts(name: &str) -> &str {
    name.trim().trim_matches(|c| c == '"' || c == '\\')
}

/// Parse SHOW DATABASES / SHOW MEASUREMENTS
fn parse_show(input: &str) -> IResult<&str, QueryDescriptor> {
    all_consuming(preceded(
        pair(keyword("show"), multispace1),
        terminated(
            alt((
                value(QueryDescriptor::ShowDatabases, keyword("databases")),
                value(QueryDescriptor::ShowMeasurements, keyword("measurements")),
            )),
            multispace0,
        ),
    ))(input)
}

/// First whitespace-separated token after a keyword, quote artifacts removed
fn parse_name(rest: &str) -> Option<&str> {
    rest.split_whitespace()
        .next()
        .map(strip_quote_artifacts)
        .filter(|name| !name.is_empty())
}

/// Parse the tail of CREATE DATABASE <name>
fn parse_create(rest: &str, query: &str) -> QueryResult<QueryDescriptor> {
    let parsed: IResult<&str, &str> = preceded(multispace1, keyword("database"))(rest);
    let (rest, _) = parsed.map_err(|_| QueryError::InvalidSyntax(query.to_string()))?;

    let name = parse_name(rest).ok_or_else(|| QueryError::InvalidSyntax(query.to_string()))?;
    Ok(QueryDescriptor::CreateDatabase {
        name: name.to_string(),
    })
}

/// Parse the tail of USE <name>
fn parse_use(rest: &str, query: &str) -> QueryResult<QueryDescriptor> {
    let database = parse_name(rest).ok_or_else(|| QueryError::InvalidSyntax(query.to_string()))?;
    Ok(QueryDescriptor::Use {
        database: database.to_string(),
    })
}

/// A whitespace-delimited word and its byte span
#[derive(Debug, Clone, Copy)]
struct Word<'a> {
    text: &'a str,
    start: usize,
    end: usize,
}

impl Word<'_> {
    fn is(&self, keyword: &str) -> bool {
        self.text.eq_ignore_ascii_case(keyword)
    }
}

/// Split on ASCII whitespace outside double quotes
fn split_words(input: &str) -> Vec<Word<'_>> {
    let bytes = input.as_bytes();
    let mut words = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i].is_ascii_whitespace() {
            i += 1;
            continue;
        }

        let start = i;
        let mut in_quotes = false;
        while i < bytes.len() {
            match bytes[i] {
                b'"' => in_quotes = !in_quotes,
                b if b.is_ascii_whitespace() && !in_quotes => break,
                _ => {}
            }
            i += 1;
        }

        words.push(Word {
            text: &input[start..i],
            start,
            end: i,
        });
    }

    words
}

/// Parse the tail of a SELECT statement
fn parse_select(body: &str, query: &str, now_ns: i64) -> QueryResult<SelectStatement> {
    let words = split_words(body);

    let from = words
        .iter()
        .position(|w| w.is("from"))
        .ok_or_else(|| QueryError::InvalidQuery(query.to_string()))?;

    let (field, aggregation) = parse_selector(&body[..words[from].start], query)?;

    let where_at = words[from + 1..]
        .iter()
        .position(|w| w.is("where"))
        .map(|i| i + from + 1);
    let group_at = (from + 1..words.len().saturating_sub(1))
        .find(|&i| words[i].is("group") && words[i + 1].is("by"));

    // Measurement runs up to whichever clause comes first
    let measurement_end = [where_at, group_at]
        .into_iter()
        .flatten()
        .min()
        .map(|i| words[i].start)
        .unwrap_or(body.len());
    let measurement = strip_quote_artifacts(&body[words[from].end..measurement_end]);
    if measurement.is_empty() {
        return Err(QueryError::MissingMeasurement(query.to_string()));
    }

    let (start_ns, end_ns) = match where_at {
        Some(i) => {
            let clause_end = group_at
                .filter(|&g| g > i)
                .map(|g| words[g].start)
                .unwrap_or(body.len());
            parse_time_bounds(&body[words[i].end..clause_end], now_ns)?
        }
        None => (0, now_ns),
    };

    let explicit_width = group_at.and_then(|g| parse_group_by_time(&body[words[g + 1].end..]));
    let bucket_width_ns = match (explicit_width, aggregation) {
        (Some(width), _) => Some(width),
        (None, Some(_)) => Some(DEFAULT_BUCKET_WIDTH_NS),
        (None, None) => None,
    };

    Ok(SelectStatement {
        measurement: measurement.to_string(),
        field,
        aggregation,
        start_ns,
        end_ns,
        bucket_width_ns,
    })
}

/// Parse aggregation function name
fn parse_aggregation_func(input: &str) -> IResult<&str, AggregationFunc> {
    alt((
        value(AggregationFunc::Mean, keyword("mean")),
        value(AggregationFunc::Sum, keyword("sum")),
        value(AggregationFunc::Count, keyword("count")),
        value(AggregationFunc::Min, keyword("min")),
        value(AggregationFunc::Max, keyword("max")),
    ))(input)
}

/// Parse `*`, `field` or `agg(field)`
fn parse_selector(
    text: &str,
    query: &str,
) -> QueryResult<(FieldSelector, Option<AggregationFunc>)> {
    let text = text.trim();
    let parsed: IResult<&str, Option<AggregationFunc>> = opt(terminated(
        parse_aggregation_func,
        pair(multispace0, char('(')),
    ))(text);
    let (inner, aggregation) =
        parsed.map_err(|_| QueryError::InvalidSyntax(query.to_string()))?;

    let field_text = match aggregation {
        Some(_) => inner.trim().trim_end_matches(')'),
        None => inner,
    };
    let field = strip_quote_artifacts(field_text);

    if field.is_empty() || field.contains('(') || field.contains(')') {
        return Err(QueryError::InvalidSyntax(query.to_string()));
    }

    let selector = match field {
        "*" => FieldSelector::All,
        name => FieldSelector::Field(name.to_string()),
    };
    Ok((selector, aggregation))
}

/// Find `>=` and `<=` after the first `time` in a WHERE clause
fn parse_time_bounds(clause: &str, now_ns: i64) -> QueryResult<(i64, i64)> {
    let lower = clause.to_ascii_lowercase();
    let Some(idx) = lower.find("time") else {
        return Ok((0, now_ns));
    };

    let tail = &clause[idx + 4..];
    let tail_lower = &lower[idx + 4..];

    let start = match tail_lower.find(">=") {
        Some(i) => parse_time_literal(&tail[i + 2..])?,
        None => 0,
    };
    let end = match tail_lower.find("<=") {
        Some(i) => parse_time_literal(&tail[i + 2..])?,
        None => now_ns,
    };

    Ok((start, end))
}

/// Parse the literal following a comparison: up to the next whitespace or
/// `and`, an integer with an optional `ms` suffix
fn parse_time_literal(text: &str) -> QueryResult<i64> {
    let literal = text.split_whitespace().next().unwrap_or("");
    let literal = match literal.to_ascii_lowercase().find("and") {
        Some(i) => &literal[..i],
        None => literal,
    };

    let parsed: IResult<&str, (&str, Option<&str>)> = all_consuming(pair(
        recognize(pair(opt(char('-')), digit1)),
        opt(tag_no_case("ms")),
    ))(literal);
    let (_, (digits, unit)) =
        parsed.map_err(|_| QueryError::InvalidTimeFormat(literal.to_string()))?;

    let number: i64 = digits
        .parse()
        .map_err(|_| QueryError::InvalidTimeFormat(literal.to_string()))?;

    match unit {
        Some(_) => number
            .checked_mul(NANOS_PER_MILLI)
            .ok_or_else(|| QueryError::InvalidTimeFormat(literal.to_string())),
        None => Ok(number),
    }
}

/// Parse `time(Nm)` at the start of a GROUP BY clause.
///
/// Anything else, including a zero or overflowing width, yields `None` so
/// the caller falls back to the default width.
fn parse_group_by_time(clause: &str) -> Option<i64> {
    let parsed: IResult<&str, i64> = preceded(
        tuple((keyword("time"), multispace0, char('('), multispace0)),
        terminated(
            map_res(digit1, |s: &str| s.parse::<i64>()),
            tuple((multispace0, tag_no_case("m"), multispace0, char(')'))),
        ),
    )(clause.trim_start());

    parsed
        .ok()
        .map(|(_, minutes)| minutes)
        .filter(|&minutes| minutes > 0)
        .and_then(|minutes| minutes.checked_mul(NANOS_PER_MINUTE))
}
