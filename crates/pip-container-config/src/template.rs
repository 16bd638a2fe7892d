//! Placeholder substitution for raw configuration text, built on `nom`.
//!
//! Documents may contain `{{ NAME }}` placeholders that are replaced with
//! values from a parameter set before the document is parsed. Unknown names
//! render as empty text. Braces that do not form a valid placeholder are kept
//! literally.

use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::{tag, take_until1, take_while1},
    character::complete::multispace0,
    combinator::{map, rest, verify},
    sequence::delimited,
};
use pip_container_common::config::ConfigParams;

/// A piece of template text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
    /// Literal text copied as-is.
    Text(&'a str),
    /// Name of a parameter to substitute.
    Placeholder(&'a str),
}

const fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.')
}

/// Parses `{{ NAME }}`.
fn placeholder(input: &str) -> IResult<&str, Segment<'_>> {
    map(
        delimited(
            tag("{{"),
            delimited(multispace0, take_while1(is_name_char), multispace0),
            tag("}}"),
        ),
        Segment::Placeholder,
    )
    .parse(input)
}

/// Parses literal text up to the next `{{`, a stray `{{`, or the remainder.
fn text(input: &str) -> IResult<&str, Segment<'_>> {
    alt((
        map(take_until1("{{"), Segment::Text),
        map(tag("{{"), Segment::Text),
        map(verify(rest, |s: &str| !s.is_empty()), Segment::Text),
    ))
    .parse(input)
}

/// Splits a template into literal and placeholder segments.
#[must_use]
pub fn segments(input: &str) -> Vec<Segment<'_>> {
    let mut result = Vec::new();
    let mut remaining = input;
    while !remaining.is_empty() {
        match alt((placeholder, text)).parse(remaining) {
            Ok((rest, segment)) => {
                result.push(segment);
                remaining = rest;
            }
            Err(_) => {
                result.push(Segment::Text(remaining));
                break;
            }
        }
    }
    result
}

/// Replaces every placeholder in `input` with its value from `parameters`.
#[must_use]
pub fn parameterize(input: &str, parameters: &ConfigParams) -> String {
    let mut output = String::with_capacity(input.len());
    let mut missing = 0_usize;
    for segment in segments(input) {
        match segment {
            Segment::Text(text) => output.push_str(text),
            Segment::Placeholder(name) => match parameters.get(name) {
                Some(value) => output.push_str(value),
                None => missing += 1,
            },
        }
    }
    if missing > 0 {
        tracing::debug!(missing, "template placeholders without a value rendered empty");
    }
    output
}
