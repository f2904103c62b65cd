//! One message per line: the name, then each parameter type, separated by
//! `|`. Inside a field `\`, `|`, newline and carriage return are written
//! `\\`, `\|`, `\n` and `\r`.
//! Stores written before escaping existed contain no backslashes and decode
//! the same way.

use crate::signature::{MessageSignature, ParameterSignature, Registry};
use nom::{
    IResult,
    branch::alt,
    character::complete::{char, none_of},
    combinator::{all_consuming, value},
    multi::many0,
    sequence::preceded,
};

pub const DELIMITER: char = '|';
const ESCAPE: char = '\\';

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecordError {
    /// 1-based.
    pub line: usize,
    pub reason: String,
}

fn escaped_char(input: &str) -> IResult<&str, char> {
    preceded(
        char(ESCAPE),
        alt((
            value(ESCAPE, char(ESCAPE)),
            value(DELIMITER, char(DELIMITER)),
            value('\n', char('n')),
            value('\r', char('r')),
        )),
    )(input)
}

fn field(input: &str) -> IResult<&str, String> {
    let (rest, chars) = many0(alt((none_of("\\|\n"), escaped_char)))(input)?;
    Ok((rest, chars.into_iter().collect()))
}

fn record(input: &str) -> IResult<&str, (String, Vec<String>)> {
    let (rest, name) = field(input)?;
    let (rest, params) = many0(preceded(char(DELIMITER), field))(rest)?;
    Ok((rest, (name, params)))
}

pub fn decode_record(line: &str) -> Result<MessageSignature, String> {
    let (_, (name, params)) = all_consuming(record)(line).map_err(|err| match err {
        nom::Err::Error(e) | nom::Err::Failure(e) => {
            format!("unexpected input at `{}`", truncate(e.input))
        }
        nom::Err::Incomplete(_) => "incomplete record".to_string(),
    })?;
    if name.is_empty() {
        return Err("empty message name".into());
    }
    Ok(MessageSignature::new(name, ParameterSignature::new(params)))
}

fn truncate(input: &str) -> &str {
    match input.char_indices().nth(16) {
        Some((idx, _)) => &input[..idx],
        None => input,
    }
}

/// Empty lines are skipped. The first bad record aborts decoding.
pub fn decode(text: &str) -> Result<Vec<MessageSignature>, RecordError> {
    text.lines()
        .enumerate()
        .filter(|(_, line)| !line.is_empty())
        .map(|(idx, line)| {
            decode_record(line).map_err(|reason| RecordError {
                line: idx + 1,
                reason,
            })
        })
        .collect()
}

pub fn escape_field(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    for c in field.chars() {
        match c {
            ESCAPE => out.push_str("\\\\"),
            DELIMITER => out.push_str("\\|"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            other => out.push(other),
        }
    }
    out
}

pub fn encode_record(message: &MessageSignature) -> String {
    let mut line = escape_field(&message.name);
    for param in &message.params {
        line.push(DELIMITER);
        line.push_str(&escape_field(param));
    }
    line
}

pub fn encode(registry: &Registry) -> String {
    registry
        .iter()
        .map(|message| format!("{}\n", encode_record(message)))
        .collect()
}
