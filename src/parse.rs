//! Record parsing for raw log lines.
//!
//! One non-comment line holds exactly six whitespace-separated integers:
//! `tag timestamp_ns node_id tx_id extra extra2`. Anything else is a
//! [`ParseError`], which is fatal for the whole run.

use thiserror::Error;

use crate::model::LogEvent;
use crate::tags::Tag;

/// First character of a comment line.
pub const COMMENT_MARKER: char = '#';

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ParseError {
    #[error("expected 6 fields, got {got}")]
    FieldCount { got: usize },

    #[error("invalid integer field '{token}'")]
    BadInteger { token: String },

    #[error("unknown tag code {code}")]
    UnknownTag { code: i64 },
}

/// Decode one line. Comment and blank lines yield `Ok(None)`.
pub fn parse_line(line: &str) -> Result<Option<LogEvent>, ParseError> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with(COMMENT_MARKER) {
        return Ok(None);
    }

    let mut fields = [0i64; 6];
    let mut count = 0usize;
    for token in trimmed.split_whitespace() {
        if count < 6 {
            fields[count] = token.parse::<i64>().map_err(|_| ParseError::BadInteger {
                token: token.to_string(),
            })?;
        }
        count += 1;
    }
    if count != 6 {
        return Err(ParseError::FieldCount { got: count });
    }

    let tag = Tag::from_code(fields[0]).ok_or(ParseError::UnknownTag { code: fields[0] })?;
    Ok(Some(LogEvent {
        tag,
        timestamp_ns: fields[1],
        node_id: fields[2],
        tx_id: fields[3],
        extra: fields[4],
        extra2: fields[5],
    }))
}
