//! Trace ingestion: a line-oriented operation file parsed into typed
//! operations before any simulation starts.
//!
//! Format, one operation per line, whitespace-separated:
//!
//! ```text
//! put 1 100
//! get 1
//! compute
//! ```
//!
//! Blank lines and lines starting with `#` are skipped. Anything else that
//! fails to parse is a [`TraceError`] carrying the 1-based line number —
//! a malformed trace is rejected here, loudly, so the replay loop only
//! ever sees valid operations and record indices can never silently
//! misalign.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use thiserror::Error;

use crate::sim::op::Operation;

#[derive(Error, Debug)]
pub enum TraceError {
    #[error("I/O error reading trace: {0}")]
    Io(#[from] std::io::Error),

    #[error("line {line}: unknown operation {op:?}")]
    UnknownOperation { line: usize, op: String },

    #[error("line {line}: {op} is missing an argument")]
    MissingArgument { line: usize, op: &'static str },

    #[error("line {line}: too many arguments for {op}")]
    TrailingArgument { line: usize, op: &'static str },

    #[error("line {line}: invalid integer {token:?}")]
    InvalidInteger { line: usize, token: String },
}

/// Load and parse a trace file.
pub fn load(path: &Path) -> Result<Vec<Operation>, TraceError> {
    let file = File::open(path)?;
    parse(BufReader::new(file))
}

/// Parse a trace from any buffered reader.
pub fn parse(reader: impl BufRead) -> Result<Vec<Operation>, TraceError> {
    let mut ops = Vec::new();

    for (idx, line) in reader.lines().enumerate() {
        let line_no = idx + 1;
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        ops.push(parse_line(trimmed, line_no)?);
    }

    Ok(ops)
}

fn parse_line(line: &str, line_no: usize) -> Result<Operation, TraceError> {
    let mut tokens = line.split_whitespace();
    // Non-empty line, so at least one token exists.
    let op = tokens.next().unwrap_or_default();

    let parsed = match op {
        "get" => {
            let key = next_int(&mut tokens, "get", line_no)?;
            Operation::Get(key)
        }
        "put" => {
            let key = next_int(&mut tokens, "put", line_no)?;
            let value = next_int(&mut tokens, "put", line_no)?;
            Operation::Put(key, value)
        }
        "compute" => Operation::Compute,
        other => {
            return Err(TraceError::UnknownOperation {
                line: line_no,
                op: other.to_string(),
            })
        }
    };

    if tokens.next().is_some() {
        return Err(TraceError::TrailingArgument {
            line: line_no,
            op: match parsed {
                Operation::Get(_) => "get",
                Operation::Put(_, _) => "put",
                Operation::Compute => "compute",
            },
        });
    }

    Ok(parsed)
}

fn next_int<'a>(
    tokens: &mut impl Iterator<Item = &'a str>,
    op: &'static str,
    line_no: usize,
) -> Result<i64, TraceError> {
    let token = tokens.next().ok_or(TraceError::MissingArgument {
        line: line_no,
        op,
    })?;
    token.parse().map_err(|_| TraceError::InvalidInteger {
        line: line_no,
        token: token.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_parse_all_operation_kinds() {
        let input = "put 1 100\nget 1\ncompute\nput -3 7\n";
        let ops = parse(Cursor::new(input)).unwrap();
        assert_eq!(
            ops,
            vec![
                Operation::Put(1, 100),
                Operation::Get(1),
                Operation::Compute,
                Operation::Put(-3, 7),
            ]
        );
    }

    #[test]
    fn test_blank_and_comment_lines_skipped() {
        let input = "\n# warm-up\nget 5\n   \n";
        let ops = parse(Cursor::new(input)).unwrap();
        assert_eq!(ops, vec![Operation::Get(5)]);
    }

    #[test]
    fn test_unknown_operation_carries_line_number() {
        let input = "get 1\ndelete 2\n";
        let err = parse(Cursor::new(input)).unwrap_err();
        match err {
            TraceError::UnknownOperation { line, op } => {
                assert_eq!(line, 2);
                assert_eq!(op, "delete");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_missing_argument() {
        let err = parse(Cursor::new("put 1\n")).unwrap_err();
        assert!(matches!(
            err,
            TraceError::MissingArgument { line: 1, op: "put" }
        ));
    }

    #[test]
    fn test_trailing_argument() {
        let err = parse(Cursor::new("get 1 2\n")).unwrap_err();
        assert!(matches!(
            err,
            TraceError::TrailingArgument { line: 1, op: "get" }
        ));
    }

    #[test]
    fn test_invalid_integer() {
        let err = parse(Cursor::new("get abc\n")).unwrap_err();
        assert!(matches!(err, TraceError::InvalidInteger { line: 1, .. }));
    }
}
