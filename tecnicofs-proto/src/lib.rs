//! The datagram wire format spoken between `tecnicofs-client` and
//! `tecnicofs-server`.
//!
//! Requests are ASCII, whitespace-separated, and fit in a single datagram
//! (`MAX_INPUT_SIZE` bytes, matching the original `tecnicofs-server.c`
//! `sscanf(command, "%c %s %s", ...)` grammar):
//!
//! ```text
//! c <path> f|d     create a file or directory
//! d <path>         delete
//! l <path>         lookup
//! m <old> <new>    move
//! p <path>         print the tree to a server-local output path
//! ```
//!
//! Responses are a single native-endian `i32`: `>= 0` on success (the
//! resolved inumber for `lookup`, `0` otherwise), negative on error.

use tecnicofs_core::Kind;
use thiserror::Error;

pub use tecnicofs_core::MAX_INPUT_SIZE;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("empty command")]
    Empty,
    #[error("unknown command token {0:?}")]
    UnknownCommand(char),
    #[error("command {0:?} is missing an argument")]
    MissingArgument(char),
    #[error("invalid node type {0:?}, expected 'f' or 'd'")]
    InvalidNodeType(char),
    #[error("command line exceeds {MAX_INPUT_SIZE} bytes")]
    TooLong,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    Create { path: String, kind: Kind },
    Delete { path: String },
    Lookup { path: String },
    Move { from: String, to: String },
    Print { output_path: String },
}

impl Request {
    /// Parses one line of the wire grammar. Mirrors the original server's
    /// `applyCommand`/`sscanf` dispatch, but reports malformed input as an
    /// `Err` instead of exiting the process.
    pub fn parse(line: &str) -> Result<Self, ParseError> {
        if line.len() > MAX_INPUT_SIZE {
            return Err(ParseError::TooLong);
        }
        let mut tokens = line.split_whitespace();
        let token = tokens.next().ok_or(ParseError::Empty)?;
        let mut chars = token.chars();
        let command = chars.next().ok_or(ParseError::Empty)?;
        if chars.next().is_some() {
            return Err(ParseError::UnknownCommand(command));
        }

        match command {
            'c' => {
                let path = tokens.next().ok_or(ParseError::MissingArgument('c'))?;
                let type_tok = tokens.next().ok_or(ParseError::MissingArgument('c'))?;
                let type_char = type_tok.chars().next().ok_or(ParseError::MissingArgument('c'))?;
                let kind = match type_char {
                    'f' => Kind::File,
                    'd' => Kind::Dir,
                    other => return Err(ParseError::InvalidNodeType(other)),
                };
                Ok(Request::Create {
                    path: path.to_owned(),
                    kind,
                })
            }
            'd' => {
                let path = tokens.next().ok_or(ParseError::MissingArgument('d'))?;
                Ok(Request::Delete { path: path.to_owned() })
            }
            'l' => {
                let path = tokens.next().ok_or(ParseError::MissingArgument('l'))?;
                Ok(Request::Lookup { path: path.to_owned() })
            }
            'm' => {
                let from = tokens.next().ok_or(ParseError::MissingArgument('m'))?;
                let to = tokens.next().ok_or(ParseError::MissingArgument('m'))?;
                Ok(Request::Move {
                    from: from.to_owned(),
                    to: to.to_owned(),
                })
            }
            'p' => {
                let path = tokens.next().ok_or(ParseError::MissingArgument('p'))?;
                Ok(Request::Print {
                    output_path: path.to_owned(),
                })
            }
            other => Err(ParseError::UnknownCommand(other)),
        }
    }

    /// Renders the command back to wire form, for the `--script` replay mode
    /// and for client-side logging.
    pub fn to_wire(&self) -> String {
        match self {
            Request::Create { path, kind } => {
                let type_char = match kind {
                    Kind::File => 'f',
                    Kind::Dir => 'd',
                };
                format!("c {path} {type_char}")
            }
            Request::Delete { path } => format!("d {path}"),
            Request::Lookup { path } => format!("l {path}"),
            Request::Move { from, to } => format!("m {from} {to}"),
            Request::Print { output_path } => format!("p {output_path}"),
        }
    }
}

/// Encodes an operation's outcome as the wire response: the native `i32`
/// the client API reads back with one `recvfrom`.
pub fn encode_response(result: i32) -> [u8; 4] {
    result.to_ne_bytes()
}

pub fn decode_response(bytes: [u8; 4]) -> i32 {
    i32::from_ne_bytes(bytes)
}
