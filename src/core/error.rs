//! Error types for compilation and evaluation.

use std::fmt;
use std::io;

use crate::core::errno::Errno;
use crate::core::value::Type;

/// Source location of a parser error.
///
/// `lineno` and `column` are 1-based; `offset` is the 0-based byte offset of
/// the start of the erroneous region and `len` its length in bytes (`1` when
/// no better region is known).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    /// 1-based line number.
    pub lineno: usize,
    /// 1-based column.
    pub column: usize,
    /// 0-based byte offset into the source.
    pub offset: usize,
    /// Length of the erroneous region in bytes.
    pub len: usize,
}

/// What exactly the parser rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ParseErrorKind {
    /// Expected `)` but found something else or the end of input.
    ExpectedCloseParen,
    /// Reference to a name that is neither an argument nor declared.
    UndefinedReference {
        /// The unresolved name.
        name: String,
    },
    /// The name resolves to a constant or argument, but was called.
    NotAFunction {
        /// The offending name.
        name: String,
    },
    /// The name resolves to a function, but was used as a value.
    NotAVariable {
        /// The offending name.
        name: String,
    },
    /// A function was called with the wrong number of arguments.
    IllegalNumberOfArguments {
        /// Arity of the declared signature.
        expected: usize,
        /// Number of arguments actually supplied.
        got: usize,
    },
    /// Expected a number.
    ExpectedNumber,
    /// Expected an identifier.
    ExpectedIdentifier,
    /// Expected `:` after the then-branch of `?:`.
    ExpectedColon,
    /// Sub-expression has the wrong type for its position.
    TypeError {
        /// The type required here.
        expected: Type,
        /// The type the sub-expression actually has.
        got: Type,
    },
    /// Input continues after a complete expression.
    TrailingGarbage,
}

impl ParseErrorKind {
    fn message(&self) -> String {
        match self {
            ParseErrorKind::ExpectedCloseParen => "expected ')'".to_string(),
            ParseErrorKind::UndefinedReference { name } => {
                format!("undefined reference: '{name}'")
            }
            ParseErrorKind::NotAFunction { name } => {
                format!("reference is not a function: '{name}'")
            }
            ParseErrorKind::NotAVariable { name } => {
                format!("reference is not an argument or constant: '{name}'")
            }
            ParseErrorKind::IllegalNumberOfArguments { expected, got } => {
                format!("illegal number of arguments: expected {expected} but got {got}")
            }
            ParseErrorKind::ExpectedNumber => "expected a number".to_string(),
            ParseErrorKind::ExpectedIdentifier => "expected an identifier".to_string(),
            ParseErrorKind::ExpectedColon => "expected ':'".to_string(),
            ParseErrorKind::TypeError { expected, got } => {
                format!("expected a {expected} expression but got a {got} expression")
            }
            ParseErrorKind::TrailingGarbage => "trailing garbage".to_string(),
        }
    }
}

/// Everything that can go wrong while defining names, compiling or
/// evaluating an expression function.
#[derive(Debug)]
#[non_exhaustive]
pub enum Error {
    /// Writing disassembly or a log message failed.
    Io(io::Error),
    /// A math routine reported a domain or range error.
    Math {
        /// Which kind of math error.
        errno: Errno,
    },
    /// A host callback left an error number that is not a math error.
    Host {
        /// The raw error number.
        errno: i32,
    },
    /// The name is not a valid identifier or is reserved.
    IllegalName {
        /// The rejected name.
        name: String,
    },
    /// An argument name occurs more than once.
    DuplicateArgument {
        /// The repeated name.
        name: String,
    },
    /// A declaration with this name already exists.
    NameExists {
        /// The conflicting name.
        name: String,
    },
    /// No declaration with this name exists.
    NoSuchName {
        /// The unknown name.
        name: String,
    },
    /// More arguments than `REGS_MAX`.
    TooManyArguments,
    /// The expression needs more registers than `REGS_MAX`.
    ExceedsMaxFrameSize,
    /// An internal invariant was violated (e.g. an unknown opcode).
    Internal,
    /// The parser rejected the source.
    Parse {
        /// What was rejected.
        kind: ParseErrorKind,
        /// Where in the source.
        position: Position,
        /// The source line containing the error, for diagnostics.
        line: String,
    },
}

impl Error {
    pub(crate) fn from_errno(errno: Errno) -> Self {
        match errno {
            Errno::Domain | Errno::Range => Error::Math { errno },
            Errno::Other(raw) => Error::Host { errno: raw },
        }
    }

    /// Source position of a parser error, `None` for all other kinds.
    pub fn position(&self) -> Option<Position> {
        match self {
            Error::Parse { position, .. } => Some(*position),
            _ => None,
        }
    }

    /// True if this error came out of the parser.
    pub fn is_parse_error(&self) -> bool {
        matches!(self, Error::Parse { .. })
    }

    /// Render a human-readable report.
    ///
    /// Parser errors print as
    ///
    /// ```text
    /// <lineno>:<column>: parser error: <message>
    /// <offending source line>
    /// ------^
    /// ```
    ///
    /// and every other kind as a single `error: <message>` line.
    pub fn log<W: io::Write>(&self, out: &mut W) -> io::Result<()> {
        match self {
            Error::Parse {
                kind,
                position,
                line,
            } => {
                writeln!(
                    out,
                    "{}:{}: parser error: {}",
                    position.lineno,
                    position.column,
                    kind.message()
                )?;
                writeln!(out, "{line}")?;
                for _ in 1..position.column {
                    out.write_all(b"-")?;
                }
                writeln!(out, "^")
            }
            other => writeln!(out, "error: {other}"),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(err) => write!(f, "i/o error: {err}"),
            Error::Math { errno: Errno::Domain } => f.write_str("math domain error"),
            Error::Math { errno: Errno::Range } => f.write_str("math range error"),
            Error::Math { errno: Errno::Other(raw) } | Error::Host { errno: raw } => {
                write!(f, "host error: errno {raw}")
            }
            Error::IllegalName { name } => write!(f, "illegal name: '{name}'"),
            Error::DuplicateArgument { name } => write!(f, "duplicate argument: '{name}'"),
            Error::NameExists { name } => write!(f, "name already exists: '{name}'"),
            Error::NoSuchName { name } => {
                write!(f, "no such constant or function: '{name}'")
            }
            Error::TooManyArguments => f.write_str("too many arguments"),
            Error::ExceedsMaxFrameSize => {
                f.write_str("expression would exceed maximum frame size")
            }
            Error::Internal => f.write_str("internal error"),
            Error::Parse { kind, position, .. } => {
                write!(
                    f,
                    "{}:{}: parser error: {}",
                    position.lineno,
                    position.column,
                    kind.message()
                )
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::Io(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parser_error_report_format() {
        let err = Error::Parse {
            kind: ParseErrorKind::TrailingGarbage,
            position: Position {
                lineno: 1,
                column: 7,
                offset: 6,
                len: 1,
            },
            line: "1 + 2 )".to_string(),
        };
        let mut out = Vec::new();
        err.log(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text, "1:7: parser error: trailing garbage\n1 + 2 )\n------^\n");
    }

    #[test]
    fn plain_error_report_format() {
        let err = Error::NoSuchName {
            name: "nope".to_string(),
        };
        let mut out = Vec::new();
        err.log(&mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "error: no such constant or function: 'nope'\n"
        );
    }

    #[test]
    fn math_errors_have_distinct_messages() {
        let dom = Error::Math { errno: Errno::Domain };
        let rng = Error::Math { errno: Errno::Range };
        assert_ne!(dom.to_string(), rng.to_string());
    }
}
