//! Core types shared by every stage of the pipeline: values and type tags,
//! the expression tree, the structured error model and the thread-local
//! math-error status.

pub mod errno;
pub mod error;
pub mod expr;
pub mod value;

pub use self::errno::Errno;
pub use self::error::{Error, ParseErrorKind, Position};
pub use self::expr::Expr;
pub use self::value::{Type, Value};
