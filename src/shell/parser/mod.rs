pub mod ast;
pub mod lexer;
pub mod parser;

pub use ast::{Pipeline, Redirect, RedirectOp, StatementOp};
pub use parser::{parse_command, ParseError};
