mod env;
mod executor;
mod interpreter;
#[cfg(unix)]
mod launcher;
pub mod parser;
mod readline;
mod shell;

pub use shell::Shell;
