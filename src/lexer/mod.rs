//! Lexical analysis for Brainfuck source
//!
//! Walks the source bytes and classifies each one as a command or a comment.

mod scanner;
mod token;

pub use scanner::{line_col, Scanner};
pub use token::{Command, Token};
