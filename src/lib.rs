//! # bflower - Brainfuck to CFG IR
//!
//! A single-pass translator from Brainfuck source to a basic-block
//! intermediate representation, ready to hand off to a backend for printing
//! or code generation.
//!
//! ## Quick Start
//!
//! ```rust
//! use bflower::compiler::Executor;
//!
//! # fn main() -> bflower::Result<()> {
//! let module = bflower::translate(b"++++++++[>++++++++<-]>+.")?;
//!
//! // One entry block plus a {body, end} pair per loop
//! assert_eq!(module.function("main").unwrap().blocks.len(), 3);
//!
//! // Run the emitted IR directly
//! let outcome = Executor::default().run(&module, b"")?;
//! assert_eq!(outcome.output, b"A");
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! Source bytes → Scanner → Tokens → IrGenerator → Module
//! ```
//!
//! ### Main Components
//!
//! - [`Scanner`] - Classifies source bytes into commands, skipping comments
//! - [`IrGenerator`] - Emits blocks and branches in one pass
//! - [`Module`] - The finished IR, serializable with serde
//! - [`Compiler`] - Options, verification and statistics around the generator
//!
//! ## Memory Model
//!
//! A 30000-cell `i8` tape and an `i64` data pointer are allocated and zeroed
//! in the entry block. Cell arithmetic wraps at 8 bits, pointer arithmetic at
//! 64 bits, and the emitted IR never checks the pointer against the tape size.
//!
//! ## Error Handling
//!
//! Bracket mismatches abort translation; no partial module is returned:
//!
//! ```rust
//! use bflower::{Error, StructuralErrorKind};
//!
//! let err = bflower::translate(b"+]").unwrap_err();
//! assert_eq!(err, Error::UnexpectedClosingBracket { offset: 1 });
//! assert_eq!(err.structural_kind(), Some(StructuralErrorKind::UnexpectedClosingBracket));
//! ```

/// Version of the bflower crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod compiler;
pub mod error;
pub mod lexer;

// Re-export main types
pub use compiler::ir::{IrGenerator, Module};
pub use compiler::{CompileOptions, CompileResult, Compiler};
pub use error::{Error, ErrorSeverity, Result, StructuralErrorKind};
pub use lexer::{Command, Scanner, Token};

/// Translate source with default options and return the module
pub fn translate(source: &[u8]) -> Result<Module> {
    Compiler::new(CompileOptions::default())
        .compile(source)
        .map(|result| result.module)
}
