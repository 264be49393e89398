//! # bflower Compiler - Brainfuck to CFG IR
//!
//! This module translates Brainfuck source into a basic-block IR module that
//! an external backend can print or compile.
//!
//! ## Architecture
//!
//! ```text
//! Source bytes → Scanner → Tokens → IrGenerator → Module → Verify → backend
//! ```
//!
//! ## Usage
//!
//! ```
//! use bflower::compiler::{Compiler, CompileOptions};
//!
//! let compiler = Compiler::new(CompileOptions::default());
//! let result = compiler.compile(b"++[->+<]>.")?;
//! assert_eq!(result.module.function("main").unwrap().blocks.len(), 3);
//! # Ok::<(), bflower::Error>(())
//! ```

pub mod debug;
pub mod exec;
pub mod ir;
pub mod runtime;
pub mod verifier;

pub use debug::{dump_ir, format_instr, format_module, format_terminator};
pub use exec::{ExecOutcome, Executor};
pub use ir::{IrGenerator, IrInstruction, IrReg, Module, TranslationStats};
pub use runtime::{RuntimeRole, RuntimeSymbols};
pub use verifier::{ProgramStats, Verifier, VerifyError, VerifyResult};

use crate::lexer::Scanner;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Compilation options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompileOptions {
    /// Number of tape cells to allocate
    pub cell_count: usize,
    /// Name of the produced module
    pub module_name: String,
    /// Name of the entry function
    pub entry_name: String,
    /// Link-time names of the runtime capabilities
    pub symbols: RuntimeSymbols,
    /// Run the IR verifier after emission
    pub verify: bool,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            cell_count: ir::DEFAULT_CELL_COUNT as usize,
            module_name: "bf_module".to_string(),
            entry_name: "main".to_string(),
            symbols: RuntimeSymbols::default(),
            verify: true,
        }
    }
}

impl CompileOptions {
    /// Parse options from JSON; missing fields keep their defaults
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::serialization(e.to_string()))
    }
}

/// Compilation result with metadata
#[derive(Debug)]
pub struct CompileResult {
    /// The finished module
    pub module: Module,
    /// Counters from the translation pass
    pub stats: TranslationStats,
    /// Verifier report (when `verify` is enabled)
    pub verification: Option<VerifyResult>,
}

/// Brainfuck to IR compiler
pub struct Compiler {
    options: CompileOptions,
}

impl Compiler {
    /// Create a new compiler with options
    pub fn new(options: CompileOptions) -> Self {
        Self { options }
    }

    /// Options this compiler was built with
    pub fn options(&self) -> &CompileOptions {
        &self.options
    }

    /// Compile source bytes to an IR module
    pub fn compile(&self, source: &[u8]) -> Result<CompileResult> {
        tracing::debug!(bytes = source.len(), module = %self.options.module_name, "compiling");

        let scanner = Scanner::new(source);
        let (module, stats) = IrGenerator::new(&self.options).generate(scanner)?;

        let verification = if self.options.verify {
            let result = Verifier::new().verify(&module);
            for warning in &result.warnings {
                tracing::warn!("IR verification warning: {}", warning);
            }
            if !result.valid {
                return Err(Error::VerificationFailed {
                    errors: result.errors.iter().map(ToString::to_string).collect(),
                });
            }
            Some(result)
        } else {
            None
        };

        Ok(CompileResult {
            module,
            stats,
            verification,
        })
    }

    /// Read and compile a source file
    pub fn compile_file(&self, path: impl AsRef<Path>) -> Result<CompileResult> {
        let path = path.as_ref();
        let source = std::fs::read(path).map_err(|e| Error::IoError {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        self.compile(&source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compile_reports_stats() {
        let compiler = Compiler::new(CompileOptions::default());
        let result = compiler.compile(b"+[>+<-]").unwrap();

        assert_eq!(result.stats.loop_count, 1);
        assert_eq!(result.stats.block_count, 3);
        let verification = result.verification.unwrap();
        assert!(verification.valid);
        assert_eq!(verification.stats.block_count, 3);
    }

    #[test]
    fn test_verify_disabled() {
        let options = CompileOptions {
            verify: false,
            ..CompileOptions::default()
        };
        let result = Compiler::new(options).compile(b"").unwrap();
        assert!(result.verification.is_none());
    }

    #[test]
    fn test_options_from_json() {
        let options =
            CompileOptions::from_json(r#"{"cell_count": 64, "symbols": {"fill": "memset"}}"#)
                .unwrap();
        assert_eq!(options.cell_count, 64);
        assert_eq!(options.entry_name, "main");
        assert_eq!(options.symbols.fill, "memset");
        assert_eq!(options.symbols.read_byte, "read_byte");

        let compiler = Compiler::new(options.clone());
        assert_eq!(compiler.options(), &options);
    }

    #[test]
    fn test_oversized_cell_count_rejected() {
        let json = r#"{"cell_count": 9223372036854775808}"#;
        let options = CompileOptions::from_json(json).unwrap();
        let err = Compiler::new(options).compile(b"+.").unwrap_err();
        assert!(matches!(err, Error::InvalidOptions(_)));
    }

    #[test]
    fn test_compile_missing_file() {
        let compiler = Compiler::new(CompileOptions::default());
        let err = compiler
            .compile_file("/nonexistent/definitely/missing.bf")
            .unwrap_err();
        assert!(matches!(err, Error::IoError { .. }));
    }
}
