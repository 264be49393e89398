//! # Intermediate Representation (IR) for Brainfuck Translation
//!
//! Source commands are lowered into a control flow graph of basic blocks that
//! a backend can print or compile. Each block is straight-line three-address
//! code closed by exactly one terminator.
//!
//! ## Module Structure
//!
//! ```text
//! ir/
//! ├── mod.rs           # This file - module definition and re-exports
//! ├── types.rs         # IrType
//! ├── instruction.rs   # IrReg, IrInstruction, Terminator
//! ├── program.rs       # BasicBlock, Function, ExternDecl, Module
//! ├── builder.rs       # IrBuilder (insertion cursor)
//! ├── memory_model.rs  # Tape and data pointer setup
//! ├── loops.rs         # LoopFrame, LoopStack
//! └── generator.rs     # IrGenerator (single-pass translator)
//! ```
//!
//! ## Key Types
//!
//! - [`IrReg`] - Virtual register, defined once
//! - [`IrInstruction`] - Straight-line operation (memory, arithmetic, compare, call)
//! - [`Terminator`] - Block-ending branch or return
//! - [`Module`] - Completed translation unit
//! - [`IrGenerator`] - Token-stream-to-IR translator

mod builder;
mod generator;
mod instruction;
pub mod loops;
pub mod memory_model;
mod program;
mod types;

// Re-export all public types
pub use builder::IrBuilder;
pub use generator::{IrGenerator, TranslationStats};
pub use instruction::{IrInstruction, IrReg, Terminator};
pub use loops::{LoopFrame, LoopStack};
pub use memory_model::{TapeLayout, DEFAULT_CELL_COUNT};
pub use program::{BasicBlock, BlockId, ExternDecl, Function, Module};
pub use types::IrType;
