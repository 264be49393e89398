//! IR Generator - translates the command stream into basic blocks
//!
//! One pass, left to right. Straight-line commands append to the block under
//! the builder cursor; brackets seal that block with a conditional branch and
//! move the cursor:
//!
//! ```text
//! [   cond = cell != 0      ]   cond = cell != 0
//!     condbr cond, body, end    condbr cond, body, end
//!     push {body, end}          pop {body, end}
//!     cursor = body             cursor = end
//! ```
//!
//! The `]` test re-checks the cell, giving "test before every iteration"
//! semantics without a separate header block. A program with `n` loops
//! therefore produces exactly `1 + 2n` blocks.

use super::builder::IrBuilder;
use super::instruction::{IrReg, Terminator};
use super::loops::{LoopFrame, LoopStack};
use super::memory_model::{emit_tape_init, TapeLayout};
use super::program::Module;
use super::types::IrType;
use crate::compiler::runtime::{RuntimeSymbols, WRITE_BYTE_SIG};
use crate::compiler::CompileOptions;
use crate::lexer::{Command, Scanner, Token};
use crate::Result;

/// Counters collected during one translation pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TranslationStats {
    /// Commands consumed
    pub token_count: usize,
    /// Loops opened (and closed)
    pub loop_count: usize,
    /// Deepest loop nesting
    pub max_depth: usize,
    /// Blocks emitted
    pub block_count: usize,
    /// Straight-line instructions emitted, including tape setup
    pub instruction_count: usize,
}

#[derive(Clone, Copy)]
enum Step {
    Up,
    Down,
}

/// Command-stream to IR translator
///
/// Consumed by [`IrGenerator::generate`]: a generator runs exactly one pass
/// and either returns a complete module or an error, never both.
pub struct IrGenerator {
    /// Builder holding the entry function and the cursor
    builder: IrBuilder,
    /// Open loops
    loops: LoopStack,
    /// Runtime symbol names
    symbols: RuntimeSymbols,
    /// Name of the produced module
    module_name: String,
    /// Cells to allocate
    cell_count: u64,
    /// Commands translated so far
    token_count: usize,
}

impl IrGenerator {
    /// Create a generator for one translation pass
    pub fn new(options: &CompileOptions) -> Self {
        Self {
            builder: IrBuilder::new(&options.entry_name, IrType::I32),
            loops: LoopStack::new(),
            symbols: options.symbols.clone(),
            module_name: options.module_name.clone(),
            cell_count: options.cell_count as u64,
            token_count: 0,
        }
    }

    /// Translate the commands yielded by `scanner` into a module
    ///
    /// The scanner's source length is reported as the end-of-input offset
    /// when a loop is left open.
    pub fn generate(mut self, scanner: Scanner<'_>) -> Result<(Module, TranslationStats)> {
        let source_len = scanner.source_len();
        let entry = self.builder.append_block("entry");
        self.builder.position_at_end(entry);
        let tape = emit_tape_init(&mut self.builder, &self.symbols, self.cell_count)?;

        for token in scanner {
            self.translate_token(token, &tape)?;
            self.token_count += 1;
        }
        self.loops.finish(source_len)?;

        let exit_code = self.builder.build_const(IrType::I32, 0)?;
        self.builder.terminate(Terminator::Ret(Some(exit_code)))?;

        let block_count = self.builder.block_count();
        let function = self.builder.finish();
        let stats = TranslationStats {
            token_count: self.token_count,
            loop_count: self.loops.opened(),
            max_depth: self.loops.max_depth(),
            block_count,
            instruction_count: function.instruction_count(),
        };
        tracing::debug!(
            tokens = stats.token_count,
            blocks = stats.block_count,
            max_depth = stats.max_depth,
            "translation complete"
        );

        let mut module = Module::new(&self.module_name);
        module.externs = self.symbols.declarations();
        module.functions.push(function);
        Ok((module, stats))
    }

    fn translate_token(&mut self, token: Token, tape: &TapeLayout) -> Result<()> {
        match token.kind {
            Command::IncrPtr => self.emit_ptr_step(tape, Step::Up),
            Command::DecrPtr => self.emit_ptr_step(tape, Step::Down),
            Command::Incr => self.emit_cell_step(tape, Step::Up),
            Command::Decr => self.emit_cell_step(tape, Step::Down),
            Command::Output => self.emit_output(tape),
            Command::Input => self.emit_input(tape),
            Command::LoopOpen => self.emit_loop_open(tape, token.offset),
            Command::LoopClose => self.emit_loop_close(tape, token.offset),
        }
    }

    fn emit_step(&mut self, ty: IrType, value: IrReg, step: Step) -> Result<IrReg> {
        let one = self.builder.build_const(ty, 1)?;
        match step {
            Step::Up => self.builder.build_add(ty, value, one),
            Step::Down => self.builder.build_sub(ty, value, one),
        }
    }

    fn emit_ptr_step(&mut self, tape: &TapeLayout, step: Step) -> Result<()> {
        let index = self.builder.build_load(IrType::I64, tape.ptr_slot)?;
        let moved = self.emit_step(IrType::I64, index, step)?;
        self.builder.build_store(IrType::I64, moved, tape.ptr_slot)
    }

    fn emit_cell_step(&mut self, tape: &TapeLayout, step: Step) -> Result<()> {
        let (cell_ptr, value) = tape.emit_load_cell(&mut self.builder)?;
        let updated = self.emit_step(IrType::I8, value, step)?;
        self.builder.build_store(IrType::I8, updated, cell_ptr)
    }

    fn emit_output(&mut self, tape: &TapeLayout) -> Result<()> {
        let (_, value) = tape.emit_load_cell(&mut self.builder)?;
        self.builder
            .build_call(&self.symbols.write_byte, vec![value], WRITE_BYTE_SIG.1)?;
        Ok(())
    }

    fn emit_input(&mut self, tape: &TapeLayout) -> Result<()> {
        let byte = self
            .builder
            .build_call_value(&self.symbols.read_byte, Vec::new())?;
        let cell_ptr = tape.emit_cell_ptr(&mut self.builder)?;
        self.builder.build_store(IrType::I8, byte, cell_ptr)
    }

    fn emit_loop_open(&mut self, tape: &TapeLayout, offset: usize) -> Result<()> {
        let cond = tape.emit_cell_nonzero(&mut self.builder)?;
        let body = self.builder.append_block("loop_body");
        let end = self.builder.append_block("loop_end");
        self.builder.terminate(Terminator::CondBr {
            cond,
            then_block: body,
            else_block: end,
        })?;

        self.loops.push(LoopFrame {
            body,
            end,
            opened_at: offset,
        });
        self.builder.position_at_end(body);
        tracing::trace!(offset, depth = self.loops.depth(), "loop opened");
        Ok(())
    }

    fn emit_loop_close(&mut self, tape: &TapeLayout, offset: usize) -> Result<()> {
        let frame = self.loops.pop(offset)?;
        let cond = tape.emit_cell_nonzero(&mut self.builder)?;
        self.builder.terminate(Terminator::CondBr {
            cond,
            then_block: frame.body,
            else_block: frame.end,
        })?;

        self.builder.position_at_end(frame.end);
        tracing::trace!(
            offset,
            opened_at = frame.opened_at,
            depth = self.loops.depth(),
            "loop closed"
        );
        Ok(())
    }
}
