//! # Memory Model
//!
//! The program sees one flat tape of `i8` cells and an `i64` data pointer.
//! Both live in stack allocations made in the entry block:
//!
//! ```text
//! tape     = alloca i8 x cell_count
//! ptr_slot = alloca i64 x 1
//! call fill(tape, 0, cell_count)
//! store i64 0, [ptr_slot]
//! ```
//!
//! Cell addresses are `tape + load(ptr_slot)`. Nothing checks the index
//! against `cell_count`.

use super::builder::IrBuilder;
use super::instruction::IrReg;
use super::types::IrType;
use crate::compiler::runtime::{RuntimeSymbols, FILL_SIG};
use crate::{Error, Result};

/// Default number of cells on the tape
pub const DEFAULT_CELL_COUNT: u64 = 30_000;

/// Registers holding the tape and data pointer allocations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TapeLayout {
    /// Pointer to the first cell
    pub tape: IrReg,
    /// Pointer to the `i64` data pointer slot
    pub ptr_slot: IrReg,
    /// Number of cells allocated
    pub cell_count: u64,
}

/// Emit the one-time tape setup at the cursor
///
/// Must run before any command is translated: every later instruction
/// assumes the pointer is 0 and all cells are 0.
pub fn emit_tape_init(
    builder: &mut IrBuilder,
    symbols: &RuntimeSymbols,
    cell_count: u64,
) -> Result<TapeLayout> {
    let tape = builder.build_alloca(IrType::I8, cell_count)?;
    let ptr_slot = builder.build_alloca(IrType::I64, 1)?;

    let zero_byte = builder.build_const(IrType::I8, 0)?;
    let len = i64::try_from(cell_count).map_err(|_| {
        Error::InvalidOptions(format!("cell_count {} does not fit in i64", cell_count))
    })?;
    let len = builder.build_const(IrType::I64, len)?;
    builder.build_call(&symbols.fill, vec![tape, zero_byte, len], FILL_SIG.1)?;

    let zero_index = builder.build_const(IrType::I64, 0)?;
    builder.build_store(IrType::I64, zero_index, ptr_slot)?;

    Ok(TapeLayout {
        tape,
        ptr_slot,
        cell_count,
    })
}

impl TapeLayout {
    /// `idx = load ptr_slot; dst = gep i8 tape, idx`
    pub fn emit_cell_ptr(&self, builder: &mut IrBuilder) -> Result<IrReg> {
        let index = builder.build_load(IrType::I64, self.ptr_slot)?;
        builder.build_gep(IrType::I8, self.tape, index)
    }

    /// Address and current value of the cell under the data pointer
    pub fn emit_load_cell(&self, builder: &mut IrBuilder) -> Result<(IrReg, IrReg)> {
        let cell_ptr = self.emit_cell_ptr(builder)?;
        let value = builder.build_load(IrType::I8, cell_ptr)?;
        Ok((cell_ptr, value))
    }

    /// `cell != 0` as an i1 register
    pub fn emit_cell_nonzero(&self, builder: &mut IrBuilder) -> Result<IrReg> {
        let (_, value) = self.emit_load_cell(builder)?;
        let zero = builder.build_const(IrType::I8, 0)?;
        builder.build_icmp_ne(IrType::I8, value, zero)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::ir::IrInstruction;

    #[test]
    fn test_init_sequence() {
        let mut builder = IrBuilder::new("main", IrType::I32);
        let entry = builder.append_block("entry");
        builder.position_at_end(entry);
        let layout =
            emit_tape_init(&mut builder, &RuntimeSymbols::default(), DEFAULT_CELL_COUNT).unwrap();
        let func = builder.finish();
        let instrs = &func.blocks[0].instructions;

        assert_eq!(
            instrs[0],
            IrInstruction::Alloca(layout.tape, IrType::I8, 30_000)
        );
        assert_eq!(
            instrs[1],
            IrInstruction::Alloca(layout.ptr_slot, IrType::I64, 1)
        );
        assert!(matches!(&instrs[4], IrInstruction::Call(None, name, args)
            if name == "fill" && args.len() == 3 && args[0] == layout.tape));
        assert!(matches!(instrs[6], IrInstruction::Store(IrType::I64, _, slot)
            if slot == layout.ptr_slot));
        assert_eq!(instrs.len(), 7);
    }

    #[test]
    fn test_cell_count_beyond_i64_rejected() {
        let mut builder = IrBuilder::new("main", IrType::I32);
        let entry = builder.append_block("entry");
        builder.position_at_end(entry);
        let too_big = i64::MAX as u64 + 1;

        let err = emit_tape_init(&mut builder, &RuntimeSymbols::default(), too_big).unwrap_err();
        assert!(matches!(err, Error::InvalidOptions(_)));
        assert_eq!(err.classify(), crate::ErrorSeverity::Recoverable);
    }
}
