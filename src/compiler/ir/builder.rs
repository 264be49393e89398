//! IR builder with a single insertion cursor
//!
//! The builder owns the function under construction. Instructions go to the
//! block under the cursor; appending a terminator seals that block and clears
//! the cursor, so the caller must reposition before emitting again.

use super::instruction::{IrInstruction, IrReg, Terminator};
use super::program::{BasicBlock, BlockId, Function};
use super::types::IrType;
use crate::{Error, Result};

/// Builds one [`Function`] block by block
pub struct IrBuilder {
    /// Function under construction
    function: Function,
    /// Block receiving instructions
    cursor: Option<BlockId>,
    /// Next available register
    next_reg: u32,
    /// Label counter for generating unique labels
    label_counter: u32,
}

impl IrBuilder {
    /// Start building a function with no blocks
    pub fn new(name: &str, ret: IrType) -> Self {
        Self {
            function: Function::new(name, ret),
            cursor: None,
            next_reg: 0,
            label_counter: 0,
        }
    }

    /// Append a fresh block labelled `{prefix}_{n}`; the first block becomes the entry
    ///
    /// The cursor does not move.
    pub fn append_block(&mut self, prefix: &str) -> BlockId {
        let id = BlockId(self.function.blocks.len() as u32);
        let label = if self.function.blocks.is_empty() && prefix == "entry" {
            prefix.to_string()
        } else {
            self.new_label(prefix)
        };
        self.function.blocks.push(BasicBlock::new(id, &label));
        if id.0 == 0 {
            self.function.entry = id;
        }
        id
    }

    /// Move the cursor to the end of `block`
    pub fn position_at_end(&mut self, block: BlockId) {
        self.cursor = Some(block);
    }

    /// Block currently under the cursor
    pub fn cursor(&self) -> Option<BlockId> {
        self.cursor
    }

    /// Number of blocks created so far
    pub fn block_count(&self) -> usize {
        self.function.blocks.len()
    }

    /// Allocate a fresh virtual register
    pub fn alloc_reg(&mut self) -> IrReg {
        let reg = IrReg::new(self.next_reg);
        self.next_reg += 1;
        reg
    }

    /// Append an instruction to the block under the cursor
    pub fn emit(&mut self, instr: IrInstruction) -> Result<()> {
        let block = self.current_block_mut()?;
        block.instructions.push(instr);
        Ok(())
    }

    /// Seal the block under the cursor with `term` and clear the cursor
    pub fn terminate(&mut self, term: Terminator) -> Result<()> {
        let block = self.current_block_mut()?;
        block.terminator = Some(term);
        self.cursor = None;
        Ok(())
    }

    /// `dst = (ty) value`
    pub fn build_const(&mut self, ty: IrType, value: i64) -> Result<IrReg> {
        let dst = self.alloc_reg();
        self.emit(IrInstruction::Const(dst, ty, value))?;
        Ok(dst)
    }

    /// `dst = alloca ty x count`
    pub fn build_alloca(&mut self, ty: IrType, count: u64) -> Result<IrReg> {
        let dst = self.alloc_reg();
        self.emit(IrInstruction::Alloca(dst, ty, count))?;
        Ok(dst)
    }

    /// `dst = load ty, [ptr]`
    pub fn build_load(&mut self, ty: IrType, ptr: IrReg) -> Result<IrReg> {
        let dst = self.alloc_reg();
        self.emit(IrInstruction::Load(dst, ty, ptr))?;
        Ok(dst)
    }

    /// `store ty value, [ptr]`
    pub fn build_store(&mut self, ty: IrType, value: IrReg, ptr: IrReg) -> Result<()> {
        self.emit(IrInstruction::Store(ty, value, ptr))
    }

    /// `dst = base + index * sizeof(ty)`
    pub fn build_gep(&mut self, ty: IrType, base: IrReg, index: IrReg) -> Result<IrReg> {
        let dst = self.alloc_reg();
        self.emit(IrInstruction::Gep(dst, ty, base, index))?;
        Ok(dst)
    }

    /// `dst = lhs + rhs`
    pub fn build_add(&mut self, ty: IrType, lhs: IrReg, rhs: IrReg) -> Result<IrReg> {
        let dst = self.alloc_reg();
        self.emit(IrInstruction::Add(dst, ty, lhs, rhs))?;
        Ok(dst)
    }

    /// `dst = lhs - rhs`
    pub fn build_sub(&mut self, ty: IrType, lhs: IrReg, rhs: IrReg) -> Result<IrReg> {
        let dst = self.alloc_reg();
        self.emit(IrInstruction::Sub(dst, ty, lhs, rhs))?;
        Ok(dst)
    }

    /// `dst = lhs != rhs`
    pub fn build_icmp_ne(&mut self, ty: IrType, lhs: IrReg, rhs: IrReg) -> Result<IrReg> {
        let dst = self.alloc_reg();
        self.emit(IrInstruction::ICmpNe(dst, ty, lhs, rhs))?;
        Ok(dst)
    }

    /// Call `name(args)`; a register is allocated for the result unless `ret` is void
    pub fn build_call(
        &mut self,
        name: &str,
        args: Vec<IrReg>,
        ret: IrType,
    ) -> Result<Option<IrReg>> {
        let dst = if ret == IrType::Void {
            None
        } else {
            Some(self.alloc_reg())
        };
        self.emit(IrInstruction::Call(dst, name.to_string(), args))?;
        Ok(dst)
    }

    /// Call `name(args)` for a symbol that returns a value
    pub fn build_call_value(&mut self, name: &str, args: Vec<IrReg>) -> Result<IrReg> {
        let dst = self.alloc_reg();
        self.emit(IrInstruction::Call(Some(dst), name.to_string(), args))?;
        Ok(dst)
    }

    /// Hand back the finished function
    pub fn finish(self) -> Function {
        self.function
    }

    fn new_label(&mut self, prefix: &str) -> String {
        let label = format!("{}_{}", prefix, self.label_counter);
        self.label_counter += 1;
        label
    }

    fn current_block_mut(&mut self) -> Result<&mut BasicBlock> {
        let id = self.cursor.ok_or(Error::NoInsertionPoint)?;
        let block = self
            .function
            .blocks
            .get_mut(id.0 as usize)
            .ok_or(Error::NoInsertionPoint)?;
        if block.is_terminated() {
            return Err(Error::BlockAlreadyTerminated {
                label: block.label.clone(),
            });
        }
        Ok(block)
    }
}
