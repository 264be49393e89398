//! IR instruction definitions

use super::program::BlockId;
use super::types::IrType;
use serde::{Deserialize, Serialize};

/// Virtual register (infinite supply, each defined exactly once)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct IrReg(pub u32);

impl IrReg {
    /// Creates a new virtual register with the given ID
    pub fn new(id: u32) -> Self {
        Self(id)
    }
}

/// Straight-line IR instruction (three-address code)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum IrInstruction {
    // Constants
    /// Load integer constant: dst = (ty) value
    Const(IrReg, IrType, i64),

    // Memory
    /// Stack allocation: dst = alloca ty x count
    Alloca(IrReg, IrType, u64),
    /// Load from memory: dst = load ty, [ptr]
    Load(IrReg, IrType, IrReg),
    /// Store to memory: store ty value, [ptr]
    Store(IrType, IrReg, IrReg),
    /// Address computation: dst = base + index * sizeof(ty)
    Gep(IrReg, IrType, IrReg, IrReg),

    // Arithmetic (wrapping at the type's width)
    /// Addition: dst = lhs + rhs
    Add(IrReg, IrType, IrReg, IrReg),
    /// Subtraction: dst = lhs - rhs
    Sub(IrReg, IrType, IrReg, IrReg),

    // Comparison (result is i1)
    /// Not equal: dst = (lhs != rhs)
    ICmpNe(IrReg, IrType, IrReg, IrReg),

    // Calls
    /// Call external symbol, store result in optional dst
    Call(Option<IrReg>, String, Vec<IrReg>),
}

impl IrInstruction {
    /// Register written by this instruction, if any
    pub fn defined_reg(&self) -> Option<IrReg> {
        match self {
            IrInstruction::Const(dst, ..)
            | IrInstruction::Alloca(dst, ..)
            | IrInstruction::Load(dst, ..)
            | IrInstruction::Gep(dst, ..)
            | IrInstruction::Add(dst, ..)
            | IrInstruction::Sub(dst, ..)
            | IrInstruction::ICmpNe(dst, ..) => Some(*dst),
            IrInstruction::Call(dst, ..) => *dst,
            IrInstruction::Store(..) => None,
        }
    }

    /// Registers read by this instruction
    pub fn used_regs(&self) -> Vec<IrReg> {
        match self {
            IrInstruction::Const(..) | IrInstruction::Alloca(..) => Vec::new(),
            IrInstruction::Load(_, _, ptr) => vec![*ptr],
            IrInstruction::Store(_, value, ptr) => vec![*value, *ptr],
            IrInstruction::Gep(_, _, a, b)
            | IrInstruction::Add(_, _, a, b)
            | IrInstruction::Sub(_, _, a, b)
            | IrInstruction::ICmpNe(_, _, a, b) => vec![*a, *b],
            IrInstruction::Call(_, _, args) => args.clone(),
        }
    }

    /// True for add/sub
    pub fn is_arithmetic(&self) -> bool {
        matches!(self, IrInstruction::Add(..) | IrInstruction::Sub(..))
    }

    /// True for calls
    pub fn is_call(&self) -> bool {
        matches!(self, IrInstruction::Call(..))
    }
}

/// Block terminator, the only way to end a basic block
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Terminator {
    /// Unconditional branch
    Br(BlockId),
    /// Branch to `then_block` if `cond` is non-zero, else to `else_block`
    CondBr {
        /// i1 condition register
        cond: IrReg,
        /// Target when true
        then_block: BlockId,
        /// Target when false
        else_block: BlockId,
    },
    /// Return from the function with an optional value
    Ret(Option<IrReg>),
}

impl Terminator {
    /// Successor blocks in branch order
    pub fn successors(&self) -> Vec<BlockId> {
        match self {
            Terminator::Br(target) => vec![*target],
            Terminator::CondBr {
                then_block,
                else_block,
                ..
            } => vec![*then_block, *else_block],
            Terminator::Ret(_) => Vec::new(),
        }
    }

    /// Registers read by this terminator
    pub fn used_regs(&self) -> Vec<IrReg> {
        match self {
            Terminator::CondBr { cond, .. } => vec![*cond],
            Terminator::Ret(Some(reg)) => vec![*reg],
            Terminator::Br(_) | Terminator::Ret(None) => Vec::new(),
        }
    }

    /// True for conditional and unconditional branches
    pub fn is_branch(&self) -> bool {
        !matches!(self, Terminator::Ret(_))
    }
}
