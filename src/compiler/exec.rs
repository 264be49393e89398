//! # IR Executor
//!
//! Runs an emitted module directly so its behavior can be compared with the
//! source semantics. Memory is modelled as one byte vector per `alloca`;
//! pointers are `(allocation, offset)` pairs.
//!
//! The emitted IR performs no bounds checks. The executor does, and reports an
//! out-of-range access as an [`Error::ExecutionError`] instead of reading
//! outside an allocation.

use super::ir::{Function, IrInstruction, IrReg, IrType, Module, Terminator};
use super::runtime::{RuntimeRole, RuntimeSymbols};
use crate::{Error, Result};
use std::collections::HashMap;

/// Fill byte for fresh allocations, so a missing `fill` call is observable
pub const UNINIT_BYTE: u8 = 0xcd;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RtValue {
    Int(u64),
    Ptr { alloc: usize, offset: u64 },
}

/// Result of running a module to completion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecOutcome {
    /// Bytes passed to the write capability, in order
    pub output: Vec<u8>,
    /// Value returned by the entry function (0 when it returns nothing)
    pub exit_code: u64,
    /// Instructions and terminators executed
    pub steps: u64,
}

/// Interpreter for [`Module`] values
pub struct Executor {
    symbols: RuntimeSymbols,
    step_limit: Option<u64>,
    allocations: Vec<Vec<u8>>,
}

struct Machine<'a> {
    regs: HashMap<IrReg, RtValue>,
    input: &'a [u8],
    input_pos: usize,
    output: Vec<u8>,
    steps: u64,
}

impl Executor {
    /// Create an executor that resolves calls through `symbols`
    pub fn new(symbols: RuntimeSymbols) -> Self {
        Self {
            symbols,
            step_limit: None,
            allocations: Vec::new(),
        }
    }

    /// Abort with an error after `limit` steps
    pub fn with_step_limit(mut self, limit: u64) -> Self {
        self.step_limit = Some(limit);
        self
    }

    /// Memory left by the last run, one entry per `alloca` in execution order
    ///
    /// For translated programs index 0 is the tape and index 1 the data pointer slot.
    pub fn allocations(&self) -> &[Vec<u8>] {
        &self.allocations
    }

    /// Run the module's first function, reading `input` for each read call
    ///
    /// Reads past the end of `input` produce 0.
    pub fn run(&mut self, module: &Module, input: &[u8]) -> Result<ExecOutcome> {
        let function = module
            .functions
            .first()
            .ok_or_else(|| Error::execution("module has no functions"))?;
        self.run_function(function, input)
    }

    /// Run a specific function
    pub fn run_function(&mut self, function: &Function, input: &[u8]) -> Result<ExecOutcome> {
        self.allocations.clear();
        let mut machine = Machine {
            regs: HashMap::new(),
            input,
            input_pos: 0,
            output: Vec::new(),
            steps: 0,
        };

        let mut current = function.entry;
        loop {
            let block = function
                .block(current)
                .ok_or_else(|| {
                    Error::execution(format!("branch to missing block #{}", current.0))
                })?;

            for instr in &block.instructions {
                self.tick(&mut machine)?;
                self.step(&mut machine, instr)?;
            }

            self.tick(&mut machine)?;
            let term = block.terminator.as_ref().ok_or_else(|| {
                Error::execution(format!("block {} has no terminator", block.label))
            })?;
            match term {
                Terminator::Br(target) => current = *target,
                Terminator::CondBr {
                    cond,
                    then_block,
                    else_block,
                } => {
                    current = if machine.int(*cond)? != 0 {
                        *then_block
                    } else {
                        *else_block
                    };
                }
                Terminator::Ret(value) => {
                    let exit_code = match value {
                        Some(reg) => machine.int(*reg)?,
                        None => 0,
                    };
                    return Ok(ExecOutcome {
                        output: machine.output,
                        exit_code,
                        steps: machine.steps,
                    });
                }
            }
        }
    }

    fn tick(&self, machine: &mut Machine<'_>) -> Result<()> {
        machine.steps += 1;
        match self.step_limit {
            Some(limit) if machine.steps > limit => {
                Err(Error::execution(format!("step limit {} exceeded", limit)))
            }
            _ => Ok(()),
        }
    }

    fn step(&mut self, machine: &mut Machine<'_>, instr: &IrInstruction) -> Result<()> {
        match instr {
            IrInstruction::Const(dst, ty, value) => {
                machine.set(*dst, RtValue::Int(ty.truncate(*value as u64)));
            }
            IrInstruction::Alloca(dst, ty, count) => {
                let size = ty
                    .size()
                    .checked_mul(*count)
                    .ok_or_else(|| Error::execution("allocation size overflows"))?;
                let size = usize::try_from(size)
                    .map_err(|_| Error::execution("allocation size overflows"))?;
                let mut memory = Vec::new();
                memory
                    .try_reserve_exact(size)
                    .map_err(|_| Error::execution(format!("cannot allocate {} bytes", size)))?;
                memory.resize(size, UNINIT_BYTE);
                self.allocations.push(memory);
                machine.set(
                    *dst,
                    RtValue::Ptr {
                        alloc: self.allocations.len() - 1,
                        offset: 0,
                    },
                );
            }
            IrInstruction::Load(dst, ty, ptr) => {
                let (alloc, offset) = machine.ptr(*ptr)?;
                let bytes = self.slice(alloc, offset, scalar_size(*ty)?)?;
                let mut raw = [0u8; 8];
                raw[..bytes.len()].copy_from_slice(bytes);
                machine.set(*dst, RtValue::Int(ty.truncate(u64::from_le_bytes(raw))));
            }
            IrInstruction::Store(ty, value, ptr) => {
                let value = machine.int(*value)?;
                let (alloc, offset) = machine.ptr(*ptr)?;
                let size = scalar_size(*ty)?;
                let raw = value.to_le_bytes();
                self.slice_mut(alloc, offset, size)?
                    .copy_from_slice(&raw[..size as usize]);
            }
            IrInstruction::Gep(dst, ty, base, index) => {
                let (alloc, offset) = machine.ptr(*base)?;
                let index = machine.int(*index)?;
                let offset = offset.wrapping_add(index.wrapping_mul(ty.size()));
                machine.set(*dst, RtValue::Ptr { alloc, offset });
            }
            IrInstruction::Add(dst, ty, a, b) => {
                let sum = machine.int(*a)?.wrapping_add(machine.int(*b)?);
                machine.set(*dst, RtValue::Int(ty.truncate(sum)));
            }
            IrInstruction::Sub(dst, ty, a, b) => {
                let diff = machine.int(*a)?.wrapping_sub(machine.int(*b)?);
                machine.set(*dst, RtValue::Int(ty.truncate(diff)));
            }
            IrInstruction::ICmpNe(dst, ty, a, b) => {
                let ne = ty.truncate(machine.int(*a)?) != ty.truncate(machine.int(*b)?);
                machine.set(*dst, RtValue::Int(ne as u64));
            }
            IrInstruction::Call(dst, name, args) => {
                let result = self.call(machine, name, args)?;
                if let (Some(dst), Some(value)) = (dst, result) {
                    machine.set(*dst, value);
                }
            }
        }
        Ok(())
    }

    fn call(
        &mut self,
        machine: &mut Machine<'_>,
        name: &str,
        args: &[IrReg],
    ) -> Result<Option<RtValue>> {
        let role = self
            .symbols
            .role_of(name)
            .ok_or_else(|| Error::execution(format!("call to unknown symbol {}", name)))?;
        let arg = |i: usize| {
            args.get(i)
                .copied()
                .ok_or_else(|| Error::execution(format!("{} is missing argument {}", name, i)))
        };

        match role {
            RuntimeRole::ReadByte => {
                let byte = machine.input.get(machine.input_pos).copied().unwrap_or(0);
                machine.input_pos += 1;
                Ok(Some(RtValue::Int(byte as u64)))
            }
            RuntimeRole::WriteByte => {
                let value = machine.int(arg(0)?)?;
                machine.output.push(value as u8);
                Ok(Some(RtValue::Int(0)))
            }
            RuntimeRole::Fill => {
                let (alloc, offset) = machine.ptr(arg(0)?)?;
                let value = machine.int(arg(1)?)? as u8;
                let len = machine.int(arg(2)?)?;
                self.slice_mut(alloc, offset, len)?.fill(value);
                Ok(None)
            }
        }
    }

    fn slice(&self, alloc: usize, offset: u64, len: u64) -> Result<&[u8]> {
        let range = self.range(alloc, offset, len)?;
        Ok(&self.allocations[alloc][range])
    }

    fn slice_mut(&mut self, alloc: usize, offset: u64, len: u64) -> Result<&mut [u8]> {
        let range = self.range(alloc, offset, len)?;
        Ok(&mut self.allocations[alloc][range])
    }

    fn range(&self, alloc: usize, offset: u64, len: u64) -> Result<std::ops::Range<usize>> {
        let size = self
            .allocations
            .get(alloc)
            .map(Vec::len)
            .ok_or_else(|| Error::execution(format!("dangling allocation #{}", alloc)))?;
        match offset.checked_add(len) {
            Some(end) if end <= size as u64 => Ok(offset as usize..end as usize),
            _ => Err(Error::execution(format!(
                "access of {} bytes at offset {} outside allocation #{} of {} bytes",
                len, offset, alloc, size
            ))),
        }
    }
}

impl Default for Executor {
    fn default() -> Self {
        Self::new(RuntimeSymbols::default())
    }
}

impl Machine<'_> {
    fn set(&mut self, reg: IrReg, value: RtValue) {
        self.regs.insert(reg, value);
    }

    fn get(&self, reg: IrReg) -> Result<RtValue> {
        self.regs
            .get(&reg)
            .copied()
            .ok_or_else(|| Error::execution(format!("read of unset register r{}", reg.0)))
    }

    fn int(&self, reg: IrReg) -> Result<u64> {
        match self.get(reg)? {
            RtValue::Int(value) => Ok(value),
            RtValue::Ptr { .. } => Err(Error::execution(format!(
                "register r{} holds a pointer, expected an integer",
                reg.0
            ))),
        }
    }

    fn ptr(&self, reg: IrReg) -> Result<(usize, u64)> {
        match self.get(reg)? {
            RtValue::Ptr { alloc, offset } => Ok((alloc, offset)),
            RtValue::Int(_) => Err(Error::execution(format!(
                "register r{} holds an integer, expected a pointer",
                reg.0
            ))),
        }
    }
}

fn scalar_size(ty: IrType) -> Result<u64> {
    match ty {
        IrType::I1 | IrType::I8 | IrType::I32 | IrType::I64 => Ok(ty.size()),
        IrType::Ptr | IrType::Void => Err(Error::execution(format!(
            "memory access of type {} is not supported",
            ty
        ))),
    }
}
