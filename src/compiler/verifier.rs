//! # IR Module Verifier
//!
//! Validates emitted modules before they are handed to a backend.
//! Ensures every block is properly terminated and every reference resolves.

use super::ir::{BlockId, Function, IrInstruction, IrReg, Module};
use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt;

/// Verification result with warnings
#[derive(Debug)]
pub struct VerifyResult {
    /// Module is structurally valid
    pub valid: bool,
    /// Errors that make the module unusable
    pub errors: Vec<VerifyError>,
    /// Warnings (non-fatal)
    pub warnings: Vec<String>,
    /// Statistics
    pub stats: ProgramStats,
}

/// Module statistics
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ProgramStats {
    /// Total straight-line instruction count
    pub instruction_count: usize,
    /// Total basic block count
    pub block_count: usize,
    /// Conditional and unconditional branches
    pub branch_count: usize,
    /// Calls to external symbols
    pub call_count: usize,
    /// Add/sub instructions
    pub arithmetic_count: usize,
}

/// Verification error types
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerifyError {
    /// Function has no blocks or its entry id is out of range
    MissingEntryBlock {
        /// Function name
        function: String,
    },

    /// Block was never sealed with a terminator
    MissingTerminator {
        /// Block label
        block: String,
    },

    /// Branch names a block that does not exist
    UnknownBranchTarget {
        /// Block containing the branch
        block: String,
        /// Target block id
        target: u32,
    },

    /// Block id does not match its position in the function
    MisnumberedBlock {
        /// Block label
        block: String,
        /// Recorded id
        id: u32,
        /// Actual position
        index: usize,
    },

    /// Call to a symbol with no extern declaration
    UnknownExtern {
        /// Block containing the call
        block: String,
        /// Called name
        name: String,
    },

    /// Call argument count differs from the declaration
    ArityMismatch {
        /// Block containing the call
        block: String,
        /// Called name
        name: String,
        /// Declared parameter count
        expected: usize,
        /// Arguments passed
        got: usize,
    },

    /// Register written more than once
    RegisterRedefined {
        /// Register
        reg: u32,
    },

    /// Register read but never written
    UndefinedRegister {
        /// Block containing the use
        block: String,
        /// Register
        reg: u32,
    },
}

impl fmt::Display for VerifyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VerifyError::MissingEntryBlock { function } => {
                write!(f, "Function {} has no entry block", function)
            }
            VerifyError::MissingTerminator { block } => {
                write!(f, "Block {} has no terminator", block)
            }
            VerifyError::UnknownBranchTarget { block, target } => {
                write!(f, "Block {} branches to unknown block #{}", block, target)
            }
            VerifyError::MisnumberedBlock { block, id, index } => {
                write!(f, "Block {} has id #{} at index {}", block, id, index)
            }
            VerifyError::UnknownExtern { block, name } => {
                write!(f, "Block {} calls undeclared symbol {}", block, name)
            }
            VerifyError::ArityMismatch {
                block,
                name,
                expected,
                got,
            } => write!(
                f,
                "Block {} calls {} with {} arguments (expected {})",
                block, name, got, expected
            ),
            VerifyError::RegisterRedefined { reg } => {
                write!(f, "Register r{} is defined more than once", reg)
            }
            VerifyError::UndefinedRegister { block, reg } => {
                write!(f, "Block {} reads undefined register r{}", block, reg)
            }
        }
    }
}

impl std::error::Error for VerifyError {}

/// IR module verifier
#[derive(Debug, Default)]
pub struct Verifier;

impl Verifier {
    /// Create a new verifier
    pub fn new() -> Self {
        Self
    }

    /// Verify a module
    pub fn verify(&self, module: &Module) -> VerifyResult {
        let mut errors = Vec::new();
        let mut warnings = Vec::new();
        let mut stats = ProgramStats::default();

        let arities: HashMap<&str, usize> = module
            .externs
            .iter()
            .map(|e| (e.name.as_str(), e.params.len()))
            .collect();

        for function in &module.functions {
            self.check_function(function, &arities, &mut errors, &mut warnings, &mut stats);
        }

        VerifyResult {
            valid: errors.is_empty(),
            errors,
            warnings,
            stats,
        }
    }

    fn check_function(
        &self,
        function: &Function,
        arities: &HashMap<&str, usize>,
        errors: &mut Vec<VerifyError>,
        warnings: &mut Vec<String>,
        stats: &mut ProgramStats,
    ) {
        if function.entry_block().is_none() {
            errors.push(VerifyError::MissingEntryBlock {
                function: function.name.clone(),
            });
            return;
        }

        // Definitions are collected function-wide first; uses are checked after
        let mut defined: HashSet<IrReg> = HashSet::new();
        for instr in function.instructions() {
            if let Some(dst) = instr.defined_reg() {
                if !defined.insert(dst) {
                    errors.push(VerifyError::RegisterRedefined { reg: dst.0 });
                }
            }
        }

        for (index, block) in function.blocks.iter().enumerate() {
            stats.block_count += 1;
            if block.id.0 as usize != index {
                errors.push(VerifyError::MisnumberedBlock {
                    block: block.label.clone(),
                    id: block.id.0,
                    index,
                });
            }

            for instr in &block.instructions {
                stats.instruction_count += 1;
                if instr.is_arithmetic() {
                    stats.arithmetic_count += 1;
                }
                if let IrInstruction::Call(_, name, args) = instr {
                    stats.call_count += 1;
                    match arities.get(name.as_str()) {
                        None => errors.push(VerifyError::UnknownExtern {
                            block: block.label.clone(),
                            name: name.clone(),
                        }),
                        Some(&expected) if expected != args.len() => {
                            errors.push(VerifyError::ArityMismatch {
                                block: block.label.clone(),
                                name: name.clone(),
                                expected,
                                got: args.len(),
                            })
                        }
                        Some(_) => {}
                    }
                }
                self.check_uses(&block.label, instr.used_regs(), &defined, errors);
            }

            match &block.terminator {
                None => errors.push(VerifyError::MissingTerminator {
                    block: block.label.clone(),
                }),
                Some(term) => {
                    if term.is_branch() {
                        stats.branch_count += 1;
                    }
                    for target in term.successors() {
                        if function.block(target).is_none() {
                            errors.push(VerifyError::UnknownBranchTarget {
                                block: block.label.clone(),
                                target: target.0,
                            });
                        }
                    }
                    self.check_uses(&block.label, term.used_regs(), &defined, errors);
                }
            }
        }

        for id in self.unreachable_blocks(function) {
            if let Some(block) = function.block(id) {
                warnings.push(format!("Block {} is unreachable from entry", block.label));
            }
        }
    }

    fn check_uses(
        &self,
        label: &str,
        uses: Vec<IrReg>,
        defined: &HashSet<IrReg>,
        errors: &mut Vec<VerifyError>,
    ) {
        for reg in uses {
            if !defined.contains(&reg) {
                errors.push(VerifyError::UndefinedRegister {
                    block: label.to_string(),
                    reg: reg.0,
                });
            }
        }
    }

    fn unreachable_blocks(&self, function: &Function) -> Vec<BlockId> {
        let mut seen: HashSet<BlockId> = HashSet::new();
        let mut queue = VecDeque::from([function.entry]);
        while let Some(id) = queue.pop_front() {
            if !seen.insert(id) {
                continue;
            }
            if let Some(block) = function.block(id) {
                queue.extend(block.successors());
            }
        }
        function
            .blocks
            .iter()
            .map(|b| b.id)
            .filter(|id| !seen.contains(id))
            .collect()
    }
}
