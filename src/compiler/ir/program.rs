//! IR module, function and basic block definitions

use super::instruction::{IrInstruction, Terminator};
use super::types::IrType;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Index of a basic block within its function
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BlockId(pub u32);

/// Basic block in the control flow graph
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasicBlock {
    /// Position of this block in its function
    pub id: BlockId,
    /// Label identifying this basic block
    pub label: String,
    /// Straight-line IR instructions in this block
    pub instructions: Vec<IrInstruction>,
    /// Terminator; `None` only while the block is still being filled
    pub terminator: Option<Terminator>,
}

impl BasicBlock {
    /// Create a new, empty, unterminated basic block
    pub fn new(id: BlockId, label: &str) -> Self {
        Self {
            id,
            label: label.to_string(),
            instructions: Vec::new(),
            terminator: None,
        }
    }

    /// True once a terminator has been appended
    pub fn is_terminated(&self) -> bool {
        self.terminator.is_some()
    }

    /// Successor blocks, empty for unterminated or returning blocks
    pub fn successors(&self) -> Vec<BlockId> {
        self.terminator
            .as_ref()
            .map(Terminator::successors)
            .unwrap_or_default()
    }
}

/// Declaration of an externally resolved symbol
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternDecl {
    /// Symbol name
    pub name: String,
    /// Parameter types
    pub params: Vec<IrType>,
    /// Return type
    pub ret: IrType,
}

impl ExternDecl {
    /// Create a new extern declaration
    pub fn new(name: &str, params: Vec<IrType>, ret: IrType) -> Self {
        Self {
            name: name.to_string(),
            params,
            ret,
        }
    }
}

/// Function body: an entry block plus the blocks reachable from it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Function {
    /// Function name
    pub name: String,
    /// Return type
    pub ret: IrType,
    /// Blocks in creation order
    pub blocks: Vec<BasicBlock>,
    /// Entry block
    pub entry: BlockId,
}

impl Function {
    /// Create a function with no blocks yet
    pub fn new(name: &str, ret: IrType) -> Self {
        Self {
            name: name.to_string(),
            ret,
            blocks: Vec::new(),
            entry: BlockId(0),
        }
    }

    /// Look up a block by id
    pub fn block(&self, id: BlockId) -> Option<&BasicBlock> {
        self.blocks.get(id.0 as usize)
    }

    /// Look up a block by label
    pub fn block_by_label(&self, label: &str) -> Option<&BasicBlock> {
        self.blocks.iter().find(|b| b.label == label)
    }

    /// The entry block, if the function has any blocks
    pub fn entry_block(&self) -> Option<&BasicBlock> {
        self.block(self.entry)
    }

    /// Blocks that branch to `id`
    pub fn predecessors(&self, id: BlockId) -> Vec<BlockId> {
        self.blocks
            .iter()
            .filter(|b| b.successors().contains(&id))
            .map(|b| b.id)
            .collect()
    }

    /// Number of straight-line instructions across all blocks
    pub fn instruction_count(&self) -> usize {
        self.blocks.iter().map(|b| b.instructions.len()).sum()
    }

    /// Iterate over every straight-line instruction in block order
    pub fn instructions(&self) -> impl Iterator<Item = &IrInstruction> {
        self.blocks.iter().flat_map(|b| b.instructions.iter())
    }
}

/// Complete translation unit handed to the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Module {
    /// Module name
    pub name: String,
    /// Declared external symbols
    pub externs: Vec<ExternDecl>,
    /// Defined functions
    pub functions: Vec<Function>,
}

impl Module {
    /// Create a new empty module
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            externs: Vec::new(),
            functions: Vec::new(),
        }
    }

    /// Look up a function by name
    pub fn function(&self, name: &str) -> Option<&Function> {
        self.functions.iter().find(|f| f.name == name)
    }

    /// Look up an extern declaration by name
    pub fn extern_decl(&self, name: &str) -> Option<&ExternDecl> {
        self.externs.iter().find(|e| e.name == name)
    }

    /// Serialize the module as pretty-printed JSON
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| Error::serialization(e.to_string()))
    }

    /// Deserialize a module from JSON
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::serialization(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::ir::IrReg;

    fn diamond() -> Function {
        let mut func = Function::new("main", IrType::I32);
        let mut entry = BasicBlock::new(BlockId(0), "entry");
        entry.instructions.push(IrInstruction::Const(IrReg(0), IrType::I1, 1));
        entry.terminator = Some(Terminator::CondBr {
            cond: IrReg(0),
            then_block: BlockId(1),
            else_block: BlockId(2),
        });
        let mut left = BasicBlock::new(BlockId(1), "left");
        left.terminator = Some(Terminator::Br(BlockId(2)));
        let mut exit = BasicBlock::new(BlockId(2), "exit");
        exit.terminator = Some(Terminator::Ret(None));
        func.blocks = vec![entry, left, exit];
        func
    }

    #[test]
    fn test_predecessors() {
        let func = diamond();
        assert_eq!(func.predecessors(BlockId(2)), vec![BlockId(0), BlockId(1)]);
        assert!(func.predecessors(BlockId(0)).is_empty());
        assert_eq!(func.block_by_label("left").map(|b| b.id), Some(BlockId(1)));
        assert_eq!(func.instruction_count(), 1);
    }

    #[test]
    fn test_json_roundtrip() {
        let mut module = Module::new("m");
        module
            .externs
            .push(ExternDecl::new("read_byte", vec![], IrType::I8));
        module.functions.push(diamond());

        let json = module.to_json().unwrap();
        assert!(json.contains("read_byte"));
        assert_eq!(Module::from_json(&json).unwrap(), module);
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        let err = Module::from_json("{not json").unwrap_err();
        assert!(matches!(err, Error::Serialization(_)));
    }
}
