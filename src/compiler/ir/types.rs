//! IR value types

use serde::{Deserialize, Serialize};
use std::fmt;

/// Primitive IR type
///
/// The IR is untyped memory plus a handful of fixed-width integers. Pointers
/// are opaque; all address arithmetic goes through `gep`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IrType {
    /// 1-bit boolean (comparison results)
    I1,
    /// 8-bit cell value
    I8,
    /// 32-bit integer (status codes, return value)
    I32,
    /// 64-bit integer (data pointer index, lengths)
    I64,
    /// Opaque pointer
    Ptr,
    /// No value
    Void,
}

impl IrType {
    /// Size in bytes when stored to memory (i1 occupies a full byte)
    pub fn size(self) -> u64 {
        match self {
            IrType::I1 | IrType::I8 => 1,
            IrType::I32 => 4,
            IrType::I64 | IrType::Ptr => 8,
            IrType::Void => 0,
        }
    }

    /// Bit width of integer types, `None` for pointers and void
    pub fn bit_width(self) -> Option<u32> {
        match self {
            IrType::I1 => Some(1),
            IrType::I8 => Some(8),
            IrType::I32 => Some(32),
            IrType::I64 => Some(64),
            IrType::Ptr | IrType::Void => None,
        }
    }

    /// Truncates a raw value to this type's width
    pub fn truncate(self, value: u64) -> u64 {
        match self.bit_width() {
            Some(64) | None => value,
            Some(bits) => value & ((1u64 << bits) - 1),
        }
    }
}

impl fmt::Display for IrType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            IrType::I1 => "i1",
            IrType::I8 => "i8",
            IrType::I32 => "i32",
            IrType::I64 => "i64",
            IrType::Ptr => "ptr",
            IrType::Void => "void",
        };
        f.write_str(name)
    }
}
