//! # External Runtime Bindings
//!
//! Symbols the emitted module calls but never defines. They are resolved by
//! whatever links the backend's output; the translator only names them.
//!
//! | Role | Signature |
//! |------|-----------|
//! | read | `read_byte() -> i8` |
//! | write | `write_byte(i8) -> i32` |
//! | fill | `fill(ptr, i8, i64) -> void` |

use super::ir::{ExternDecl, IrType};
use serde::{Deserialize, Serialize};

/// Parameter and return types of `read_byte`
pub const READ_BYTE_SIG: (&[IrType], IrType) = (&[], IrType::I8);
/// Parameter and return types of `write_byte`
pub const WRITE_BYTE_SIG: (&[IrType], IrType) = (&[IrType::I8], IrType::I32);
/// Parameter and return types of `fill`
pub const FILL_SIG: (&[IrType], IrType) = (&[IrType::Ptr, IrType::I8, IrType::I64], IrType::Void);

/// Which runtime capability a symbol provides
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeRole {
    /// Read one byte of input
    ReadByte,
    /// Write one byte of output
    WriteByte,
    /// Fill a buffer with a byte value
    Fill,
}

/// Link-time names of the three runtime capabilities
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeSymbols {
    /// Symbol for byte input
    pub read_byte: String,
    /// Symbol for byte output
    pub write_byte: String,
    /// Symbol for bulk fill
    pub fill: String,
}

impl Default for RuntimeSymbols {
    fn default() -> Self {
        Self {
            read_byte: "read_byte".to_string(),
            write_byte: "write_byte".to_string(),
            fill: "fill".to_string(),
        }
    }
}

impl RuntimeSymbols {
    /// Extern declarations for all three symbols, in read/write/fill order
    pub fn declarations(&self) -> Vec<ExternDecl> {
        [
            (&self.read_byte, READ_BYTE_SIG),
            (&self.write_byte, WRITE_BYTE_SIG),
            (&self.fill, FILL_SIG),
        ]
        .into_iter()
        .map(|(name, (params, ret))| ExternDecl::new(name, params.to_vec(), ret))
        .collect()
    }

    /// Map a called symbol name back to its role
    pub fn role_of(&self, name: &str) -> Option<RuntimeRole> {
        if name == self.read_byte {
            Some(RuntimeRole::ReadByte)
        } else if name == self.write_byte {
            Some(RuntimeRole::WriteByte)
        } else if name == self.fill {
            Some(RuntimeRole::Fill)
        } else {
            None
        }
    }
}
