use serde::{Deserialize, Serialize};

/// A single recognized command from the source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// The command at this position
    pub kind: Command,
    /// Byte offset of the command in the source (0-indexed)
    pub offset: usize,
}

impl Token {
    /// Creates a new token
    pub fn new(kind: Command, offset: usize) -> Self {
        Token { kind, offset }
    }
}

/// The eight commands of the instruction set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Command {
    /// `>` move the data pointer right
    IncrPtr,
    /// `<` move the data pointer left
    DecrPtr,
    /// `+` increment the current cell
    Incr,
    /// `-` decrement the current cell
    Decr,
    /// `.` write the current cell
    Output,
    /// `,` read into the current cell
    Input,
    /// `[` open a loop
    LoopOpen,
    /// `]` close a loop
    LoopClose,
}

impl Command {
    /// Classifies a source byte, returning `None` for comment bytes
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            b'>' => Some(Command::IncrPtr),
            b'<' => Some(Command::DecrPtr),
            b'+' => Some(Command::Incr),
            b'-' => Some(Command::Decr),
            b'.' => Some(Command::Output),
            b',' => Some(Command::Input),
            b'[' => Some(Command::LoopOpen),
            b']' => Some(Command::LoopClose),
            _ => None,
        }
    }

    /// The source byte for this command
    pub fn as_byte(self) -> u8 {
        match self {
            Command::IncrPtr => b'>',
            Command::DecrPtr => b'<',
            Command::Incr => b'+',
            Command::Decr => b'-',
            Command::Output => b'.',
            Command::Input => b',',
            Command::LoopOpen => b'[',
            Command::LoopClose => b']',
        }
    }

    /// True for `+ - < >`
    pub fn is_arithmetic(self) -> bool {
        matches!(
            self,
            Command::IncrPtr | Command::DecrPtr | Command::Incr | Command::Decr
        )
    }
}
