//! Loop stack for bracket matching
//!
//! Each `[` pushes the pair of blocks it created; the matching `]` pops it.
//! The stack replaces recursion, so nesting depth costs one frame of memory
//! per level and nothing on the call stack.

use super::program::BlockId;
use crate::{Error, Result};

/// Blocks generated for one open bracket
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopFrame {
    /// First block of the loop body (target of both condition checks)
    pub body: BlockId,
    /// Block following the loop
    pub end: BlockId,
    /// Byte offset of the `[` that opened the loop
    pub opened_at: usize,
}

/// LIFO stack of open loops, scoped to one translation pass
#[derive(Debug, Default)]
pub struct LoopStack {
    frames: Vec<LoopFrame>,
    max_depth: usize,
    opened: usize,
}

impl LoopStack {
    /// Create an empty stack
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a loop
    pub fn push(&mut self, frame: LoopFrame) {
        self.frames.push(frame);
        self.opened += 1;
        self.max_depth = self.max_depth.max(self.frames.len());
    }

    /// Close the innermost loop for the `]` at `offset`
    pub fn pop(&mut self, offset: usize) -> Result<LoopFrame> {
        self.frames
            .pop()
            .ok_or(Error::UnexpectedClosingBracket { offset })
    }

    /// Current nesting depth
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// True at top level
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Deepest nesting seen so far
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Total loops opened so far
    pub fn opened(&self) -> usize {
        self.opened
    }

    /// Check that every loop was closed once input ends at `end_offset`
    pub fn finish(&self, end_offset: usize) -> Result<()> {
        match self.frames.last() {
            None => Ok(()),
            Some(frame) => Err(Error::UnterminatedLoop {
                offset: end_offset,
                opened_at: frame.opened_at,
            }),
        }
    }
}
