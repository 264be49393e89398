//! Direct interpreter for Brainfuck source, used as the reference semantics
//! that translated IR is checked against.

#![allow(dead_code)]

/// Why a reference run stopped early
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefError {
    /// A cell access fell outside the tape
    OutOfBounds,
    /// More than the allowed number of commands executed
    StepLimit,
    /// Brackets do not match
    Unbalanced,
}

/// Final machine state of a reference run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefOutcome {
    pub output: Vec<u8>,
    pub tape: Vec<u8>,
    pub pointer: u64,
}

/// Run `source` on a zeroed tape of `cells` cells; reads past the input yield 0
pub fn run_reference(
    source: &[u8],
    input: &[u8],
    cells: usize,
    step_limit: u64,
) -> Result<RefOutcome, RefError> {
    let program: Vec<u8> = source
        .iter()
        .copied()
        .filter(|b| b"><+-.,[]".contains(b))
        .collect();
    let jumps = match_brackets(&program)?;

    let mut tape = vec![0u8; cells];
    let mut pointer: u64 = 0;
    let mut output = Vec::new();
    let mut input_pos = 0;
    let mut pc = 0;
    let mut steps = 0;

    while pc < program.len() {
        steps += 1;
        if steps > step_limit {
            return Err(RefError::StepLimit);
        }
        match program[pc] {
            b'>' => pointer = pointer.wrapping_add(1),
            b'<' => pointer = pointer.wrapping_sub(1),
            b'+' => {
                let cell = cell_mut(&mut tape, pointer)?;
                *cell = cell.wrapping_add(1);
            }
            b'-' => {
                let cell = cell_mut(&mut tape, pointer)?;
                *cell = cell.wrapping_sub(1);
            }
            b'.' => output.push(*cell_mut(&mut tape, pointer)?),
            b',' => {
                let byte = input.get(input_pos).copied().unwrap_or(0);
                input_pos += 1;
                *cell_mut(&mut tape, pointer)? = byte;
            }
            b'[' => {
                if *cell_mut(&mut tape, pointer)? == 0 {
                    pc = jumps[pc];
                }
            }
            b']' => {
                if *cell_mut(&mut tape, pointer)? != 0 {
                    pc = jumps[pc];
                }
            }
            _ => unreachable!(),
        }
        pc += 1;
    }

    Ok(RefOutcome {
        output,
        tape,
        pointer,
    })
}

fn cell_mut(tape: &mut [u8], pointer: u64) -> Result<&mut u8, RefError> {
    usize::try_from(pointer)
        .ok()
        .and_then(|i| tape.get_mut(i))
        .ok_or(RefError::OutOfBounds)
}

fn match_brackets(program: &[u8]) -> Result<Vec<usize>, RefError> {
    let mut jumps = vec![0; program.len()];
    let mut open = Vec::new();
    for (i, &b) in program.iter().enumerate() {
        match b {
            b'[' => open.push(i),
            b']' => {
                let start = open.pop().ok_or(RefError::Unbalanced)?;
                jumps[start] = i;
                jumps[i] = start;
            }
            _ => {}
        }
    }
    if open.is_empty() {
        Ok(jumps)
    } else {
        Err(RefError::Unbalanced)
    }
}

/// Independent bracket check: offset of the first unmatched `]`, or of the
/// innermost unclosed `[` at end of input
pub fn first_bracket_error(source: &[u8]) -> Option<(bool, usize)> {
    let mut open = Vec::new();
    for (i, &b) in source.iter().enumerate() {
        match b {
            b'[' => open.push(i),
            b']' => {
                if open.pop().is_none() {
                    return Some((true, i));
                }
            }
            _ => {}
        }
    }
    open.last().map(|&i| (false, i))
}
