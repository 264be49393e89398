//! Debug utilities for inspecting emitted IR
//!
//! The text produced here is for humans; backends consume [`Module`] directly.

use super::ir::{BlockId, Function, IrInstruction, Module, Terminator};
use std::fmt;

/// Print a module in human-readable format
pub fn dump_ir(module: &Module) {
    println!("═══════════════════════════════════════════════════════════");
    println!("                    IR DUMP");
    println!("═══════════════════════════════════════════════════════════");
    print!("{}", format_module(module));
    println!("═══════════════════════════════════════════════════════════\n");
}

/// Render a whole module
pub fn format_module(module: &Module) -> String {
    let mut out = format!("; module {}\n", module.name);
    for decl in &module.externs {
        let params: Vec<String> = decl.params.iter().map(ToString::to_string).collect();
        out.push_str(&format!(
            "declare {} @{}({})\n",
            decl.ret,
            decl.name,
            params.join(", ")
        ));
    }
    for function in &module.functions {
        out.push('\n');
        out.push_str(&format_function(function));
    }
    out
}

/// Render one function with its blocks in creation order
pub fn format_function(function: &Function) -> String {
    let mut out = format!("define {} @{}() {{\n", function.ret, function.name);
    for block in &function.blocks {
        out.push_str(&format!("{}:\n", block.label));
        for instr in &block.instructions {
            out.push_str(&format!("  {}\n", format_instr(instr)));
        }
        match &block.terminator {
            Some(term) => out.push_str(&format!("  {}\n", format_terminator(term, function))),
            None => out.push_str("  ; <unterminated>\n"),
        }
    }
    out.push_str("}\n");
    out
}

/// Format a single IR instruction
pub fn format_instr(instr: &IrInstruction) -> String {
    match instr {
        IrInstruction::Const(dst, ty, val) => format!("r{} = {} {}", dst.0, ty, val),
        IrInstruction::Alloca(dst, ty, count) => {
            format!("r{} = alloca {} x {}", dst.0, ty, count)
        }
        IrInstruction::Load(dst, ty, ptr) => format!("r{} = load {}, [r{}]", dst.0, ty, ptr.0),
        IrInstruction::Store(ty, val, ptr) => format!("store {} r{}, [r{}]", ty, val.0, ptr.0),
        IrInstruction::Gep(dst, ty, base, idx) => {
            format!("r{} = gep {}, r{}, r{}", dst.0, ty, base.0, idx.0)
        }
        IrInstruction::Add(dst, ty, a, b) => format!("r{} = add {} r{}, r{}", dst.0, ty, a.0, b.0),
        IrInstruction::Sub(dst, ty, a, b) => format!("r{} = sub {} r{}, r{}", dst.0, ty, a.0, b.0),
        IrInstruction::ICmpNe(dst, ty, a, b) => {
            format!("r{} = icmp ne {} r{}, r{}", dst.0, ty, a.0, b.0)
        }
        IrInstruction::Call(dst, name, args) => {
            let args_str: Vec<String> = args.iter().map(|r| format!("r{}", r.0)).collect();
            match dst {
                Some(d) => format!("r{} = call @{}({})", d.0, name, args_str.join(", ")),
                None => format!("call @{}({})", name, args_str.join(", ")),
            }
        }
    }
}

/// Format a terminator, resolving block ids to labels through `function`
pub fn format_terminator(term: &Terminator, function: &Function) -> String {
    let label = |id: &BlockId| {
        function
            .block(*id)
            .map(|b| b.label.clone())
            .unwrap_or_else(|| format!("#{}", id.0))
    };
    match term {
        Terminator::Br(target) => format!("br {}", label(target)),
        Terminator::CondBr {
            cond,
            then_block,
            else_block,
        } => format!(
            "condbr r{}, {}, {}",
            cond.0,
            label(then_block),
            label(else_block)
        ),
        Terminator::Ret(Some(reg)) => format!("ret r{}", reg.0),
        Terminator::Ret(None) => "ret".to_string(),
    }
}

impl fmt::Display for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_module(self))
    }
}
