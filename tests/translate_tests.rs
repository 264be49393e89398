//! End-to-end translation tests: source in, module out, module executed

mod common;

use bflower::compiler::ir::{BlockId, IrInstruction, Terminator};
use bflower::compiler::{
    format_module, CompileOptions, Compiler, Executor, RuntimeSymbols, Verifier,
};
use bflower::{translate, Error, Module, StructuralErrorKind};
use common::run_reference;

const HELLO_WORLD: &[u8] = b"++++++++[>++++[>++>+++>+++>+<<<<-]>+>+>->>+[<]<-]>>.>---.+++++++..+++.>>.<-.<.+++.------.--------.>>+.>++.";

fn branch_count(module: &Module) -> usize {
    module.functions[0]
        .blocks
        .iter()
        .filter(|b| b.terminator.as_ref().is_some_and(Terminator::is_branch))
        .count()
}

fn execute(module: &Module, input: &[u8]) -> (Vec<u8>, Vec<u8>) {
    let mut exec = Executor::default().with_step_limit(10_000_000);
    let outcome = exec.run(module, input).unwrap();
    (outcome.output, exec.allocations()[0].clone())
}

#[test]
fn test_increment_increment_output() {
    let module = translate(b"++.").unwrap();
    assert_eq!(branch_count(&module), 0);
    assert_eq!(module.functions[0].blocks.len(), 1);

    let (output, tape) = execute(&module, b"");
    assert_eq!(output, vec![2]);
    assert_eq!(tape[0], 2);
}

#[test]
fn test_single_iteration_loop() {
    let module = translate(b"+[-]").unwrap();
    assert_eq!(module.functions[0].blocks.len(), 3);

    let (output, tape) = execute(&module, b"");
    assert!(output.is_empty());
    assert_eq!(tape[0], 0);
}

#[test]
fn test_lone_closing_bracket() {
    let err = translate(b"]").unwrap_err();
    assert_eq!(err, Error::UnexpectedClosingBracket { offset: 0 });
    assert_eq!(
        err.structural_kind(),
        Some(StructuralErrorKind::UnexpectedClosingBracket)
    );
}

#[test]
fn test_lone_opening_bracket() {
    let err = translate(b"[").unwrap_err();
    assert_eq!(
        err,
        Error::UnterminatedLoop {
            offset: 1,
            opened_at: 0
        }
    );
    assert_eq!(
        err.structural_kind(),
        Some(StructuralErrorKind::UnterminatedLoop)
    );
}

#[test]
fn test_unterminated_after_balanced_prefix() {
    // Regression: a balanced prefix must not mask a later open bracket
    let err = translate(b"[-]+[>").unwrap_err();
    assert_eq!(
        err,
        Error::UnterminatedLoop {
            offset: 6,
            opened_at: 4
        }
    );
}

#[test]
fn test_extra_close_after_balanced_loop() {
    let err = translate(b"[]]").unwrap_err();
    assert_eq!(err, Error::UnexpectedClosingBracket { offset: 2 });
}

#[test]
fn test_nested_loops_pairing() {
    let module = translate(b"[[]]").unwrap();
    let main = &module.functions[0];
    // entry + two {body, end} pairs
    assert_eq!(main.blocks.len(), 5);

    let outer = (BlockId(1), BlockId(2));
    let inner = (BlockId(3), BlockId(4));
    let targets = |id: u32| match &main.blocks[id as usize].terminator {
        Some(Terminator::CondBr {
            then_block,
            else_block,
            ..
        }) => (*then_block, *else_block),
        other => panic!("block {} ends with {:?}", id, other),
    };

    assert_eq!(targets(0), outer);
    assert_eq!(targets(1), inner);
    assert_eq!(targets(3), inner);
    assert_eq!(targets(4), outer);
    assert!(matches!(
        main.blocks[2].terminator,
        Some(Terminator::Ret(_))
    ));
}

#[test]
fn test_empty_program() {
    let module = translate(b"").unwrap();
    let main = &module.functions[0];
    assert_eq!(main.blocks.len(), 1);
    assert!(main.instructions().all(|i| !i.is_arithmetic()));

    let (output, _) = execute(&module, b"");
    assert!(output.is_empty());
}

#[test]
fn test_comments_do_not_change_ir() {
    let plain = translate(b"+[->+<]").unwrap();
    let commented = translate(b"add one + then [ loop - move > add + back < ] done").unwrap();
    assert_eq!(plain, commented);
}

#[test]
fn test_hello_world_matches_reference() {
    let module = translate(HELLO_WORLD).unwrap();
    let (output, _) = execute(&module, b"");
    assert_eq!(output, b"Hello World!\n".to_vec());

    let reference = run_reference(HELLO_WORLD, b"", 30_000, 1_000_000).unwrap();
    assert_eq!(output, reference.output);
}

#[test]
fn test_cat_program() {
    let module = translate(b",[.,]").unwrap();
    let (output, _) = execute(&module, b"echo me");
    assert_eq!(output, b"echo me".to_vec());
}

#[test]
fn test_deep_nesting() {
    let depth = 2_000;
    let source: Vec<u8> = std::iter::repeat(b'[')
        .take(depth)
        .chain(std::iter::repeat(b']').take(depth))
        .collect();

    let result = Compiler::new(CompileOptions::default())
        .compile(&source)
        .unwrap();
    assert_eq!(result.stats.max_depth, depth);
    assert_eq!(result.stats.block_count, 1 + 2 * depth);
    assert!(result.verification.unwrap().valid);
}

#[test]
fn test_every_block_terminated_once() {
    let module = translate(HELLO_WORLD).unwrap();
    let main = &module.functions[0];
    assert!(main.blocks.iter().all(|b| b.terminator.is_some()));
    let loops = HELLO_WORLD.iter().filter(|&&b| b == b'[').count();
    assert_eq!(main.blocks.len(), 1 + 2 * loops);

    let report = Verifier::new().verify(&module);
    assert!(report.valid, "{:?}", report.errors);
    assert!(report.warnings.is_empty());
}

#[test]
fn test_tape_setup_precedes_commands() {
    let module = translate(b"+").unwrap();
    let entry = &module.functions[0].blocks[0].instructions;

    let fill_at = entry
        .iter()
        .position(|i| matches!(i, IrInstruction::Call(_, name, _) if name == "fill"))
        .unwrap();
    let first_add = entry.iter().position(IrInstruction::is_arithmetic).unwrap();
    assert!(fill_at < first_add);
    assert!(matches!(entry[0], IrInstruction::Alloca(..)));
}

#[test]
fn test_renamed_runtime_symbols() {
    let options = CompileOptions {
        symbols: RuntimeSymbols {
            read_byte: "getchar".to_string(),
            write_byte: "putchar".to_string(),
            fill: "memset".to_string(),
        },
        ..CompileOptions::default()
    };
    let module = Compiler::new(options.clone()).compile(b",.").unwrap().module;

    assert!(module.extern_decl("putchar").is_some());
    assert!(module.extern_decl("write_byte").is_none());
    let text = format_module(&module);
    assert!(text.contains("call @getchar()"));
    assert!(text.contains("call @memset("));

    let mut exec = Executor::new(options.symbols);
    assert_eq!(exec.run(&module, b"z").unwrap().output, b"z".to_vec());
}

#[test]
fn test_custom_cell_count() {
    let options = CompileOptions {
        cell_count: 4,
        ..CompileOptions::default()
    };
    let module = Compiler::new(options).compile(b">>>+").unwrap().module;
    let mut exec = Executor::default();
    exec.run(&module, b"").unwrap();
    assert_eq!(exec.allocations()[0], vec![0, 0, 0, 1]);

    // The emitted IR itself never bounds-checks; only the executor notices
    let module = Compiler::new(CompileOptions {
        cell_count: 4,
        ..CompileOptions::default()
    })
    .compile(b">>>>+")
    .unwrap()
    .module;
    assert!(matches!(
        Executor::default().run(&module, b""),
        Err(Error::ExecutionError(_))
    ));
}

#[test]
fn test_json_handoff() {
    let module = translate(HELLO_WORLD).unwrap();
    let json = module.to_json().unwrap();
    let restored = Module::from_json(&json).unwrap();
    assert_eq!(restored, module);

    let (output, _) = execute(&restored, b"");
    assert_eq!(output, b"Hello World!\n".to_vec());
}
