// End-to-end optimizer tests: whole sequences over objects, with the
// analyzer re-run after every step the way the exploration session does.

use crate::analysis;
use crate::ast::{Object, ParsedInput};
use crate::dialect::Dialect;
use crate::optimizer::{Disambiguator, OptimizerContext, OptimizerSuite};
use crate::parser;
use crate::printer::Printer;

fn parse_object(source: &str) -> Object {
    let parsed = match parser::parse(source) {
        Ok(parsed) => parsed,
        Err(error) => panic!("failed to parse `{}`: {}", source, error),
    };
    parsed.into_object().0
}

/// Disambiguates, then applies each step of `sequence` to the object tree
/// children-first, re-analyzing after every step.
fn run_sequence(object: &mut Object, sequence: &str) {
    let dialect = Dialect::evm();
    let disambiguated = object.for_each_mut::<()>(&mut |node| {
        let mut ctx = OptimizerContext::for_block(&dialect, &node.code);
        Disambiguator::run(&mut ctx, &mut node.code);
        Ok(())
    });
    assert!(disambiguated.is_ok());

    for step in sequence.chars() {
        let applied = object.for_each_mut(&mut |node| {
            let mut ctx = OptimizerContext::for_block(&dialect, &node.code);
            OptimizerSuite::run_sequence(&mut ctx, &step.to_string(), &mut node.code)
        });
        if let Err(error) = applied {
            panic!("step `{}` failed: {}", step, error);
        }
        if let Err(error) = analysis::analyze_object(&dialect, object) {
            panic!("output of step `{}` does not analyze: {}", step, error);
        }
    }
}

const CONTRACT: &str = r#"object "contract" {
    code {
        {
            let size := datasize("runtime")
            datacopy(0, dataoffset("runtime"), size)
            return(0, size)
        }
    }
    object "runtime" {
        code {
            function load(slot) -> value {
                value := sload(slot)
            }
            let zero := 0
            switch calldataload(zero)
            case 0 { sstore(0, load(add(1, 2))) }
            default { revert(0, 0) }
        }
        data "meta" hex"1337"
    }
}"#;

#[test]
fn the_full_suite_keeps_programs_analyzable() {
    let mut object = parse_object(CONTRACT);
    run_sequence(&mut object, "fghDdxjsnuorT");
    let printed = Printer::print_object(&object);
    // The result must still be a valid program.
    let reparsed = parse_object(&printed);
    let dialect = Dialect::evm();
    if let Err(error) = analysis::analyze_object(&dialect, &reparsed) {
        panic!("reparsed output does not analyze: {}", error);
    }
}

#[test]
fn sequences_are_deterministic() {
    let mut first = parse_object(CONTRACT);
    let mut second = parse_object(CONTRACT);
    run_sequence(&mut first, "xsnu");
    run_sequence(&mut second, "xsnu");
    assert_eq!(Printer::print_object(&first), Printer::print_object(&second));
}

#[test]
fn split_then_join_round_trips_simple_programs() {
    let source = "{ sstore(add(1, 2), mload(sub(4, 3))) }";
    let ParsedInput::Block(block) = parser::parse(source).unwrap() else {
        panic!("expected bare block");
    };
    let dialect = Dialect::evm();

    let mut split = block.clone();
    let mut ctx = OptimizerContext::for_block(&dialect, &split);
    OptimizerSuite::run_sequence(&mut ctx, "x", &mut split).unwrap();
    assert!(Printer::print_block(&split).contains("let tmp_1"));

    let mut ctx = OptimizerContext::for_block(&dialect, &split);
    OptimizerSuite::run_sequence(&mut ctx, "j", &mut split).unwrap();
    assert_eq!(Printer::print_block(&split), Printer::print_block(&block));
}

#[test]
fn simplify_and_prune_fold_constant_programs() {
    let mut object = parse_object("{ let a := add(1, 2) let b := mul(a, 0) sstore(b, a) }");
    run_sequence(&mut object, "sTsTu");
    let printed = Printer::print_block(&object.code);
    assert!(
        printed.contains("sstore(0, 3)"),
        "constants did not fold: {}",
        printed
    );
}

#[test]
fn dead_code_after_revert_is_removed() {
    let mut object = parse_object("{ revert(0, 0) sstore(0, 1) let x := 2 }");
    run_sequence(&mut object, "D");
    let printed = Printer::print_block(&object.code);
    assert!(!printed.contains("sstore"));
    assert!(printed.contains("revert(0, 0)"));
}

#[test]
fn disambiguation_makes_names_globally_unique() {
    let mut object =
        parse_object("{ { let x := 1 sstore(0, x) } { let x := 2 sstore(1, x) } }");
    run_sequence(&mut object, "f");
    let printed = Printer::print_block(&object.code);
    assert!(printed.contains("let x :="));
    assert!(printed.contains("let x_1 :="));
}

#[test]
fn sub_objects_are_optimized_too() {
    let mut object = parse_object(CONTRACT);
    run_sequence(&mut object, "sT");
    let printed = Printer::print_object(&object);
    // add(1, 2) lives in the runtime sub-object.
    assert!(printed.contains("load(3)"), "sub-object untouched: {}", printed);
}
