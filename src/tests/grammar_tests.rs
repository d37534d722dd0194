// Systematic grammar tests: each major rule from yul.pest, plus the
// analyzer checks that run right after parsing.

use crate::analysis;
use crate::ast::*;
use crate::dialect::Dialect;
use crate::parser;
use crate::printer::Printer;

fn parse_ok(source: &str) -> ParsedInput {
    match parser::parse(source) {
        Ok(parsed) => parsed,
        Err(error) => panic!("failed to parse `{}`: {}", source, error),
    }
}

fn analyze(source: &str) -> Result<(), analysis::AnalysisError> {
    let dialect = Dialect::evm();
    match parse_ok(source) {
        ParsedInput::Object(object) => analysis::analyze_object(&dialect, &object),
        ParsedInput::Block(block) => analysis::analyze_block(&dialect, &block),
    }
}

mod statements {
    use super::*;

    #[test]
    fn statement_forms_parse() {
        let cases = vec![
            "{ }",
            "{ let x := 1 }",
            "{ let x, y }",
            "{ let x := 1 x := 2 }",
            "{ if 1 { } }",
            "{ switch 1 case 0 { } case 1 { } default { } }",
            "{ for { let i := 0 } lt(i, 10) { i := add(i, 1) } { } }",
            "{ for { } 1 { } { break continue } }",
            "{ function f() { leave } }",
            "{ function f(a, b) -> c, d { c := a d := b } }",
            "{ { { } } }",
        ];
        for source in cases {
            parse_ok(source);
        }
    }

    #[test]
    fn keywords_do_not_swallow_identifier_prefixes() {
        // `letx` is an identifier, not `let` followed by `x`.
        let parsed = parse_ok("{ let letx := 1 sstore(0, letx) }");
        let ParsedInput::Block(block) = parsed else {
            panic!("expected bare block");
        };
        match &block.statements[0] {
            Statement::VariableDeclaration(declaration) => {
                assert_eq!(declaration.variables[0].as_str(), "letx");
            }
            other => panic!("expected variable declaration, got {:?}", other),
        }
    }

    #[test]
    fn malformed_inputs_are_rejected() {
        let cases = vec![
            "",
            "{",
            "{ let }",
            "{ let x := }",
            "{ if { } }",
            "{ switch }",
            "{ for { } { } { } }",
            "{ function { } }",
        ];
        for source in cases {
            assert!(
                parser::parse(source).is_err(),
                "expected parse failure for `{}`",
                source
            );
        }
    }
}

mod literals {
    use super::*;

    #[test]
    fn number_forms() {
        let cases = vec![
            ("{ let x := 0 }", "0"),
            ("{ let x := 42 }", "42"),
            ("{ let x := 0x0 }", "0x0"),
            ("{ let x := 0xdeadBEEF }", "0xdeadBEEF"),
        ];
        for (source, expected) in cases {
            let ParsedInput::Block(block) = parse_ok(source) else {
                panic!("expected bare block");
            };
            let Statement::VariableDeclaration(declaration) = &block.statements[0] else {
                panic!("expected declaration in `{}`", source);
            };
            match &declaration.value {
                Some(Expression::Literal(Literal::Number(text))) => assert_eq!(text, expected),
                other => panic!("expected number literal, got {:?}", other),
            }
        }
    }

    #[test]
    fn booleans_and_strings() {
        let ParsedInput::Block(block) =
            parse_ok("{ let t := true let f := false let s := \"he\\\"llo\" }")
        else {
            panic!("expected bare block");
        };
        assert_eq!(block.statements.len(), 3);
        let Statement::VariableDeclaration(declaration) = &block.statements[2] else {
            panic!("expected declaration");
        };
        match &declaration.value {
            Some(Expression::Literal(Literal::Str(text))) => assert_eq!(text, "he\"llo"),
            other => panic!("expected string literal, got {:?}", other),
        }
    }
}

mod objects {
    use super::*;

    const NESTED: &str = r#"object "a" {
    code { sstore(0, dataoffset("b")) }
    object "b" {
        code { sstore(0, datasize("c")) }
        object "c" { code { } }
    }
    data "payload" hex"c0ffee"
}"#;

    #[test]
    fn nested_objects_parse() {
        let ParsedInput::Object(object) = parse_ok(NESTED) else {
            panic!("expected an object");
        };
        assert_eq!(object.name, "a");
        assert_eq!(object.members.len(), 2);
        let sub: Vec<&Object> = object.sub_objects().collect();
        assert_eq!(sub[0].name, "b");
        assert_eq!(sub[0].sub_objects().next().map(|o| o.name.as_str()), Some("c"));
    }

    #[test]
    fn data_segments_survive_a_print_round_trip() {
        let ParsedInput::Object(object) = parse_ok(NESTED) else {
            panic!("expected an object");
        };
        let printed = Printer::print_object(&object);
        let ParsedInput::Object(reparsed) = parse_ok(&printed) else {
            panic!("expected an object after reprint");
        };
        assert_eq!(object, reparsed);
    }

    #[test]
    fn datasize_only_sees_immediate_members() {
        // `c` is addressable from `b`, not from `a`.
        assert!(analyze(NESTED).is_ok());
        let bad = r#"object "a" {
    code { sstore(0, datasize("c")) }
    object "b" { object "c" { code { } } code { } }
}"#;
        // `object` members must come after `code`; also `c` is out of reach.
        assert!(parser::parse(bad).is_err() || analyze(bad).is_err());
    }
}

mod analyzer {
    use super::*;

    #[test]
    fn scoping_violations_are_rejected() {
        let cases = vec![
            "{ sstore(0, x) }",
            "{ let x := x }",
            "{ { let x := 1 } sstore(0, x) }",
            "{ let x := 1 let x := 2 }",
            "{ let mload := 1 }",
            "{ break }",
            "{ leave }",
            "{ function f() { let a := 1 } sstore(0, a) }",
            // A bare literal is not a statement: it leaves a value behind.
            "{ 1 }",
        ];
        for source in cases {
            assert!(
                analyze(source).is_err(),
                "expected analysis failure for `{}`",
                source
            );
        }
    }

    #[test]
    fn valid_programs_pass() {
        let cases = vec![
            "{ let x := 1 sstore(0, x) }",
            "{ function f() -> r { r := 1 } sstore(0, f()) }",
            "{ sstore(0, f()) function f() -> r { r := 1 } }",
            "{ for { let i := 0 } lt(i, 2) { i := add(i, 1) } { if eq(i, 1) { break } } }",
            "{ function f() { leave } f() }",
        ];
        for source in cases {
            if let Err(error) = analyze(source) {
                panic!("expected `{}` to analyze, got {}", source, error);
            }
        }
    }

    #[test]
    fn builtin_arity_is_checked() {
        assert!(analyze("{ sstore(0) }").is_err());
        assert!(analyze("{ let x := add(1, 2, 3) }").is_err());
        assert!(analyze("{ let x := sstore(0, 1) }").is_err());
    }
}
