//! Universal invariants from the testable-properties section: lexer
//! round-tripping, interner idempotency, determinism, call-frame
//! cleanup, array arithmetic identities, and the sort/reverse laws.

use pretty_assertions::assert_eq;
use vylang::lexer::TokenKind;
use vylang::{run, Interner, Lexer};

#[test]
fn lexing_twice_produces_identical_token_streams() {
    let src = "sub fact(n) { if n <= 1 { return 1; } return n * fact(n - 1); } log(fact(5));";
    let (a, warnings_a) = Lexer::new(src).tokenize();
    let (b, warnings_b) = Lexer::new(src).tokenize();
    assert_eq!(a, b);
    assert!(warnings_a.is_empty());
    assert!(warnings_b.is_empty());
}

#[test]
fn lexer_never_aborts_on_unexpected_bytes() {
    let (tokens, warnings) = Lexer::new("x = 1; ` y = 2;").tokenize();
    assert!(!warnings.is_empty());
    assert!(tokens.iter().any(|t| t.kind == TokenKind::Identifier && t.text == "y"));
}

#[test]
fn intern_is_idempotent_and_roundtrips() {
    let mut interner = Interner::new();
    let a = interner.intern("fact");
    let b = interner.intern("fact");
    let c = interner.intern("other");
    assert_eq!(a, b);
    assert_ne!(a, c);
    assert_eq!(interner.get(a), "fact");
}

#[test]
fn evaluating_the_same_program_twice_is_deterministic() {
    let src = "sub f(n) { return n * 2; } f(21);";
    let a = run(src).unwrap().unwrap();
    let b = run(src).unwrap().unwrap();
    assert_eq!(a.as_number(), b.as_number());
}

#[test]
fn array_literal_size_and_indexing_agree_with_construction() {
    let v = run("a = [10, 20, 30]; a.size();").unwrap().unwrap();
    assert_eq!(v.as_number(), Some(3.0));
    for (i, expected) in [10.0, 20.0, 30.0].into_iter().enumerate() {
        let v = run(&format!("a = [10, 20, 30]; a[{i}];")).unwrap().unwrap();
        assert_eq!(v.as_number(), Some(expected));
    }
}

#[test]
fn division_and_floor_division_identities_hold() {
    let v = run("(7 / 2) * 2;").unwrap().unwrap();
    assert!((v.as_number().unwrap() - 7.0).abs() < 1e-9);

    let v = run("(7 // 2) * 2 + (7 % 2);").unwrap().unwrap();
    assert_eq!(v.as_number(), Some(7.0));
}

#[test]
fn array_concatenation_size_is_additive_and_prefix_preserving() {
    let v = run("([1, 2] + [3, 4, 5]).size();").unwrap().unwrap();
    assert_eq!(v.as_number(), Some(5.0));

    let v = run("a = [1, 2]; b = [3, 4, 5]; c = a + b; c[0];").unwrap().unwrap();
    assert_eq!(v.as_number(), Some(1.0));
    let v = run("a = [1, 2]; b = [3, 4, 5]; c = a + b; c[1];").unwrap().unwrap();
    assert_eq!(v.as_number(), Some(2.0));
}

#[test]
fn sort_is_a_permutation_and_non_decreasing() {
    let v = run("a = [5, 3, 4, 1, 2]; a.sort();").unwrap().unwrap();
    let sorted: Vec<f64> = v.as_array().unwrap().borrow().iter().map(|x| x.as_number().unwrap()).collect();
    assert_eq!(sorted, vec![1.0, 2.0, 3.0, 4.0, 5.0]);
    assert!(sorted.windows(2).all(|w| w[0] <= w[1]));
}

#[test]
fn reverse_is_an_involution() {
    let v = run("a = [1, 2, 3, 4]; a.reverse(); a.reverse();").unwrap().unwrap();
    let nums: Vec<f64> = v.as_array().unwrap().borrow().iter().map(|x| x.as_number().unwrap()).collect();
    assert_eq!(nums, vec![1.0, 2.0, 3.0, 4.0]);
}

#[test]
fn call_frame_is_gone_after_a_function_that_errors_midway() {
    let interner = Interner::new();
    let (tokens, _) = Lexer::new("sub boom(n) { return n / 0; } boom(1);").tokenize();
    let mut interner = interner;
    let program = vylang::Parser::new(tokens, &mut interner).parse_program().unwrap();
    let mut interp = vylang::Interpreter::new();
    interp.interner = interner;
    assert!(interp.run_program(&program).is_err());
    assert!(interp.namespaces.groups().all(|g| !g.starts_with("call_")));
}
