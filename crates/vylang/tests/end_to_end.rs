//! The six literal input/output scenarios the evaluator promises to
//! preserve, run through the full lex → parse → evaluate pipeline with
//! stdout captured implicitly via the returned value (programs here
//! return the value they'd otherwise `log`).

use vylang::{run, Interner, Interpreter, Lexer, Parser};

fn eval(src: &str) -> vylang::Value {
    run(src).expect("program runs").expect("produces a value")
}

#[test]
fn arithmetic_precedence_returns_seven() {
    assert_eq!(eval("1 + 2 * 3;").as_number(), Some(7.0));
}

#[test]
fn array_sort_mutates_and_returns_sorted_array() {
    let v = eval("a = [3, 1, 2]; a.sort();");
    let nums: Vec<f64> = v.as_array().unwrap().borrow().iter().map(|x| x.as_number().unwrap()).collect();
    assert_eq!(nums, vec![1.0, 2.0, 3.0]);
}

#[test]
fn factorial_of_five_is_120() {
    let v = eval("sub fact(n) { if n <= 1 { return 1; } return n * fact(n - 1); } fact(5);");
    assert_eq!(v.as_number(), Some(120.0));
}

#[test]
fn group_member_is_readable_from_outside() {
    assert_eq!(eval("group g { x = 10; } g.x;").as_number(), Some(10.0));
}

#[test]
fn undefined_variable_after_group_scope_is_a_runtime_error() {
    let err = run("group g { x = 10; } x;").unwrap_err();
    assert!(err.to_string().contains("Variable 'x' not found"));
}

#[test]
fn through_collect_squares_first_three_integers() {
    let v = eval("through i:: 1..3 -> collect { i * i; };");
    let nums: Vec<f64> = v.as_array().unwrap().borrow().iter().map(|x| x.as_number().unwrap()).collect();
    assert_eq!(nums, vec![1.0, 4.0, 9.0]);
}

#[test]
fn reassigning_a_const_is_a_runtime_error() {
    let err = run("const pi :: Number = 3.14; pi = 3;").unwrap_err();
    assert!(err.to_string().contains("Cannot reassign read-only 'pi'"));
}

#[test]
fn vmath_module_methods_are_reachable_after_registration() {
    assert_eq!(eval("module vmath; vmath.sqrt(16);").as_number(), Some(4.0));
    assert_eq!(eval("module vmath; vmath.pi;").as_number(), Some(std::f64::consts::PI));
}

#[test]
fn dismissed_module_method_call_errors() {
    let err = run("module vmath; dismiss vmath; vmath.sqrt(4);").unwrap_err();
    assert!(err.to_string().contains("has no method"));
}

#[test]
fn vmem_usage_accounts_for_array_contents() {
    let v = eval("a = [1, 2, 3]; module vmem; vmem.usage(a);");
    assert!(v.as_number().unwrap() > 0.0);
}

#[test]
fn compile_error_has_a_line_number() {
    let mut interner = Interner::new();
    let (tokens, _) = Lexer::new("sub f(n {").tokenize();
    let err = Parser::new(tokens, &mut interner).parse_program().unwrap_err();
    assert!(err.line >= 1);
}

#[test]
fn array_method_on_anonymous_array_only_permits_size() {
    let err = run("[1, 2, 3].push(4);").unwrap_err();
    assert!(err.to_string().contains("anonymous"));
    assert_eq!(eval("[1, 2, 3].size();").as_number(), Some(3.0));
}

#[test]
fn call_frames_do_not_leak_into_a_second_run() {
    let mut interner = Interner::new();
    let (tokens, _) = Lexer::new("sub f(n) { return n + 1; } f(1); f(2);").tokenize();
    let program = Parser::new(tokens, &mut interner).parse_program().unwrap();
    let mut interp = Interpreter::new();
    interp.interner = interner;
    interp.run_program(&program).unwrap();
    assert!(interp.namespaces.groups().all(|g| !g.starts_with("call_")));
}
