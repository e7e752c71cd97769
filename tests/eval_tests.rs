//! Evaluation pipeline tests: parse, normalize and run whole programs.

use emolang::cli::output::OutputBuffer;
use emolang::engine::Engine;
use emolang::errors::ErrorCategory;
use emolang::{EmoError, ErrorKind, SourceContext};

fn run(source: &str) -> Result<String, EmoError> {
    let source = SourceContext::from_file("test.emo", source);
    let mut out = OutputBuffer::new();
    Engine::standard().run(&source, &mut out)?;
    Ok(out.buffer)
}

fn run_ok(source: &str) -> String {
    match run(source) {
        Ok(out) => out,
        Err(e) => panic!("program failed: {e}\n{source}"),
    }
}

fn run_err(source: &str) -> ErrorKind {
    run(source).unwrap_err().kind
}

#[test]
fn prints_arithmetic() {
    let out = run_ok("📢 a 😌 7 🗿 b 😌 2\n🖨 👉 a ➕ b 👈\n🖨 👉 a ➖ b ✖ 3 👈\n🖨 👉 a 📎 b 👈");
    assert_eq!(out, "9\n1\n1");
}

#[test]
fn division_always_yields_a_float() {
    assert_eq!(run_ok("🖨 👉 7 ➗ 2 👈"), "3.5");
    assert_eq!(run_ok("🖨 👉 4 ➗ 2 👈"), "2.0");
}

#[test]
fn parentheses_override_precedence() {
    assert_eq!(run_ok("🖨 👉 👉 1 ➕ 2 👈 ✖ 3 👈"), "9");
}

#[test]
fn division_by_zero_is_an_error() {
    assert_eq!(run_err("🖨 👉 1 ➗ 0 👈"), ErrorKind::DivisionByZero);
    assert_eq!(run_err("🖨 👉 1 📎 0 👈"), ErrorKind::DivisionByZero);
}

#[test]
fn integer_overflow_is_an_error() {
    let kind = run_err("🖨 👉 9223372036854775807 ➕ 1 👈");
    assert!(matches!(kind, ErrorKind::Overflow { .. }));
}

#[test]
fn string_concatenation() {
    assert_eq!(run_ok("🖨 👉 \"n = \" ➕ 3 👈"), "n = 3");
}

#[test]
fn type_mismatch_is_reported() {
    let kind = run_err("🖨 👉 \"a\" ➖ 1 👈");
    assert!(matches!(kind, ErrorKind::TypeMismatch { .. }));
}

#[test]
fn logic_and_bitwise_operators() {
    let out = run_ok(
        "🖨 👉 ✔ 😠 ❌ 👈\n🖨 👉 ✔ 😇 ❌ 👈\n🖨 👉 ❗ ❌ 👈\n🖨 👉 〰 5 👈\n\
         🖨 👉 6 ⚛ 3 👈\n🖨 👉 6 ☯ 3 👈\n🖨 👉 6 ⚓ 3 👈",
    );
    assert_eq!(out, "false\ntrue\ntrue\n-6\n2\n7\n5");
}

#[test]
fn logical_operators_short_circuit() {
    assert_eq!(run_ok("🖨 👉 ❌ 😠 missing 👈"), "false");
    assert_eq!(run_ok("🖨 👉 ✔ 😇 missing 👈"), "true");
}

#[test]
fn logical_operators_yield_booleans() {
    let out = run_ok("🖨 👉 2 😠 3 👈\n🖨 👉 0 😇 \"\" 👈\n🖨 👉 ❌ 😇 ❌ 😇 1 👈");
    assert_eq!(out, "true\nfalse\ntrue");
}

#[test]
fn comparisons() {
    let out = run_ok("🖨 👉 1 😭 2 👈\n🖨 👉 2 😭😌 1 👈\n🖨 👉 3 😌😌 3 👈\n🖨 👉 3 ❗😌 3 👈");
    assert_eq!(out, "true\nfalse\ntrue\nfalse");
}

#[test]
fn if_elif_else_picks_one_branch() {
    let program = |grade: i32| {
        format!(
            "📢 g 😌 {grade}\n\
             🚩 👉 g 😁😌 90 👈 🍽 🖨 👉 \"A\" 👈 🥂\n\
             🏳 👉 g 😁😌 70 👈 🍽 🖨 👉 \"B\" 👈 🥂\n\
             🏁 🍽 🖨 👉 \"C\" 👈 🥂"
        )
    };
    assert_eq!(run_ok(&program(95)), "A");
    assert_eq!(run_ok(&program(75)), "B");
    assert_eq!(run_ok(&program(10)), "C");
}

#[test]
fn while_loop_counts_down() {
    let out = run_ok("📢 n 😌 3\n💿 👉 n 😁 0 👈 🍽 🖨 👉 n 👈 n 😌 n ➖ 1 🥂");
    assert_eq!(out, "3\n2\n1");
}

#[test]
fn for_loop_with_continue_and_break() {
    let out = run_ok(
        "📢 total 😌 0\n\
         📀 👉 📢 i 😌 0 👄 i 😭 10 👄 i 😌 i ➕ 1 👈 🍽\n\
           🚩 👉 i 😌😌 3 👈 🍽 ⏩ 🥂\n\
           🚩 👉 i 😁 5 👈 🍽 ⏸ 🥂\n\
           total 😌 total ➕ i\n\
         🥂\n\
         🖨 👉 total 👈",
    );
    assert_eq!(out, "12");
}

#[test]
fn for_loop_without_test_runs_until_break() {
    let out = run_ok(
        "📀 👉 📢 i 😌 0 👄 👄 i 😌 i ➕ 1 👈 🍽 🚩 👉 i 😁😌 3 👈 🍽 ⏸ 🥂 🖨 👉 i 👈 🥂",
    );
    assert_eq!(out, "0\n1\n2");
}

#[test]
fn for_loop_variable_does_not_leak() {
    let kind = run_err("📀 👉 📢 i 😌 0 👄 i 😭 1 👄 i 😌 i ➕ 1 👈 🍽 🥂\n🖨 👉 i 👈");
    assert!(matches!(kind, ErrorKind::UndefinedSymbol { .. }));
}

#[test]
fn blocks_open_a_new_scope() {
    let out = run_ok("📢 x 😌 1\n🚩 👉 ✔ 👈 🍽 📢 x 😌 2 🖨 👉 x 👈 🥂\n🖨 👉 x 👈");
    assert_eq!(out, "2\n1");

    let kind = run_err("🚩 👉 ✔ 👈 🍽 📢 y 😌 1 🥂\n🖨 👉 y 👈");
    assert_eq!(kind, ErrorKind::UndefinedSymbol { symbol: "y".into() });
}

#[test]
fn assignment_updates_outer_scope() {
    let out = run_ok("📢 x 😌 1\n🚩 👉 ✔ 👈 🍽 x 😌 5 🥂\n🖨 👉 x 👈");
    assert_eq!(out, "5");
}

#[test]
fn declaration_without_initializer_defaults_to_zero() {
    assert_eq!(run_ok("📢 x\n🖨 👉 x 👈"), "0");
}

#[test]
fn redeclaration_in_same_scope_fails() {
    let kind = run_err("📢 x 😌 1\n📢 x 😌 2");
    assert_eq!(kind, ErrorKind::Redeclaration { symbol: "x".into() });
}

#[test]
fn assignment_to_undeclared_variable_fails() {
    let kind = run_err("x 😌 1");
    assert_eq!(
        kind,
        ErrorKind::UndeclaredAssignment {
            symbol: "x".into()
        }
    );
}

#[test]
fn loop_control_outside_a_loop_is_ignored() {
    assert_eq!(run_ok("⏸\n🖨 👉 1 👈\n⏩\n🖨 👉 2 👈"), "1\n2");
}

#[test]
fn statements_may_end_with_a_separator() {
    assert_eq!(run_ok("📢 a 😌 1 👄 🖨 👉 a 👈 👄"), "1");
}

#[test]
fn printing_an_empty_string_keeps_the_line() {
    let source = SourceContext::from_file("test.emo", "🖨 👉 \"\" 👈\n🖨 👉 1 👈\n");
    let mut out = OutputBuffer::new();
    Engine::standard().run(&source, &mut out).unwrap();
    assert_eq!(out.lines(), vec!["", "1"]);
}

#[test]
fn out_of_range_literal_fails_before_running() {
    let source = SourceContext::from_file("test.emo", "🖨 👉 1 👈\n🖨 👉 99999999999999999999 👈");
    let mut out = OutputBuffer::new();
    let err = Engine::standard().run(&source, &mut out).unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Parse);
    assert_eq!(err.diagnostic_info.error_code, "emo::parse::invalid_literal");
    assert!(out.lines().is_empty());
}

#[test]
fn output_before_a_runtime_error_is_kept() {
    let source = SourceContext::from_file("test.emo", "🖨 👉 1 👈\n🖨 👉 nope 👈\n🖨 👉 2 👈");
    let mut out = OutputBuffer::new();
    let err = Engine::standard().run(&source, &mut out).unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Runtime);
    assert_eq!(out.as_str(), "1");
}

#[test]
fn unnormalized_trees_are_rejected_by_the_evaluator() {
    let engine = Engine::standard();
    let source = SourceContext::from_file("test.emo", "🖨 👉 1 ➕ 2 👈");
    let raw = engine.parse(&source).unwrap();
    let mut out = OutputBuffer::new();
    let err = engine.execute(&raw, &source, &mut out).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::UnnormalizedToken { .. }));
    assert_eq!(err.diagnostic_info.error_code, "emo::runtime::unnormalized_token");
}
