// tests/parser_tests.rs

use emolang::errors::ErrorCategory;
use emolang::syntax::parser::parse;
use emolang::{Child, RuleId, SourceContext, SyntaxTree};

fn parsed(source: &str) -> SyntaxTree {
    parse(&SourceContext::from_file("test.emo", source)).unwrap()
}

/// The single top-level statement of a program.
fn only_statement(source: &str) -> SyntaxTree {
    let program = parsed(source);
    assert_eq!(program.rule, RuleId::Program);
    assert_eq!(program.children.len(), 1, "expected one statement in {source:?}");
    program.subtree(0).unwrap().clone()
}

#[test]
fn empty_program_has_no_children() {
    let program = parsed("\n");
    assert_eq!(program.rule, RuleId::Program);
    assert!(program.children.is_empty());
}

#[test]
fn declaration_with_initializer() {
    let stmt = only_statement("📢 x 😌 1");
    assert_eq!(stmt.rule, RuleId::DeclareStmt);

    let binding = stmt.subtree(0).unwrap();
    assert_eq!(binding.rule, RuleId::AssignmentStmt);
    assert_eq!(binding.subtree(0).unwrap().rule, RuleId::Name);
    // A lone operand still sits under a cast_expression node.
    assert_eq!(binding.subtree(1).unwrap().rule, RuleId::CastExpression);
}

#[test]
fn declaration_list_keeps_every_declarator() {
    let stmt = only_statement("📢 a 🗿 b 😌 2 🗿 c");
    let rules: Vec<_> = stmt
        .children
        .iter()
        .filter_map(Child::as_tree)
        .map(|t| t.rule)
        .collect();
    assert_eq!(
        rules,
        vec![RuleId::Name, RuleId::AssignmentStmt, RuleId::Name]
    );
}

#[test]
fn multiplication_binds_tighter_than_addition() {
    let stmt = only_statement("1 ➕ 2 ✖ 3");
    assert_eq!(stmt.rule, RuleId::AdditiveExpression);
    assert_eq!(stmt.token(1).unwrap().text, "➕");
    let rhs = stmt.subtree(2).unwrap();
    assert_eq!(rhs.rule, RuleId::MultiplicativeExpression);
    assert_eq!(rhs.token(1).unwrap().text, "✖");
}

#[test]
fn operator_chains_fold_left() {
    let stmt = only_statement("a ➖ b ➕ c");
    assert_eq!(stmt.children.len(), 3);
    assert_eq!(stmt.token(1).unwrap().text, "➕");
    let inner = stmt.subtree(0).unwrap();
    assert_eq!(inner.rule, RuleId::AdditiveExpression);
    assert_eq!(inner.token(1).unwrap().text, "➖");
}

#[test]
fn two_glyph_relational_operators_are_one_token() {
    for op in ["😁😌", "😭😌", "😌😌", "❗😌", "😭", "😁"] {
        let stmt = only_statement(&format!("a {op} b"));
        assert_eq!(stmt.rule, RuleId::EqualityExpression);
        assert_eq!(stmt.token(1).unwrap().text, op);
    }
}

#[test]
fn unary_operator_nests_cast_expressions() {
    let stmt = only_statement("❗ 〰 x");
    assert_eq!(stmt.rule, RuleId::CastExpression);
    assert_eq!(stmt.token(0).unwrap().text, "❗");
    let inner = stmt.subtree(1).unwrap();
    assert_eq!(inner.token(0).unwrap().text, "〰");
    assert_eq!(inner.subtree(1).unwrap().children.len(), 1);
}

#[test]
fn variation_selector_is_ignored() {
    let stmt = only_statement("✔\u{FE0F}");
    let boolean = stmt.subtree(0).unwrap();
    assert_eq!(boolean.rule, RuleId::Boolean);
    assert_eq!(boolean.token(0).unwrap().text, "✔");
}

#[test]
fn comments_are_skipped() {
    let program = parsed("💩 a comment ➕ ➖\n🖨 👉 1 👈 💩 trailing\n");
    assert_eq!(program.children.len(), 1);
    assert_eq!(program.subtree(0).unwrap().rule, RuleId::PrintStmt);
}

#[test]
fn string_literal_keeps_inner_text() {
    let stmt = only_statement("\"hi there\"");
    let string = stmt.subtree(0).unwrap();
    assert_eq!(string.rule, RuleId::String);
    assert_eq!(string.token(0).unwrap().text, "hi there");
}

#[test]
fn if_statement_keeps_keywords_in_place() {
    let stmt = only_statement("🚩 👉 a 👈 🍽 🥂 🏳 👉 b 👈 🍽 🥂 🏁 🍽 🥂");
    assert_eq!(stmt.rule, RuleId::IfStmt);
    let keywords: Vec<_> = stmt
        .children
        .iter()
        .filter_map(Child::as_token)
        .map(|t| t.text.as_str())
        .collect();
    assert_eq!(keywords, vec!["🚩", "🏳", "🏁"]);
    assert_eq!(stmt.children.len(), 8);
    assert_eq!(stmt.subtree(2).unwrap().rule, RuleId::Suite);
}

#[test]
fn for_statement_has_four_parts() {
    let stmt = only_statement("📀 👉 📢 i 😌 0 👄 i 😭 3 👄 i 😌 i ➕ 1 👈 🍽 ⏸ 🥂");
    assert_eq!(stmt.rule, RuleId::ForStmt);
    let rules: Vec<_> = stmt
        .children
        .iter()
        .filter_map(Child::as_tree)
        .map(|t| t.rule)
        .collect();
    assert_eq!(
        rules,
        vec![RuleId::ForDecl, RuleId::ForTest, RuleId::ForUpdates, RuleId::Suite]
    );
}

#[test]
fn empty_for_clauses_are_empty_nodes() {
    let stmt = only_statement("📀 👉 👄 👄 👈 🍽 ⏸ 🥂");
    for i in 0..3 {
        assert!(stmt.subtree(i).unwrap().children.is_empty());
    }
}

#[test]
fn token_spans_point_into_the_source() {
    let source = "a ➕ b";
    let stmt = only_statement(source);
    let op = stmt.token(1).unwrap();
    assert_eq!(&source[op.span.start..op.span.end], "➕");
}

#[test]
fn unclosed_print_is_a_parse_error() {
    let err = parse(&SourceContext::from_file("bad.emo", "🖨 👉 1")).unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Parse);
    assert_eq!(err.diagnostic_info.error_code, "emo::parse::syntax");
}
