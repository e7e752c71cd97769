//! Emo Parser
//!
//! Converts Emo source code into a concrete syntax tree with source location
//! tracking. The grammar lives in `grammar.pest` and is compiled once, at build
//! time, by `pest_derive`. This parser is purely syntactic: symbolic tokens are
//! kept exactly as written.

use pest::{error::Error, iterators::Pair, Parser};
use pest_derive::Parser;

use crate::errors::{EmoError, ErrorKind, ErrorReporting, PhaseContext, SourceContext};
use crate::syntax::{Child, RuleId, Span, SyntaxTree, Token};

#[derive(Parser)]
#[grammar = "syntax/grammar.pest"]
struct EmoParser;

// ============================================================================
// PUBLIC API
// ============================================================================

/// Parse Emo source code into a tree rooted at a `program` node.
pub fn parse(source: &SourceContext) -> Result<SyntaxTree, EmoError> {
    let ctx = PhaseContext::new(source.clone(), "parse");

    let mut pairs = EmoParser::parse(Rule::program, &source.content)
        .map_err(|e| convert_parse_error(e, &ctx))?;

    let program = pairs
        .next()
        .ok_or_else(|| ctx.internal_error("program", Span::default()))?;

    build_tree(RuleId::Program, program, &ctx)
}

// ============================================================================
// TREE BUILDERS
// ============================================================================

fn build_child(pair: Pair<Rule>, ctx: &PhaseContext) -> Result<Child, EmoError> {
    let rule = pair.as_rule();
    if is_terminal(rule) {
        let token = Token::new(pair.as_str(), get_span(&pair));
        if rule == Rule::NUMBER {
            check_number(&token, ctx)?;
        }
        return Ok(Child::Token(token));
    }

    let Some(id) = rule_id(rule) else {
        return Err(ctx.internal_error(&format!("{rule:?}"), get_span(&pair)));
    };

    if id.is_binary() {
        build_chain(id, pair, ctx)
    } else {
        build_tree(id, pair, ctx).map(Child::Tree)
    }
}

fn build_tree(id: RuleId, pair: Pair<Rule>, ctx: &PhaseContext) -> Result<SyntaxTree, EmoError> {
    let span = get_span(&pair);
    let children = pair
        .into_inner()
        .filter(|p| p.as_rule() != Rule::EOI)
        .map(|p| build_child(p, ctx))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(SyntaxTree::spanned(id, children, span))
}

/// Folds `operand (operator operand)*` into left-nested nodes of rule `id`.
/// A level with a single operand produces no node of its own.
fn build_chain(id: RuleId, pair: Pair<Rule>, ctx: &PhaseContext) -> Result<Child, EmoError> {
    let span = get_span(&pair);
    let mut inner = pair.into_inner();

    let first = inner
        .next()
        .ok_or_else(|| ctx.internal_error(id.name(), span))?;
    let mut acc = build_child(first, ctx)?;

    while let Some(operator) = inner.next() {
        let operand = inner
            .next()
            .ok_or_else(|| ctx.internal_error(id.name(), span))?;
        let operator = build_child(operator, ctx)?;
        let operand = build_child(operand, ctx)?;
        let node_span = acc.span().to(operand.span());
        acc = Child::Tree(SyntaxTree::spanned(id, vec![acc, operator, operand], node_span));
    }

    Ok(acc)
}

/// Number literals must fit the runtime representation: `i64`, or `f64` when
/// a fractional part is present.
fn check_number(token: &Token, ctx: &PhaseContext) -> Result<(), EmoError> {
    let text = token.text.as_str();
    let fits = if text.contains('.') {
        text.parse::<f64>().is_ok()
    } else {
        text.parse::<i64>().is_ok()
    };
    if fits {
        return Ok(());
    }
    Err(ctx.report_at(
        ErrorKind::InvalidLiteral {
            literal_type: "number".into(),
            value: text.into(),
        },
        token.span,
    ))
}

fn is_terminal(rule: Rule) -> bool {
    matches!(
        rule,
        Rule::IF
            | Rule::ELIF
            | Rule::ELSE
            | Rule::LOR
            | Rule::LAND
            | Rule::BOR
            | Rule::BXOR
            | Rule::BAND
            | Rule::REL_OP
            | Rule::ADD_OP
            | Rule::MUL_OP
            | Rule::UNARY_OP
            | Rule::TRUE
            | Rule::FALSE
            | Rule::NUMBER
            | Rule::STRING_BODY
            | Rule::IDENT
    )
}

fn rule_id(rule: Rule) -> Option<RuleId> {
    let id = match rule {
        Rule::program => RuleId::Program,
        Rule::suite => RuleId::Suite,
        Rule::declare_stmt => RuleId::DeclareStmt,
        Rule::assignment_stmt => RuleId::AssignmentStmt,
        Rule::print_stmt => RuleId::PrintStmt,
        Rule::if_stmt => RuleId::IfStmt,
        Rule::while_stmt => RuleId::WhileStmt,
        Rule::for_stmt => RuleId::ForStmt,
        Rule::for_decl => RuleId::ForDecl,
        Rule::for_test => RuleId::ForTest,
        Rule::for_updates => RuleId::ForUpdates,
        Rule::flow_stmt => RuleId::FlowStmt,
        Rule::break_stmt => RuleId::BreakStmt,
        Rule::continue_stmt => RuleId::ContinueStmt,
        Rule::logical_or_expression => RuleId::LogicalOrExpression,
        Rule::logical_and_expression => RuleId::LogicalAndExpression,
        Rule::inclusive_or_expression => RuleId::InclusiveOrExpression,
        Rule::exclusive_or_expression => RuleId::ExclusiveOrExpression,
        Rule::and_expression => RuleId::AndExpression,
        Rule::equality_expression => RuleId::EqualityExpression,
        Rule::additive_expression => RuleId::AdditiveExpression,
        Rule::multiplicative_expression => RuleId::MultiplicativeExpression,
        Rule::cast_expression => RuleId::CastExpression,
        Rule::boolean => RuleId::Boolean,
        Rule::number => RuleId::Number,
        Rule::string => RuleId::String,
        Rule::name => RuleId::Name,
        _ => return None,
    };
    Some(id)
}

// ============================================================================
// UTILITIES
// ============================================================================

fn get_span(pair: &Pair<Rule>) -> Span {
    Span {
        start: pair.as_span().start(),
        end: pair.as_span().end(),
    }
}

/// Human-readable names for rules that show up in "expected ..." messages.
fn describe_rule(rule: &Rule) -> String {
    match rule {
        Rule::EOI => "end of input",
        Rule::REL_OP => "relational operator",
        Rule::ADD_OP => "➕ or ➖",
        Rule::MUL_OP => "✖, ➗ or 📎",
        Rule::UNARY_OP => "❗ or 〰",
        Rule::LOR => "😇",
        Rule::LAND => "😠",
        Rule::BOR => "☯",
        Rule::BXOR => "⚓",
        Rule::BAND => "⚛",
        Rule::ELIF => "🏳",
        Rule::ELSE => "🏁",
        Rule::IF => "🚩",
        Rule::IDENT | Rule::name => "name",
        Rule::NUMBER | Rule::number => "number",
        Rule::boolean => "✔ or ❌",
        Rule::string => "string",
        Rule::suite => "statement",
        other => return format!("{other:?}"),
    }
    .to_string()
}

fn convert_parse_error(error: Error<Rule>, ctx: &PhaseContext) -> EmoError {
    let span = match error.location {
        pest::error::InputLocation::Pos(pos) => Span {
            start: pos,
            end: pos,
        },
        pest::error::InputLocation::Span((start, end)) => Span { start, end },
    };

    let error = error.renamed_rules(describe_rule);
    let message = error.variant.message().into_owned();

    ctx.report_at(ErrorKind::Syntax { message }, span)
}
