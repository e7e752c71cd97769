//! Syntax module for the Emo language
//!
//! This module provides the concrete syntax tree produced by the grammar engine
//! in [`parser`]. A tree node records which grammar production it instantiates
//! and an ordered list of children, each either a nested node or a terminal token.

use std::fmt::{self, Write};

use serde::{Deserialize, Serialize};

pub mod parser;

/// Represents a span in the source code.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Smallest span covering both `self` and `other`.
    pub fn to(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}

// ============================================================================
// RULE IDENTITY
// ============================================================================

/// The grammar production a [`SyntaxTree`] node instantiates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleId {
    Program,
    Suite,
    DeclareStmt,
    AssignmentStmt,
    PrintStmt,
    IfStmt,
    WhileStmt,
    ForStmt,
    ForDecl,
    ForTest,
    ForUpdates,
    FlowStmt,
    BreakStmt,
    ContinueStmt,
    LogicalOrExpression,
    LogicalAndExpression,
    InclusiveOrExpression,
    ExclusiveOrExpression,
    AndExpression,
    EqualityExpression,
    AdditiveExpression,
    MultiplicativeExpression,
    CastExpression,
    Boolean,
    Number,
    String,
    Name,
}

impl RuleId {
    /// The production name as written in the grammar.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Program => "program",
            Self::Suite => "suite",
            Self::DeclareStmt => "declare_stmt",
            Self::AssignmentStmt => "assignment_stmt",
            Self::PrintStmt => "print_stmt",
            Self::IfStmt => "if_stmt",
            Self::WhileStmt => "while_stmt",
            Self::ForStmt => "for_stmt",
            Self::ForDecl => "for_decl",
            Self::ForTest => "for_test",
            Self::ForUpdates => "for_updates",
            Self::FlowStmt => "flow_stmt",
            Self::BreakStmt => "break_stmt",
            Self::ContinueStmt => "continue_stmt",
            Self::LogicalOrExpression => "logical_or_expression",
            Self::LogicalAndExpression => "logical_and_expression",
            Self::InclusiveOrExpression => "inclusive_or_expression",
            Self::ExclusiveOrExpression => "exclusive_or_expression",
            Self::AndExpression => "and_expression",
            Self::EqualityExpression => "equality_expression",
            Self::AdditiveExpression => "additive_expression",
            Self::MultiplicativeExpression => "multiplicative_expression",
            Self::CastExpression => "cast_expression",
            Self::Boolean => "boolean",
            Self::Number => "number",
            Self::String => "string",
            Self::Name => "name",
        }
    }

    /// Binary operator levels. These are shaped as `operand (operator operand)*`
    /// and folded into left-nested nodes by the parser.
    pub const fn is_binary(self) -> bool {
        matches!(
            self,
            Self::LogicalOrExpression
                | Self::LogicalAndExpression
                | Self::InclusiveOrExpression
                | Self::ExclusiveOrExpression
                | Self::AndExpression
                | Self::EqualityExpression
                | Self::AdditiveExpression
                | Self::MultiplicativeExpression
        )
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ============================================================================
// TREE
// ============================================================================

/// A terminal produced by the lexer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub text: String,
    pub span: Span,
}

impl Token {
    pub fn new(text: impl Into<String>, span: Span) -> Self {
        Self {
            text: text.into(),
            span,
        }
    }
}

/// One child slot of a [`SyntaxTree`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Child {
    Tree(SyntaxTree),
    Token(Token),
}

impl Child {
    /// A token child with an empty span, for trees assembled by hand.
    pub fn token(text: impl Into<String>) -> Self {
        Child::Token(Token::new(text, Span::default()))
    }

    pub fn span(&self) -> Span {
        match self {
            Child::Tree(tree) => tree.span,
            Child::Token(token) => token.span,
        }
    }

    pub fn as_tree(&self) -> Option<&SyntaxTree> {
        match self {
            Child::Tree(tree) => Some(tree),
            Child::Token(_) => None,
        }
    }

    pub fn as_token(&self) -> Option<&Token> {
        match self {
            Child::Token(token) => Some(token),
            Child::Tree(_) => None,
        }
    }
}

impl From<SyntaxTree> for Child {
    fn from(tree: SyntaxTree) -> Self {
        Child::Tree(tree)
    }
}

impl From<Token> for Child {
    fn from(token: Token) -> Self {
        Child::Token(token)
    }
}

/// A concrete syntax tree node: one application of a grammar rule.
///
/// Each node owns its children. Child order mirrors source order and is never
/// rearranged after parsing; later passes only replace token text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyntaxTree {
    pub rule: RuleId,
    pub children: Vec<Child>,
    pub span: Span,
}

impl SyntaxTree {
    /// Builds a node without source location.
    pub fn new(rule: RuleId, children: Vec<Child>) -> Self {
        Self::spanned(rule, children, Span::default())
    }

    pub fn spanned(rule: RuleId, children: Vec<Child>, span: Span) -> Self {
        Self {
            rule,
            children,
            span,
        }
    }

    /// A node whose only child is a token, e.g. `name` or `boolean`.
    pub fn leaf(rule: RuleId, text: impl Into<String>) -> Self {
        Self::new(rule, vec![Child::token(text)])
    }

    pub fn child(&self, index: usize) -> Option<&Child> {
        self.children.get(index)
    }

    pub fn token(&self, index: usize) -> Option<&Token> {
        self.child(index).and_then(Child::as_token)
    }

    pub fn subtree(&self, index: usize) -> Option<&SyntaxTree> {
        self.child(index).and_then(Child::as_tree)
    }

    /// All token texts beneath this node, in source order.
    pub fn terminals(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_terminals(&mut out);
        out
    }

    fn collect_terminals<'a>(&'a self, out: &mut Vec<&'a str>) {
        for child in &self.children {
            match child {
                Child::Tree(tree) => tree.collect_terminals(out),
                Child::Token(token) => out.push(&token.text),
            }
        }
    }

    /// Indented, one-node-per-line rendering of the tree.
    pub fn pretty(&self) -> String {
        let mut out = String::new();
        // Writing into a String cannot fail.
        let _ = self.write_pretty(&mut out, 0);
        out
    }

    fn write_pretty(&self, out: &mut impl Write, depth: usize) -> fmt::Result {
        let indent = "  ".repeat(depth);
        if let [Child::Token(token)] = self.children.as_slice() {
            return writeln!(out, "{indent}{}\t{}", self.rule, token.text);
        }
        writeln!(out, "{indent}{}", self.rule)?;
        for child in &self.children {
            match child {
                Child::Tree(tree) => tree.write_pretty(out, depth + 1)?,
                Child::Token(token) => writeln!(out, "{indent}  {}", token.text)?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pretty_inlines_single_token_nodes() {
        let tree = SyntaxTree::new(
            RuleId::AdditiveExpression,
            vec![
                SyntaxTree::leaf(RuleId::Name, "a").into(),
                Child::token("+"),
                SyntaxTree::leaf(RuleId::Number, "1").into(),
            ],
        );
        assert_eq!(
            tree.pretty(),
            "additive_expression\n  name\ta\n  +\n  number\t1\n"
        );
    }

    #[test]
    fn terminals_are_collected_in_order() {
        let tree = SyntaxTree::new(
            RuleId::IfStmt,
            vec![
                Child::token("🚩"),
                SyntaxTree::leaf(RuleId::Boolean, "✔").into(),
                SyntaxTree::new(RuleId::Suite, vec![]).into(),
            ],
        );
        assert_eq!(tree.terminals(), vec!["🚩", "✔"]);
    }
}
