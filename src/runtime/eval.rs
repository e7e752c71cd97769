//! Tree-walking evaluator for normalized Emo programs.
//!
//! ## Core Responsibility
//!
//! Executes a tree that has already been through the normalizer. Operators and
//! keywords are matched on their canonical spelling ("+", "if", "true") only; a
//! symbolic glyph reaching this module means the normalization pass was skipped
//! and is reported as [`ErrorKind::UnnormalizedToken`].
//!
//! ## Scoping
//!
//! Every `if` branch, every `while` iteration and every `for` body iteration runs
//! in a fresh frame. A `for` loop additionally wraps its declaration in an outer
//! frame that lives for the whole loop.

use std::cmp::Ordering;

use crate::errors::{EmoError, ErrorKind, ErrorReporting, PhaseContext, SourceContext};
use crate::normalizer::FIRST_OPERATOR_INDEX;
use crate::runtime::{OutputSink, Scopes, Value};
use crate::syntax::{Child, RuleId, Span, SyntaxTree, Token};

/// Control-flow outcome of executing a statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Next,
    Break,
    Continue,
}

/// A canonical operator token of a binary node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operator {
    /// `and`/`or`: short-circuiting, the right operand may never be evaluated.
    Logical(LogicalOp),
    /// Everything else: both operands are evaluated first.
    Value(BinaryOp),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LogicalOp {
    And,
    Or,
}

impl Operator {
    fn from_canonical(text: &str) -> Option<Self> {
        match text {
            "and" => Some(Self::Logical(LogicalOp::And)),
            "or" => Some(Self::Logical(LogicalOp::Or)),
            _ => BinaryOp::from_canonical(text).map(Self::Value),
        }
    }
}

/// Canonical value operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Lt,
    Gt,
    Le,
    Ge,
    Eq,
    Ne,
    BitAnd,
    BitXor,
    BitOr,
}

impl BinaryOp {
    fn from_canonical(text: &str) -> Option<Self> {
        let op = match text {
            "+" => Self::Add,
            "-" => Self::Sub,
            "*" => Self::Mul,
            "/" => Self::Div,
            "%" => Self::Rem,
            "<" => Self::Lt,
            ">" => Self::Gt,
            "<=" => Self::Le,
            ">=" => Self::Ge,
            "==" => Self::Eq,
            "!=" => Self::Ne,
            "&" => Self::BitAnd,
            "xor" => Self::BitXor,
            "|" => Self::BitOr,
            _ => return None,
        };
        Some(op)
    }

    fn symbol(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Rem => "%",
            Self::Lt => "<",
            Self::Gt => ">",
            Self::Le => "<=",
            Self::Ge => ">=",
            Self::Eq => "==",
            Self::Ne => "!=",
            Self::BitAnd => "&",
            Self::BitXor => "xor",
            Self::BitOr => "|",
        }
    }
}

// ============================================================================
// EVALUATOR
// ============================================================================

/// Executes one normalized program against an output sink.
pub struct Evaluator<'o> {
    scopes: Scopes,
    output: &'o mut dyn OutputSink,
    ctx: PhaseContext,
}

/// Runs a normalized program to completion.
pub fn evaluate(
    program: &SyntaxTree,
    source: SourceContext,
    output: &mut dyn OutputSink,
) -> Result<(), EmoError> {
    Evaluator::new(source, output).run(program)
}

impl<'o> Evaluator<'o> {
    pub fn new(source: SourceContext, output: &'o mut dyn OutputSink) -> Self {
        Self {
            scopes: Scopes::new(),
            output,
            ctx: PhaseContext::new(source, "runtime"),
        }
    }

    /// Executes every top-level statement. `⏸`/`⏩` outside a loop are ignored.
    pub fn run(&mut self, program: &SyntaxTree) -> Result<(), EmoError> {
        for child in &program.children {
            if let Child::Tree(statement) = child {
                self.exec(statement)?;
            }
        }
        Ok(())
    }

    // =====================
    // Statements
    // =====================

    fn exec(&mut self, stmt: &SyntaxTree) -> Result<Flow, EmoError> {
        match stmt.rule {
            RuleId::DeclareStmt => self.exec_declare(stmt),
            RuleId::AssignmentStmt => {
                let (name, value) = self.eval_binding(stmt)?;
                self.scopes
                    .assign(name, value)
                    .map_err(|kind| self.ctx.report_at(kind, stmt.span))?;
                Ok(Flow::Next)
            }
            RuleId::PrintStmt => {
                let value = self.eval(self.tree_at(stmt, 0)?)?;
                self.output.emit(&value.to_string(), Some(&stmt.span));
                Ok(Flow::Next)
            }
            RuleId::IfStmt => self.exec_if(stmt),
            RuleId::WhileStmt => self.exec_while(stmt),
            RuleId::ForStmt => {
                self.scopes.push();
                let flow = self.exec_for(stmt);
                self.scopes.pop();
                flow
            }
            RuleId::FlowStmt => match self.tree_at(stmt, 0)?.rule {
                RuleId::BreakStmt => Ok(Flow::Break),
                RuleId::ContinueStmt => Ok(Flow::Continue),
                _ => Err(self.ctx.internal_error(stmt.rule.name(), stmt.span)),
            },
            RuleId::Suite => self.exec_suite(stmt),
            _ => {
                self.eval(stmt)?;
                Ok(Flow::Next)
            }
        }
    }

    fn exec_suite(&mut self, suite: &SyntaxTree) -> Result<Flow, EmoError> {
        for child in &suite.children {
            let Child::Tree(stmt) = child else {
                continue;
            };
            match self.exec(stmt)? {
                Flow::Next => {}
                flow => return Ok(flow),
            }
        }
        Ok(Flow::Next)
    }

    fn exec_scoped(&mut self, suite: &SyntaxTree) -> Result<Flow, EmoError> {
        self.scopes.push();
        let flow = self.exec_suite(suite);
        self.scopes.pop();
        flow
    }

    fn exec_declare(&mut self, stmt: &SyntaxTree) -> Result<Flow, EmoError> {
        for child in &stmt.children {
            let Child::Tree(declarator) = child else {
                continue;
            };
            let (name, value) = match declarator.rule {
                RuleId::AssignmentStmt => self.eval_binding(declarator)?,
                _ => (self.name_of(declarator)?, Value::default()),
            };
            self.scopes
                .declare(name, value)
                .map_err(|kind| self.ctx.report_at(kind, declarator.span))?;
        }
        Ok(Flow::Next)
    }

    /// Name and evaluated right-hand side of an `assignment_stmt`.
    fn eval_binding<'n>(&mut self, stmt: &'n SyntaxTree) -> Result<(&'n str, Value), EmoError> {
        let name = self.name_of(self.tree_at(stmt, 0)?)?;
        let value = self.eval(self.tree_at(stmt, 1)?)?;
        Ok((name, value))
    }

    fn exec_if(&mut self, stmt: &SyntaxTree) -> Result<Flow, EmoError> {
        let mut i = 0;
        while i < stmt.children.len() {
            let keyword = self.token_at(stmt, i)?;
            match keyword.text.as_str() {
                "if" | "elif" => {
                    let condition = self.tree_at(stmt, i + 1)?;
                    let body = self.tree_at(stmt, i + 2)?;
                    if self.eval(condition)?.is_truthy() {
                        return self.exec_scoped(body);
                    }
                    i += 3;
                }
                "else" => {
                    let body = self.tree_at(stmt, i + 1)?;
                    return self.exec_scoped(body);
                }
                _ => return Err(self.unnormalized(stmt, keyword)),
            }
        }
        Ok(Flow::Next)
    }

    fn exec_while(&mut self, stmt: &SyntaxTree) -> Result<Flow, EmoError> {
        let condition = self.tree_at(stmt, 0)?;
        let body = self.tree_at(stmt, 1)?;
        while self.eval(condition)?.is_truthy() {
            if self.exec_scoped(body)? == Flow::Break {
                break;
            }
        }
        Ok(Flow::Next)
    }

    fn exec_for(&mut self, stmt: &SyntaxTree) -> Result<Flow, EmoError> {
        let init = self.tree_at(stmt, 0)?;
        let test = self.tree_at(stmt, 1)?;
        let updates = self.tree_at(stmt, 2)?;
        let body = self.tree_at(stmt, 3)?;

        self.exec_suite(init)?;
        loop {
            // An empty test clause loops until `⏸`.
            let proceed = match test.subtree(0) {
                Some(condition) => self.eval(condition)?.is_truthy(),
                None => true,
            };
            if !proceed || self.exec_scoped(body)? == Flow::Break {
                break;
            }
            self.exec_suite(updates)?;
        }
        Ok(Flow::Next)
    }

    // =====================
    // Expressions
    // =====================

    fn eval(&mut self, node: &SyntaxTree) -> Result<Value, EmoError> {
        match node.rule {
            RuleId::Name => {
                let name = self.name_of(node)?;
                self.scopes
                    .get(name)
                    .cloned()
                    .map_err(|kind| self.ctx.report_at(kind, node.span))
            }
            RuleId::Number => self.eval_number(node),
            RuleId::String => Ok(Value::Str(
                node.token(0).map(|t| t.text.clone()).unwrap_or_default(),
            )),
            RuleId::Boolean => {
                let token = self.token_at(node, 0)?;
                match token.text.as_str() {
                    "true" => Ok(Value::Bool(true)),
                    "false" => Ok(Value::Bool(false)),
                    _ => Err(self.unnormalized(node, token)),
                }
            }
            RuleId::CastExpression => self.eval_cast(node),
            rule if rule.is_binary() => self.eval_binary(node),
            _ => Err(self.ctx.internal_error(node.rule.name(), node.span)),
        }
    }

    fn eval_number(&self, node: &SyntaxTree) -> Result<Value, EmoError> {
        let token = self.token_at(node, 0)?;
        let text = token.text.as_str();
        let parsed = if text.contains('.') {
            text.parse::<f64>().ok().map(Value::Float)
        } else {
            text.parse::<i64>().ok().map(Value::Int)
        };
        // The parser rejects literals that do not fit.
        parsed.ok_or_else(|| self.ctx.internal_error(node.rule.name(), token.span))
    }

    fn eval_cast(&mut self, node: &SyntaxTree) -> Result<Value, EmoError> {
        if node.children.len() == 1 {
            return self.eval(self.tree_at(node, 0)?);
        }
        let operator = self.token_at(node, 0)?;
        let operand = self.eval(self.tree_at(node, 1)?)?;
        match operator.text.as_str() {
            "!" => Ok(Value::Bool(!operand.is_truthy())),
            "~" => match operand.as_int() {
                Some(i) => Ok(Value::Int(!i)),
                None => Err(self.mismatch("~", "number", operand.type_name(), operator.span)),
            },
            _ => Err(self.unnormalized(node, operator)),
        }
    }

    fn eval_binary(&mut self, node: &SyntaxTree) -> Result<Value, EmoError> {
        let mut acc = self.eval(self.tree_at(node, 0)?)?;
        let mut i = FIRST_OPERATOR_INDEX;
        while i < node.children.len() {
            let token = self.token_at(node, i)?;
            let rhs = self.tree_at(node, i + 1)?;
            let op = Operator::from_canonical(&token.text)
                .ok_or_else(|| self.unnormalized(node, token))?;
            acc = match op {
                Operator::Logical(LogicalOp::And) => {
                    Value::Bool(acc.is_truthy() && self.eval(rhs)?.is_truthy())
                }
                Operator::Logical(LogicalOp::Or) => {
                    Value::Bool(acc.is_truthy() || self.eval(rhs)?.is_truthy())
                }
                Operator::Value(op) => {
                    let rhs = self.eval(rhs)?;
                    self.apply(op, acc, rhs, token.span)?
                }
            };
            i += 2;
        }
        Ok(acc)
    }

    fn apply(&self, op: BinaryOp, lhs: Value, rhs: Value, span: Span) -> Result<Value, EmoError> {
        use BinaryOp as Op;
        match op {
            Op::Add if matches!(lhs, Value::Str(_)) || matches!(rhs, Value::Str(_)) => {
                Ok(Value::Str(format!("{lhs}{rhs}")))
            }
            Op::Add | Op::Sub | Op::Mul => self.arithmetic(op, &lhs, &rhs, span),
            Op::Div => {
                let (a, b) = self.floats(op, &lhs, &rhs, span)?;
                if b == 0.0 {
                    return Err(self.ctx.report_at(ErrorKind::DivisionByZero, span));
                }
                Ok(Value::Float(a / b))
            }
            Op::Rem => {
                let (a, b) = self.ints(op, &lhs, &rhs, span)?;
                if b == 0 {
                    return Err(self.ctx.report_at(ErrorKind::DivisionByZero, span));
                }
                a.checked_rem(b)
                    .map(Value::Int)
                    .ok_or_else(|| self.overflow(op, span))
            }
            Op::Lt | Op::Gt | Op::Le | Op::Ge => {
                let ordering = lhs.compare(&rhs).ok_or_else(|| {
                    self.mismatch(op.symbol(), "two numbers or two strings", &pair_types(&lhs, &rhs), span)
                })?;
                Ok(Value::Bool(match op {
                    Op::Lt => ordering == Ordering::Less,
                    Op::Gt => ordering == Ordering::Greater,
                    Op::Le => ordering != Ordering::Greater,
                    _ => ordering != Ordering::Less,
                }))
            }
            Op::Eq => Ok(Value::Bool(lhs.loose_eq(&rhs))),
            Op::Ne => Ok(Value::Bool(!lhs.loose_eq(&rhs))),
            Op::BitAnd | Op::BitXor | Op::BitOr => {
                let (a, b) = self.ints(op, &lhs, &rhs, span)?;
                Ok(Value::Int(match op {
                    Op::BitAnd => a & b,
                    Op::BitXor => a ^ b,
                    _ => a | b,
                }))
            }
        }
    }

    /// `+ - *`: integer arithmetic unless a float is involved.
    fn arithmetic(&self, op: BinaryOp, lhs: &Value, rhs: &Value, span: Span) -> Result<Value, EmoError> {
        if !lhs.is_float() && !rhs.is_float() {
            if let (Some(a), Some(b)) = (lhs.as_int(), rhs.as_int()) {
                let result = match op {
                    BinaryOp::Add => a.checked_add(b),
                    BinaryOp::Sub => a.checked_sub(b),
                    _ => a.checked_mul(b),
                };
                return result.map(Value::Int).ok_or_else(|| self.overflow(op, span));
            }
        }
        let (a, b) = self.floats(op, lhs, rhs, span)?;
        Ok(Value::Float(match op {
            BinaryOp::Add => a + b,
            BinaryOp::Sub => a - b,
            _ => a * b,
        }))
    }

    fn floats(&self, op: BinaryOp, lhs: &Value, rhs: &Value, span: Span) -> Result<(f64, f64), EmoError> {
        match (lhs.as_float(), rhs.as_float()) {
            (Some(a), Some(b)) => Ok((a, b)),
            _ => Err(self.mismatch(op.symbol(), "numbers", &pair_types(lhs, rhs), span)),
        }
    }

    fn ints(&self, op: BinaryOp, lhs: &Value, rhs: &Value, span: Span) -> Result<(i64, i64), EmoError> {
        match (lhs.as_int(), rhs.as_int()) {
            (Some(a), Some(b)) => Ok((a, b)),
            _ => Err(self.mismatch(op.symbol(), "integers", &pair_types(lhs, rhs), span)),
        }
    }

    // =====================
    // Node access and error helpers
    // =====================

    fn tree_at<'n>(&self, node: &'n SyntaxTree, index: usize) -> Result<&'n SyntaxTree, EmoError> {
        node.subtree(index)
            .ok_or_else(|| self.ctx.internal_error(node.rule.name(), node.span))
    }

    fn token_at<'n>(&self, node: &'n SyntaxTree, index: usize) -> Result<&'n Token, EmoError> {
        node.token(index)
            .ok_or_else(|| self.ctx.internal_error(node.rule.name(), node.span))
    }

    fn name_of<'n>(&self, node: &'n SyntaxTree) -> Result<&'n str, EmoError> {
        if node.rule != RuleId::Name {
            return Err(self.ctx.internal_error(node.rule.name(), node.span));
        }
        self.token_at(node, 0).map(|t| t.text.as_str())
    }

    fn unnormalized(&self, node: &SyntaxTree, token: &Token) -> EmoError {
        self.ctx
            .report_at(
                ErrorKind::UnnormalizedToken {
                    rule: node.rule.to_string(),
                    token: token.text.clone(),
                },
                token.span,
            )
            .with_help("Run the tree through the normalizer before evaluating it.")
    }

    fn mismatch(&self, operation: &str, expected: &str, actual: &str, span: Span) -> EmoError {
        self.ctx.report_at(
            ErrorKind::TypeMismatch {
                operation: operation.into(),
                expected: expected.into(),
                actual: actual.into(),
            },
            span,
        )
    }

    fn overflow(&self, op: BinaryOp, span: Span) -> EmoError {
        self.ctx.report_at(
            ErrorKind::Overflow {
                operation: op.symbol().into(),
            },
            span,
        )
    }
}

fn pair_types(lhs: &Value, rhs: &Value) -> String {
    format!("{} and {}", lhs.type_name(), rhs.type_name())
}
