//! Identifier collection over expression subtrees.
//!
//! Occurrence order is left-to-right and load-bearing: callers classifying an
//! assignment target treat the first occurrence as the written name.

use crate::parse::ast::{Expr, ExprKind};
use std::collections::HashSet;

/// Collects identifier occurrences of an expression subtree.
#[derive(Debug, Default)]
pub struct IdentCollector {
    /// Identifiers in left-to-right visit order, duplicates included.
    pub ordered: Vec<String>,
}

impl IdentCollector {
    pub fn collect(expr: &Expr) -> Self {
        let mut collector = Self::default();
        collector.visit(expr);
        collector
    }

    /// Set view of the collected occurrences.
    pub fn set(&self) -> HashSet<String> {
        self.ordered.iter().cloned().collect()
    }

    fn visit(&mut self, expr: &Expr) {
        match &expr.kind {
            ExprKind::Ident(name) => self.ordered.push(name.clone()),
            ExprKind::Literal => {}
            ExprKind::Assign { lhs, rhs, .. } => {
                self.visit(lhs);
                self.visit(rhs);
            }
            ExprKind::Unary { operand, .. } | ExprKind::Update { operand, .. } => {
                self.visit(operand)
            }
            ExprKind::Binary { lhs, rhs } => {
                self.visit(lhs);
                self.visit(rhs);
            }
            ExprKind::Ternary {
                cond,
                then_expr,
                else_expr,
            } => {
                self.visit(cond);
                self.visit(then_expr);
                self.visit(else_expr);
            }
            ExprKind::Paren(inner) | ExprKind::Cast(inner) => self.visit(inner),
            ExprKind::ArrayAccess { array, index } => {
                self.visit(array);
                self.visit(index);
            }
            ExprKind::ArrayInit(items) => items.iter().for_each(|i| self.visit(i)),
            ExprKind::ArrayCreation { dims, init } => {
                dims.iter().for_each(|d| self.visit(d));
                if let Some(init) = init {
                    self.visit(init);
                }
            }
            ExprKind::FieldAccess { object, field } => {
                self.visit(object);
                self.ordered.push(field.clone());
            }
            ExprKind::MethodCall {
                receiver,
                name,
                args,
            } => {
                if let Some(receiver) = receiver {
                    self.visit(receiver);
                }
                self.ordered.push(name.clone());
                args.iter().for_each(|a| self.visit(a));
            }
            ExprKind::New { args, .. } => args.iter().for_each(|a| self.visit(a)),
            ExprKind::Unsupported { idents } => self.ordered.extend(idents.iter().cloned()),
        }
    }
}

/// All identifiers occurring in an expression, as a set.
pub fn occurs(expr: &Expr) -> HashSet<String> {
    IdentCollector::collect(expr).set()
}
