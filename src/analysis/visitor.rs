//! The scope-aware dataflow visitor.
//!
//! Walks statement and expression forms of one method body, accumulating a
//! flow relation and variable classifications per scope, and merges child
//! scopes into their parent with capture-avoiding renaming. No statement or
//! expression shape is a hard failure here: every unmatched shape is recorded
//! as a skip (with its source text) and contributes no flow information.

use crate::analysis::algebra::{assign, correction, unique_name};
use crate::analysis::idents::{occurs, IdentCollector};
use crate::analysis::scope::ScopeState;
use crate::parse::ast::{Declarator, Expr, ExprKind, Stmt};
use log::{debug, warn};
use std::collections::HashSet;

/// Analyze a method body and return its finished scope state.
pub fn analyze_body(body: &[Stmt]) -> ScopeState {
    let mut visitor = FlowVisitor::default();
    for stmt in body {
        visitor.visit_stmt(stmt);
    }
    visitor.scope
}

#[derive(Debug, Default)]
struct FlowVisitor {
    scope: ScopeState,
}

impl FlowVisitor {
    fn skip(&mut self, text: &str, what: &str) {
        warn!("unhandled {what}: {text}");
        self.scope.skipped.push(text.to_string());
    }

    /// Analyze one statement in a fresh child scope.
    fn child_of(stmt: &Stmt) -> ScopeState {
        let mut visitor = FlowVisitor::default();
        visitor.visit_stmt(stmt);
        visitor.scope
    }

    /// Add control-dependency flows from the condition variables to every
    /// variable the guarded scope writes.
    fn apply_correction(scope: &mut ScopeState, cond_vars: &HashSet<String>) {
        scope.vars.extend(cond_vars.iter().cloned());
        let corr = correction(cond_vars, &scope.out);
        scope.matrix.extend(corr);
    }

    fn visit_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Block(stmts) => {
                let mut child = FlowVisitor::default();
                for s in stmts {
                    child.visit_stmt(s);
                }
                self.scope.merge_scoped(child.scope);
            }
            Stmt::LocalDecl(decls) => {
                for decl in decls {
                    self.visit_declarator(decl);
                }
            }
            Stmt::Expr(expr) => self.visit_expr_stmt(expr),
            Stmt::If {
                cond,
                then_branch,
                else_branch,
            } => self.visit_if(cond, then_branch, else_branch.as_deref()),
            Stmt::While { cond, body } | Stmt::DoWhile { body, cond } => {
                let cond_vars = Self::xvars(cond);
                let mut body_scope = Self::child_of(body);
                Self::apply_correction(&mut body_scope, &cond_vars);
                self.scope.merge_scoped(body_scope);
            }
            Stmt::For {
                init,
                cond,
                update,
                body,
            } => self.visit_for(init, cond.as_ref(), update, body),
            Stmt::ForEach { var, source, body } => self.visit_foreach(var, source, body),
            Stmt::Switch { subject, cases } => self.visit_switch(subject, cases),
            Stmt::Return(value) => {
                if let Some(value) = value {
                    let (in_v, _) = self.rvars(value);
                    self.scope.vars.extend(in_v.iter().cloned());
                    self.scope.returned.extend(in_v);
                }
            }
            Stmt::Break | Stmt::Continue => {}
            Stmt::Unsupported { text } => self.skip(text, "statement"),
        }
    }

    fn visit_declarator(&mut self, decl: &Declarator) {
        let out_v: HashSet<String> = std::iter::once(decl.name.clone()).collect();
        self.scope.vars.insert(decl.name.clone());
        self.scope.declared.insert(decl.name.clone());
        if let Some(init) = &decl.init {
            let (in_v, _) = self.rvars(init);
            self.scope.vars.extend(in_v.iter().cloned());
            self.scope.out.insert(decl.name.clone());
            self.scope.matrix.extend(assign(&in_v, &out_v));
        }
    }

    /// An expression in statement position: assignments and updates carry
    /// flows, bare calls and anything else are skips.
    fn visit_expr_stmt(&mut self, expr: &Expr) {
        match &expr.kind {
            // a compound operator also reads its own target, but a variable
            // is never paired with itself, so the second assign term only
            // matters for nested reads such as array indices
            ExprKind::Assign { lhs, rhs, .. } => {
                debug!("assignment: {}", expr.text);
                let (in_l, out_l) = self.lvars(lhs);
                let (in_r, _) = self.rvars(rhs);
                self.scope.vars.extend(in_l.iter().cloned());
                self.scope.vars.extend(in_r.iter().cloned());
                self.scope.vars.extend(out_l.iter().cloned());
                self.scope.out.extend(out_l.iter().cloned());
                self.scope.matrix.extend(assign(&in_r, &out_l));
                self.scope.matrix.extend(assign(&in_l, &out_l));
            }
            ExprKind::Update { operand, .. } => {
                debug!("update: {}", expr.text);
                let (in_l, out_l) = self.lvars(operand);
                self.scope.vars.extend(in_l.iter().cloned());
                self.scope.vars.extend(out_l.iter().cloned());
                self.scope.out.extend(out_l.iter().cloned());
                self.scope.matrix.extend(assign(&in_l, &out_l));
            }
            ExprKind::MethodCall { .. } => self.skip(&expr.text, "call"),
            ExprKind::Literal => {}
            _ => self.skip(&expr.text, "expression"),
        }
    }

    /// Classify an expression used as an assignment target or in isolation:
    /// `(in-variables, out-variables)`.
    fn lvars(&mut self, expr: &Expr) -> (HashSet<String>, HashSet<String>) {
        match &expr.kind {
            ExprKind::Ident(name) => {
                debug!("L/out: {name}");
                (HashSet::new(), std::iter::once(name.clone()).collect())
            }
            ExprKind::Paren(inner) | ExprKind::Cast(inner) => self.lvars(inner),
            ExprKind::Unary { operand, .. } | ExprKind::Update { operand, .. } => {
                self.lvars(operand)
            }
            ExprKind::ArrayAccess { .. } => {
                // the left-most name is written; every identifier in the
                // indices is read
                let mut ordered = IdentCollector::collect(expr).ordered;
                if ordered.is_empty() {
                    self.skip(&expr.text, "assign target");
                    return (HashSet::new(), HashSet::new());
                }
                let target = ordered.remove(0);
                debug!("L/out: {target}");
                let in_v: HashSet<String> = ordered.into_iter().collect();
                (in_v, std::iter::once(target).collect())
            }
            _ => {
                // deliberate precision cutoff, not a failure
                self.skip(&expr.text, "assign target");
                (HashSet::new(), HashSet::new())
            }
        }
    }

    /// Classify a read-position expression: `(in-variables, out-variables)`.
    /// Out-variables appear when the expression embeds a write, e.g. a
    /// pre/post-increment inside a larger expression.
    fn rvars(&mut self, expr: &Expr) -> (HashSet<String>, HashSet<String>) {
        let empty = (HashSet::new(), HashSet::new());
        match &expr.kind {
            ExprKind::Literal => empty,
            ExprKind::Ident(name) => {
                debug!("R/in: {name}");
                (std::iter::once(name.clone()).collect(), HashSet::new())
            }
            ExprKind::Paren(inner) | ExprKind::Cast(inner) => self.rvars(inner),
            ExprKind::Unary { operand, .. } => self.rvars(operand),
            ExprKind::Update { operand, .. } => {
                // embedded write: the operand is read and written here
                let (in_l, out_l) = self.lvars(operand);
                self.scope.vars.extend(in_l.iter().cloned());
                self.scope.vars.extend(out_l.iter().cloned());
                self.scope.out.extend(out_l.iter().cloned());
                self.scope.matrix.extend(assign(&in_l, &out_l));
                let in_v: HashSet<String> = in_l.union(&out_l).cloned().collect();
                (in_v, out_l)
            }
            ExprKind::Binary { lhs, rhs } => self.rvars_union([lhs.as_ref(), rhs.as_ref()]),
            ExprKind::Ternary {
                cond,
                then_expr,
                else_expr,
            } => self.rvars_union([cond.as_ref(), then_expr.as_ref(), else_expr.as_ref()]),
            ExprKind::ArrayAccess { array, index } => {
                self.rvars_union([array.as_ref(), index.as_ref()])
            }
            ExprKind::ArrayInit(items) => self.rvars_union(items.iter()),
            ExprKind::ArrayCreation { dims, init } => {
                let (mut in_v, mut out_v) = self.rvars_union(dims.iter());
                if let Some(init) = init {
                    let (i, o) = self.rvars(init);
                    in_v.extend(i);
                    out_v.extend(o);
                }
                (in_v, out_v)
            }
            ExprKind::FieldAccess { .. } => {
                // imprecision boundary: plain member access is skipped
                self.skip(&expr.text, "dot-op");
                empty
            }
            ExprKind::MethodCall { .. } => {
                self.skip(&expr.text, "call");
                empty
            }
            ExprKind::New {
                type_name: Some(type_name),
                args,
            } => self.synthetic_reference(type_name, args, &expr.text),
            ExprKind::New {
                type_name: None, ..
            } => {
                self.skip(&expr.text, "new object");
                empty
            }
            _ => {
                // conservative fallback: every identifier occurring in the
                // unmatched shape counts as read
                self.skip(&expr.text, "expression");
                (occurs(expr), HashSet::new())
            }
        }
    }

    fn rvars_union<'a>(
        &mut self,
        exprs: impl IntoIterator<Item = &'a Expr>,
    ) -> (HashSet<String>, HashSet<String>) {
        let mut in_v = HashSet::new();
        let mut out_v = HashSet::new();
        for expr in exprs {
            let (i, o) = self.rvars(expr);
            in_v.extend(i);
            out_v.extend(o);
        }
        (in_v, out_v)
    }

    /// Object construction with a simple type name: allocate a fresh
    /// reference name, route every in-variable reaching the constructor
    /// arguments to it, and hand the reference back as the expression's
    /// single in-variable.
    fn synthetic_reference(
        &mut self,
        type_name: &str,
        args: &[Expr],
        text: &str,
    ) -> (HashSet<String>, HashSet<String>) {
        let mut in_args = HashSet::new();
        for arg in args {
            let (i, _) = self.rvars(arg);
            in_args.extend(i);
        }
        self.scope.vars.extend(in_args.iter().cloned());
        let reference = unique_name(type_name, &self.scope.vars);
        debug!("synthetic reference {reference} for: {text}");
        self.scope.vars.insert(reference.clone());
        // the reference is a binding local to this scope: declaring it makes
        // the scope merge rename it instead of conflating it with a sibling
        // scope's reference of the same constructed type
        self.scope.declared.insert(reference.clone());
        let ref_set: HashSet<String> = std::iter::once(reference).collect();
        self.scope.matrix.extend(assign(&in_args, &ref_set));
        (ref_set, HashSet::new())
    }

    /// Variables of a boolean/condition expression. `a.equals(b)` is
    /// recognized by name as an idiomatic equality test; everything else
    /// falls back to all occurring identifiers.
    fn xvars(expr: &Expr) -> HashSet<String> {
        match &expr.kind {
            ExprKind::Paren(inner) => Self::xvars(inner),
            ExprKind::MethodCall {
                receiver: Some(receiver),
                name,
                args,
            } if name == "equals" && args.len() == 1 => {
                let mut vars = Self::xvars(receiver);
                vars.extend(Self::xvars(&args[0]));
                vars
            }
            _ => occurs(expr),
        }
    }

    fn visit_if(&mut self, cond: &Expr, then_branch: &Stmt, else_branch: Option<&Stmt>) {
        let cond_vars = Self::xvars(cond);
        let mut branch = Self::child_of(then_branch);
        Self::apply_correction(&mut branch, &cond_vars);
        if let Some(else_branch) = else_branch {
            // sibling branches do not see each other's declarations
            let mut other = Self::child_of(else_branch);
            Self::apply_correction(&mut other, &cond_vars);
            branch.merge_scoped(other);
        }
        self.scope.merge_scoped(branch);
    }

    fn visit_for(&mut self, init: &[Stmt], cond: Option<&Expr>, update: &[Expr], body: &Stmt) {
        // init, update and body share one child scope; a single correction
        // pass with the loop condition covers the merged result
        let mut child = FlowVisitor::default();
        for stmt in init {
            child.visit_stmt(stmt);
        }
        for expr in update {
            child.visit_expr_stmt(expr);
        }
        child.visit_stmt(body);
        let mut scope = child.scope;
        if let Some(cond) = cond {
            Self::apply_correction(&mut scope, &Self::xvars(cond));
        }
        self.scope.merge_scoped(scope);
    }

    fn visit_foreach(&mut self, var: &str, source: &Expr, body: &Stmt) {
        let iter_var: HashSet<String> = std::iter::once(var.to_string()).collect();
        let mut scope = Self::child_of(body);
        Self::apply_correction(&mut scope, &iter_var);
        // the iterable flows into the fresh per-iteration binding
        let src_vars = occurs(source);
        scope.vars.extend(src_vars.iter().cloned());
        scope.declared.insert(var.to_string());
        scope.matrix.extend(assign(&src_vars, &iter_var));
        self.scope.merge_scoped(scope);
    }

    fn visit_switch(&mut self, subject: &Expr, cases: &[Vec<Stmt>]) {
        // sibling cases, like if/else branches, do not see each other's
        // declarations
        let mut aggregate = ScopeState::default();
        for case in cases {
            let mut case_visitor = FlowVisitor::default();
            for stmt in case {
                case_visitor.visit_stmt(stmt);
            }
            aggregate.merge_scoped(case_visitor.scope);
        }
        Self::apply_correction(&mut aggregate, &Self::xvars(subject));
        self.scope.merge_scoped(aggregate);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::ast::Member;
    use crate::parse::parser::parse;
    use std::path::Path;

    fn scope_of(stmts: &str) -> ScopeState {
        let source = format!("public class P {{ static void main() {{ {stmts} }} }}");
        let unit = parse(&source, Path::new("P.java")).unwrap();
        let Member::Method(method) = &unit.classes[0].members[0] else {
            panic!("expected method");
        };
        analyze_body(&method.body)
    }

    fn flow(a: &str, b: &str) -> (String, String) {
        (a.to_string(), b.to_string())
    }

    #[test]
    fn test_update_embedded_in_assignment() {
        let scope = scope_of("y = x++;");
        assert!(scope.flows().contains(&flow("x", "y")));
        assert!(scope.out.contains("x"));
        assert!(scope.out.contains("y"));
    }

    #[test]
    fn test_compound_assignment_reads_rhs() {
        let scope = scope_of("x += y;");
        assert_eq!(scope.flows(), [flow("y", "x")].into_iter().collect());
    }

    #[test]
    fn test_array_target_indices_are_reads() {
        let scope = scope_of("a[i] = b;");
        let flows = scope.flows();
        assert!(flows.contains(&flow("b", "a")));
        assert!(flows.contains(&flow("i", "a")));
        assert_eq!(flows.len(), 2);
    }

    #[test]
    fn test_field_access_is_skipped_not_flowed() {
        let scope = scope_of("y = o.f;");
        assert!(scope.flows().is_empty());
        assert_eq!(scope.skipped, vec!["o.f"]);
        assert!(scope.out.contains("y"));
    }

    #[test]
    fn test_equals_condition_recognized() {
        let scope = scope_of("if (a.equals(b)) { y = x; }");
        let flows = scope.flows();
        assert!(flows.contains(&flow("a", "y")));
        assert!(flows.contains(&flow("b", "y")));
        assert!(flows.contains(&flow("x", "y")));
        assert!(!scope.vars.contains("equals"));
    }

    #[test]
    fn test_synthetic_reference_for_construction() {
        let scope = scope_of("Point p = new Point(a, b);");
        let flows = scope.flows();
        // one fresh subscripted reference routes the constructor arguments
        let reference = scope
            .vars
            .iter()
            .find(|v| v.starts_with("Point"))
            .unwrap()
            .clone();
        assert_eq!(reference, "Point₂");
        assert!(flows.contains(&flow("a", &reference)));
        assert!(flows.contains(&flow("b", &reference)));
        assert!(flows.contains(&flow(&reference, "p")));
    }

    #[test]
    fn test_synthetic_reference_is_locally_declared() {
        let scope = scope_of("Point p = new Point(a);");
        assert!(scope.declared.contains("Point₂"));
    }

    #[test]
    fn test_qualified_construction_stays_skipped() {
        let scope = scope_of("Object o = new java.util.Random();");
        assert!(scope.flows().is_empty());
        assert_eq!(scope.skipped.len(), 1);
    }

    #[test]
    fn test_return_tracks_in_variables() {
        let scope = scope_of("int y = x; return y;");
        assert_eq!(scope.returned, std::iter::once("y".to_string()).collect());
        assert!(scope.flows().contains(&flow("x", "y")));
    }

    #[test]
    fn test_foreach_binds_and_corrects() {
        let scope = scope_of("for (int x : items) { sum += x; }");
        let flows = scope.flows();
        assert!(flows.contains(&flow("items", "x")));
        assert!(flows.contains(&flow("x", "sum")));
        assert!(scope.declared.contains("x"));
    }

    #[test]
    fn test_for_loop_single_correction_pass() {
        let scope = scope_of("for (int i = 0; i < n; i++) { s += i; }");
        let flows = scope.flows();
        assert!(flows.contains(&flow("i", "s")));
        assert!(flows.contains(&flow("n", "s")));
        assert!(flows.contains(&flow("n", "i")));
        assert!(!flows.contains(&flow("i", "i")));
    }

    #[test]
    fn test_bare_call_is_skipped_and_analysis_continues() {
        let scope = scope_of("System.out.println(x); y = a;");
        assert_eq!(scope.flows(), [flow("a", "y")].into_iter().collect());
        assert_eq!(scope.skipped.len(), 1);
    }
}
