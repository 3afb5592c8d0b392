//! Typed AST for the subset of Java the dataflow engine understands.
//!
//! The tree-sitter CST is lowered once into tagged variants so the engine
//! dispatches by exhaustive pattern matching instead of child-count and
//! operator-text sniffing. Operator categories are resolved here, at lowering
//! time. Every expression keeps its literal source text so skip diagnostics
//! can report the exact offending fragment.
//!
//! Shapes outside the supported subset lower to `Unsupported`, carrying the
//! source text and the identifier leaves found inside; the engine records
//! them as skips and continues.

use tree_sitter::Node;

use crate::parse::parser::node_text;

#[derive(Debug, Clone, Default)]
pub struct CompilationUnit {
    pub classes: Vec<ClassDecl>,
}

#[derive(Debug, Clone)]
pub struct ClassDecl {
    pub name: String,
    pub members: Vec<Member>,
}

#[derive(Debug, Clone)]
pub enum Member {
    Class(ClassDecl),
    Method(MethodDecl),
}

#[derive(Debug, Clone)]
pub struct MethodDecl {
    pub name: String,
    /// Literal source text of the whole declaration, kept for reporting.
    pub source: String,
    pub body: Vec<Stmt>,
}

#[derive(Debug, Clone)]
pub enum Stmt {
    Block(Vec<Stmt>),
    LocalDecl(Vec<Declarator>),
    Expr(Expr),
    If {
        cond: Expr,
        then_branch: Box<Stmt>,
        else_branch: Option<Box<Stmt>>,
    },
    While {
        cond: Expr,
        body: Box<Stmt>,
    },
    DoWhile {
        body: Box<Stmt>,
        cond: Expr,
    },
    For {
        init: Vec<Stmt>,
        cond: Option<Expr>,
        update: Vec<Expr>,
        body: Box<Stmt>,
    },
    ForEach {
        var: String,
        source: Expr,
        body: Box<Stmt>,
    },
    Switch {
        subject: Expr,
        cases: Vec<Vec<Stmt>>,
    },
    Return(Option<Expr>),
    Break,
    Continue,
    /// try, throw, assert, synchronized, labeled statements, and anything
    /// else with no typed counterpart. Recorded as a skip, never an error.
    Unsupported {
        text: String,
    },
}

#[derive(Debug, Clone)]
pub struct Declarator {
    pub name: String,
    pub init: Option<Expr>,
}

#[derive(Debug, Clone)]
pub struct Expr {
    pub kind: ExprKind,
    /// Literal source text of this expression.
    pub text: String,
}

#[derive(Debug, Clone)]
pub enum ExprKind {
    Ident(String),
    /// Numeric/string/char/bool/null literals, `this`, `super`: no flow
    /// contribution.
    Literal,
    Assign {
        op: AssignOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Update {
        op: UpdateOp,
        operand: Box<Expr>,
    },
    Binary {
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Ternary {
        cond: Box<Expr>,
        then_expr: Box<Expr>,
        else_expr: Box<Expr>,
    },
    Paren(Box<Expr>),
    Cast(Box<Expr>),
    ArrayAccess {
        array: Box<Expr>,
        index: Box<Expr>,
    },
    ArrayInit(Vec<Expr>),
    ArrayCreation {
        dims: Vec<Expr>,
        init: Option<Box<Expr>>,
    },
    FieldAccess {
        object: Box<Expr>,
        field: String,
    },
    MethodCall {
        receiver: Option<Box<Expr>>,
        name: String,
        args: Vec<Expr>,
    },
    /// Object construction. `type_name` is `Some` only for simple
    /// (non-qualified) constructed type names.
    New {
        type_name: Option<String>,
        args: Vec<Expr>,
    },
    /// Anything else: lambdas, method references, instanceof, switch in
    /// expression position, ... The identifier leaves are harvested so the
    /// conservative all-occurrences fallback still works.
    Unsupported {
        idents: Vec<String>,
    },
}

/// Assignment operator category: `=` versus the compound forms
/// (`+=`, `-=`, `*=`, `/=`, `%=`, `&=`, `|=`, `^=`, `>>=`, `>>>=`, `<<=`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignOp {
    Simple,
    Compound,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Not,
    BitNot,
    Plus,
    Minus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOp {
    Increment,
    Decrement,
}

/// Lower a parsed `program` node into the typed compilation unit.
pub fn lower_unit(root: Node, source: &str) -> CompilationUnit {
    let mut unit = CompilationUnit::default();
    for child in named_children(root) {
        if child.kind() == "class_declaration" {
            if let Some(class) = lower_class(child, source) {
                unit.classes.push(class);
            }
        }
    }
    unit
}

fn lower_class(node: Node, source: &str) -> Option<ClassDecl> {
    let name = node_text(&node.child_by_field_name("name")?, source).to_string();
    let mut members = Vec::new();
    if let Some(body) = node.child_by_field_name("body") {
        for member in named_children(body) {
            match member.kind() {
                "class_declaration" => {
                    if let Some(inner) = lower_class(member, source) {
                        members.push(Member::Class(inner));
                    }
                }
                "method_declaration" | "constructor_declaration" => {
                    if let Some(method) = lower_method(member, source) {
                        members.push(Member::Method(method));
                    }
                }
                _ => {}
            }
        }
    }
    Some(ClassDecl { name, members })
}

fn lower_method(node: Node, source: &str) -> Option<MethodDecl> {
    let name = node_text(&node.child_by_field_name("name")?, source).to_string();
    // abstract/interface methods have no body and nothing to analyze
    let body = node.child_by_field_name("body")?;
    Some(MethodDecl {
        name,
        source: node_text(&node, source).to_string(),
        body: lower_stmts(body, source),
    })
}

fn lower_stmts(block: Node, source: &str) -> Vec<Stmt> {
    named_children(block)
        .into_iter()
        .map(|n| lower_stmt(n, source))
        .collect()
}

fn lower_stmt(node: Node, source: &str) -> Stmt {
    let unsupported = || Stmt::Unsupported {
        text: node_text(&node, source).to_string(),
    };
    match node.kind() {
        "block" => Stmt::Block(lower_stmts(node, source)),
        "local_variable_declaration" => {
            let mut cursor = node.walk();
            let decls = node
                .children_by_field_name("declarator", &mut cursor)
                .filter_map(|d| lower_declarator(d, source))
                .collect();
            Stmt::LocalDecl(decls)
        }
        "expression_statement" => match first_named(node) {
            Some(inner) => Stmt::Expr(lower_expr(inner, source)),
            None => unsupported(),
        },
        "if_statement" => {
            let (cond, consequence) = match (
                node.child_by_field_name("condition"),
                node.child_by_field_name("consequence"),
            ) {
                (Some(c), Some(t)) => (c, t),
                _ => return unsupported(),
            };
            Stmt::If {
                cond: lower_expr(cond, source),
                then_branch: Box::new(lower_stmt(consequence, source)),
                else_branch: node
                    .child_by_field_name("alternative")
                    .map(|a| Box::new(lower_stmt(a, source))),
            }
        }
        "while_statement" => match (
            node.child_by_field_name("condition"),
            node.child_by_field_name("body"),
        ) {
            (Some(c), Some(b)) => Stmt::While {
                cond: lower_expr(c, source),
                body: Box::new(lower_stmt(b, source)),
            },
            _ => unsupported(),
        },
        "do_statement" => match (
            node.child_by_field_name("body"),
            node.child_by_field_name("condition"),
        ) {
            (Some(b), Some(c)) => Stmt::DoWhile {
                body: Box::new(lower_stmt(b, source)),
                cond: lower_expr(c, source),
            },
            _ => unsupported(),
        },
        "for_statement" => {
            let body = match node.child_by_field_name("body") {
                Some(b) => b,
                None => return unsupported(),
            };
            let mut cursor = node.walk();
            let init = node
                .children_by_field_name("init", &mut cursor)
                .map(|n| {
                    if n.kind() == "local_variable_declaration" {
                        lower_stmt(n, source)
                    } else {
                        Stmt::Expr(lower_expr(n, source))
                    }
                })
                .collect();
            let mut cursor = node.walk();
            let update = node
                .children_by_field_name("update", &mut cursor)
                .map(|n| lower_expr(n, source))
                .collect();
            Stmt::For {
                init,
                cond: node
                    .child_by_field_name("condition")
                    .map(|c| lower_expr(c, source)),
                update,
                body: Box::new(lower_stmt(body, source)),
            }
        }
        "enhanced_for_statement" => {
            match (
                node.child_by_field_name("name"),
                node.child_by_field_name("value"),
                node.child_by_field_name("body"),
            ) {
                (Some(name), Some(value), Some(body)) => Stmt::ForEach {
                    var: node_text(&name, source).to_string(),
                    source: lower_expr(value, source),
                    body: Box::new(lower_stmt(body, source)),
                },
                _ => unsupported(),
            }
        }
        // statement-position switch; expression-position switch lowers to
        // ExprKind::Unsupported below
        "switch_expression" => lower_switch(node, source).unwrap_or_else(unsupported),
        "return_statement" => Stmt::Return(first_named(node).map(|e| lower_expr(e, source))),
        "break_statement" => Stmt::Break,
        "continue_statement" => Stmt::Continue,
        _ => unsupported(),
    }
}

fn lower_switch(node: Node, source: &str) -> Option<Stmt> {
    let subject = node.child_by_field_name("condition")?;
    let body = node.child_by_field_name("body")?;
    let mut cases = Vec::new();
    for group in named_children(body) {
        if matches!(group.kind(), "switch_block_statement_group" | "switch_rule") {
            // case labels are ignored: only the case bodies carry flows
            let stmts = named_children(group)
                .into_iter()
                .filter(|n| n.kind() != "switch_label")
                .map(|n| lower_stmt(n, source))
                .collect();
            cases.push(stmts);
        }
    }
    Some(Stmt::Switch {
        subject: lower_expr(subject, source),
        cases,
    })
}

fn lower_declarator(node: Node, source: &str) -> Option<Declarator> {
    let name = node_text(&node.child_by_field_name("name")?, source).to_string();
    Some(Declarator {
        name,
        init: node
            .child_by_field_name("value")
            .map(|v| lower_expr(v, source)),
    })
}

pub fn lower_expr(node: Node, source: &str) -> Expr {
    let text = node_text(&node, source).to_string();
    let kind = lower_expr_kind(node, source);
    Expr { kind, text }
}

fn lower_expr_kind(node: Node, source: &str) -> ExprKind {
    match node.kind() {
        "identifier" => ExprKind::Ident(node_text(&node, source).to_string()),
        "decimal_integer_literal"
        | "hex_integer_literal"
        | "octal_integer_literal"
        | "binary_integer_literal"
        | "decimal_floating_point_literal"
        | "hex_floating_point_literal"
        | "string_literal"
        | "character_literal"
        | "text_block"
        | "true"
        | "false"
        | "null_literal"
        | "this"
        | "super" => ExprKind::Literal,
        "assignment_expression" => {
            match (
                node.child_by_field_name("left"),
                node.child_by_field_name("operator"),
                node.child_by_field_name("right"),
            ) {
                (Some(lhs), Some(op), Some(rhs)) => ExprKind::Assign {
                    op: if op.kind() == "=" {
                        AssignOp::Simple
                    } else {
                        AssignOp::Compound
                    },
                    lhs: Box::new(lower_expr(lhs, source)),
                    rhs: Box::new(lower_expr(rhs, source)),
                },
                _ => unsupported_kind(node, source),
            }
        }
        "binary_expression" => {
            match (
                node.child_by_field_name("left"),
                node.child_by_field_name("right"),
            ) {
                (Some(lhs), Some(rhs)) => ExprKind::Binary {
                    lhs: Box::new(lower_expr(lhs, source)),
                    rhs: Box::new(lower_expr(rhs, source)),
                },
                _ => unsupported_kind(node, source),
            }
        }
        "unary_expression" => {
            match (
                node.child_by_field_name("operator"),
                node.child_by_field_name("operand"),
            ) {
                (Some(op), Some(operand)) => ExprKind::Unary {
                    op: match op.kind() {
                        "!" => UnaryOp::Not,
                        "~" => UnaryOp::BitNot,
                        "+" => UnaryOp::Plus,
                        _ => UnaryOp::Minus,
                    },
                    operand: Box::new(lower_expr(operand, source)),
                },
                _ => unsupported_kind(node, source),
            }
        }
        "update_expression" => match first_named(node) {
            Some(operand) => ExprKind::Update {
                op: update_op(node),
                operand: Box::new(lower_expr(operand, source)),
            },
            None => unsupported_kind(node, source),
        },
        "parenthesized_expression" => match first_named(node) {
            Some(inner) => ExprKind::Paren(Box::new(lower_expr(inner, source))),
            None => unsupported_kind(node, source),
        },
        "cast_expression" => match node.child_by_field_name("value") {
            Some(value) => ExprKind::Cast(Box::new(lower_expr(value, source))),
            None => unsupported_kind(node, source),
        },
        "ternary_expression" => {
            match (
                node.child_by_field_name("condition"),
                node.child_by_field_name("consequence"),
                node.child_by_field_name("alternative"),
            ) {
                (Some(c), Some(t), Some(e)) => ExprKind::Ternary {
                    cond: Box::new(lower_expr(c, source)),
                    then_expr: Box::new(lower_expr(t, source)),
                    else_expr: Box::new(lower_expr(e, source)),
                },
                _ => unsupported_kind(node, source),
            }
        }
        "array_access" => {
            match (
                node.child_by_field_name("array"),
                node.child_by_field_name("index"),
            ) {
                (Some(array), Some(index)) => ExprKind::ArrayAccess {
                    array: Box::new(lower_expr(array, source)),
                    index: Box::new(lower_expr(index, source)),
                },
                _ => unsupported_kind(node, source),
            }
        }
        "array_initializer" => ExprKind::ArrayInit(
            named_children(node)
                .into_iter()
                .map(|n| lower_expr(n, source))
                .collect(),
        ),
        "array_creation_expression" => {
            let mut dims = Vec::new();
            for child in named_children(node) {
                if child.kind() == "dimensions_expr" {
                    if let Some(inner) = first_named(child) {
                        dims.push(lower_expr(inner, source));
                    }
                }
            }
            ExprKind::ArrayCreation {
                dims,
                init: node
                    .child_by_field_name("value")
                    .map(|v| Box::new(lower_expr(v, source))),
            }
        }
        "field_access" => {
            match (
                node.child_by_field_name("object"),
                node.child_by_field_name("field"),
            ) {
                (Some(object), Some(field)) => ExprKind::FieldAccess {
                    object: Box::new(lower_expr(object, source)),
                    field: node_text(&field, source).to_string(),
                },
                _ => unsupported_kind(node, source),
            }
        }
        "method_invocation" => match node.child_by_field_name("name") {
            Some(name) => ExprKind::MethodCall {
                receiver: node
                    .child_by_field_name("object")
                    .map(|o| Box::new(lower_expr(o, source))),
                name: node_text(&name, source).to_string(),
                args: argument_list(node, source),
            },
            None => unsupported_kind(node, source),
        },
        "object_creation_expression" => ExprKind::New {
            type_name: node
                .child_by_field_name("type")
                .and_then(|t| simple_type_name(t, source)),
            args: argument_list(node, source),
        },
        _ => unsupported_kind(node, source),
    }
}

fn unsupported_kind(node: Node, source: &str) -> ExprKind {
    ExprKind::Unsupported {
        idents: harvest_idents(node, source),
    }
}

/// The simple name of a constructed type, or `None` for qualified and other
/// non-simple type shapes (those stay an imprecision boundary).
fn simple_type_name(type_node: Node, source: &str) -> Option<String> {
    match type_node.kind() {
        "type_identifier" => Some(node_text(&type_node, source).to_string()),
        "generic_type" => named_children(type_node)
            .into_iter()
            .find(|n| n.kind() == "type_identifier")
            .map(|n| node_text(&n, source).to_string()),
        _ => None,
    }
}

fn argument_list(node: Node, source: &str) -> Vec<Expr> {
    node.child_by_field_name("arguments")
        .map(|args| {
            named_children(args)
                .into_iter()
                .map(|a| lower_expr(a, source))
                .collect()
        })
        .unwrap_or_default()
}

fn update_op(node: Node) -> UpdateOp {
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        match child.kind() {
            "++" => return UpdateOp::Increment,
            "--" => return UpdateOp::Decrement,
            _ => {}
        }
    }
    UpdateOp::Increment
}

/// All identifier leaves of a CST subtree, in left-to-right order.
fn harvest_idents(node: Node, source: &str) -> Vec<String> {
    let mut idents = Vec::new();
    collect_idents(node, source, &mut idents);
    idents
}

fn collect_idents(node: Node, source: &str, out: &mut Vec<String>) {
    if node.kind() == "identifier" {
        out.push(node_text(&node, source).to_string());
        return;
    }
    for child in named_children(node) {
        collect_idents(child, source, out);
    }
}

/// Named children with comment nodes filtered out.
fn named_children(node: Node) -> Vec<Node> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor)
        .filter(|n| !matches!(n.kind(), "line_comment" | "block_comment"))
        .collect()
}

fn first_named(node: Node) -> Option<Node> {
    named_children(node).into_iter().next()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parser::parse;
    use std::path::Path;

    fn body_of(stmts: &str) -> Vec<Stmt> {
        let source = format!("public class Program {{ static void main() {{ {stmts} }} }}");
        let unit = parse(&source, Path::new("Program.java")).unwrap();
        match &unit.classes[0].members[0] {
            Member::Method(m) => m.body.clone(),
            other => panic!("expected method, got {other:?}"),
        }
    }

    fn first_expr(stmts: &str) -> Expr {
        match body_of(stmts).remove(0) {
            Stmt::Expr(e) => e,
            other => panic!("expected expression statement, got {other:?}"),
        }
    }

    #[test]
    fn test_assignment_operator_categories() {
        match first_expr("x = y;").kind {
            ExprKind::Assign { op, .. } => assert_eq!(op, AssignOp::Simple),
            other => panic!("expected assignment, got {other:?}"),
        }
        match first_expr("x += y;").kind {
            ExprKind::Assign { op, .. } => assert_eq!(op, AssignOp::Compound),
            other => panic!("expected assignment, got {other:?}"),
        }
    }

    #[test]
    fn test_update_expression_prefix_and_postfix() {
        for (stmt, expected) in [
            ("x++;", UpdateOp::Increment),
            ("++x;", UpdateOp::Increment),
            ("x--;", UpdateOp::Decrement),
            ("--x;", UpdateOp::Decrement),
        ] {
            match first_expr(stmt).kind {
                ExprKind::Update { op, .. } => assert_eq!(op, expected),
                other => panic!("expected update, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_new_simple_vs_qualified_type() {
        match first_expr("x = new Point(a, b);").kind {
            ExprKind::Assign { rhs, .. } => match rhs.kind {
                ExprKind::New { type_name, args } => {
                    assert_eq!(type_name.as_deref(), Some("Point"));
                    assert_eq!(args.len(), 2);
                }
                other => panic!("expected new, got {other:?}"),
            },
            other => panic!("expected assignment, got {other:?}"),
        }
        match first_expr("x = new java.util.Random();").kind {
            ExprKind::Assign { rhs, .. } => match rhs.kind {
                ExprKind::New { type_name, .. } => assert!(type_name.is_none()),
                other => panic!("expected new, got {other:?}"),
            },
            other => panic!("expected assignment, got {other:?}"),
        }
    }

    #[test]
    fn test_array_initializer_and_access() {
        let body = body_of("int[] a = { x, y }; int b = a[i];");
        match &body[0] {
            Stmt::LocalDecl(decls) => match &decls[0].init.as_ref().unwrap().kind {
                ExprKind::ArrayInit(items) => assert_eq!(items.len(), 2),
                other => panic!("expected array initializer, got {other:?}"),
            },
            other => panic!("expected declaration, got {other:?}"),
        }
        match &body[1] {
            Stmt::LocalDecl(decls) => assert!(matches!(
                decls[0].init.as_ref().unwrap().kind,
                ExprKind::ArrayAccess { .. }
            )),
            other => panic!("expected declaration, got {other:?}"),
        }
    }

    #[test]
    fn test_unsupported_statement_keeps_source_text() {
        let body = body_of("try { x = y; } catch (Exception e) { }");
        match &body[0] {
            Stmt::Unsupported { text } => assert!(text.starts_with("try")),
            other => panic!("expected unsupported, got {other:?}"),
        }
    }

    #[test]
    fn test_unsupported_expression_harvests_idents() {
        let expr = first_expr("x = a instanceof Foo ? b : c;");
        // the ternary is typed, the instanceof condition is not
        match expr.kind {
            ExprKind::Assign { rhs, .. } => match rhs.kind {
                ExprKind::Ternary { cond, .. } => match cond.kind {
                    ExprKind::Unsupported { idents } => assert_eq!(idents, vec!["a"]),
                    other => panic!("expected unsupported, got {other:?}"),
                },
                other => panic!("expected ternary, got {other:?}"),
            },
            other => panic!("expected assignment, got {other:?}"),
        }
    }

    #[test]
    fn test_switch_cases_grouped_by_label() {
        let body = body_of("switch (k) { case 1: y = a; break; default: y = b; }");
        match &body[0] {
            Stmt::Switch { cases, .. } => {
                assert_eq!(cases.len(), 2);
                assert_eq!(cases[0].len(), 2); // y = a; break;
                assert_eq!(cases[1].len(), 1);
            }
            other => panic!("expected switch, got {other:?}"),
        }
    }

    #[test]
    fn test_nested_class_members() {
        let source = "class Outer { class Inner { void f() { } } void g() { } }";
        let unit = parse(source, Path::new("Outer.java")).unwrap();
        let outer = &unit.classes[0];
        assert_eq!(outer.members.len(), 2);
        assert!(matches!(outer.members[0], Member::Class(_)));
        assert!(matches!(outer.members[1], Member::Method(_)));
    }
}
