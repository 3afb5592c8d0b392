//! Class/method walker: drives the dataflow visitor once per method body and
//! packages the results.
//!
//! Qualified class names are built top-down by dot-joining with the enclosing
//! class; nested classes are recorded flattened at the root of the result map
//! under their full qualified name, while methods live in their own class's
//! result keyed by simple method name.

use crate::analysis::result::{ClassResult, MethodResult};
use crate::analysis::visitor::analyze_body;
use crate::parse::ast::{ClassDecl, CompilationUnit, Member, MethodDecl};
use log::debug;
use std::collections::BTreeMap;

/// Walk every class of a compilation unit into a qualified-name keyed map.
pub fn walk(unit: &CompilationUnit) -> BTreeMap<String, ClassResult> {
    let mut classes = BTreeMap::new();
    for class in &unit.classes {
        walk_class(class, None, &mut classes);
    }
    classes
}

fn walk_class(class: &ClassDecl, prefix: Option<&str>, out: &mut BTreeMap<String, ClassResult>) {
    let qualified = match prefix {
        Some(prefix) => format!("{prefix}.{}", class.name),
        None => class.name.clone(),
    };
    let mut result = ClassResult::default();
    for member in &class.members {
        match member {
            Member::Class(inner) => walk_class(inner, Some(&qualified), out),
            Member::Method(method) => {
                result
                    .methods
                    .insert(method.name.clone(), analyze_method(&qualified, method));
            }
        }
    }
    out.insert(qualified, result);
}

fn analyze_method(class_name: &str, method: &MethodDecl) -> MethodResult {
    debug!("analyzing {class_name}.{}", method.name);
    let scope = analyze_body(&method.body);
    let mut variables: Vec<String> = scope.vars.iter().cloned().collect();
    variables.sort();
    MethodResult {
        name: format!("{class_name}.{}", method.name),
        source: method.source.clone(),
        variables,
        flows: scope.flows().into_iter().collect(),
        skipped: scope.skipped,
        verdict: None,
        model: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parser::parse;
    use std::path::Path;

    fn walk_source(source: &str) -> BTreeMap<String, ClassResult> {
        walk(&parse(source, Path::new("T.java")).unwrap())
    }

    #[test]
    fn test_nested_classes_flatten_under_qualified_names() {
        let classes = walk_source(
            "class Outer { class Inner { void f() { } } void g() { } }",
        );
        assert_eq!(
            classes.keys().collect::<Vec<_>>(),
            vec!["Outer", "Outer.Inner"]
        );
        assert!(classes["Outer"].methods.contains_key("g"));
        assert!(classes["Outer.Inner"].methods.contains_key("f"));
    }

    #[test]
    fn test_method_result_carries_qualified_name_and_source() {
        let classes = walk_source("class A { class B { int f(int x) { return x; } } }");
        let method = &classes["A.B"].methods["f"];
        assert_eq!(method.name, "A.B.f");
        assert!(method.source.starts_with("int f(int x)"));
        assert!(method.variables.contains(&"x".to_string()));
    }

    #[test]
    fn test_flows_are_deduplicated_and_sorted() {
        let classes = walk_source(
            "class A { void m() { y = x; y = x; z = a; } }",
        );
        let method = &classes["A"].methods["m"];
        let expected = vec![
            ("a".to_string(), "z".to_string()),
            ("x".to_string(), "y".to_string()),
        ];
        assert_eq!(method.flows, expected);
    }

    #[test]
    fn test_methods_are_independent() {
        let classes = walk_source(
            "class A { void m() { y = x; } void n() { q = p; } }",
        );
        let m = &classes["A"].methods["m"];
        let n = &classes["A"].methods["n"];
        assert!(!m.variables.contains(&"p".to_string()));
        assert!(!n.variables.contains(&"x".to_string()));
    }
}
