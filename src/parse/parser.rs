//! Tree-sitter parser integration for Java.
//!
//! Parsing is the fatal tier of error handling: a source file that does not
//! parse cleanly stops the pipeline before any dataflow extraction runs.

use crate::errors::JavaflowError;
use crate::parse::ast::{lower_unit, CompilationUnit};
use log::{debug, error};
use std::path::Path;
use tree_sitter::{Parser, Tree};

/// Parse Java source into the typed compilation unit.
///
/// Returns `JavaflowError::Syntax` when the tree contains error nodes;
/// later stages must never see a partially parsed tree.
pub fn parse(source: &str, path: &Path) -> Result<CompilationUnit, JavaflowError> {
    let tree = parse_tree(source)?;
    if tree.root_node().has_error() {
        error!("syntax errors in {}", path.display());
        return Err(JavaflowError::Syntax {
            path: path.to_path_buf(),
        });
    }
    debug!("parsed {} successfully", path.display());
    Ok(lower_unit(tree.root_node(), source))
}

fn parse_tree(source: &str) -> Result<Tree, JavaflowError> {
    let mut parser = Parser::new();
    parser
        .set_language(&tree_sitter_java::LANGUAGE.into())
        .map_err(|e| JavaflowError::Parser(e.to_string()))?;
    parser
        .parse(source, None)
        .ok_or_else(|| JavaflowError::Parser("parse returned no tree".to_string()))
}

/// Get text for a tree-sitter node.
pub fn node_text<'a>(node: &tree_sitter::Node, source: &'a str) -> &'a str {
    &source[node.start_byte()..node.end_byte()]
}
