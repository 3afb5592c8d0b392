//! Java parsing front end: tree-sitter integration and the typed AST the
//! dataflow engine consumes.

pub mod ast;
pub mod parser;
