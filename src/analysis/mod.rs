//! Dataflow extraction: identifier collection, the flow algebra, the
//! scope-aware recursive visitor, and the class/method walker that packages
//! per-method results.

pub mod algebra;
pub mod idents;
pub mod result;
pub mod scope;
pub mod visitor;
pub mod walker;

use crate::analysis::result::AnalysisReport;
use crate::parse::ast::CompilationUnit;
use std::path::Path;

/// Run dataflow extraction over a parsed compilation unit.
pub fn analyze(unit: &CompilationUnit, input: &Path) -> AnalysisReport {
    AnalysisReport {
        input_file: input.display().to_string(),
        classes: walker::walk(unit),
    }
}
