//! Result records produced by the walker and enriched by the solver.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::analysis::algebra::Flow;

/// Everything extracted (and, after the solve stage, decided) for one input
/// file.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub input_file: String,
    /// Classes keyed by qualified name; nested classes appear flattened at
    /// the top level under their dot-joined name.
    pub classes: BTreeMap<String, ClassResult>,
}

/// Per-class results, methods keyed by simple method name.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ClassResult {
    pub methods: BTreeMap<String, MethodResult>,
}

/// The packaged outcome for one method body. Immutable after extraction
/// except for the solver fields, which the solve stage fills in.
#[derive(Debug, Clone, Serialize)]
pub struct MethodResult {
    /// Qualified name: enclosing class chain dot-joined with the method name.
    pub name: String,
    /// Literal source text of the whole declaration.
    pub source: String,
    /// Sorted list of every tracked variable.
    pub variables: Vec<String>,
    /// Deduplicated, ordered flow pairs.
    pub flows: Vec<Flow>,
    /// Source text of skipped statements and expressions, in encounter order.
    pub skipped: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verdict: Option<Verdict>,
    /// Witness levels, present only on a satisfiable verdict.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<BTreeMap<String, i64>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Verdict {
    Sat,
    Unsat,
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Verdict::Sat => write!(f, "SAT"),
            Verdict::Unsat => write!(f, "UNSAT"),
        }
    }
}
