// Export modules for library usage
pub mod analysis;
pub mod cli;
pub mod commands;
pub mod errors;
pub mod io;
pub mod parse;
pub mod solve;

// Re-export commonly used types
pub use crate::analysis::result::{AnalysisReport, ClassResult, MethodResult, Verdict};
pub use crate::analysis::scope::ScopeState;
pub use crate::analysis::visitor::analyze_body;
pub use crate::analysis::walker::walk;
pub use crate::errors::JavaflowError;
pub use crate::io::output::{OutputConfig, OutputFormat, ReportWriter};
pub use crate::parse::ast::{ClassDecl, CompilationUnit, Expr, ExprKind, MethodDecl, Stmt};
pub use crate::parse::parser::parse;
pub use crate::solve::{solve_levels, solve_report, Solved};
