//! Flow-to-constraint translation and the black-box solve step.
//!
//! Each method is solved independently: one non-negative integer level symbol
//! per tracked variable, one `level(source) <= level(sink)` constraint per
//! flow pair, plus optional externally pinned levels. Minimizing the sum of
//! levels keeps the witness small; the constraint system is a difference
//! system over integers, so the relaxed optimum is integral and rounding the
//! solver's values is exact.

use good_lp::{
    constraint, default_solver, variable, variables, Expression, ResolutionError, Solution,
    SolverModel, Variable,
};
use log::{debug, warn};
use std::collections::{BTreeMap, HashMap};

use crate::analysis::algebra::Flow;
use crate::analysis::result::{AnalysisReport, Verdict};
use crate::errors::JavaflowError;

/// Outcome of one solve: the verdict, and a witness model when satisfiable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Solved {
    pub verdict: Verdict,
    pub model: Option<BTreeMap<String, i64>>,
}

/// Decide level constraints for one variable/flow set.
///
/// `pins` fixes named levels to exact values; a pin on an unknown name is
/// ignored with a warning. `UNSAT` is a verdict; any other solver failure is
/// surfaced as an error, never conflated with `UNSAT`.
pub fn solve_levels(
    vars: &[String],
    flows: &[Flow],
    pins: &BTreeMap<String, i64>,
) -> Result<Solved, JavaflowError> {
    let mut problem = variables!();
    let mut symbols: HashMap<&str, Variable> = HashMap::new();
    for name in vars {
        symbols
            .entry(name.as_str())
            .or_insert_with(|| problem.add(variable().min(0)));
    }
    for (source, sink) in flows {
        for name in [source, sink] {
            symbols
                .entry(name.as_str())
                .or_insert_with(|| problem.add(variable().min(0)));
        }
    }
    if symbols.is_empty() {
        return Ok(Solved {
            verdict: Verdict::Sat,
            model: Some(BTreeMap::new()),
        });
    }

    let objective = symbols
        .values()
        .fold(Expression::from(0.0), |acc, v| acc + *v);
    let mut model = problem.minimise(objective).using(default_solver);
    for (source, sink) in flows {
        let (lo, hi) = (symbols[source.as_str()], symbols[sink.as_str()]);
        model = model.with(constraint!(lo <= hi));
    }
    for (name, level) in pins {
        match symbols.get(name.as_str()) {
            Some(symbol) => {
                let symbol = *symbol;
                model = model.with(constraint!(symbol == *level as f64));
            }
            None => warn!("pin on unknown variable {name} ignored"),
        }
    }

    match model.solve() {
        Ok(solution) => {
            let witness: BTreeMap<String, i64> = symbols
                .iter()
                .map(|(name, symbol)| (name.to_string(), solution.value(*symbol).round() as i64))
                .collect();
            debug!("SAT with witness {witness:?}");
            Ok(Solved {
                verdict: Verdict::Sat,
                model: Some(witness),
            })
        }
        Err(ResolutionError::Infeasible) => Ok(Solved {
            verdict: Verdict::Unsat,
            model: None,
        }),
        Err(other) => Err(JavaflowError::Solver(other.to_string())),
    }
}

/// Run the solve step over every method of a report, in place. Methods with
/// no tracked variables are skipped: there is nothing to solve.
pub fn solve_report(report: &mut AnalysisReport) -> Result<(), JavaflowError> {
    for class in report.classes.values_mut() {
        for method in class.methods.values_mut() {
            if method.variables.is_empty() {
                debug!("skipping {}: no variables", method.name);
                continue;
            }
            let solved = solve_levels(&method.variables, &method.flows, &BTreeMap::new())?;
            method.verdict = Some(solved.verdict);
            method.model = solved.model;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|n| n.to_string()).collect()
    }

    fn flows(pairs: &[(&str, &str)]) -> Vec<Flow> {
        pairs
            .iter()
            .map(|(a, b)| (a.to_string(), b.to_string()))
            .collect()
    }

    #[test]
    fn test_monotone_chain_is_sat() {
        let solved = solve_levels(
            &names(&["x", "y", "z"]),
            &flows(&[("x", "y"), ("y", "z")]),
            &BTreeMap::new(),
        )
        .unwrap();
        assert_eq!(solved.verdict, Verdict::Sat);
        let model = solved.model.unwrap();
        assert!(model["x"] <= model["y"]);
        assert!(model["y"] <= model["z"]);
        assert!(model.values().all(|&v| v >= 0));
    }

    #[test]
    fn test_cycle_alone_is_sat() {
        // a <= cycle is satisfiable with all levels equal
        let solved = solve_levels(
            &names(&["x", "y", "z"]),
            &flows(&[("x", "y"), ("y", "z"), ("z", "x")]),
            &BTreeMap::new(),
        )
        .unwrap();
        assert_eq!(solved.verdict, Verdict::Sat);
        let model = solved.model.unwrap();
        assert_eq!(model["x"], model["y"]);
        assert_eq!(model["y"], model["z"]);
    }

    #[test]
    fn test_cycle_with_conflicting_pins_is_unsat() {
        let pins: BTreeMap<String, i64> =
            [("x".to_string(), 2), ("z".to_string(), 0)].into_iter().collect();
        let solved = solve_levels(
            &names(&["x", "y", "z"]),
            &flows(&[("x", "y"), ("y", "z"), ("z", "x")]),
            &pins,
        )
        .unwrap();
        assert_eq!(solved.verdict, Verdict::Unsat);
        assert!(solved.model.is_none());
    }

    #[test]
    fn test_pins_constrain_the_witness() {
        let pins: BTreeMap<String, i64> = [("x".to_string(), 2)].into_iter().collect();
        let solved = solve_levels(&names(&["x", "y"]), &flows(&[("x", "y")]), &pins).unwrap();
        assert_eq!(solved.verdict, Verdict::Sat);
        let model = solved.model.unwrap();
        assert_eq!(model["x"], 2);
        assert!(model["y"] >= 2);
    }

    #[test]
    fn test_unpinned_unknown_name_is_ignored() {
        let pins: BTreeMap<String, i64> = [("ghost".to_string(), 7)].into_iter().collect();
        let solved = solve_levels(&names(&["x"]), &[], &pins).unwrap();
        assert_eq!(solved.verdict, Verdict::Sat);
        assert!(!solved.model.unwrap().contains_key("ghost"));
    }

    #[test]
    fn test_no_variables_is_trivially_sat() {
        let solved = solve_levels(&[], &[], &BTreeMap::new()).unwrap();
        assert_eq!(solved.verdict, Verdict::Sat);
        assert_eq!(solved.model, Some(BTreeMap::new()));
    }
}
