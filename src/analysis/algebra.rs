//! Pure set/relation operations behind the dataflow visitor.

use std::collections::HashSet;

/// One directed flow: information at `.0` may influence the value later
/// observed at `.1`.
pub type Flow = (String, String);

/// Flow pairs generated by an assignment: every in-variable flows to every
/// out-variable. Reflexive pairs are filtered at generation time, so no flow
/// is ever self-referential.
pub fn assign(in_v: &HashSet<String>, out_v: &HashSet<String>) -> Vec<Flow> {
    let mut flows = Vec::with_capacity(in_v.len() * out_v.len());
    for source in in_v {
        for sink in out_v {
            if source != sink {
                flows.push((source.clone(), sink.clone()));
            }
        }
    }
    flows
}

/// Control-dependency flows from a condition's variables to every variable
/// written inside the construct it guards. Operationally the same relation
/// as [`assign`].
pub fn correction(cond_v: &HashSet<String>, out_v: &HashSet<String>) -> Vec<Flow> {
    assign(cond_v, out_v)
}

/// Find a replacement name not present in `known`.
///
/// Candidates are the base name with successive unicode subscripts starting
/// at 2; subscripts are illegal in Java identifiers, so a renamed variable
/// can never collide with a source-level name. There are `|known| + 1`
/// candidates against `|known|` taken names, so by pigeonhole the bounded
/// search always succeeds.
pub fn unique_name(base: &str, known: &HashSet<String>) -> String {
    for i in 2..=known.len() + 2 {
        let candidate = format!("{base}{}", subscript(i));
        if !known.contains(&candidate) {
            return candidate;
        }
    }
    unreachable!("pigeonhole: {} candidates over {} names", known.len() + 1, known.len())
}

fn subscript(n: usize) -> String {
    const DIGITS: [char; 10] = ['₀', '₁', '₂', '₃', '₄', '₅', '₆', '₇', '₈', '₉'];
    n.to_string()
        .bytes()
        .map(|b| DIGITS[(b - b'0') as usize])
        .collect()
}
