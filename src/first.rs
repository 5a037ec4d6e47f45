//! FIRST-set computation for context-free grammars.
//!
//! Both engines need FIRST sets: the Earley chart does not consult them directly, but LR(1)
//! closure computes lookaheads from FIRST(βa), and the same `first_of_string` routine doubles
//! as the fixed-point step below by passing `lookahead = None`.

use crate::grammar::Grammar;
use crate::symbol::Symbol;
use std::collections::{HashMap, HashSet};

/// FIRST sets, keyed by nonterminal. `None` in a value set stands for ε.
pub type FirstSets = HashMap<Symbol, HashSet<Option<char>>>;

/// Computes FIRST(A) for every nonterminal A of `grammar`, to a fixed point.
///
/// FIRST(A) is a set of `Option<char>`, where `Some(c)` is the terminal `c` and `None` means A
/// can derive ε.
pub fn compute_first_sets(grammar: &Grammar) -> FirstSets {
    let mut first_sets: FirstSets = HashMap::new();

    for nonterminal in grammar.nonterminals() {
        first_sets.insert(*nonterminal, HashSet::new());
    }

    let mut changed = true;
    while changed {
        changed = false;

        for rule in grammar.all_rules() {
            let lhs = rule.lhs;
            let rhs_first = first_of_string(&first_sets, &rule.rhs, None);

            let current = first_sets.get(&lhs).unwrap();
            if !rhs_first.is_subset(current) {
                first_sets.get_mut(&lhs).unwrap().extend(rhs_first);
                changed = true;
            }
        }
    }

    log::debug!("computed FIRST sets for {} nonterminals", first_sets.len());
    first_sets
}

/// Computes FIRST(γ·lookahead), where γ is a sequence of symbols and `lookahead` is appended as
/// a virtual trailing one-symbol tail.
///
/// This single routine serves two purposes, mirroring how the grammar this crate descends from
/// reuses one "trailing symbol" slot for both meanings:
///
/// - Plain FIRST(γ): call with `lookahead = None`; a `None` that survives to the end of the
///   scan (every symbol of γ nullable) means γ itself can derive ε.
/// - LR(1) closure lookaheads: call with `lookahead = Some(item.lookahead)` (or `None` for ⊥);
///   a `None` that survives to the end means the tail propagates the caller's own lookahead
///   unchanged, i.e. FIRST(γ) ∪ {lookahead} if γ is nullable, {FIRST(γ) minus ε} otherwise.
pub fn first_of_string(
    first_sets: &FirstSets,
    symbols: &[Symbol],
    lookahead: Option<char>,
) -> HashSet<Option<char>> {
    let mut result = HashSet::new();
    let mut nullable_so_far = true;

    for symbol in symbols {
        if !nullable_so_far {
            break;
        }

        match symbol {
            Symbol::Terminal(c) => {
                result.insert(Some(*c));
                nullable_so_far = false;
            }
            Symbol::Nonterminal(_) => {
                let first_sym = first_sets.get(symbol).cloned().unwrap_or_default();
                for entry in &first_sym {
                    if entry.is_some() {
                        result.insert(*entry);
                    }
                }
                nullable_so_far = first_sym.contains(&None);
            }
        }
    }

    if nullable_so_far {
        result.insert(lookahead);
    }

    result
}
