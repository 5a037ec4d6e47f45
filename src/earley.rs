//! Earley recognition.
//!
//! Builds a chart of Earley sets S₀..Sₙ for an input of length n and accepts iff Sₙ contains a
//! completed item for the augmented start rule originating at 0.

use crate::augment::augment;
use crate::error::{GrammarError, Result};
use crate::grammar::{Grammar, Rule};
use crate::symbol::Symbol;
use std::collections::{HashMap, HashSet, VecDeque};

/// An Earley item: a rule, a dot position within its right-hand side, and the chart index it
/// originated at.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct EarleyItem {
    rule: Rule,
    dot: usize,
    origin: usize,
}

impl EarleyItem {
    fn new(rule: Rule, dot: usize, origin: usize) -> Self {
        Self { rule, dot, origin }
    }

    fn symbol_after_dot(&self) -> Option<Symbol> {
        self.rule.rhs.get(self.dot).copied()
    }

    fn is_complete(&self) -> bool {
        self.dot >= self.rule.rhs.len()
    }

    fn advanced(&self) -> Self {
        Self {
            rule: self.rule.clone(),
            dot: self.dot + 1,
            origin: self.origin,
        }
    }
}

/// One column of the chart: the items known to hold at a given input position.
#[derive(Debug, Default)]
struct EarleySet {
    items: Vec<EarleyItem>,
    seen: HashSet<EarleyItem>,
    /// Index of completed items by (lhs, origin), for the predictor's completion step.
    completed_by_origin: HashMap<(Symbol, usize), Vec<usize>>,
    /// Index of items by the symbol immediately after their dot, for `complete()`'s search of
    /// items waiting on a given nonterminal and `scan()`'s search of items waiting on a given
    /// terminal.
    by_next_symbol: HashMap<Symbol, Vec<usize>>,
}

impl EarleySet {
    /// Adds `item` to this set if not already present, returning whether it was newly added.
    fn insert(&mut self, item: EarleyItem) -> bool {
        if self.seen.contains(&item) {
            return false;
        }
        self.seen.insert(item.clone());
        let index = self.items.len();
        if item.is_complete() {
            self.completed_by_origin
                .entry((item.rule.lhs, item.origin))
                .or_default()
                .push(index);
        } else if let Some(symbol) = item.symbol_after_dot() {
            self.by_next_symbol.entry(symbol).or_default().push(index);
        }
        self.items.push(item);
        true
    }

    /// Checks whether some item completed at this position originates at `origin` for `lhs` —
    /// the test behind the ε-completion shortcut (spec requires origin == the set being closed,
    /// i.e. a zero-width completion).
    fn has_completion_from(&self, lhs: Symbol, origin: usize) -> bool {
        self.completed_by_origin.contains_key(&(lhs, origin))
    }

    /// Returns the items of this set whose next symbol is `symbol`, in insertion order.
    fn waiting_on(&self, symbol: Symbol) -> impl Iterator<Item = &EarleyItem> {
        self.by_next_symbol
            .get(&symbol)
            .into_iter()
            .flatten()
            .map(|&idx| &self.items[idx])
    }
}

/// A chart-based Earley recognizer for a single grammar.
///
/// Construction augments the grammar with a fresh start rule and stores the result; the input
/// word is consumed only by [`EarleyEngine::predict`], so one engine recognizes many words.
#[derive(Debug)]
pub struct EarleyEngine {
    grammar: Grammar,
    start: Symbol,
}

impl EarleyEngine {
    /// Builds an Earley engine from `grammar`.
    ///
    /// Fails only with [`GrammarError::StartSymbolConflict`], since Earley recognition places
    /// no LR(1)-style restriction on the grammar.
    pub fn new(grammar: Grammar) -> Result<Self> {
        let (augmented, start) = augment(&grammar)?;
        Ok(Self {
            grammar: augmented,
            start,
        })
    }

    /// Recognizes `word`, returning `Ok(true)` iff it is in the language of the grammar.
    ///
    /// Fails with [`GrammarError::InvalidInput`] if `word` contains a character that is not a
    /// terminal of the (original, un-augmented) grammar.
    pub fn predict(&self, word: &str) -> Result<bool> {
        let chars: Vec<char> = word.chars().collect();
        for &c in &chars {
            if !self.grammar.terminals().contains(&Symbol::Terminal(c)) {
                return Err(GrammarError::InvalidInput(c));
            }
        }
        let n = chars.len();

        let mut sets: Vec<EarleySet> = (0..=n).map(|_| EarleySet::default()).collect();
        for rule in self.grammar.rules_for(self.start.as_char()) {
            sets[0].insert(EarleyItem::new(rule.clone(), 0, 0));
        }

        for i in 0..=n {
            let mut worklist: VecDeque<usize> = (0..sets[i].items.len()).collect();

            while let Some(idx) = worklist.pop_front() {
                let item = sets[i].items[idx].clone();

                match item.symbol_after_dot() {
                    None => {
                        self.complete(&mut sets, i, &item, &mut worklist);
                    }
                    Some(Symbol::Nonterminal(_)) => {
                        self.predict_step(&mut sets, i, &item, &mut worklist);
                    }
                    Some(Symbol::Terminal(_)) => {}
                }
            }

            if i < n {
                self.scan(&mut sets, i, chars[i]);
            }
        }

        log::debug!(
            "earley chart for word of length {n} has {} items in final set",
            sets[n].items.len()
        );

        let accepted = sets[n].items.iter().any(|item| {
            item.is_complete() && item.rule.lhs == self.start && item.origin == 0
        });
        Ok(accepted)
    }

    /// Predictor step for item `[A -> α•Bβ, j]` at position `i`: adds `[B -> •γ, i]` for every
    /// rule `B -> γ`, plus the ε-completion shortcut described in the module docs.
    fn predict_step(
        &self,
        sets: &mut [EarleySet],
        i: usize,
        item: &EarleyItem,
        worklist: &mut VecDeque<usize>,
    ) {
        let Some(Symbol::Nonterminal(b)) = item.symbol_after_dot() else {
            return;
        };

        for rule in self.grammar.rules_for(b) {
            let new_item = EarleyItem::new(rule.clone(), 0, i);
            if sets[i].insert(new_item) {
                worklist.push_back(sets[i].items.len() - 1);
            }
        }

        // If B has already been completed with a zero-width derivation starting at i, the
        // predicted item is immediately advanceable: add [A -> αB•β, j] without waiting for a
        // later completion to synthesize it by the ordinary "complete" route, since that
        // completed item may already be fully processed by the time this predict runs.
        if sets[i].has_completion_from(Symbol::Nonterminal(b), i) {
            let advanced = item.advanced();
            if sets[i].insert(advanced) {
                worklist.push_back(sets[i].items.len() - 1);
            }
        }
    }

    /// Completer step for a completed item `[B -> γ•, j]` at position `i`: advances every item
    /// in `S_j` waiting on `B`.
    fn complete(
        &self,
        sets: &mut [EarleySet],
        i: usize,
        item: &EarleyItem,
        worklist: &mut VecDeque<usize>,
    ) {
        let lhs = item.rule.lhs;
        let origin = item.origin;

        let waiting: Vec<EarleyItem> = sets[origin].waiting_on(lhs).cloned().collect();

        for waiting_item in waiting {
            let advanced = waiting_item.advanced();
            if sets[i].insert(advanced) {
                worklist.push_back(sets[i].items.len() - 1);
            }
        }
    }

    /// Scanner step: for every item in `S_i` expecting terminal `c`, adds its advance to
    /// `S_{i+1}`.
    fn scan(&self, sets: &mut [EarleySet], i: usize, c: char) {
        let matching: Vec<EarleyItem> = sets[i]
            .waiting_on(Symbol::Terminal(c))
            .cloned()
            .collect();

        for item in matching {
            sets[i + 1].insert(item.advanced());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn balanced_anbn() -> Grammar {
        let mut g = Grammar::construct(["S"], ["a", "b"], "S").unwrap();
        g.add_rule('S', "aSb").unwrap();
        g.add_rule('S', "").unwrap();
        g
    }

    #[test]
    fn accepts_balanced_words() {
        let engine = EarleyEngine::new(balanced_anbn()).unwrap();
        assert!(engine.predict("").unwrap());
        assert!(engine.predict("ab").unwrap());
        assert!(engine.predict("aaabbb").unwrap());
    }

    #[test]
    fn rejects_unbalanced_words() {
        let engine = EarleyEngine::new(balanced_anbn()).unwrap();
        assert!(!engine.predict("aab").unwrap());
        assert!(!engine.predict("aabbb").unwrap());
    }

    #[test]
    fn rejects_input_outside_terminal_alphabet() {
        let engine = EarleyEngine::new(balanced_anbn()).unwrap();
        let err = engine.predict("ac").unwrap_err();
        assert!(matches!(err, GrammarError::InvalidInput('c')));
    }

    #[test]
    fn handles_ambiguous_grammar_with_infinite_derivations() {
        // S -> SS | a: ambiguous, and S has infinitely many leftmost derivations of "a", but
        // Earley recognition must still terminate and accept.
        let mut g = Grammar::construct(["S"], ["a"], "S").unwrap();
        g.add_rule('S', "SS").unwrap();
        g.add_rule('S', "a").unwrap();
        let engine = EarleyEngine::new(g).unwrap();
        assert!(engine.predict("a").unwrap());
        assert!(engine.predict("aaaa").unwrap());
        assert!(!engine.predict("").unwrap());
    }

    #[test]
    fn handles_nested_nullable_chains() {
        let mut g = Grammar::construct(["S", "A", "B"], ["a"], "S").unwrap();
        g.add_rule('S', "AB").unwrap();
        g.add_rule('A', "").unwrap();
        g.add_rule('B', "").unwrap();
        g.add_rule('B', "a").unwrap();
        let engine = EarleyEngine::new(g).unwrap();
        assert!(engine.predict("").unwrap());
        assert!(engine.predict("a").unwrap());
        assert!(!engine.predict("aa").unwrap());
    }
}
