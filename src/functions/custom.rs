//! # custom.rs
//!
//! User-defined function clauses.
//!
//! A declaration such as `f(x, 0) = x + 1` becomes a [`Clause`]: a parameter
//! pattern (`[$0, 0]`) and a body already evaluated with every parameter
//! name replaced by its positional slot. All clauses sharing a storage key
//! (`f@2`) form an overload list kept in dispatch order, most specific
//! first.

use crate::functions::core::NumericBackend;
use crate::node::Node;

use smallvec::SmallVec;
use std::cmp::Ordering;
use std::rc::Rc;

pub(crate) const ARITY_THRESH: usize = 4;

/// One position of a clause pattern.
#[derive(Debug, Clone, PartialEq)]
pub enum Parameter<T = f64> {
    /// Matches any argument; bound to `$index` while the body runs.
    Positional(usize),
    /// Matches only an argument equal to the value.
    Literal(T),
}

impl<T: NumericBackend> Parameter<T> {
    fn matches(&self, arg: &T) -> bool {
        match self {
            Parameter::Positional(_) => true,
            Parameter::Literal(value) => value == arg,
        }
    }

    /// Literals sort before positional slots; literals sort by value.
    fn specificity(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Parameter::Literal(a), Parameter::Literal(b)) => a.partial_cmp(b).unwrap_or(Ordering::Equal),
            (Parameter::Literal(_), Parameter::Positional(_)) => Ordering::Less,
            (Parameter::Positional(_), Parameter::Literal(_)) => Ordering::Greater,
            (Parameter::Positional(_), Parameter::Positional(_)) => Ordering::Equal,
        }
    }
}

impl<T: NumericBackend> std::fmt::Display for Parameter<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Parameter::Positional(index) => write!(f, "${index}"),
            Parameter::Literal(value) => write!(f, "{}", value.canonical()),
        }
    }
}

/// A `(pattern, body)` pair stored under a `name@arity` key.
///
/// Patterns are stored inline using `SmallVec` up to `ARITY_THRESH`
/// parameters before heap allocation.
#[derive(Debug, Clone, PartialEq)]
pub struct Clause<T = f64> {
    pattern: SmallVec<[Parameter<T>; ARITY_THRESH]>,
    body: Node<T>,
}

impl<T: NumericBackend> Clause<T> {
    pub fn new<I>(pattern: I, body: Node<T>) -> Self
    where
        I: IntoIterator<Item = Parameter<T>>,
    {
        Self { pattern: pattern.into_iter().collect(), body }
    }

    pub fn pattern(&self) -> &[Parameter<T>] {
        &self.pattern
    }

    pub fn body(&self) -> &Node<T> {
        &self.body
    }

    pub fn arity(&self) -> usize {
        self.pattern.len()
    }

    /// Whether every literal parameter equals the argument at its position.
    pub fn matches(&self, args: &[T]) -> bool {
        self.pattern.len() == args.len()
            && self.pattern.iter().zip(args).all(|(param, arg)| param.matches(arg))
    }

    /// Orders patterns by length, then element-wise by specificity.
    pub fn compare_pattern(&self, other: &Self) -> Ordering {
        self.pattern.len().cmp(&other.pattern.len()).then_with(|| {
            self.pattern.iter().zip(&other.pattern)
                .map(|(a, b)| a.specificity(b))
                .find(|ord| ord.is_ne())
                .unwrap_or(Ordering::Equal)
        })
    }
}

impl<T: NumericBackend> std::fmt::Display for Clause<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let params: Vec<String> = self.pattern.iter().map(|p| p.to_string()).collect();
        write!(f, "({}) = {}", params.join(", "), self.body)
    }
}

/// Merges `clause` into an overload list kept in dispatch order.
///
/// A clause with an equal pattern replaces the stored one; otherwise the
/// clause is inserted before the first less specific clause.
pub(crate) fn merge_clause<T: NumericBackend>(clauses: &mut Vec<Rc<Clause<T>>>, clause: Rc<Clause<T>>) {
    for idx in 0..clauses.len() {
        match clause.compare_pattern(&clauses[idx]) {
            Ordering::Equal => {
                clauses[idx] = clause;
                return;
            }
            Ordering::Less => {
                clauses.insert(idx, clause);
                return;
            }
            Ordering::Greater => {}
        }
    }
    clauses.push(clause);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clause(pattern: &[Parameter<f64>], body: f64) -> Rc<Clause<f64>> {
        Rc::new(Clause::new(pattern.iter().cloned(), Node::Number(body)))
    }

    fn bodies(clauses: &[Rc<Clause<f64>>]) -> Vec<f64> {
        clauses.iter().map(|c| *c.body().as_number().unwrap()).collect()
    }

    #[test]
    fn test_matches() {
        let c = clause(&[Parameter::Positional(0), Parameter::Literal(1.0)], 0.0);
        assert!(c.matches(&[5.0, 1.0]));
        assert!(!c.matches(&[5.0, 2.0]));
        assert!(!c.matches(&[5.0]));
        assert!(clause(&[], 0.0).matches(&[]));
    }

    #[test]
    fn test_literal_sorts_before_positional() {
        let literal = clause(&[Parameter::Literal(7.0)], 0.0);
        let positional = clause(&[Parameter::Positional(0)], 0.0);
        assert_eq!(literal.compare_pattern(&positional), Ordering::Less);
        assert_eq!(positional.compare_pattern(&literal), Ordering::Greater);
        assert_eq!(positional.compare_pattern(&positional), Ordering::Equal);
    }

    #[test]
    fn test_merge_orders_most_specific_first() {
        let mut list = Vec::new();
        merge_clause(&mut list, clause(&[Parameter::Positional(0)], 3.0));
        merge_clause(&mut list, clause(&[Parameter::Literal(1.0)], 2.0));
        merge_clause(&mut list, clause(&[Parameter::Literal(0.0)], 1.0));
        assert_eq!(bodies(&list), vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_merge_replaces_equal_pattern() {
        let mut list = Vec::new();
        merge_clause(&mut list, clause(&[Parameter::Literal(0.0)], 1.0));
        merge_clause(&mut list, clause(&[Parameter::Positional(0)], 2.0));
        merge_clause(&mut list, clause(&[Parameter::Literal(0.0)], 5.0));
        assert_eq!(bodies(&list), vec![5.0, 2.0]);
    }

    #[test]
    fn test_display() {
        let c = clause(&[Parameter::Positional(0), Parameter::Literal(2.0)], 4.0);
        assert_eq!(c.to_string(), "($0, 2) = 4");
    }
}
