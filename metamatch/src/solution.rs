//! Assignments of metavariables.

use crate::{debruijn, Constraint, Error, Expr, FreshSymbols, Problem};
use alloc::collections::BTreeSet;
use alloc::string::{String, ToString};
use core::fmt::{self, Display};

/// Simultaneous substitution of metavariables, obtained by matching.
///
/// The values of a solution never contain metavariables.
/// During matching, the values are de Bruijn-encoded and without bindings;
/// [`Solution::restored`] reverts these transformations.
#[derive(Clone, Debug, Default)]
pub struct Solution {
    map: im::OrdMap<String, Expr>,
    /// metavariables of the problem that the solution was created for
    domain: BTreeSet<String>,
    encoded: bool,
    bindings_removed: bool,
}

impl Solution {
    /// Create an empty solution for a problem.
    pub fn new(problem: &Problem) -> Self {
        let domain = problem.iter().flat_map(|c| c.pattern.metas()).collect();
        Self {
            domain,
            ..Self::default()
        }
    }

    /// Record that the values of the solution are de Bruijn-encoded
    /// and that their bindings are removed.
    pub(crate) fn transformed(self) -> Self {
        Self {
            encoded: true,
            bindings_removed: true,
            ..self
        }
    }

    /// Add an instantiation to the solution.
    ///
    /// Return false if the instantiation conflicts with the solution,
    /// namely if its metavariable is already assigned a different value,
    /// or if its value refers to bindings outside of it.
    pub fn extend(&mut self, c: &Constraint) -> Result<bool, Error> {
        let (meta, value) = c.instantiation().ok_or(Error::NotApplicable)?;
        if !value.is_closed() {
            trace!("value with loose variables: {}", value);
            return Ok(false);
        }
        if let Some(old) = self.map.get(&*meta.text) {
            return Ok(same_value(old, &value));
        }
        let update = |(k, v): (&String, &Expr)| -> Result<_, Error> {
            let v = if v.has_meta() { c.applied_to(v)? } else { v.clone() };
            Ok((k.clone(), v))
        };
        self.map = self.map.iter().map(update).collect::<Result<_, _>>()?;
        self.map.insert(meta.text.to_string(), value);
        Ok(true)
    }

    /// Return the value of a metavariable.
    pub fn get(&self, name: &str) -> Option<&Expr> {
        self.map.get(name)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Iterate over the metavariables and their values.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Expr)> {
        self.map.iter()
    }

    /// Metavariables of the problem that the solution was created for.
    pub fn domain(&self) -> &BTreeSet<String> {
        &self.domain
    }

    /// Metavariables of the problem that are not assigned any value.
    pub fn unassigned(&self) -> impl Iterator<Item = &String> {
        self.domain.iter().filter(|m| !self.map.contains_key(m.as_str()))
    }

    /// Return the solution as problem consisting of instantiations.
    pub fn instantiations(&self) -> Problem {
        let inst = |(k, v): (&String, &Expr)| Constraint::new(Expr::meta(k), v.clone()).ok();
        self.map.iter().filter_map(inst).collect()
    }

    /// Reintroduce bindings and decode the values.
    ///
    /// Fresh parameter names are taken from the given source.
    pub fn restored(&self, fresh: &mut FreshSymbols) -> Self {
        let mut restore = |v: &Expr| {
            let v = if self.bindings_removed { v.with_bindings() } else { v.clone() };
            if self.encoded {
                debruijn::decode_with(&v, fresh)
            } else {
                v
            }
        };
        let mut map = im::OrdMap::new();
        for (k, v) in self.map.iter() {
            map.insert(k.clone(), restore(v));
        }
        Self {
            map,
            domain: self.domain.clone(),
            encoded: false,
            bindings_removed: false,
        }
    }
}

/// Return true if two values are alpha-equivalent,
/// regardless of whether their bindings are removed.
fn same_value(v1: &Expr, v2: &Expr) -> bool {
    v1.with_bindings().alpha_eq(&v2.with_bindings())
}

/// Solutions are equal if they assign alpha-equivalent values
/// to the same metavariables.
impl PartialEq for Solution {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .all(|(k, v)| other.get(k).map_or(false, |v2| same_value(v, v2)))
    }
}

impl Display for Solution {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (k, v)) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {}", k, v)?;
        }
        write!(f, "}}")
    }
}
