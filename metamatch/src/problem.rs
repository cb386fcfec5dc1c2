//! Sets of constraints.

use crate::{Constraint, Error, Expr};
use alloc::vec::Vec;
use core::fmt::{self, Display};

/// Set of constraints, ordered by ascending complexity.
///
/// Constraints of the same complexity are kept in the order of their insertion.
#[derive(Clone, Debug, Default)]
pub struct Problem(Vec<Constraint>);

impl Problem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Construct a problem from pattern-expression pairs.
    ///
    /// ~~~
    /// # use metamatch::{Error, Expr, Problem};
    /// let pairs = [("(f _x)", "(f a)"), ("_y", "b"), ("_y", "b")];
    /// let parse = |(p, e): &(&str, &str)| -> Result<_, Error> { Ok((Expr::parse(p)?, Expr::parse(e)?)) };
    /// let pairs = pairs.iter().map(parse).collect::<Result<Vec<_>, _>>()?;
    /// let problem = Problem::from_pairs(pairs)?;
    /// assert_eq!(problem.len(), 2);
    /// assert_eq!(problem.to_string(), "{(_y,b), ((f _x),(f a))}");
    /// # Ok::<_, Error>(())
    /// ~~~
    pub fn from_pairs(pairs: impl IntoIterator<Item = (Expr, Expr)>) -> Result<Self, Error> {
        let mut problem = Self::new();
        for (p, e) in pairs {
            problem.add_pair(p, e)?
        }
        Ok(problem)
    }

    /// Insert a constraint unless it is already contained.
    pub fn add(&mut self, c: Constraint) {
        if self.0.contains(&c) {
            return;
        }
        let complexity = c.complexity();
        let pos = self.0.iter().position(|d| d.complexity() > complexity);
        self.0.insert(pos.unwrap_or(self.0.len()), c)
    }

    pub fn add_pair(&mut self, pattern: Expr, expr: Expr) -> Result<(), Error> {
        self.add(Constraint::new(pattern, expr)?);
        Ok(())
    }

    /// Return a copy of the problem with the given constraints added.
    pub fn plus(&self, cs: impl IntoIterator<Item = Constraint>) -> Self {
        let mut problem = self.clone();
        problem.extend(cs);
        problem
    }

    /// Return a copy of the problem without the constraint at the given position.
    pub fn without(&self, i: usize) -> Self {
        let mut problem = self.clone();
        problem.remove(i);
        problem
    }

    /// Remove the constraint at the given position, if it exists.
    pub fn remove(&mut self, i: usize) -> Option<Constraint> {
        (i < self.0.len()).then(|| self.0.remove(i))
    }

    /// Remove a constraint of lowest complexity.
    pub fn pop_first(&mut self) -> Option<Constraint> {
        self.remove(0)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, i: usize) -> Option<&Constraint> {
        self.0.get(i)
    }

    pub fn iter(&self) -> core::slice::Iter<'_, Constraint> {
        self.0.iter()
    }

    /// Apply an instantiation to the patterns of all constraints and
    /// reduce the resulting expression function applications.
    pub fn substituted(&self, inst: &Constraint) -> Result<Self, Error> {
        let (meta, _) = inst.instantiation().ok_or(Error::NotApplicable)?;
        let mut problem = Self::new();
        for c in self.iter() {
            if c.pattern.any_symb(&|s| s.same_name(meta)) {
                let c = c.after_substituting(core::slice::from_ref(inst))?;
                problem.add(c.beta()?)
            } else {
                problem.add(c.clone())
            }
        }
        Ok(problem)
    }
}

impl Extend<Constraint> for Problem {
    fn extend<I: IntoIterator<Item = Constraint>>(&mut self, iter: I) {
        iter.into_iter().for_each(|c| self.add(c))
    }
}

impl FromIterator<Constraint> for Problem {
    fn from_iter<I: IntoIterator<Item = Constraint>>(iter: I) -> Self {
        let mut problem = Self::new();
        problem.extend(iter);
        problem
    }
}

impl IntoIterator for Problem {
    type Item = Constraint;
    type IntoIter = alloc::vec::IntoIter<Constraint>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Problem {
    type Item = &'a Constraint;
    type IntoIter = core::slice::Iter<'a, Constraint>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Problems are equal if they contain the same constraints, in any order.
impl PartialEq for Problem {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|c| other.0.contains(c))
    }
}

impl Eq for Problem {}

impl Display for Problem {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{{")?;
        for (i, c) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", c)?;
        }
        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Complexity;
    use alloc::string::ToString;

    fn constraint(p: &str, e: &str) -> Constraint {
        let parse = |s| Expr::parse(s).unwrap();
        Constraint::new(parse(p), parse(e)).unwrap()
    }

    #[test]
    fn ordered() {
        let mut problem = Problem::new();
        assert!(problem.is_empty());
        problem.add(constraint("(@ _P x)", "(f x)"));
        problem.add(constraint("(g _a)", "(g b)"));
        problem.add(constraint("_A", "a"));
        problem.add(constraint("c", "c"));
        problem.add(constraint("_B", "b"));
        problem.add(constraint("d", "e"));
        problem.add(constraint("_A", "a"));
        assert_eq!(problem.len(), 6);

        let names: Vec<_> = problem.iter().map(|c| c.complexity()).collect();
        use Complexity::*;
        assert_eq!(names, [Failure, Success, Instantiation, Instantiation, Children, Efa]);
        // ties are broken by insertion order
        assert_eq!(problem.get(2), Some(&constraint("_A", "a")));
        assert_eq!(problem.get(3), Some(&constraint("_B", "b")));
        assert_eq!(problem.get(6), None);
    }

    #[test]
    fn copies() {
        let problem: Problem = [constraint("_A", "a"), constraint("c", "c")].into_iter().collect();
        let plus = problem.plus([constraint("d", "d"), constraint("_A", "a")]);
        assert_eq!(problem.len(), 2);
        assert_eq!(plus.len(), 3);

        let without = plus.without(0);
        assert_eq!(plus.len(), 3);
        assert_eq!(without.len(), 2);
        assert_eq!(plus.without(7), plus);

        let mut removed = plus.clone();
        assert_eq!(removed.remove(1), Some(constraint("d", "d")));
        assert_eq!(removed, problem);
    }

    #[test]
    fn equality() {
        let p1: Problem = [constraint("_A", "a"), constraint("_B", "b")].into_iter().collect();
        let p2: Problem = [constraint("_B", "b"), constraint("_A", "a")].into_iter().collect();
        assert_eq!(p1.get(0), p2.get(1));
        assert_eq!(p1, p2);
        assert_ne!(p1, p1.without(0));
        assert_eq!(p1.to_string(), "{(_A,a), (_B,b)}");
    }

    #[test]
    fn substituted() -> Result<(), Error> {
        let problem: Problem = [
            constraint("(@ _P _x)", "(f a)"),
            constraint("(g _x)", "(g a)"),
            constraint("(h _y)", "(h b)"),
        ]
        .into_iter()
        .collect();
        let inst = constraint("_P", "(@ v , (f v))");
        let problem = problem.substituted(&inst)?;
        assert_eq!(problem.to_string(), "{((f _x),(f a)), ((g _x),(g a)), ((h _y),(h b))}");
        assert_eq!(problem.substituted(&constraint("a", "a")), Err(Error::NotApplicable));
        Ok(())
    }
}
