//! Matching of patterns against expressions.
//!
//! Matching searches for all assignments of metavariables that
//! make every pattern of a [`Problem`] equal to its expression.
//! The search processes constraints in the order of their [`Complexity`].
//! Only constraints whose pattern is an expression function application
//! make the search branch, namely once for each way of
//! abstracting the expression over the operands
//! (projection and imitation).
//!
//! ~~~
//! # use metamatch::{match_all, Error, Expr};
//! let pattern = Expr::parse("(@ _P _x)")?;
//! let solutions = match_all(&pattern, &Expr::parse("(f 1)")?)?;
//! assert_eq!(solutions.len(), 4);
//! # Ok::<_, Error>(())
//! ~~~

use crate::expr::Var;
use crate::symbol::Kind;
use crate::{Appl, Complexity, Constraint, Error, Expr, FreshSymbols, Problem, Solution, Symbol};
use alloc::{boxed::Box, rc::Rc, vec::Vec};
use itertools::Either;

/// Search for all solutions of a problem.
#[derive(Clone, Debug)]
pub struct MatchingChallenge {
    problem: Problem,
    limit: Option<usize>,
    fresh: FreshSymbols,
}

impl MatchingChallenge {
    pub fn new(problem: Problem) -> Self {
        let limit = None;
        let fresh = FreshSymbols::new();
        Self {
            problem,
            limit,
            fresh,
        }
    }

    /// Abort the search after the given number of steps.
    pub fn with_limit(self, limit: usize) -> Self {
        let limit = Some(limit);
        Self { limit, ..self }
    }

    /// Take fresh symbols from the given source.
    ///
    /// The source additionally avoids all names in the problem.
    pub fn with_fresh(self, fresh: FreshSymbols) -> Self {
        Self { fresh, ..self }
    }

    /// Return a lazy iterator over all solutions.
    ///
    /// This fails if a pattern applies an expression function
    /// to a wrong number of arguments.
    pub fn solutions(&self) -> Result<Solutions, Error> {
        let mut fresh = self.fresh.clone();
        for c in self.problem.iter() {
            fresh.avoid_expr(&c.pattern);
            fresh.avoid_expr(&c.expr);
        }

        let prepare = |c: &Constraint| c.debruijn_encode().remove_bindings().beta();
        let cs = self.problem.iter().map(prepare);
        let problem = cs.collect::<Result<Problem, _>>()?;
        let solution = Solution::new(&self.problem).transformed();
        Ok(Solutions {
            stack: Vec::from([Branch::Search(problem, solution)]),
            fresh,
            moves: 0,
            limit: self.limit,
        })
    }

    /// Return all solutions.
    pub fn solve(&self) -> Result<Vec<Solution>, Error> {
        self.solutions()?.collect()
    }
}

/// Return all solutions for matching a pattern against an expression.
pub fn match_all(pattern: &Expr, expr: &Expr) -> Result<Vec<Solution>, Error> {
    match_all_pairs([(pattern.clone(), expr.clone())])
}

/// Return all solutions that match all patterns against their expressions.
pub fn match_all_pairs(pairs: impl IntoIterator<Item = (Expr, Expr)>) -> Result<Vec<Solution>, Error> {
    MatchingChallenge::new(Problem::from_pairs(pairs)?).solve()
}

/// Lazy iterator over the solutions of a [`MatchingChallenge`].
///
/// The iterator yields [`Error::SearchAborted`] once if
/// the search takes more steps than the limit of the challenge.
pub struct Solutions {
    /// branches that remain to be explored, the last one first
    stack: Vec<Branch>,
    fresh: FreshSymbols,
    moves: usize,
    limit: Option<usize>,
}

/// Pending part of the search.
enum Branch {
    /// solve the problem, extending the solution
    Search(Problem, Solution),
    /// try the remaining values of a metavariable applied as expression function
    Candidates(Candidates),
}

struct Candidates {
    problem: Problem,
    solution: Solution,
    meta: Expr,
    params: Vec<Symbol>,
    bodies: Bodies<Expr>,
}

/// Lazy sequence of expression function bodies.
type Bodies<T> = Box<dyn Iterator<Item = (T, Assigned)>>;

/// Values that the operands of an expression function application take in a body,
/// one for every parameter that occurs in the body.
type Assigned = Vec<Option<Expr>>;

impl Solutions {
    /// Number of steps performed so far.
    pub fn moves(&self) -> usize {
        self.moves
    }

    /// Extend the solution by an instantiation and substitute it in the problem.
    fn instantiate(&mut self, problem: Problem, mut solution: Solution, c: &Constraint) {
        match solution.extend(c) {
            Ok(true) => match problem.substituted(c) {
                Ok(problem) => self.stack.push(Branch::Search(problem, solution)),
                Err(e) => trace!("substitution failed: {}", e),
            },
            Ok(false) => trace!("inconsistent instantiation: {}", c),
            Err(e) => trace!("instantiation failed: {}", e),
        }
    }

    fn efa(&mut self, problem: Problem, solution: Solution, c: Constraint) {
        let (op, operands) = match c.pattern.efa_parts() {
            Some(parts) => parts,
            None => return,
        };
        if op.is_ef() {
            let reduct = op.apply(operands).and_then(|r| r.beta());
            match reduct.and_then(|r| Constraint::new(r, c.expr.clone())) {
                Ok(reduced) => self.stack.push(Branch::Search(problem.plus([reduced]), solution)),
                Err(e) => trace!("reduction failed: {}", e),
            }
        } else if op.is_meta() {
            let arity = operands.len();
            let params = self.fresh.next_n(arity);
            let params = params.into_iter().map(|p| p.into_kind(Kind::Param)).collect();
            trace!("candidates of arity {} for {}", arity, op);
            self.stack.push(Branch::Candidates(Candidates {
                problem: problem.plus([c.clone()]),
                solution,
                meta: op.clone(),
                params,
                bodies: abstractions(c.expr.clone(), 0, Vec::from_iter((0..arity).map(|_| None))),
            }))
        } else {
            trace!("operator is neither a function nor a metavariable: {}", op)
        }
    }

    /// Try the next candidate value of a metavariable.
    fn candidate(&mut self, mut cands: Candidates) {
        let body = match cands.bodies.next() {
            Some((body, _)) => body,
            None => return,
        };
        let ef = Expr::ef(cands.params.clone(), body);
        let (problem, solution) = (cands.problem.clone(), cands.solution.clone());
        let inst = Constraint::new(cands.meta.clone(), ef);
        self.stack.push(Branch::Candidates(cands));
        match inst {
            Ok(inst) => self.instantiate(problem, solution, &inst),
            Err(e) => trace!("invalid candidate: {}", e),
        }
    }
}

/// Return true if the expression may be replaced by a parameter.
fn replaceable(e: &Expr) -> bool {
    match e {
        Expr::Symb(s) => !s.is_marker() && !s.is_param(),
        _ => true,
    }
}

/// Lazily enumerate all ways of replacing subexpressions of `e` by
/// parameters bound `k` bindings outside of `e`.
///
/// A parameter replaces only subexpressions that are equal
/// when placed at the position of the expression function application,
/// because the corresponding operand cannot yield different subexpressions.
/// Subexpressions that refer to bindings outside of `e` are always replaced.
fn abstractions(e: Expr, k: usize, assigned: Assigned) -> Bodies<Expr> {
    let kept = match &e {
        Expr::Appl(a) => {
            let attrs = a.attrs.clone();
            let args = arguments(a.clone(), k, assigned.clone());
            Either::Left(args.map(move |(args, assigned)| {
                let attrs = attrs.clone();
                (Expr::Appl(Rc::new(Appl { args, attrs })), assigned)
            }))
        }
        _ => Either::Right(e.is_closed_under(k).then(|| (e.clone(), assigned.clone())).into_iter()),
    };
    let value = if replaceable(&e) { e.unshifted(k) } else { None };
    let replaced = (0..assigned.len()).filter_map(move |i| {
        let value = value.as_ref()?;
        if assigned[i].as_ref().map_or(false, |v| v != value) {
            return None;
        }
        let mut assigned = assigned.clone();
        assigned[i] = Some(value.clone());
        Some((Expr::Var(Var::new(k, i)), assigned))
    });
    Box::new(replaced.chain(kept))
}

/// Lazily enumerate the abstractions of all arguments of an application.
fn arguments(a: Rc<Appl>, k: usize, assigned: Assigned) -> Bodies<Vec<Expr>> {
    let binder = a.is_binding();
    let last = a.args.len().saturating_sub(1);
    let init: Bodies<Vec<Expr>> = Box::new(core::iter::once((Vec::new(), assigned)));
    a.args.iter().cloned().enumerate().fold(init, |prefixes, (i, arg)| {
        let k = if binder && i == last { k + 1 } else { k };
        Box::new(prefixes.flat_map(move |(prefix, assigned)| {
            abstractions(arg.clone(), k, assigned).map(move |(arg, assigned)| {
                let mut args = prefix.clone();
                args.push(arg);
                (args, assigned)
            })
        }))
    })
}

impl Iterator for Solutions {
    type Item = Result<Solution, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let branch = self.stack.pop()?;
            if self.limit.map_or(false, |limit| self.moves >= limit) {
                debug!("search aborted after {} moves", self.moves);
                self.stack.clear();
                return Some(Err(Error::SearchAborted));
            }
            self.moves += 1;

            let (mut problem, solution) = match branch {
                Branch::Search(problem, solution) => (problem, solution),
                Branch::Candidates(cands) => {
                    self.candidate(cands);
                    continue;
                }
            };
            let c = match problem.pop_first() {
                Some(c) => c,
                None => {
                    trace!("solution: {}", solution);
                    return Some(Ok(solution.restored(&mut self.fresh)));
                }
            };
            trace!("{} constraint {}", c.complexity(), c);
            match c.complexity() {
                Complexity::Failure => (),
                Complexity::Success => self.stack.push(Branch::Search(problem, solution)),
                Complexity::Instantiation => self.instantiate(problem, solution, &c),
                Complexity::Children => {
                    if let Ok(cs) = c.children() {
                        problem.extend(cs);
                        self.stack.push(Branch::Search(problem, solution))
                    }
                }
                Complexity::Efa => self.efa(problem, solution, c),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    fn solve(pairs: &[(&str, &str)]) -> Result<Vec<Solution>, Error> {
        let parse = |(p, e): &(&str, &str)| -> Result<_, Error> { Ok((Expr::parse(p)?, Expr::parse(e)?)) };
        match_all_pairs(pairs.iter().map(parse).collect::<Result<Vec<_>, Error>>()?)
    }

    /// Construct a solution from metavariable-value pairs.
    fn solution(pairs: &[(&str, &str)]) -> Result<Solution, Error> {
        let mut sol = Solution::default();
        for (m, e) in pairs {
            assert!(sol.extend(&Constraint::new(Expr::meta(m), Expr::parse(e)?)?)?);
        }
        Ok(sol)
    }

    /// Assert that the actual solutions are equal to the expected ones, in any order.
    fn check(actual: Vec<Solution>, expected: &[&[(&str, &str)]]) -> Result<(), Error> {
        let expected = expected.iter().map(|s| solution(s));
        let expected = expected.collect::<Result<Vec<_>, _>>()?;
        assert_eq!(actual.len(), expected.len(), "{:?}", actual);
        for e in expected.iter() {
            assert!(actual.contains(e), "missing {} in {:?}", e, actual);
        }
        Ok(())
    }

    #[test]
    fn simple() -> Result<(), Error> {
        check(solve(&[("a", "b")])?, &[])?;
        check(solve(&[("(f a)", "(f a)")])?, &[&[]])?;
        check(solve(&[("_A", "x")])?, &[&[("A", "x")]])?;
        check(solve(&[("(_A _B)", "(x y)")])?, &[&[("A", "x"), ("B", "y")]])?;
        check(solve(&[("(_A _A)", "(x y)")])?, &[])?;
        check(solve(&[("(_A _A)", "(x x)")])?, &[&[("A", "x")]])?;
        Ok(())
    }

    #[test]
    fn efa() -> Result<(), Error> {
        let expected: &[&[_]] = &[
            &[("P", "(@ v , v)"), ("x", "(f 1)")],
            &[("P", "(@ v , (f v))"), ("x", "1")],
            &[("P", "(@ v , (v 1))"), ("x", "f")],
            &[("P", "(@ v , (f 1))")],
        ];
        check(solve(&[("(@ _P _x)", "(f 1)")])?, expected)?;

        let expected: &[&[_]] = &[
            &[("P", "(@ v , v)"), ("x", "(f f)")],
            &[("P", "(@ v , (f v))"), ("x", "f")],
            &[("P", "(@ v , (v f))"), ("x", "f")],
            &[("P", "(@ v , (v v))"), ("x", "f")],
            &[("P", "(@ v , (f f))")],
        ];
        check(solve(&[("(@ _P _x)", "(f f)")])?, expected)?;
        Ok(())
    }

    #[test]
    fn miscellaneous() -> Result<(), Error> {
        let solutions = solve(&[("(@ _P _x)", "(b 2)"), ("(@ _P _y)", "(b 3)")])?;
        let expected: &[&[_]] = &[
            &[("x", "(b 2)"), ("y", "(b 3)"), ("P", "(@ v , v)")],
            &[("x", "2"), ("y", "3"), ("P", "(@ v , (b v))")],
        ];
        check(solutions, expected)?;

        let solutions = solve(&[("(@ _P _x)", "(f a a)"), ("_x", "b")])?;
        check(solutions, &[&[("x", "b"), ("P", "(@ v , (f a a))")]])?;

        // induction
        let solutions = solve(&[
            ("(@ _P 0)", "(= 7 5)"),
            ("(∀ _k , (=> (@ _P _k) (@ _P (+ _k 1))))", "(∀ n , (=> (= 7 5) (= 7 5)))"),
            ("(∀ _n , (@ _P _n))", "(∀ n , (= 7 5))"),
        ])?;
        check(solutions, &[&[("P", "(@ v , (= 7 5))"), ("k", "n"), ("n", "n")]])?;

        // existential elimination
        let solutions = solve(&[
            ("(∃ _x , (@ _P _x))", "(∃ x , (> x 0))"),
            ("(∀ _y , (=> (@ _P _y) _Q))", "(∀ x , (=> (> x 0) (> -1 0)))"),
            ("_Q", "(> -1 0)"),
        ])?;
        let expected = [("x", "x"), ("y", "x"), ("P", "(@ v , (> v 0))"), ("Q", "(> -1 0)")];
        check(solutions, &[&expected])?;
        Ok(())
    }

    #[test]
    fn universal_elimination() -> Result<(), Error> {
        let solutions = solve(&[
            ("(∀ _x , (@ _P _x))", "(∀ r , (> (+ (sq r) 1) 0))"),
            ("(@ _P _T)", "(> (+ (sq -9) 1) 0)"),
        ])?;
        let expected = [("P", "(@ v , (> (+ (sq v) 1) 0))"), ("T", "-9"), ("x", "r")];
        check(solutions, &[&expected])?;

        let solutions = solve(&[("(∀ _x , (@ _P _x))", "(∀ x , (R x y))"), ("(@ _P _t)", "(R 3 y)")])?;
        check(solutions, &[&[("P", "(@ v , (R v y))"), ("t", "3"), ("x", "x")]])?;

        // the bound variable must not escape its binding
        let solutions = solve(&[
            ("(∀ _x , (@ _P _x))", "(∀ x , (∃ y , (< x y)))"),
            ("(@ _P _T)", "(∃ y , (< y y))"),
        ])?;
        check(solutions, &[])
    }

    #[test]
    fn existential_introduction() -> Result<(), Error> {
        let solutions = solve(&[("(@ _P _t)", "(> 1 0)"), ("(∃ _x , (@ _P _x))", "(∃ x , (> x 0))")])?;
        check(solutions, &[&[("P", "(@ v , (> v 0))"), ("t", "1"), ("x", "x")]])?;

        let solutions = solve(&[("(@ _P _t)", "(!= x t)"), ("(∃ _x , (@ _P _x))", "(∃ y , (!= y t))")])?;
        check(solutions, &[&[("P", "(@ v , (!= v t))"), ("t", "x"), ("x", "y")]])?;

        let solutions = solve(&[("(@ _P _t)", "(!= x t)"), ("(∃ _x , (@ _P _x))", "(∃ x , (!= x x))")])?;
        check(solutions, &[])
    }

    #[test]
    fn equality_elimination() -> Result<(), Error> {
        let rule = |a, p1, p2| [("(= _a _b)", a), ("(@ _P _a)", p1), ("(@ _P _b)", p2)];

        let solutions = solve(&rule("(= t 1)", "(> t 0)", "(> 1 0)"))?;
        check(solutions, &[&[("a", "t"), ("b", "1"), ("P", "(@ v , (> v 0))")]])?;

        let solutions = solve(&rule("(= t 1)", "(= (+ 1 1) 2)", "(= (+ t 1) 2)"))?;
        check(solutions, &[])?;

        let solutions = solve(&rule("(= 1 2)", "(= (+ 1 1) 2)", "(= (+ 1 2) 2)"))?;
        check(solutions, &[&[("a", "1"), ("b", "2"), ("P", "(@ v , (= (+ 1 v) 2))")]])
    }

    #[test]
    fn restored() -> Result<(), Error> {
        // solutions do not contain encoded parameters
        let solutions = solve(&[("(@ _P _x)", "(∀ y , (Q y c))")])?;
        for sol in solutions.iter() {
            for (_, v) in sol.iter() {
                v.for_each_symb(&mut |s| assert!(!s.is_param()));
                assert!(!alloc::format!("{}", v).contains("@binding"));
            }
        }
        let sol = solutions.iter().find(|s| s.get("x").is_none());
        assert_eq!(sol.and_then(|s| s.get("P")), Some(&Expr::parse("(@ new1 , (∀ y , (Q y c)))")?));
        Ok(())
    }

    #[test]
    fn lazy() -> Result<(), Error> {
        let problem = Problem::from_pairs(vec![(Expr::parse("(@ _P _x)")?, Expr::parse("(f f)")?)])?;
        let challenge = MatchingChallenge::new(problem);
        let mut solutions = challenge.solutions()?;
        assert!(solutions.next().is_some());
        let moves = solutions.moves();
        assert_eq!(solutions.count(), 4);
        assert!(moves > 0);

        let limited = challenge.clone().with_limit(3);
        assert_eq!(limited.solve(), Err(Error::SearchAborted));
        let mut solutions = limited.solutions()?;
        assert_eq!(solutions.by_ref().last(), Some(Err(Error::SearchAborted)));
        assert!(solutions.next().is_none());

        let mut fresh = FreshSymbols::new();
        fresh.avoid(["new1", "new2"]);
        let solutions = challenge.with_fresh(fresh).solve()?;
        let ef = solutions.iter().find_map(|s| s.get("P").filter(|_| s.get("x").is_none()));
        assert_eq!(ef, Some(&Expr::parse("(@ new3 , (f f))")?));
        Ok(())
    }

    #[test]
    fn bound_and_free() -> Result<(), Error> {
        let solutions = solve(&[("(and (∀ _x , (P _x)) (Q _x))", "(and (∀ r , (P r)) (Q r))")])?;
        check(solutions, &[&[("x", "r")]])?;
        let solutions = solve(&[("(and (Q _x) (∀ _x , (P _x)))", "(and (Q r) (∀ r , (P r)))")])?;
        check(solutions, &[&[("x", "r")]])?;

        check(solve(&[("(and (∀ _x , (P _x)) (Q _x))", "(and (∀ r , (P r)) (Q s))")])?, &[])?;
        check(solve(&[("(and (Q _x) (∀ _x , (P _x)))", "(and (Q s) (∀ r , (P r)))")])?, &[])?;
        // the same metavariable binds differently named parameters
        check(solve(&[("(and (∀ _x , (P _x)) (∃ _x , (P _x)))", "(and (∀ r , (P r)) (∃ s , (P s)))")])?, &[])
    }

    #[test]
    fn wide() -> Result<(), Error> {
        let args: Vec<_> = (0..30).map(|i| alloc::format!("a{}", i)).collect();
        let target = Expr::parse(&alloc::format!("(f {})", args.join(" ")))?;
        let pattern = Expr::parse("(@ _P _x)")?;
        let problem = Problem::from_pairs([(pattern.clone(), target.clone())])?;

        let limited = MatchingChallenge::new(problem.clone()).with_limit(2);
        assert_eq!(limited.solutions()?.next(), Some(Err(Error::SearchAborted)));

        let mut solutions = MatchingChallenge::new(problem).solutions()?;
        let first = solutions.next().transpose()?;
        assert_eq!(first.as_ref().and_then(|s| s.get("x")), Some(&target));
        assert!(solutions.moves() <= 5);

        // identity, constant, and one abstracted position for each argument
        assert_eq!(match_all(&pattern, &target)?.len(), 33);
        Ok(())
    }

    #[test]
    fn arity_mismatch() -> Result<(), Error> {
        let problem = Problem::from_pairs(vec![(Expr::parse("(@ (@ x , x) a b)")?, Expr::symb("a"))])?;
        let err = MatchingChallenge::new(problem).solutions().err();
        assert_eq!(err, Some(Error::ArityMismatch { arity: 1, args: 2 }));
        Ok(())
    }
}
