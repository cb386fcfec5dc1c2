//! Processing of events & files.

use crate::event::Label;
use crate::{Error, Event, Opt, PathRead, Stage};
use metamatch::expr::GIVEN;
use metamatch::{formula, Expr, MatchingChallenge, Problem, Solution};
use metamatch_parse::{Lazy, Term};
use rayon::iter::{ParallelBridge, ParallelIterator};
use std::io::{BufRead, BufReader, Read, Write};
use std::path::PathBuf;

/// Lazily parse a sequence of problems from a reader.
fn parse(read: impl Read) -> impl Iterator<Item = Result<Term<String>, Error>> {
    let lines = BufReader::new(read).lines().map(|line| line.map_err(Error::from));
    Lazy::new(lines)
}

/// Construct a problem from an environment of alternating patterns and expressions.
fn problem(tm: Term<String>, opt: &Opt) -> Result<Problem, Error> {
    let e = Expr::from_term(tm)?;
    let children = e.children();
    if !e.is_env() || children.len() % 2 != 0 {
        return Err(Error::Unpaired(e.to_string()));
    }
    let declared: Vec<&str> = opt.declare.iter().flatten().map(|s| s.as_str()).collect();
    let pattern = |p: &Expr| match opt.declare {
        Some(_) => formula::from(p, &declared),
        None => p.clone(),
    };
    let pairs = children.chunks(2).map(|pe| (pattern(&pe[0]), pe[1].clone()));
    Ok(Problem::from_pairs(pairs)?)
}

/// Return true if instantiating every pattern with the solution yields its expression.
fn verify(problem: &Problem, sol: &Solution) -> Result<bool, Error> {
    for c in problem {
        let inst = formula::instantiate(c.pattern(), sol, &[GIVEN])?;
        if !inst.alpha_eq(c.expr()) {
            log::error!("Instantiated pattern {} differs from {}", inst, c.expr());
            return Ok(false);
        }
    }
    Ok(true)
}

/// Solve a problem and print its solutions.
fn solve((label, tm): (Label, Term<String>), opt: &Opt) -> Result<(), Error> {
    if opt.omits(Stage::Convert) {
        return Ok(());
    }
    let problem = problem(tm, opt)?;
    log::info!("Solve {}: {}", label, problem);

    if opt.omits(Stage::Match) {
        return Ok(());
    }
    let mut challenge = MatchingChallenge::new(problem.clone());
    if let Some(limit) = opt.limit {
        challenge = challenge.with_limit(limit)
    }
    let mut solutions = challenge.solutions()?;

    let mut lines = Vec::new();
    let max = opt.max_solutions.unwrap_or(usize::MAX);
    for sol in solutions.by_ref().take(max) {
        match sol {
            Ok(sol) => {
                if !opt.omits(Stage::Verify) && !verify(&problem, &sol)? {
                    return Err(Error::Verification(label));
                }
                lines.push(format!("{}: {}", label, sol))
            }
            Err(metamatch::Error::SearchAborted) => {
                log::warn!("Search for {} aborted", label);
                lines.push(format!("{}: aborted", label))
            }
            Err(e) => return Err(e.into()),
        }
    }
    log::info!("Found {} solutions after {} moves", lines.len(), solutions.moves());
    if lines.is_empty() {
        lines.push(format!("{}: no solution", label))
    }

    let stdout = std::io::stdout();
    let mut stdout = stdout.lock();
    lines.iter().try_for_each(|l| writeln!(stdout, "{}", l))?;
    Ok(())
}

/// Solve problems one by one, or in parallel if jobs are given.
fn solve_all<I>(mut iter: I, opt: &Opt) -> Result<(), Error>
where
    I: Iterator<Item = Result<(Label, Term<String>), Error>> + Send,
{
    if opt.jobs.is_some() {
        iter.par_bridge().try_for_each(|p| solve(p?, opt))
    } else {
        iter.try_for_each(|p| solve(p?, opt))
    }
}

/// Process all given input files.
///
/// This should be functionally equivalent to
/// [consuming](consume) all events [produced](produce) from the input files.
pub fn run(opt: &Opt) -> Result<(), Error> {
    for file in PathRead::from_pathbufs(&opt.files) {
        let file = file?;
        log::info!("Open file {}", file.path);
        let mut index = 0;
        let problems = parse(file.read).map(|tm| {
            index += 1;
            Ok((format!("{}:{}", file.path, index), tm?))
        });
        solve_all(problems, opt)?
    }
    Ok(())
}

/// Produce a stream of events from a sequence of input files.
pub fn produce<F, E>(files: &[PathBuf], mut send: F) -> Result<(), Error>
where
    F: FnMut(Result<Event, Error>) -> Result<(), E>,
{
    for file in PathRead::from_pathbufs(files) {
        let file = file?;

        let head = core::iter::once(Ok(Event::File(file.path)));
        let tail = parse(file.read).map(|tm| tm.map(Event::Problem));

        // sending fails prematurely if consumption fails
        // in that case, handle the error after this function exits
        if head.chain(tail).try_for_each(&mut send).is_err() {
            return Ok(());
        }
    }
    Ok(())
}

/// Consume a stream of events by solving the problems they contain.
pub fn consume<I>(iter: I, opt: &Opt) -> Result<(), Error>
where
    I: Iterator<Item = Result<Event, Error>> + Send,
{
    let mut file = String::new();
    let mut index = 0;

    // run as long as we receive events, and abort on error
    let problems = iter
        .inspect(|event| event.iter().for_each(|e| log::debug!("{}", e)))
        .map(|event| Ok(event?.handle(&mut file, &mut index)))
        .flat_map(|ro: Result<_, Error>| ro.transpose());

    solve_all(problems, opt)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn problems(s: &str, opt: &Opt) -> Result<Vec<Problem>, Error> {
        parse(s.as_bytes()).map(|tm| problem(tm?, opt)).collect()
    }

    #[test]
    fn problems_from_input() -> Result<(), Error> {
        let opt = Opt::parse_from(["mmatch"]);
        let input = "{ (@ _P _x) (f 1) }\n// comment\n{ _A a _B b }";
        let ps = problems(input, &opt)?;
        assert_eq!(ps.len(), 2);
        assert_eq!(ps[1].len(), 2);

        assert!(matches!(problems("{ _A }", &opt), Err(Error::Unpaired(_))));
        assert!(matches!(problems("(f x)", &opt), Err(Error::Unpaired(_))));
        assert!(matches!(problems("{ (f x", &opt), Err(Error::Parse(_))));
        Ok(())
    }

    /// Reader that fails once its input is consumed.
    struct Failing<'a>(&'a [u8]);

    impl Read for Failing<'_> {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            if self.0.is_empty() {
                Err(std::io::Error::new(std::io::ErrorKind::Other, "broken pipe"))
            } else {
                self.0.read(buf)
            }
        }
    }

    #[test]
    fn lazy() {
        // problems are available before the rest of the input is read
        let mut tms = parse(Failing(b"{ _A a }\n{ _B\n b }\n"));
        assert!(matches!(tms.next(), Some(Ok(_))));
        assert!(matches!(tms.next(), Some(Ok(_))));
        assert!(matches!(tms.next(), Some(Err(Error::Io(_)))));
        assert!(tms.next().is_none());
    }

    #[test]
    fn declared() -> Result<(), Error> {
        let opt = Opt::parse_from(["mmatch", "--declare", "∀"]);
        let ps = problems("{ (∀ x , (@ P x)) (∀ r , (> r 0)) (@ P t) (> 5 0) }", &opt)?;
        let sols = MatchingChallenge::new(ps[0].clone()).solve()?;
        assert_eq!(sols.len(), 1);
        assert_eq!(sols[0].get("t"), Some(&Expr::parse("5")?));
        assert!(verify(&ps[0], &sols[0])?);
        Ok(())
    }

    #[test]
    fn verified() -> Result<(), Error> {
        let opt = Opt::parse_from(["mmatch"]);
        let input = "{ :(= _a _b) :(= t 1) (@ _P _a) (> t 0) (@ _P _b) (> 1 0) }";
        let ps = problems(input, &opt)?;
        let sols = MatchingChallenge::new(ps[0].clone()).solve()?;
        assert_eq!(sols.len(), 1);
        assert!(verify(&ps[0], &sols[0])?);

        // a solution of another problem
        let other = problems("{ (@ _P _a) (< t 0) }", &opt)?;
        assert!(!verify(&other[0], &sols[0])?);
        Ok(())
    }

    #[test]
    fn events() -> Result<(), Error> {
        let opt = Opt::parse_from(["mmatch", "--omit", "verify"]);
        let (mut file, mut index) = (String::new(), 0);
        let tm = Term::parse_str("{ _A a }")?.map(&String::from);
        assert!(Event::File("a.txt".into()).handle(&mut file, &mut index).is_none());
        let labelled = Event::Problem(tm.clone()).handle(&mut file, &mut index);
        assert_eq!(labelled, Some(("a.txt:1".to_string(), tm.clone())));

        let events = [Ok(Event::File("b.txt".into())), Ok(Event::Problem(tm))];
        consume(events.into_iter(), &opt)
    }
}
