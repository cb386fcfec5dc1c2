use crate::Stage;
use clap::Parser;
use std::path::PathBuf;

/// Match patterns with metavariables against expressions
///
/// Every input problem is an environment `{ p1 e1 ... pn en }`
/// that pairs patterns with expressions.
/// For every problem, all assignments of metavariables are printed
/// that make every pattern equal to its expression.
#[derive(Clone, Debug, Parser)]
#[command(version)]
pub struct Opt {
    /// Perform only operations until (excluding) the given stage
    #[arg(long, value_enum)]
    pub omit: Option<Stage>,

    /// Give up the search for solutions of a problem after the given number of steps
    #[arg(long)]
    pub limit: Option<usize>,

    /// Print at most the given number of solutions per problem
    #[arg(long, value_name = "N")]
    pub max_solutions: Option<usize>,

    /// Treat all symbols in patterns as metavariables, except for the given ones
    ///
    /// Without this option, only symbols starting with an underscore
    /// are metavariables, such as `_P`.
    #[arg(long, value_name = "SYMBOLS", value_delimiter = ',')]
    pub declare: Option<Vec<String>>,

    /// Parse given number of problems in advance (∞ if argument omitted)
    ///
    /// If this option is used, problems are parsed and solved simultaneously.
    /// If this option is given with a number n, then
    /// maximally n problems are parsed in advance.
    /// If this option is given without an extra argument, then
    /// the number of problems parsed in advance is unbounded.
    #[arg(long, short = 'c')]
    pub channel_capacity: Option<Option<usize>>,

    /// Solve problems concurrently
    ///
    /// If this option is given with a number n, then
    /// maximally n problems are concurrently solved.
    /// If this option is given without an extra argument, then
    /// the number of concurrently solved problems is
    /// determined automatically from the number of CPUs.
    ///
    /// This option enables the parsing of problems in advance ("-c"),
    /// by default with an unbounded capacity.
    #[arg(long, short = 'j')]
    pub jobs: Option<Option<usize>>,

    /// Files to process (standard input if none given)
    ///
    /// To read from standard input, use "-" as file name.
    #[arg(value_name = "FILE")]
    pub files: Vec<PathBuf>,
}

impl Opt {
    pub fn omits(&self, stage: Stage) -> bool {
        self.omit.map_or(false, |omit| omit <= stage)
    }
}

#[test]
fn options() {
    let opt = Opt::parse_from(["mmatch", "a.txt", "--omit", "verify", "--declare", "∀,∃", "-j"]);
    assert!(opt.omits(Stage::Verify));
    assert!(!opt.omits(Stage::Match));
    assert_eq!(opt.declare, Some(vec!["∀".to_string(), "∃".to_string()]));
    assert_eq!(opt.jobs, Some(None));
    assert_eq!(opt.files, [PathBuf::from("a.txt")]);

    let opt = Opt::parse_from(["mmatch", "--jobs", "4", "--limit", "100"]);
    assert_eq!(opt.jobs, Some(Some(4)));
    assert_eq!(opt.limit, Some(100));
    assert!(opt.files.is_empty());
}
