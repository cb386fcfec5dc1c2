use clap::ValueEnum;

/// A stage in the processing of problems.
///
/// This is useful to omit certain parts of problem processing.
/// Omitting one stage also omits all stages after it,
/// i.e. all stages greater than the stage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
pub enum Stage {
    /// Construction of problems from parsed environments
    Convert,
    /// Search for solutions
    Match,
    /// Instantiation of patterns with solutions
    Verify,
}
