use std::io;

/// Central error type.
#[derive(Debug)]
pub enum Error {
    Io(io::Error),
    Parse(metamatch_parse::Error),
    Mm(metamatch::Error),
    ThreadPool(rayon::ThreadPoolBuildError),
    /// input problem that is not an environment of pattern-expression pairs
    Unpaired(String),
    /// solution that does not make a pattern equal to its expression
    Verification(String),
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<metamatch_parse::Error> for Error {
    fn from(err: metamatch_parse::Error) -> Self {
        Self::Parse(err)
    }
}

impl From<metamatch::Error> for Error {
    fn from(err: metamatch::Error) -> Self {
        Self::Mm(err)
    }
}

impl From<rayon::ThreadPoolBuildError> for Error {
    fn from(err: rayon::ThreadPoolBuildError) -> Self {
        Self::ThreadPool(err)
    }
}
