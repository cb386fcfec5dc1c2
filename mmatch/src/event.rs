use core::fmt::{self, Display};
use metamatch_parse::Term;

/// Problems with interspersed file opening.
///
/// Events contain only owned parse structures,
/// so they can be transferred between threads.
pub enum Event {
    /// Open a new file
    File(String),
    /// Solve a problem inside the last opened file
    Problem(Term<String>),
}

/// Position of a problem in the input, such as `rules.txt:3`.
pub type Label = String;

impl Event {
    /// Return the problem with its position if the event contains one.
    ///
    /// `file` and `index` track the currently opened file and
    /// the number of problems read from it.
    pub fn handle(self, file: &mut String, index: &mut usize) -> Option<(Label, Term<String>)> {
        match self {
            Self::File(path) => {
                *file = path;
                *index = 0;
                None
            }
            Self::Problem(tm) => {
                *index += 1;
                Some((format!("{}:{}", file, index), tm))
            }
        }
    }
}

impl Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::File(path) => write!(f, "Open file {}", path),
            Self::Problem(tm) => write!(f, "Read problem {}", tm),
        }
    }
}
