use crate::term::{Error, Term};
use crate::{Terms, Token};
use alloc::collections::VecDeque;
use alloc::string::String;

/// Lazily parse terms from a sequence of lines.
///
/// Lines are collected until all parentheses and braces opened in them are closed,
/// then the terms in the collected lines are parsed.
/// Consequently, attributes have to start on the same line as their term.
///
/// ~~~
/// use metamatch_parse::{Error, Lazy};
/// let lines = ["{ (f _x)", "  (f a) } :b", "(g", "c)"].map(|l| Ok::<_, Error>(String::from(l)));
/// let tms: Result<Vec<_>, Error> = Lazy::new(lines.into_iter()).collect();
/// let tms: Vec<_> = tms?.iter().map(|tm| tm.to_string()).collect();
/// assert_eq!(tms, ["{ (f _x) (f a) }", ":b", "(g c)"]);
/// # Ok::<_, Error>(())
/// ~~~
pub struct Lazy<I> {
    lines: I,
    buf: String,
    /// number of currently unclosed parentheses and braces
    depth: isize,
    /// does the buffer end with `:`?
    given: bool,
    parsed: VecDeque<Result<Term<String>, Error>>,
    failed: bool,
}

impl<I> Lazy<I> {
    pub fn new(lines: I) -> Self {
        Self {
            lines,
            buf: String::new(),
            depth: 0,
            given: false,
            parsed: VecDeque::new(),
            failed: false,
        }
    }

    fn push_line(&mut self, line: &str) {
        for token in crate::lex(line) {
            self.given = token == Token::Colon;
            match token {
                Token::LPar | Token::LBrace | Token::AttrOpen => self.depth += 1,
                Token::RPar | Token::RBrace => self.depth -= 1,
                _ => (),
            }
        }
        self.buf.push_str(line);
        self.buf.push('\n');
    }

    /// Parse all terms in the buffer and empty it.
    fn flush(&mut self) {
        let tms = Terms::new(&self.buf).map(|tm| tm.map(|tm| tm.map(&String::from)));
        self.parsed.extend(tms);
        self.buf.clear();
        self.depth = 0;
        self.given = false;
    }
}

impl<E: From<Error>, I: Iterator<Item = Result<String, E>>> Iterator for Lazy<I> {
    type Item = Result<Term<String>, E>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(tm) = self.parsed.pop_front() {
                self.failed = tm.is_err();
                return Some(tm.map_err(E::from));
            }
            if self.failed {
                return None;
            }
            match self.lines.next() {
                Some(Ok(line)) => {
                    self.push_line(&line);
                    if self.depth <= 0 && !self.given {
                        self.flush()
                    }
                }
                Some(Err(e)) => {
                    self.failed = true;
                    return Some(Err(e));
                }
                None if self.buf.is_empty() => return None,
                None => {
                    self.flush();
                    // unclosed input at the end is still an error
                    if self.parsed.is_empty() {
                        return None;
                    }
                }
            }
        }
    }
}

#[test]
fn lines() {
    use alloc::vec::Vec;
    let lazy = |ls: &[&str]| -> Vec<Result<Term<String>, Error>> {
        Lazy::new(ls.iter().map(|l| Ok(String::from(*l)))).collect()
    };
    let tms = lazy(&["a (b", "c) // (", "{ d", "} :", "e"]);
    assert_eq!(tms.len(), 4);
    assert!(tms.iter().all(|tm| tm.is_ok()));

    let tms = lazy(&["a", "(b", "c"]);
    assert_eq!(tms.len(), 2);
    assert_eq!(tms[1], Err(Error::UnclosedLPar));

    // no terms after an error
    let tms = lazy(&["a )", "b"]);
    assert_eq!(tms.len(), 2);
    assert_eq!(tms[1], Err(Error::UnmatchedRPar));
}
