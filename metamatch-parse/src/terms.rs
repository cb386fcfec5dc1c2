use crate::term::{Error, Term};
use crate::Token;
use core::iter::Peekable;

/// Lazily parse a sequence of terms.
pub struct Terms<'s, I: Iterator<Item = Token<'s>>> {
    iter: Peekable<I>,
    failed: bool,
}

impl<'s, I: Iterator<Item = Token<'s>>> Terms<'s, I> {
    pub fn from_tokens(iter: I) -> Self {
        let iter = iter.peekable();
        let failed = false;
        Self { iter, failed }
    }
}

impl<'s> Terms<'s, crate::Lex<'s>> {
    pub fn new(s: &'s str) -> Self {
        Self::from_tokens(crate::lex(s))
    }
}

impl<'s, I: Iterator<Item = Token<'s>>> Iterator for Terms<'s, I> {
    type Item = Result<Term<&'s str>, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let token = self.iter.next()?;
        let tm = Term::parse(token, &mut self.iter);
        // do not try to resynchronise after an error
        self.failed = tm.is_err();
        Some(tm)
    }
}

#[test]
fn terms() {
    use alloc::vec::Vec;
    let tms: Result<Vec<_>, _> = Terms::new("a (b c) { d } :e").collect();
    assert_eq!(tms.unwrap().len(), 4);

    let tms: Vec<_> = Terms::new("a ) b c").collect();
    assert_eq!(tms.len(), 2);
    assert_eq!(tms[1], Err(Error::UnmatchedRPar));
}
