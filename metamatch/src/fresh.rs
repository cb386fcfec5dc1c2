//! Generation of fresh symbols.

use crate::{Expr, Symbol};
use alloc::{format, string::String, vec::Vec};
use fnv::FnvHashSet;

/// Source of symbols `new1`, `new2`, ... that avoid a set of names.
///
/// Every matching run uses its own source, so
/// independent runs do not share any state.
#[derive(Clone, Debug, Default)]
pub struct FreshSymbols {
    avoid: FnvHashSet<String>,
    counter: usize,
}

impl FreshSymbols {
    pub fn new() -> Self {
        Default::default()
    }

    /// Never generate any of the given names.
    pub fn avoid<S: Into<String>>(&mut self, names: impl IntoIterator<Item = S>) {
        self.avoid.extend(names.into_iter().map(Into::into))
    }

    /// Never generate the name of a symbol occurring in the expression.
    pub fn avoid_expr(&mut self, e: &Expr) {
        e.for_each_symb(&mut |s| {
            self.avoid.insert(String::from(&*s.text));
        })
    }

    /// Return a symbol that was neither generated before nor is to be avoided.
    pub fn next(&mut self) -> Symbol {
        loop {
            self.counter += 1;
            let name = format!("new{}", self.counter);
            if !self.avoid.contains(&name) {
                let sym = Symbol::new(&name);
                self.avoid.insert(name);
                return sym;
            }
        }
    }

    /// Return `n` fresh symbols.
    pub fn next_n(&mut self, n: usize) -> Vec<Symbol> {
        (0..n).map(|_| self.next()).collect()
    }
}

impl<'a> FromIterator<&'a Expr> for FreshSymbols {
    fn from_iter<I: IntoIterator<Item = &'a Expr>>(iter: I) -> Self {
        let mut fresh = Self::new();
        iter.into_iter().for_each(|e| fresh.avoid_expr(e));
        fresh
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    fn texts(syms: &[Symbol]) -> Vec<String> {
        syms.iter().map(|s| s.text.to_string()).collect()
    }

    #[test]
    fn unconstrained() {
        let mut fresh = FreshSymbols::new();
        assert_eq!(texts(&[fresh.next(), fresh.next(), fresh.next()]), ["new1", "new2", "new3"]);
        assert_eq!(texts(&fresh.next_n(5)), ["new4", "new5", "new6", "new7", "new8"]);
    }

    #[test]
    fn avoiding() -> Result<(), crate::Error> {
        let mut fresh = FreshSymbols::new();
        fresh.avoid(["new2", "new3", "x", "y"]);
        assert_eq!(texts(&fresh.next_n(3)), ["new1", "new4", "new5"]);

        let e = Expr::parse("(∀ new1 new3 , (> new1 new3))")?;
        let mut fresh: FreshSymbols = [&e].into_iter().collect();
        assert_eq!(texts(&fresh.next_n(2)), ["new2", "new4"]);
        Ok(())
    }
}
