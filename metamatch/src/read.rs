//! Conversion of parsed terms to expressions.

use crate::symbol::{EF, EFA};
use crate::{Error, Expr, Symbol};
use alloc::vec::Vec;
use metamatch_parse::Term;

/// Convert a parsed symbol; a leading underscore marks a metavariable.
fn symbol(s: &str) -> Symbol {
    match s.strip_prefix('_') {
        Some(m) if !m.is_empty() => Symbol::meta(m),
        _ => Symbol::new(s),
    }
}

/// Convert the head of an application or binding, resolving `@` to `marker`.
fn head<S: AsRef<str>>(tm: Term<S>, marker: &str) -> Result<Expr, Error> {
    match tm {
        Term::Symb(s) if s.as_ref() == "@" => Ok(Expr::symb(marker)),
        tm => Expr::from_term(tm),
    }
}

impl Expr {
    /// Convert a parsed term to an expression.
    ///
    /// The symbol `@` at the head of an application denotes
    /// an expression function application, and
    /// at the head of a binding, it denotes an expression function.
    ///
    /// Both borrowed and owned terms can be converted.
    pub fn from_term<S: AsRef<str>>(tm: Term<S>) -> Result<Self, Error> {
        match tm {
            Term::Symb(s) => Ok(Expr::Symb(symbol(s.as_ref()))),
            Term::Appl(args) => {
                let mut args = args.into_iter();
                let first = args.next().map(|a| head(a, EFA)).transpose()?;
                let rest = args.map(Expr::from_term);
                let args = first.into_iter().map(Ok).chain(rest);
                Ok(Expr::appl(args.collect::<Result<_, _>>()?))
            }
            Term::Bind(hp, body) => {
                let mut hp = hp.into_iter();
                let h = head(hp.next().ok_or(Error::ParamNotSymbol)?, EF)?;
                let params = hp.map(|p| match p {
                    Term::Symb(s) => Ok(symbol(s.as_ref())),
                    _ => Err(Error::ParamNotSymbol),
                });
                let params = params.collect::<Result<Vec<_>, _>>()?;
                Ok(Expr::bind(h, params, Expr::from_term(*body)?))
            }
            Term::Env(cs) => {
                let cs = cs.into_iter().map(Expr::from_term);
                Ok(Expr::env(cs.collect::<Result<_, _>>()?))
            }
            Term::Given(tm) => Ok(Expr::from_term(*tm)?.given()),
            Term::Attr(tm, attrs) => {
                let tm = Expr::from_term(*tm)?;
                Ok(attrs.into_iter().fold(tm, |tm, (k, v)| tm.with_attr(k.as_ref(), v.as_ref())))
            }
        }
    }

    /// Parse an expression from a string.
    ///
    /// ~~~
    /// # use metamatch::{Error, Expr};
    /// let e = Expr::parse("(∀ _x , (@ _P _x))")?;
    /// assert_eq!(e.to_string(), "(∀ _x , (@ _P _x))");
    /// assert!(e.has_meta());
    /// # Ok::<_, Error>(())
    /// ~~~
    pub fn parse(s: &str) -> Result<Self, Error> {
        Self::from_term(Term::parse_str(s)?)
    }

    /// Parse a sequence of expressions from a string.
    pub fn parse_many(s: &str) -> Result<Vec<Self>, Error> {
        let terms = metamatch_parse::Terms::new(s);
        terms.map(|tm| Self::from_term(tm?)).collect()
    }
}

#[cfg(test)]
mod tests {
    use crate::symbol::{EF, EFA};
    use crate::{Error, Expr};
    use alloc::string::ToString;

    #[test]
    fn markers() -> Result<(), Error> {
        let efa = Expr::parse("(@ _P x)")?;
        assert!(efa.is_efa());
        assert_eq!(efa.child(0), Some(Expr::symb(EFA)));
        let ef = Expr::parse("(@ v , (f v))")?;
        assert!(ef.is_ef());
        assert_eq!(ef.child(0), Some(Expr::symb(EF)));
        // `@` is an ordinary symbol elsewhere
        assert_eq!(Expr::parse("(f @)")?.child(1), Some(Expr::symb("@")));
        Ok(())
    }

    #[test]
    fn display() -> Result<(), Error> {
        for s in [
            "(∀ _x , (@ _P _x))",
            ":{ :(= _a _b) (@ _P _b) }",
            "(f \"with space\" x) +{\"label\":\"eq\"}",
            "{ }",
        ] {
            assert_eq!(Expr::parse(s)?.to_string(), s);
        }
        Ok(())
    }

    #[test]
    fn owned() -> Result<(), Error> {
        use alloc::string::String;
        let s = "{ (@ x , (f x)) :_A +{\"k\":\"v\"} }";
        let tm = metamatch_parse::Term::parse_str(s)?;
        assert_eq!(Expr::from_term(tm.clone().map(&String::from))?, Expr::from_term(tm)?);
        Ok(())
    }

    #[test]
    fn negative() {
        assert_eq!(Expr::parse("(f x").unwrap_err(), Error::Parse(metamatch_parse::Error::UnclosedLPar));
        assert_eq!(Expr::parse("(∀ (x) , x)").unwrap_err(), Error::ParamNotSymbol);
    }
}
