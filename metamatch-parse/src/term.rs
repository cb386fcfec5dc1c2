use crate::Token;
use alloc::{boxed::Box, vec::Vec};
use core::fmt::{self, Display};

/// Parsed expression tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Term<S> {
    /// Atomic symbol
    Symb(S),
    /// Application (`(f x y)`)
    Appl(Vec<Self>),
    /// Binding (`(h x y , body)`): head followed by bound parameters, and body
    Bind(Vec<Self>, Box<Self>),
    /// Environment (`{ a b }`)
    Env(Vec<Self>),
    /// Term marked as given (`:a`)
    Given(Box<Self>),
    /// Term with attributes (`a +{"k":"v"}`)
    Attr(Box<Self>, Vec<(S, S)>),
}

fn list<T: Display>(ts: &[T], f: &mut fmt::Formatter) -> fmt::Result {
    let mut iter = ts.iter();
    if let Some(head) = iter.next() {
        head.fmt(f)?;
    }
    iter.try_for_each(|t| write!(f, " {}", t))
}

impl<S: Display> Display for Term<S> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Symb(s) => s.fmt(f),
            Self::Appl(args) => {
                write!(f, "(")?;
                list(args, f)?;
                write!(f, ")")
            }
            Self::Bind(hp, body) => {
                write!(f, "(")?;
                list(hp, f)?;
                write!(f, " , {})", body)
            }
            Self::Env(cs) if cs.is_empty() => write!(f, "{{ }}"),
            Self::Env(cs) => {
                write!(f, "{{ ")?;
                list(cs, f)?;
                write!(f, " }}")
            }
            Self::Given(tm) => write!(f, ":{}", tm),
            Self::Attr(tm, attrs) => {
                write!(f, "{} +{{", tm)?;
                for (i, (k, v)) in attrs.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "\"{}\":\"{}\"", k, v)?;
                }
                write!(f, "}}")
            }
        }
    }
}

#[derive(Debug, PartialEq)]
pub enum Error {
    ExpectedTerm,
    UnclosedLPar,
    UnclosedLBrace,
    UnmatchedRPar,
    UnmatchedRBrace,
    EmptyApplication,
    /// `,` not preceded by a head and at least one parameter
    MisplacedComma,
    BindingWithoutBody,
    MultipleBodies,
    MalformedAttributes,
    UnknownToken,
    TrailingInput,
}

type Result<T> = core::result::Result<T, Error>;

/// An opened parenthesis or brace, waiting for its contents.
#[derive(Debug)]
enum Cont<S> {
    /// `(t1 ... tn`
    Appl(bool, Vec<Term<S>>),
    /// `(h x1 ... xn ,`, possibly followed by a body
    Bind(bool, Vec<Term<S>>, Option<Term<S>>),
    /// `{t1 ... tn`
    Env(bool, Vec<Term<S>>),
}

impl<S> Term<S> {
    /// Apply a function to all symbols and attributes.
    ///
    /// This is useful to obtain owned terms, such as with `tm.map(&String::from)`.
    pub fn map<T>(self, f: &impl Fn(S) -> T) -> Term<T> {
        let map_all = |tms: Vec<Self>| -> Vec<Term<T>> { tms.into_iter().map(|tm| tm.map(f)).collect() };
        match self {
            Self::Symb(s) => Term::Symb(f(s)),
            Self::Appl(args) => Term::Appl(map_all(args)),
            Self::Bind(hp, body) => Term::Bind(map_all(hp), Box::new(body.map(f))),
            Self::Env(cs) => Term::Env(map_all(cs)),
            Self::Given(tm) => Term::Given(Box::new(tm.map(f))),
            Self::Attr(tm, attrs) => {
                let attrs = attrs.into_iter().map(|(k, v)| (f(k), f(v)));
                Term::Attr(Box::new(tm.map(f)), attrs.collect())
            }
        }
    }

    fn given(self, given: bool) -> Self {
        if given {
            Self::Given(Box::new(self))
        } else {
            self
        }
    }
}

fn attrs<'s, I>(iter: &mut I) -> Result<Vec<(&'s str, &'s str)>>
where
    I: Iterator<Item = Token<'s>>,
{
    let mut attrs = Vec::new();
    loop {
        match (iter.next(), iter.next(), iter.next()) {
            (Some(Token::Symb(k)), Some(Token::Colon), Some(Token::Symb(v))) => attrs.push((k, v)),
            _ => return Err(Error::MalformedAttributes),
        }
        match iter.next() {
            Some(Token::Comma) => (),
            Some(Token::RBrace) => return Ok(attrs),
            _ => return Err(Error::MalformedAttributes),
        }
    }
}

impl<'s> Term<&'s str> {
    /// Parse a term, starting from the given token.
    ///
    /// This function does not use recursion,
    /// so it can parse arbitrarily deep terms without overflowing the stack.
    pub fn parse<I>(token: Token<'s>, iter: &mut core::iter::Peekable<I>) -> Result<Self>
    where
        I: Iterator<Item = Token<'s>>,
    {
        let mut stack: Vec<Cont<&'s str>> = Vec::new();
        // is the next term preceded by `:`?
        let mut given = false;
        let mut token = Some(token);
        loop {
            let tm = match token.take().or_else(|| iter.next()) {
                None if given => return Err(Error::ExpectedTerm),
                None => match stack.pop() {
                    None => return Err(Error::ExpectedTerm),
                    Some(Cont::Env(..)) => return Err(Error::UnclosedLBrace),
                    Some(_) => return Err(Error::UnclosedLPar),
                },
                Some(Token::Symb(s)) => Term::Symb(s).given(core::mem::take(&mut given)),
                Some(Token::LPar) => {
                    stack.push(Cont::Appl(core::mem::take(&mut given), Vec::new()));
                    continue;
                }
                Some(Token::LBrace) => {
                    stack.push(Cont::Env(core::mem::take(&mut given), Vec::new()));
                    continue;
                }
                Some(Token::Colon) if !given => {
                    given = true;
                    continue;
                }
                Some(Token::Comma) if !given => match stack.pop() {
                    Some(Cont::Appl(g, hp)) if hp.len() >= 2 => {
                        stack.push(Cont::Bind(g, hp, None));
                        continue;
                    }
                    _ => return Err(Error::MisplacedComma),
                },
                Some(Token::RPar) if !given => match stack.pop() {
                    Some(Cont::Appl(_, args)) if args.is_empty() => {
                        return Err(Error::EmptyApplication)
                    }
                    Some(Cont::Appl(g, args)) => Term::Appl(args).given(g),
                    Some(Cont::Bind(g, hp, Some(body))) => Term::Bind(hp, Box::new(body)).given(g),
                    Some(Cont::Bind(_, _, None)) => return Err(Error::BindingWithoutBody),
                    _ => return Err(Error::UnmatchedRPar),
                },
                Some(Token::RBrace) if !given => match stack.pop() {
                    Some(Cont::Env(g, cs)) => Term::Env(cs).given(g),
                    _ => return Err(Error::UnmatchedRBrace),
                },
                Some(Token::Space) => continue,
                Some(Token::Error) => return Err(Error::UnknownToken),
                Some(_) => return Err(Error::ExpectedTerm),
            };

            let tm = if iter.peek() == Some(&Token::AttrOpen) {
                iter.next();
                Term::Attr(Box::new(tm), attrs(iter)?)
            } else {
                tm
            };

            match stack.last_mut() {
                None => return Ok(tm),
                Some(Cont::Appl(_, ts)) | Some(Cont::Env(_, ts)) => ts.push(tm),
                Some(Cont::Bind(_, _, body @ None)) => *body = Some(tm),
                Some(Cont::Bind(_, _, Some(_))) => return Err(Error::MultipleBodies),
            }
        }
    }

    /// Parse a string containing exactly one term.
    pub fn parse_str(s: &'s str) -> Result<Self> {
        let mut iter = crate::lex(s).peekable();
        let tm = Self::parse(iter.next().ok_or(Error::ExpectedTerm)?, &mut iter)?;
        match iter.next() {
            None => Ok(tm),
            Some(_) => Err(Error::TrailingInput),
        }
    }
}

#[test]
fn positive() -> Result<()> {
    Term::parse_str("x")?;
    Term::parse_str("(f x)")?;
    Term::parse_str("(∀ x , (> x 0))")?;
    Term::parse_str("(∀ x y , (∃ z , (= (+ x y) z)))")?;
    Term::parse_str("{ a :(b c) { d } }")?;
    Term::parse_str(":{ :(= a b) (@ P b) } +{\"label\":\"equality elimination\"}")?;
    Term::parse_str("((a (((b)))))")?;
    Term::parse_str("(a // comment\n b)")?;
    Ok(())
}

#[test]
fn display() -> Result<()> {
    let s = "(∀ x y , (∃ z , (= (+ x y) z)))";
    assert_eq!(alloc::format!("{}", Term::parse_str(s)?), s);
    let s = ":{ :(= a b) (P b) } +{\"label\":\"elim\"}";
    assert_eq!(alloc::format!("{}", Term::parse_str(s)?), s);
    Ok(())
}

#[test]
fn map() -> Result<()> {
    use alloc::string::String;
    let s = ":{ (∀ x , (P x)) a } +{\"k\":\"v\"}";
    let tm: Term<String> = Term::parse_str(s)?.map(&String::from);
    assert_eq!(alloc::format!("{}", tm), s);
    let upper = tm.map(&|s| s.to_uppercase());
    assert_eq!(alloc::format!("{}", upper), ":{ (∀ X , (P X)) A } +{\"K\":\"V\"}");
    Ok(())
}

#[test]
fn negative() {
    use Error::*;
    assert_eq!(Term::parse_str("").unwrap_err(), ExpectedTerm);
    assert_eq!(Term::parse_str(")").unwrap_err(), UnmatchedRPar);
    assert_eq!(Term::parse_str("{ a )").unwrap_err(), UnmatchedRPar);
    assert_eq!(Term::parse_str("(a ").unwrap_err(), UnclosedLPar);
    assert_eq!(Term::parse_str("{ a").unwrap_err(), UnclosedLBrace);
    assert_eq!(Term::parse_str("()").unwrap_err(), EmptyApplication);
    assert_eq!(Term::parse_str("(a , b)").unwrap_err(), MisplacedComma);
    assert_eq!(Term::parse_str("(a x ,)").unwrap_err(), BindingWithoutBody);
    assert_eq!(Term::parse_str("(a x , b c)").unwrap_err(), MultipleBodies);
    assert_eq!(Term::parse_str("a +{b}").unwrap_err(), MalformedAttributes);
    assert_eq!(Term::parse_str(":").unwrap_err(), ExpectedTerm);
    assert_eq!(Term::parse_str("a b").unwrap_err(), TrailingInput);
    assert_eq!(Term::parse_str("[a]").unwrap_err(), UnknownToken);
}
