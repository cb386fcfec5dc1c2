//! Formulas, namely expressions whose undeclared symbols are metavariables.
//!
//! A formula is obtained from an expression by [`from`]
//! and instantiated to an ordinary expression by [`instantiate`].
//!
//! ~~~
//! # use metamatch::{formula, Error, Expr};
//! let rule = formula::from(&Expr::parse("{ :(= a b) :(@ P a) (@ P b) }")?, &["="]);
//! let bindings = [("a", "x"), ("b", "(f y)"), ("P", "(@ v , (> v 1))")];
//! let bindings: im::OrdMap<_, _> = bindings
//!     .into_iter()
//!     .map(|(m, e)| Ok((m.to_string(), Expr::parse(e)?)))
//!     .collect::<Result<_, Error>>()?;
//! let inst = formula::instantiate(&rule, &bindings, &[])?;
//! assert_eq!(inst.to_string(), "{ :(= x (f y)) :(> x 1) (> (f y) 1) }");
//! # Ok::<_, Error>(())
//! ~~~

use crate::expr::Environment;
use crate::symbol::Kind;
use crate::{debruijn, Appl, Binding, Error, Expr, FreshSymbols, Solution, Symbol};
use alloc::collections::{BTreeMap, BTreeSet};
use alloc::{rc::Rc, string::String, vec::Vec};

/// Turn every symbol that is not declared into a metavariable.
///
/// Binding parameters are treated like any other undeclared symbol.
/// The reserved markers are never turned into metavariables.
pub fn from(target: &Expr, declared: &[&str]) -> Expr {
    target.map_symbs(&|s| {
        if s.kind == Kind::Const && !s.is_marker() && !declared.contains(&&*s.text) {
            s.clone().into_meta()
        } else {
            s.clone()
        }
    })
}

/// Return the names of all metavariables in a formula.
pub fn domain(e: &Expr) -> BTreeSet<String> {
    e.metas()
}

/// Values of metavariables.
pub trait Bindings {
    fn lookup(&self, name: &str) -> Option<&Expr>;
}

impl Bindings for Solution {
    fn lookup(&self, name: &str) -> Option<&Expr> {
        self.get(name)
    }
}

impl Bindings for BTreeMap<String, Expr> {
    fn lookup(&self, name: &str) -> Option<&Expr> {
        self.get(name)
    }
}

impl Bindings for im::OrdMap<String, Expr> {
    fn lookup(&self, name: &str) -> Option<&Expr> {
        self.get(name)
    }
}

impl Bindings for fnv::FnvHashMap<String, Expr> {
    fn lookup(&self, name: &str) -> Option<&Expr> {
        self.get(name)
    }
}

/// Simultaneously replace metavariables by their values and
/// reduce the resulting expression function applications.
///
/// Metavariables without value are kept.
/// Of the attributes of a replaced metavariable,
/// only those in `preserve` are copied to its value.
/// Substitution does not capture variables.
///
/// This fails with [`Error::NonExpressionInExpressionContext`] when
/// an environment would be placed inside an application or binding.
pub fn instantiate<B: Bindings>(tree: &Expr, bindings: &B, preserve: &[&str]) -> Result<Expr, Error> {
    let inst = Instantiate { bindings, preserve };
    let e = inst.subst(&debruijn::encode(tree), 0, false)?.beta()?;
    let mut fresh: FreshSymbols = core::iter::once(&e).collect();
    Ok(debruijn::decode_with(&e, &mut fresh))
}

struct Instantiate<'a, B> {
    bindings: &'a B,
    preserve: &'a [&'a str],
}

impl<'a, B: Bindings> Instantiate<'a, B> {
    /// Return the value of a metavariable occurrence under `k` bindings.
    fn value(&self, meta: &Symbol, k: usize, in_expr: bool) -> Result<Option<Expr>, Error> {
        let value = match self.bindings.lookup(&meta.text) {
            Some(v) => v,
            None => return Ok(None),
        };
        if in_expr && value.is_env() {
            return Err(Error::NonExpressionInExpressionContext);
        }
        let mut value = debruijn::encode(value) << k;
        for key in self.preserve {
            if let Some(v) = meta.attrs.get(*key) {
                value = value.with_attr(key, v)
            }
        }
        Ok(Some(value))
    }

    fn param(&self, p: &Symbol) -> Result<Symbol, Error> {
        match self.bindings.lookup(&p.text) {
            Some(Expr::Symb(s)) if p.is_meta() => {
                let attrs = p.attrs.clone();
                Ok(Symbol { attrs, ..Symbol::with_kind(&s.text, Kind::Param) })
            }
            Some(_) if p.is_meta() => Err(Error::ParamNotSymbol),
            _ => Ok(p.clone()),
        }
    }

    /// Substitute in an expression under `k` bindings.
    ///
    /// `in_expr` tells whether the expression is inside an application or binding.
    fn subst(&self, e: &Expr, k: usize, in_expr: bool) -> Result<Expr, Error> {
        Ok(match e {
            Expr::Symb(s) if s.is_meta() => self.value(s, k, in_expr)?.unwrap_or_else(|| e.clone()),
            Expr::Symb(_) | Expr::Var(_) => e.clone(),
            Expr::Appl(a) => {
                let binder = a.is_binding();
                let last = a.args.len().saturating_sub(1);
                let args = a.args.iter().enumerate().map(|(i, arg)| {
                    self.subst(arg, if binder && i == last { k + 1 } else { k }, true)
                });
                Expr::Appl(Rc::new(Appl {
                    args: args.collect::<Result<_, _>>()?,
                    attrs: a.attrs.clone(),
                }))
            }
            Expr::Bind(b) => {
                let params = b.params.iter().map(|p| self.param(p));
                Expr::Bind(Rc::new(Binding {
                    head: self.subst(&b.head, k, true)?,
                    params: params.collect::<Result<Vec<_>, _>>()?,
                    body: self.subst(&b.body, k + 1, true)?,
                    attrs: b.attrs.clone(),
                }))
            }
            Expr::Env(en) => {
                let children = en.children.iter().map(|c| self.subst(c, k, false));
                Expr::Env(Rc::new(Environment {
                    children: children.collect::<Result<_, _>>()?,
                    attrs: en.attrs.clone(),
                }))
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    fn bindings(pairs: &[(&str, &str)]) -> Result<BTreeMap<String, Expr>, Error> {
        let parse = |(m, e): &(&str, &str)| -> Result<_, Error> { Ok((m.to_string(), Expr::parse(e)?)) };
        pairs.iter().map(parse).collect()
    }

    #[test]
    fn from_declared() -> Result<(), Error> {
        let f = from(&Expr::parse("(+ 3 (* -1 k))")?, &[]);
        assert_eq!(f.to_string(), "(_+ _3 (_* _-1 _k))");
        let f = from(&Expr::parse("(+ k (* -1 k))")?, &["k"]);
        assert_eq!(f.to_string(), "(_+ k (_* _-1 k))");
        let f = from(&Expr::parse("{ :(= i 1) (> n m) }")?, &["i"]);
        assert_eq!(f.to_string(), "{ :(_= i _1) (_> _n _m) }");
        let f = from(&Expr::parse("(∀ x , (@ P x))")?, &["∀"]);
        assert_eq!(f.to_string(), "(∀ _x , (@ _P _x))");
        // declared binding parameters stay as they are
        let f = from(&Expr::parse("(∀ x , (@ P x))")?, &["∀", "x"]);
        assert_eq!(f.to_string(), "(∀ x , (@ _P x))");
        Ok(())
    }

    #[test]
    fn domains() -> Result<(), Error> {
        assert!(domain(&Expr::parse("(f x)")?).is_empty());
        assert!(domain(&Expr::parse("{ a (b c) }")?).is_empty());
        let d = domain(&Expr::parse("(this (is an _example) (with _example))")?);
        assert_eq!(d.into_iter().collect::<Vec<_>>(), ["example"]);
        let d = domain(&Expr::parse(":{ :(= _a _b) :(@ _P _a) (@ _P _b) }")?);
        assert_eq!(d.into_iter().collect::<Vec<_>>(), ["P", "a", "b"]);
        Ok(())
    }

    #[test]
    fn unchanged() -> Result<(), Error> {
        let f = Expr::parse("{ one (two 3) :(4 five , six) { seven } }")?;
        let b = bindings(&[("x", "testing"), ("y", "{ a b c }"), ("z", ":1")])?;
        assert_eq!(instantiate(&f, &b, &[])?, f);
        Ok(())
    }

    #[test]
    fn single() -> Result<(), Error> {
        let f = Expr::parse("(this (is an _example expression) (with #s 1 2 3))")?;
        let inst = instantiate(&f, &bindings(&[("example", "7")])?, &[])?;
        assert_eq!(inst, Expr::parse("(this (is an 7 expression) (with #s 1 2 3))")?);

        let b = bindings(&[("example", "(some compound expression)")])?;
        let inst = instantiate(&f, &b, &[])?;
        let expected = "(this (is an (some compound expression) expression) (with #s 1 2 3))";
        assert_eq!(inst, Expr::parse(expected)?);

        let b = bindings(&[("example", "{ some env }")])?;
        assert_eq!(instantiate(&f, &b, &[]), Err(Error::NonExpressionInExpressionContext));
        // environments may be placed inside environments
        let inst = instantiate(&Expr::parse("{ a _example }")?, &b, &[])?;
        assert_eq!(inst.to_string(), "{ a { some env } }");
        Ok(())
    }

    #[test]
    fn rule() -> Result<(), Error> {
        let f = Expr::parse(":{ :(= _a _b) :(@ _P _a) (@ _P _b) } +{\"label\":\"equality elimination\"}")?;

        let inst = instantiate(&f, &bindings(&[("P", "(@ v , (> v 1))")])?, &[])?;
        let expected = ":{ :(= _a _b) :(> _a 1) (> _b 1) } +{\"label\":\"equality elimination\"}";
        assert_eq!(inst, Expr::parse(expected)?);

        let b = bindings(&[
            ("P", "(@ v , (> v 1))"),
            ("a", "AAA"),
            ("b", "BBB"),
            ("c", "(this is unused)"),
        ])?;
        let inst = instantiate(&f, &b, &[])?;
        let expected = ":{ :(= AAA BBB) :(> AAA 1) (> BBB 1) } +{\"label\":\"equality elimination\"}";
        assert_eq!(inst, Expr::parse(expected)?);

        // the same with other kinds of bindings
        let b: im::OrdMap<_, _> = b.into_iter().collect();
        assert_eq!(instantiate(&f, &b, &[])?, Expr::parse(expected)?);
        let b: fnv::FnvHashMap<_, _> = b.into_iter().collect();
        assert_eq!(instantiate(&f, &b, &[])?, Expr::parse(expected)?);
        Ok(())
    }

    #[test]
    fn preserve() -> Result<(), Error> {
        let f = Expr::parse("(f _A +{\"k\":\"v\",\"l\":\"w\"})")?;
        let b = bindings(&[("A", "(g x)")])?;
        assert_eq!(instantiate(&f, &b, &[])?.to_string(), "(f (g x))");
        let inst = instantiate(&f, &b, &["k", "other"])?;
        assert_eq!(inst.to_string(), "(f (g x) +{\"k\":\"v\"})");
        Ok(())
    }

    #[test]
    fn capture() -> Result<(), Error> {
        // the value `x` must not be captured by the binding of `x`
        let f = Expr::parse("(∀ x , (= x _A))")?;
        let inst = instantiate(&f, &bindings(&[("A", "x")])?, &[])?;
        assert_eq!(inst.to_string(), "(∀ new1 , (= new1 x))");

        // metavariable parameters
        let f = Expr::parse("(∀ _x , (@ _P _x))")?;
        let b = bindings(&[("x", "y"), ("P", "(@ v , (R v y))")])?;
        // the free `y` in the value is distinct from the parameter `y`
        assert_eq!(instantiate(&f, &b, &[])?.to_string(), "(∀ new1 , (R new1 y))");
        let b = bindings(&[("x", "z"), ("P", "(@ v , (R v y))")])?;
        assert_eq!(instantiate(&f, &b, &[])?.to_string(), "(∀ z , (R z y))");
        let b = bindings(&[("x", "(f y)")])?;
        assert_eq!(instantiate(&f, &b, &[]), Err(Error::ParamNotSymbol));
        Ok(())
    }

    #[test]
    fn solution() -> Result<(), Error> {
        let rule = from(&Expr::parse("{ :(∀ x , (@ P x)) (@ P t) }")?, &["∀"]);
        let target = Expr::parse("{ :(∀ r , (> r 0)) (> 5 0) }")?;
        let sols = crate::match_all(&rule, &target)?;
        assert_eq!(sols.len(), 1);
        assert_eq!(instantiate(&rule, &sols[0], &[])?, target);
        Ok(())
    }
}
