//! De Bruijn encoding of bound parameters.
//!
//! Encoding replaces every reference to a binding parameter by
//! a [`Var`] giving the distance to its binding and
//! the position of the parameter in that binding.
//! The parameters themselves become symbols of kind [`Kind::Param`],
//! whose texts are kept only as hints for decoding.
//! As a result, two alpha-equivalent expressions encode to equal expressions,
//! and substitution under bindings cannot capture variables.
//!
//! Parameters that are metavariables remain metavariables in encoded bindings,
//! such that matching can instantiate them with the parameters of the target.
//! The reserved markers [`EF`](crate::symbol::EF) and [`EFA`](crate::symbol::EFA)
//! are never treated as references.

use crate::expr::{Environment, Var};
use crate::symbol::Kind;
use crate::{Appl, Binding, Expr, FreshSymbols, Stack, Symbol};
use alloc::{rc::Rc, vec::Vec};
use fnv::FnvHashSet;

/// Encode all bindings of an expression.
///
/// Encoding an already encoded expression leaves it unchanged.
pub fn encode(e: &Expr) -> Expr {
    encode_in(e, &mut Stack::new())
}

fn encode_in(e: &Expr, scope: &mut Stack<Vec<Symbol>>) -> Expr {
    match e {
        Expr::Symb(s) if !s.is_marker() && !s.is_param() => {
            let pos = |params: &Vec<Symbol>| params.iter().rposition(|p| p.same_name(s));
            match scope.find_map(pos) {
                Some((depth, index)) => {
                    let attrs = s.attrs.clone();
                    Expr::Var(Var {
                        depth,
                        index,
                        attrs,
                    })
                }
                None => e.clone(),
            }
        }
        Expr::Symb(_) | Expr::Var(_) => e.clone(),
        Expr::Appl(a) => Expr::Appl(Rc::new(Appl {
            args: a.args.iter().map(|a| encode_in(a, scope)).collect(),
            attrs: a.attrs.clone(),
        })),
        Expr::Bind(b) => {
            let head = encode_in(&b.head, scope);
            let params = b.params.iter().map(|p| match p.kind {
                Kind::Const => p.clone().into_kind(Kind::Param),
                Kind::Meta | Kind::Param => p.clone(),
            });
            let params = params.collect();
            let body = scope.with_pushed(b.params.clone(), |scope| encode_in(&b.body, scope));
            let attrs = b.attrs.clone();
            Expr::Bind(Rc::new(Binding {
                head,
                params,
                body,
                attrs,
            }))
        }
        Expr::Env(en) => Expr::Env(Rc::new(Environment {
            children: en.children.iter().map(|c| encode_in(c, scope)).collect(),
            attrs: en.attrs.clone(),
        })),
    }
}

/// Decode all bindings of an encoded expression.
///
/// Parameters keep their original names whenever this does not capture
/// any other symbol; otherwise, they obtain fresh names.
pub fn decode(e: &Expr) -> Expr {
    let mut fresh: FreshSymbols = core::iter::once(e).collect();
    decode_with(e, &mut fresh)
}

/// Decode all bindings, taking fresh names from the given source.
///
/// The source must avoid all names occurring in the expression.
pub fn decode_with(e: &Expr, fresh: &mut FreshSymbols) -> Expr {
    decode_in(e, &mut Stack::new(), fresh)
}

/// Names of all ordinary symbols and metavariables.
fn free_names(e: &Expr) -> FnvHashSet<Rc<str>> {
    let mut names = FnvHashSet::default();
    e.for_each_symb(&mut |s| {
        if !s.is_param() {
            names.insert(s.text.clone());
        }
    });
    names
}

fn decode_in(e: &Expr, scope: &mut Stack<Vec<Symbol>>, fresh: &mut FreshSymbols) -> Expr {
    match e {
        Expr::Symb(s) if s.is_param() => Expr::Symb(s.clone().into_kind(Kind::Const)),
        Expr::Symb(_) => e.clone(),
        Expr::Var(v) => match scope.get(v.depth).and_then(|ps| ps.get(v.index)) {
            Some(p) => {
                let attrs = v.attrs.clone();
                Expr::Symb(Symbol { attrs, ..p.clone() })
            }
            None => e.clone(),
        },
        Expr::Appl(a) => Expr::Appl(Rc::new(Appl {
            args: a.args.iter().map(|a| decode_in(a, scope, fresh)).collect(),
            attrs: a.attrs.clone(),
        })),
        Expr::Bind(b) => {
            let head = decode_in(&b.head, scope, fresh);

            // names that must not be chosen for the parameters
            let mut taken = free_names(&b.body);
            b.body.for_each_loose(1, &mut |v, depth| {
                let outer = scope.get(depth).and_then(|ps| ps.get(v.index));
                taken.extend(outer.map(|p| p.text.clone()))
            });

            let mut params = Vec::with_capacity(b.params.len());
            for p in b.params.iter() {
                let p = if !p.is_param() {
                    p.clone()
                } else if p.text.is_empty() || taken.contains(&p.text) {
                    let attrs = p.attrs.clone();
                    Symbol {
                        attrs,
                        ..fresh.next()
                    }
                } else {
                    p.clone().into_kind(Kind::Const)
                };
                taken.insert(p.text.clone());
                params.push(p)
            }

            let body = scope.with_pushed(params.clone(), |scope| decode_in(&b.body, scope, fresh));
            let attrs = b.attrs.clone();
            Expr::Bind(Rc::new(Binding {
                head,
                params,
                body,
                attrs,
            }))
        }
        Expr::Env(en) => Expr::Env(Rc::new(Environment {
            children: en.children.iter().map(|c| decode_in(c, scope, fresh)).collect(),
            attrs: en.attrs.clone(),
        })),
    }
}

impl Expr {
    /// Return true if both expressions are equal up to
    /// the names of binding parameters.
    ///
    /// ~~~
    /// # use metamatch::{Error, Expr};
    /// let e1 = Expr::parse("(∀ x , (P x))")?;
    /// let e2 = Expr::parse("(∀ y , (P y))")?;
    /// let e3 = Expr::parse("(∀ y , (P x))")?;
    /// assert!(e1.alpha_eq(&e2));
    /// assert!(!e1.alpha_eq(&e3));
    /// # Ok::<_, Error>(())
    /// ~~~
    pub fn alpha_eq(&self, other: &Self) -> bool {
        self == other || encode(self) == encode(other)
    }
}
