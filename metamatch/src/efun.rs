//! Expression functions and their applications.
//!
//! An expression function (EF) is a binding with the head [`EF`],
//! written `(@ x1 ... xn , body)`.
//! An expression function application (EFA) is an application
//! with the first child [`EFA`], written `(@ F t1 ... tn)`.
//! The operator `F` of an EFA is usually a metavariable
//! that matching instantiates with an EF.
//!
//! Both forms are also recognised after [`Expr::without_bindings`],
//! where an EF becomes `(@binding @lambda x1 ... xn body)`.

use crate::expr::Environment;
use crate::symbol::{EF, EFA};
use crate::{Appl, Binding, Error, Expr, Symbol, Var};
use alloc::{rc::Rc, vec::Vec};

impl Expr {
    /// Create an expression function.
    pub fn ef(params: Vec<Symbol>, body: Expr) -> Self {
        Self::bind(Expr::symb(EF), params, body)
    }

    /// Create an expression function application.
    ///
    /// ~~~
    /// # use metamatch::{Error, Expr};
    /// let f = Expr::parse("(@ x , (+ x 1))")?;
    /// let efa = Expr::efa(f, [Expr::symb("2")].into())?;
    /// assert_eq!(efa.to_string(), "(@ (@ x , (+ x 1)) 2)");
    /// assert_eq!(efa.beta()?.to_string(), "(+ 2 1)");
    /// assert_eq!(Expr::efa(Expr::meta("P"), [].into()), Err(Error::EmptyEFA));
    /// # Ok::<_, Error>(())
    /// ~~~
    pub fn efa(op: Expr, operands: Vec<Expr>) -> Result<Self, Error> {
        if operands.is_empty() && op.is_meta() {
            return Err(Error::EmptyEFA);
        }
        if op.is_ef() {
            let arity = op.arity()?;
            if arity != operands.len() {
                let args = operands.len();
                return Err(Error::ArityMismatch { arity, args });
            }
        }
        let args = [Expr::symb(EFA), op].into_iter().chain(operands);
        Ok(Self::appl(args.collect()))
    }

    /// Return parameters and body if the expression is an expression function.
    fn ef_parts(&self) -> Option<(Vec<&Symbol>, &Expr)> {
        match self {
            Self::Bind(b) if matches!(&b.head, Expr::Symb(s) if s.is(EF)) => {
                Some((b.params.iter().collect(), &b.body))
            }
            Self::Appl(a) if a.is_binding() && matches!(&a.args[1], Expr::Symb(s) if s.is(EF)) => {
                let n = a.args.len();
                let params = a.args[2..n - 1].iter().map(|p| p.get_symb());
                Some((params.collect::<Option<_>>()?, &a.args[n - 1]))
            }
            _ => None,
        }
    }

    /// Return operator and operands if the expression is
    /// an expression function application.
    pub fn efa_parts(&self) -> Option<(&Expr, &[Expr])> {
        match self {
            Self::Appl(a) if a.args.len() >= 3 && matches!(&a.args[0], Expr::Symb(s) if s.is(EFA)) => {
                Some((&a.args[1], &a.args[2..]))
            }
            _ => None,
        }
    }

    pub fn is_ef(&self) -> bool {
        self.ef_parts().is_some()
    }

    pub fn is_efa(&self) -> bool {
        self.efa_parts().is_some()
    }

    /// Return the number of parameters of an expression function.
    pub fn arity(&self) -> Result<usize, Error> {
        let (params, _) = self.ef_parts().ok_or(Error::NotAFunction)?;
        Ok(params.len())
    }

    /// Apply an expression function to arguments.
    ///
    /// Every reference to a parameter in the body,
    /// either by name or by de Bruijn index,
    /// is replaced by the corresponding argument.
    pub fn apply(&self, args: &[Expr]) -> Result<Expr, Error> {
        let (params, body) = self.ef_parts().ok_or(Error::NotAFunction)?;
        if params.len() != args.len() {
            let arity = params.len();
            let args = args.len();
            return Err(Error::ArityMismatch { arity, args });
        }

        // projection
        let proj = match body {
            Expr::Var(v) if v.depth == 0 => Some(v.index),
            Expr::Symb(s) if !s.is_param() => params.iter().rposition(|p| p.same_name(s)),
            _ => None,
        };
        if let Some(i) = proj {
            return Ok(with_occurrence_attrs(args[i].clone(), body));
        }

        let subst = Subst { params, args };
        let visible: Vec<bool> = subst.params.iter().map(|p| !p.is_param()).collect();
        Ok(subst.apply(body, 0, &visible))
    }

    /// Reduce all applications of expression functions.
    ///
    /// The attributes of a reduced application are kept on its result.
    pub fn beta(&self) -> Result<Expr, Error> {
        match self {
            Self::Symb(_) | Self::Var(_) => Ok(self.clone()),
            Self::Appl(a) => {
                let args = a.args.iter().map(|a| a.beta());
                let attrs = a.attrs.clone();
                let args = args.collect::<Result<_, _>>()?;
                let e = Self::Appl(Rc::new(Appl { args, attrs }));
                match e.efa_parts() {
                    Some((op, operands)) if op.is_ef() => {
                        let reduct = op.apply(operands)?;
                        trace!("beta: {} ~> {}", e, reduct);
                        let attrs = a.attrs.clone().union(reduct.attrs().clone());
                        reduct.with_attrs(attrs).beta()
                    }
                    _ => Ok(e),
                }
            }
            Self::Bind(b) => Ok(Self::Bind(Rc::new(Binding {
                head: b.head.beta()?,
                params: b.params.clone(),
                body: b.body.beta()?,
                attrs: b.attrs.clone(),
            }))),
            Self::Env(en) => {
                let children = en.children.iter().map(|c| c.beta());
                Ok(Self::Env(Rc::new(Environment {
                    children: children.collect::<Result<_, _>>()?,
                    attrs: en.attrs.clone(),
                })))
            }
        }
    }
}

/// Keep the attributes of a replaced occurrence on its replacement.
fn with_occurrence_attrs(arg: Expr, occ: &Expr) -> Expr {
    if occ.attrs().is_empty() {
        arg
    } else {
        let attrs = occ.attrs().clone().union(arg.attrs().clone());
        arg.with_attrs(attrs)
    }
}

struct Subst<'a> {
    params: Vec<&'a Symbol>,
    args: &'a [Expr],
}

impl<'a> Subst<'a> {
    /// Substitute arguments in an expression under `k` bindings.
    ///
    /// `visible` tells for each parameter whether
    /// it can still be referred to by name.
    fn apply(&self, e: &Expr, k: usize, visible: &[bool]) -> Expr {
        match e {
            Expr::Var(v) if v.depth == k => match self.args.get(v.index) {
                Some(arg) => with_occurrence_attrs(arg.clone() << k, e),
                None => e.clone(),
            },
            Expr::Var(v) if v.depth > k => {
                let depth = v.depth - 1;
                Expr::Var(Var { depth, ..v.clone() })
            }
            Expr::Var(_) => e.clone(),
            Expr::Symb(s) if s.is_param() || s.is_marker() => e.clone(),
            Expr::Symb(s) => {
                let pos = (self.params.iter().zip(visible.iter()))
                    .rposition(|(p, vis)| *vis && p.same_name(s));
                match pos {
                    Some(i) => with_occurrence_attrs(self.args[i].clone() << k, e),
                    None => e.clone(),
                }
            }
            Expr::Appl(a) if a.is_binding() => {
                let n = a.args.len();
                let params: Vec<_> = a.args[2..n - 1].iter().filter_map(|p| p.get_symb()).collect();
                let inner = self.shadow(visible, &params);
                let args = a.args.iter().enumerate().map(|(i, arg)| match i {
                    0 => arg.clone(),
                    1 => self.apply(arg, k, visible),
                    i if i == n - 1 => self.apply(arg, k + 1, &inner),
                    _ => arg.clone(),
                });
                let attrs = a.attrs.clone();
                Expr::Appl(Rc::new(Appl {
                    args: args.collect(),
                    attrs,
                }))
            }
            Expr::Appl(_) | Expr::Env(_) => e.map_children(|c| self.apply(c, k, visible)),
            Expr::Bind(b) => {
                let params: Vec<_> = b.params.iter().collect();
                let inner = self.shadow(visible, &params);
                Expr::Bind(Rc::new(Binding {
                    head: self.apply(&b.head, k, visible),
                    params: b.params.clone(),
                    body: self.apply(&b.body, k + 1, &inner),
                    attrs: b.attrs.clone(),
                }))
            }
        }
    }

    /// Hide the parameters that are shadowed by the parameters of an inner binding.
    fn shadow(&self, visible: &[bool], inner: &[&Symbol]) -> Vec<bool> {
        let shadowed = |p: &Symbol| inner.iter().any(|q| q.same_name(p));
        let params = self.params.iter().zip(visible.iter());
        params.map(|(p, vis)| *vis && !shadowed(p)).collect()
    }
}
