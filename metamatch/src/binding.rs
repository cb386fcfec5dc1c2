//! Bindings and their conversion from and to applications.

use crate::symbol::BINDING;
use crate::{Appl, Attrs, Expr, Symbol};
use alloc::{rc::Rc, vec::Vec};
use core::fmt::{self, Display};

/// Binding, such as `(∀ x y , (= x y))`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Binding {
    pub head: Expr,
    /// bound parameters, at least one
    pub params: Vec<Symbol>,
    pub body: Expr,
    pub attrs: Attrs,
}

impl Display for Binding {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "({}", self.head)?;
        self.params.iter().try_for_each(|p| write!(f, " {}", p))?;
        write!(f, " , {})", self.body)
    }
}

impl Expr {
    /// Replace every binding `(h x1 ... xn , b)` by
    /// an application `(@binding h x1 ... xn b)`.
    ///
    /// This allows parameter slots to be treated like any other child.
    /// The body of the resulting application remains in the scope of the binding,
    /// such that de Bruijn indices stay valid.
    pub fn without_bindings(&self) -> Self {
        match self {
            Self::Symb(_) | Self::Var(_) => self.clone(),
            Self::Appl(a) => Self::Appl(Rc::new(Appl {
                args: a.args.iter().map(|a| a.without_bindings()).collect(),
                attrs: a.attrs.clone(),
            })),
            Self::Bind(b) => {
                let marker = Expr::symb(BINDING);
                let head = b.head.without_bindings();
                let params = b.params.iter().cloned().map(Expr::Symb);
                let body = b.body.without_bindings();
                let args = [marker, head].into_iter().chain(params).chain([body]);
                let attrs = b.attrs.clone();
                Self::Appl(Rc::new(Appl {
                    args: args.collect(),
                    attrs,
                }))
            }
            Self::Env(_) => self.map_children(|c| c.without_bindings()),
        }
    }

    /// Inverse of [`Expr::without_bindings`].
    ///
    /// Applications whose parameter slots are not all symbols
    /// are left as they are.
    pub fn with_bindings(&self) -> Self {
        match self {
            Self::Symb(_) | Self::Var(_) => self.clone(),
            Self::Appl(a) if a.is_binding() => {
                let n = a.args.len();
                let params: Option<Vec<Symbol>> = a.args[2..n - 1]
                    .iter()
                    .map(|p| p.get_symb().cloned())
                    .collect();
                match params {
                    Some(params) => Self::Bind(Rc::new(Binding {
                        head: a.args[1].with_bindings(),
                        params,
                        body: a.args[n - 1].with_bindings(),
                        attrs: a.attrs.clone(),
                    })),
                    None => {
                        trace!("binding with non-symbol parameters: {}", self);
                        self.map_children(|c| c.with_bindings())
                    }
                }
            }
            Self::Appl(_) | Self::Env(_) => self.map_children(|c| c.with_bindings()),
            Self::Bind(b) => Self::Bind(Rc::new(Binding {
                head: b.head.with_bindings(),
                params: b.params.clone(),
                body: b.body.with_bindings(),
                attrs: b.attrs.clone(),
            })),
        }
    }

    /// Map the children of an application or environment.
    ///
    /// Other expressions are returned unchanged.
    pub(crate) fn map_children(&self, f: impl Fn(&Expr) -> Expr) -> Self {
        match self {
            Self::Appl(a) => Self::Appl(Rc::new(Appl {
                args: a.args.iter().map(f).collect(),
                attrs: a.attrs.clone(),
            })),
            Self::Env(e) => Self::Env(Rc::new(crate::expr::Environment {
                children: e.children.iter().map(f).collect(),
                attrs: e.attrs.clone(),
            })),
            _ => self.clone(),
        }
    }
}
