//! Expression trees.

use crate::application::format as fmt_appl;
use crate::{Appl, Binding, Symbol};
use alloc::{rc::Rc, string::String, vec::Vec};
use core::fmt::{self, Display};

/// Attributes attached to a node, such as whether it is given.
pub type Attrs = im::OrdMap<String, String>;

/// Attribute marking a node as given (written `:x`).
pub const GIVEN: &str = "given";

/// Reference to the parameter of an enclosing binding.
///
/// The `depth` counts the bindings between the reference and its binder
/// (0 meaning the innermost one), and
/// the `index` is the position of the parameter in its binder.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Var {
    pub depth: usize,
    pub index: usize,
    pub attrs: Attrs,
}

impl Var {
    pub fn new(depth: usize, index: usize) -> Self {
        let attrs = Attrs::new();
        Self {
            depth,
            index,
            attrs,
        }
    }
}

/// Ordered container of expressions, such as `{ :a (b c) }`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Environment {
    pub children: Vec<Expr>,
    pub attrs: Attrs,
}

/// Expression tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Expr {
    Symb(Symbol),
    /// de Bruijn-encoded reference to a bound parameter
    Var(Var),
    Appl(Rc<Appl>),
    Bind(Rc<Binding>),
    Env(Rc<Environment>),
}

impl From<Symbol> for Expr {
    fn from(s: Symbol) -> Self {
        Self::Symb(s)
    }
}

impl Expr {
    /// Create an ordinary symbol.
    pub fn symb(text: &str) -> Self {
        Self::Symb(Symbol::new(text))
    }

    /// Create a metavariable.
    pub fn meta(text: &str) -> Self {
        Self::Symb(Symbol::meta(text))
    }

    pub fn appl(args: Vec<Expr>) -> Self {
        let attrs = Attrs::new();
        Self::Appl(Rc::new(Appl { args, attrs }))
    }

    pub fn bind(head: Expr, params: Vec<Symbol>, body: Expr) -> Self {
        let attrs = Attrs::new();
        Self::Bind(Rc::new(Binding {
            head,
            params,
            body,
            attrs,
        }))
    }

    pub fn env(children: Vec<Expr>) -> Self {
        let attrs = Attrs::new();
        Self::Env(Rc::new(Environment { children, attrs }))
    }

    pub fn get_symb(&self) -> Option<&Symbol> {
        match self {
            Self::Symb(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_env(&self) -> bool {
        matches!(self, Self::Env(_))
    }

    pub fn attrs(&self) -> &Attrs {
        match self {
            Self::Symb(s) => &s.attrs,
            Self::Var(v) => &v.attrs,
            Self::Appl(a) => &a.attrs,
            Self::Bind(b) => &b.attrs,
            Self::Env(e) => &e.attrs,
        }
    }

    pub fn attrs_mut(&mut self) -> &mut Attrs {
        match self {
            Self::Symb(s) => &mut s.attrs,
            Self::Var(v) => &mut v.attrs,
            Self::Appl(a) => &mut Rc::make_mut(a).attrs,
            Self::Bind(b) => &mut Rc::make_mut(b).attrs,
            Self::Env(e) => &mut Rc::make_mut(e).attrs,
        }
    }

    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attrs().get(key).map(|v| v.as_str())
    }

    pub fn with_attr(mut self, key: &str, value: &str) -> Self {
        let attrs = self.attrs_mut();
        attrs.insert(String::from(key), String::from(value));
        self
    }

    /// Replace all attributes.
    pub fn with_attrs(mut self, attrs: Attrs) -> Self {
        *self.attrs_mut() = attrs;
        self
    }

    pub fn is_given(&self) -> bool {
        self.attr(GIVEN).is_some()
    }

    /// Mark the expression as given.
    pub fn given(self) -> Self {
        self.with_attr(GIVEN, "true")
    }

    /// Return the immediate children.
    ///
    /// The children of a binding are its head, its parameters, and its body.
    pub fn children(&self) -> Vec<Expr> {
        match self {
            Self::Symb(_) | Self::Var(_) => Vec::new(),
            Self::Appl(a) => a.args.clone(),
            Self::Bind(b) => {
                let params = b.params.iter().cloned().map(Expr::Symb);
                let head = core::iter::once(b.head.clone());
                head.chain(params).chain([b.body.clone()]).collect()
            }
            Self::Env(e) => e.children.clone(),
        }
    }

    /// Return the child at the given position, see [`Expr::children`].
    pub fn child(&self, i: usize) -> Option<Expr> {
        self.children().into_iter().nth(i)
    }

    /// Return true if both expressions share the same memory.
    ///
    /// This implies equality, but not vice versa.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Symb(s1), Self::Symb(s2)) => s1.ptr_eq(s2),
            (Self::Var(v1), Self::Var(v2)) => v1 == v2,
            (Self::Appl(a1), Self::Appl(a2)) => Rc::ptr_eq(a1, a2),
            (Self::Bind(b1), Self::Bind(b2)) => Rc::ptr_eq(b1, b2),
            (Self::Env(e1), Self::Env(e2)) => Rc::ptr_eq(e1, e2),
            _ => false,
        }
    }

    /// Call a function on every symbol, including binding parameters.
    pub fn for_each_symb(&self, f: &mut impl FnMut(&Symbol)) {
        match self {
            Self::Symb(s) => f(s),
            Self::Var(_) => (),
            Self::Appl(a) => a.args.iter().for_each(|a| a.for_each_symb(f)),
            Self::Bind(b) => {
                b.head.for_each_symb(f);
                b.params.iter().for_each(&mut *f);
                b.body.for_each_symb(f)
            }
            Self::Env(e) => e.children.iter().for_each(|c| c.for_each_symb(f)),
        }
    }

    /// Return true if some symbol satisfies the predicate.
    pub fn any_symb(&self, f: &impl Fn(&Symbol) -> bool) -> bool {
        match self {
            Self::Symb(s) => f(s),
            Self::Var(_) => false,
            Self::Appl(a) => a.args.iter().any(|a| a.any_symb(f)),
            Self::Bind(b) => b.head.any_symb(f) || b.params.iter().any(f) || b.body.any_symb(f),
            Self::Env(e) => e.children.iter().any(|c| c.any_symb(f)),
        }
    }

    /// Replace every symbol, including binding parameters.
    pub fn map_symbs(&self, f: &impl Fn(&Symbol) -> Symbol) -> Self {
        match self {
            Self::Symb(s) => Self::Symb(f(s)),
            Self::Var(_) => self.clone(),
            Self::Appl(a) => Self::Appl(Rc::new(Appl {
                args: a.args.iter().map(|a| a.map_symbs(f)).collect(),
                attrs: a.attrs.clone(),
            })),
            Self::Bind(b) => Self::Bind(Rc::new(Binding {
                head: b.head.map_symbs(f),
                params: b.params.iter().map(f).collect(),
                body: b.body.map_symbs(f),
                attrs: b.attrs.clone(),
            })),
            Self::Env(e) => Self::Env(Rc::new(Environment {
                children: e.children.iter().map(|c| c.map_symbs(f)).collect(),
                attrs: e.attrs.clone(),
            })),
        }
    }

    /// Replace every variable that is bound outside of the expression.
    ///
    /// The function receives the variable as well as
    /// the number `k` of bindings traversed to reach it.
    /// Subexpressions without such variables are shared, not copied.
    pub fn map_vars<F>(&self, f: &F, k: usize) -> Self
    where
        F: Fn(&Var, usize) -> Expr,
    {
        let sub = |tm: &Expr, k| tm.map_vars(f, k);
        match self {
            Self::Var(v) if v.depth >= k => return f(v, k),
            Self::Var(_) | Self::Symb(_) => (),
            Self::Appl(a) => {
                let binder = a.is_binding();
                let last = a.args.len().saturating_sub(1);
                let args: Vec<_> = (a.args.iter().enumerate())
                    .map(|(i, arg)| sub(arg, if binder && i == last { k + 1 } else { k }))
                    .collect();
                if !a.args.iter().zip(args.iter()).all(|(a, a2)| a.ptr_eq(a2)) {
                    let attrs = a.attrs.clone();
                    return Self::Appl(Rc::new(Appl { args, attrs }));
                }
            }
            Self::Bind(b) => {
                let head = sub(&b.head, k);
                let body = sub(&b.body, k + 1);
                if !b.head.ptr_eq(&head) || !b.body.ptr_eq(&body) {
                    let params = b.params.clone();
                    let attrs = b.attrs.clone();
                    return Self::Bind(Rc::new(Binding {
                        head,
                        params,
                        body,
                        attrs,
                    }));
                }
            }
            Self::Env(e) => {
                let children: Vec<_> = e.children.iter().map(|c| sub(c, k)).collect();
                if !e.children.iter().zip(children.iter()).all(|(c, c2)| c.ptr_eq(c2)) {
                    let attrs = e.attrs.clone();
                    return Self::Env(Rc::new(Environment { children, attrs }));
                }
            }
        }
        self.clone()
    }

    /// Call a function on every variable that is bound outside of the expression
    /// when the expression is placed under `k` bindings.
    ///
    /// The function receives the variable and its depth relative to
    /// the outside of the expression.
    pub fn for_each_loose(&self, k: usize, f: &mut impl FnMut(&Var, usize)) {
        match self {
            Self::Var(v) if v.depth >= k => f(v, v.depth - k),
            Self::Var(_) | Self::Symb(_) => (),
            Self::Appl(a) => {
                let binder = a.is_binding();
                let last = a.args.len().saturating_sub(1);
                for (i, arg) in a.args.iter().enumerate() {
                    arg.for_each_loose(if binder && i == last { k + 1 } else { k }, f)
                }
            }
            Self::Bind(b) => {
                b.head.for_each_loose(k, f);
                b.body.for_each_loose(k + 1, f)
            }
            Self::Env(e) => e.children.iter().for_each(|c| c.for_each_loose(k, f)),
        }
    }

    /// Return true if the expression contains no reference to
    /// a binding outside of it.
    pub fn is_closed(&self) -> bool {
        self.is_closed_under(0)
    }

    /// Return true if the expression, placed under `k` bindings,
    /// does not refer to any binding outside of these.
    pub fn is_closed_under(&self, k: usize) -> bool {
        let mut closed = true;
        self.for_each_loose(k, &mut |_, _| closed = false);
        closed
    }

    /// Undo shifting by `k`, namely return `e` such that `e << k` equals `self`.
    ///
    /// Return `None` if the expression refers to any of
    /// the `k` innermost bindings outside of it.
    pub fn unshifted(&self, k: usize) -> Option<Self> {
        let mut inner = false;
        self.for_each_loose(0, &mut |_, depth| inner |= depth < k);
        if inner {
            return None;
        }
        let shift = |v: &Var, _k| {
            let depth = v.depth - k;
            let attrs = v.attrs.clone();
            Expr::Var(Var { depth, attrs, ..*v })
        };
        Some(if k == 0 { self.clone() } else { self.map_vars(&shift, 0) })
    }
}

/// Shift all variables bound outside the expression by the given amount.
///
/// This is necessary when placing an expression under bindings.
#[allow(clippy::suspicious_arithmetic_impl)]
impl core::ops::Shl<usize> for Expr {
    type Output = Self;

    fn shl(self, rhs: usize) -> Self::Output {
        if rhs == 0 {
            self
        } else {
            let shift = |v: &Var, _k| {
                let depth = v.depth + rhs;
                let attrs = v.attrs.clone();
                Expr::Var(Var { depth, attrs, ..*v })
            };
            self.map_vars(&shift, 0)
        }
    }
}

fn fmt_attrs(attrs: &Attrs, f: &mut fmt::Formatter) -> fmt::Result {
    let mut attrs = attrs.iter().filter(|(k, _)| k.as_str() != GIVEN).peekable();
    if attrs.peek().is_none() {
        return Ok(());
    }
    write!(f, " +{{")?;
    for (i, (k, v)) in attrs.enumerate() {
        if i > 0 {
            write!(f, ",")?;
        }
        write!(f, "\"{}\":\"{}\"", k, v)?;
    }
    write!(f, "}}")
}

impl Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.is_given() {
            write!(f, ":")?;
        }
        match self {
            Self::Symb(s) => s.fmt(f)?,
            Self::Var(v) => write!(f, "β{}.{}", v.depth, v.index)?,
            Self::Appl(a) => fmt_appl(&a.args, f)?,
            Self::Bind(b) => b.fmt(f)?,
            Self::Env(e) if e.children.is_empty() => write!(f, "{{ }}")?,
            Self::Env(e) => {
                write!(f, "{{")?;
                e.children.iter().try_for_each(|c| write!(f, " {}", c))?;
                write!(f, " }}")?
            }
        }
        fmt_attrs(self.attrs(), f)
    }
}


#[test]
fn shift() {
    use alloc::vec;
    let e = Expr::appl(vec![Expr::symb("g"), Expr::Var(Var::new(2, 0))]);
    let unshifted = e.unshifted(1);
    assert_eq!(unshifted, Some(Expr::appl(vec![Expr::symb("g"), Expr::Var(Var::new(1, 0))])));
    assert_eq!(unshifted.map(|u| u << 1), Some(e.clone()));
    assert_eq!(e.unshifted(3), None);
    // variables bound inside the expression are not shifted
    let b = Expr::bind(Expr::symb("∀"), vec![Symbol::new("x")], e.clone());
    let body = Expr::appl(vec![Expr::symb("g"), Expr::Var(Var::new(1, 0))]);
    assert_eq!(b.unshifted(1), Some(Expr::bind(Expr::symb("∀"), vec![Symbol::new("x")], body)));
    assert_eq!(b.unshifted(2), None);
    assert_eq!(b.unshifted(0), Some(b));
}
