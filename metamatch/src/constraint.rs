//! Pairs of patterns and expressions.

use crate::expr::Environment;
use crate::symbol::Kind;
use crate::{debruijn, Appl, Binding, Error, Expr, Symbol};
use alloc::{rc::Rc, vec::Vec};
use core::cell::OnceCell;
use core::fmt::{self, Display};

/// Classification of a constraint, determining the order in which
/// constraints are processed during matching.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Complexity {
    /// the constraint can never be satisfied
    Failure,
    /// the constraint is satisfied by any solution
    Success,
    /// the pattern is a lone metavariable
    Instantiation,
    /// the constraint can be split into constraints between children
    Children,
    /// the pattern is an expression function application
    Efa,
}

impl Complexity {
    pub fn name(self) -> &'static str {
        match self {
            Self::Failure => "failure",
            Self::Success => "success",
            Self::Instantiation => "instantiation",
            Self::Children => "children",
            Self::Efa => "EFA",
        }
    }
}

impl Display for Complexity {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.name().fmt(f)
    }
}

/// A pattern that should match an expression.
///
/// The expression of a constraint never contains metavariables.
/// Constraints are immutable; all transformations return new constraints.
#[derive(Clone, Debug)]
pub struct Constraint {
    pub(crate) pattern: Expr,
    pub(crate) expr: Expr,
    complexity: OnceCell<Complexity>,
}

impl PartialEq for Constraint {
    fn eq(&self, other: &Self) -> bool {
        self.pattern == other.pattern && self.expr == other.expr
    }
}

impl Eq for Constraint {}

impl Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "({},{})", self.pattern, self.expr)
    }
}

/// Return true if all attributes of `sub` are also in `sup`.
fn attrs_within(sub: &Expr, sup: &Expr) -> bool {
    let sup = sup.attrs();
    sub.attrs().iter().all(|(k, v)| sup.get(k) == Some(v))
}

/// Return true if the pattern symbol equals the expression symbol.
///
/// A symbol also equals a parameter of the same name,
/// which arises from metavariables instantiated with parameters.
fn symb_equal(p: &Symbol, e: &Symbol) -> bool {
    p == e || (p.kind == Kind::Const && e.is_param() && p.text == e.text && p.attrs == e.attrs)
}

/// Return true if a pattern without metavariables equals the expression.
fn equal(p: &Expr, e: &Expr) -> bool {
    let all = |ps: &[Expr], es: &[Expr]| ps.len() == es.len() && ps.iter().zip(es).all(|(p, e)| equal(p, e));
    match (p, e) {
        (Expr::Symb(ps), Expr::Symb(es)) => symb_equal(ps, es),
        (Expr::Appl(pa), Expr::Appl(ea)) => pa.attrs == ea.attrs && all(&pa.args, &ea.args),
        (Expr::Bind(pb), Expr::Bind(eb)) => {
            let mut params = pb.params.iter().zip(eb.params.iter());
            pb.attrs == eb.attrs
                && pb.params.len() == eb.params.len()
                && params.all(|(p, e)| symb_equal(p, e))
                && equal(&pb.head, &eb.head)
                && equal(&pb.body, &eb.body)
        }
        (Expr::Env(pe), Expr::Env(ee)) => pe.attrs == ee.attrs && all(&pe.children, &ee.children),
        _ => p == e,
    }
}

/// Return true if pattern and expression have the same shape,
/// disregarding their children.
fn same_shape(pattern: &Expr, expr: &Expr) -> bool {
    let same = match (pattern, expr) {
        (Expr::Appl(p), Expr::Appl(e)) => p.args.len() == e.args.len(),
        (Expr::Bind(p), Expr::Bind(e)) => p.params.len() == e.params.len(),
        (Expr::Env(p), Expr::Env(e)) => p.children.len() == e.children.len(),
        _ => false,
    };
    same && pattern.attrs() == expr.attrs()
}

impl Constraint {
    /// Create a new constraint.
    ///
    /// ~~~
    /// # use metamatch::{Constraint, Error, Expr};
    /// let c = Constraint::new(Expr::parse("(f _x)")?, Expr::parse("(f a)")?)?;
    /// assert_eq!(c.complexity().name(), "children");
    /// let c = Constraint::new(Expr::parse("(f a)")?, Expr::parse("(f _x)")?);
    /// assert_eq!(c, Err(Error::InvalidConstraint));
    /// # Ok::<_, Error>(())
    /// ~~~
    pub fn new(pattern: Expr, expr: Expr) -> Result<Self, Error> {
        if expr.has_meta() {
            return Err(Error::InvalidConstraint);
        }
        Ok(Self::unchecked(pattern, expr))
    }

    fn unchecked(pattern: Expr, expr: Expr) -> Self {
        let complexity = OnceCell::new();
        Self {
            pattern,
            expr,
            complexity,
        }
    }

    pub fn pattern(&self) -> &Expr {
        &self.pattern
    }

    pub fn expr(&self) -> &Expr {
        &self.expr
    }

    pub fn complexity(&self) -> Complexity {
        *self.complexity.get_or_init(|| self.classify())
    }

    fn classify(&self) -> Complexity {
        let (p, e) = (&self.pattern, &self.expr);
        if p.is_meta() {
            if attrs_within(p, e) {
                Complexity::Instantiation
            } else {
                Complexity::Failure
            }
        } else if p.is_efa() {
            Complexity::Efa
        } else if !p.has_meta() {
            if equal(p, e) {
                Complexity::Success
            } else {
                Complexity::Failure
            }
        } else if same_shape(p, e) {
            Complexity::Children
        } else {
            Complexity::Failure
        }
    }

    /// Split a constraint into constraints between the children of
    /// the pattern and the expression.
    pub fn children(&self) -> Result<Vec<Constraint>, Error> {
        let complexity = self.complexity();
        if complexity != Complexity::Children {
            return Err(Error::WrongComplexity(complexity));
        }
        let pc = self.pattern.children().into_iter();
        let ec = self.expr.children().into_iter();
        Ok(pc.zip(ec).map(|(p, e)| Self::unchecked(p, e)).collect())
    }

    /// Return true if the pattern is a lone metavariable.
    pub fn is_instantiation(&self) -> bool {
        self.pattern.is_meta()
    }

    /// Return true if the constraint can be applied as substitution.
    pub fn can_apply(&self) -> bool {
        self.is_instantiation()
    }

    /// Return the metavariable and its value if the constraint is an instantiation.
    ///
    /// The value does not carry the attributes of the metavariable,
    /// such that `:_A` matched against `:(f x)` yields `(f x)`.
    /// A parameter value, obtained from a metavariable in a binding,
    /// becomes an ordinary symbol, such that the metavariable
    /// may occur outside of the binding as well.
    pub fn instantiation(&self) -> Option<(&Symbol, Expr)> {
        let meta = self.pattern.get_symb().filter(|s| s.is_meta())?;
        let mut attrs = self.expr.attrs().clone();
        meta.attrs.keys().for_each(|k| {
            attrs.remove(k);
        });
        let value = match &self.expr {
            Expr::Symb(s) if s.is_param() => Expr::Symb(s.clone().into_kind(Kind::Const)),
            e => e.clone(),
        };
        Some((meta, value.with_attrs(attrs)))
    }

    /// Replace all occurrences of the metavariable of the constraint
    /// in the target by the value of the constraint.
    ///
    /// The target is not modified.
    pub fn applied_to(&self, target: &Expr) -> Result<Expr, Error> {
        let (meta, value) = self.instantiation().ok_or(Error::NotApplicable)?;
        let subst = MetaSubst { meta, value };
        subst.apply(target, 0)
    }

    /// Like [`Constraint::applied_to`], but replace the target.
    pub fn apply_to(&self, target: &mut Expr) -> Result<(), Error> {
        *target = self.applied_to(target)?;
        Ok(())
    }

    /// Apply substitutions in order to the pattern.
    pub fn after_substituting(&self, subs: &[Constraint]) -> Result<Self, Error> {
        let pattern = subs
            .iter()
            .try_fold(self.pattern.clone(), |p, s| s.applied_to(&p))?;
        Ok(Self::unchecked(pattern, self.expr.clone()))
    }

    /// Reduce all applications of expression functions in the pattern.
    pub fn beta(&self) -> Result<Self, Error> {
        Ok(Self::unchecked(self.pattern.beta()?, self.expr.clone()))
    }

    /// Replace bindings by applications in pattern and expression.
    ///
    /// See [`Expr::without_bindings`].
    pub fn remove_bindings(&self) -> Self {
        let pattern = self.pattern.without_bindings();
        Self::unchecked(pattern, self.expr.without_bindings())
    }

    pub fn debruijn_encode(&self) -> Self {
        let pattern = debruijn::encode(&self.pattern);
        Self::unchecked(pattern, debruijn::encode(&self.expr))
    }

    pub fn debruijn_decode(&self) -> Self {
        let pattern = debruijn::decode(&self.pattern);
        Self::unchecked(pattern, debruijn::decode(&self.expr))
    }
}

/// Substitution of a single metavariable.
struct MetaSubst<'a> {
    meta: &'a Symbol,
    value: Expr,
}

impl<'a> MetaSubst<'a> {
    /// Value for an occurrence of the metavariable under `k` bindings.
    fn value(&self, occ: &Symbol, k: usize) -> Expr {
        let value = self.value.clone() << k;
        if occ.attrs.is_empty() {
            value
        } else {
            let attrs = occ.attrs.clone().union(value.attrs().clone());
            value.with_attrs(attrs)
        }
    }

    fn param(&self, p: &Symbol) -> Result<Symbol, Error> {
        if !p.same_name(self.meta) {
            return Ok(p.clone());
        }
        match &self.value {
            Expr::Symb(s) => Ok(s.clone()),
            _ => Err(Error::ParamNotSymbol),
        }
    }

    fn apply(&self, e: &Expr, k: usize) -> Result<Expr, Error> {
        Ok(match e {
            Expr::Symb(s) if s.same_name(self.meta) => self.value(s, k),
            Expr::Symb(_) | Expr::Var(_) => e.clone(),
            Expr::Appl(a) => {
                let binder = a.is_binding();
                let last = a.args.len().saturating_sub(1);
                let args = a.args.iter().enumerate().map(|(i, arg)| {
                    self.apply(arg, if binder && i == last { k + 1 } else { k })
                });
                Expr::Appl(Rc::new(Appl {
                    args: args.collect::<Result<_, _>>()?,
                    attrs: a.attrs.clone(),
                }))
            }
            Expr::Bind(b) => {
                let params = b.params.iter().map(|p| self.param(p));
                Expr::Bind(Rc::new(Binding {
                    head: self.apply(&b.head, k)?,
                    params: params.collect::<Result<_, _>>()?,
                    body: self.apply(&b.body, k + 1)?,
                    attrs: b.attrs.clone(),
                }))
            }
            Expr::Env(en) => {
                let children = en.children.iter().map(|c| self.apply(c, k));
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

    fn constraint(p: &str, e: &str) -> Result<Constraint, Error> {
        Constraint::new(Expr::parse(p)?, Expr::parse(e)?)
    }

    #[test]
    fn complexity() -> Result<(), Error> {
        use Complexity::*;
        let cases = [
            ("a", "(b c)", Failure),
            ("(x _y z)", "(a b , c)", Failure),
            ("(x _y , z)", "(a b c)", Failure),
            ("(x _y z)", "(a b)", Failure),
            ("(x _y z , w)", "(a b , c)", Failure),
            ("(x (w w) z)", "(x (w w) z)", Success),
            ("_A", "(a b)", Instantiation),
            ("(x _y z)", "(a b c)", Children),
            ("(x _y z , w)", "(a b c , d)", Children),
            ("{ _a b }", "{ c d }", Children),
            ("(@ _P x)", "(a b c d)", Efa),
            // attributes of the pattern have to be present
            (":_A", ":(a b)", Instantiation),
            (":_A", "(a b)", Failure),
            (":(f _x)", "(f a)", Failure),
        ];
        for (p, e, expected) in cases {
            let c = constraint(p, e)?;
            assert_eq!(c.complexity(), expected, "{}", c);
        }
        assert_eq!(Efa.name(), "EFA");
        assert_eq!(Instantiation.to_string(), "instantiation");
        assert!(Failure < Success && Success < Instantiation);
        assert!(Instantiation < Children && Children < Efa);
        Ok(())
    }

    #[test]
    fn children() -> Result<(), Error> {
        let c = constraint("(x _y z)", "(a b c)")?;
        let cs = c.children()?;
        assert_eq!(cs.len(), 3);
        assert_eq!(cs[0], constraint("x", "a")?);
        assert_eq!(cs[1], constraint("_y", "b")?);
        assert_eq!(cs[1].complexity(), Complexity::Instantiation);

        // recombining children yields the original
        let ps = cs.iter().map(|c| c.pattern.clone()).collect();
        let es = cs.iter().map(|c| c.expr.clone()).collect();
        assert_eq!(Expr::appl(ps), c.pattern);
        assert_eq!(Expr::appl(es), c.expr);

        let c = constraint("(∀ _x y , (P _x y))", "(∃ a b , (Q a))")?;
        let cs: Vec<_> = c.children()?.iter().map(|c| c.to_string()).collect();
        assert_eq!(cs, ["(∀,∃)", "(_x,a)", "(y,b)", "((P _x y),(Q a))"]);

        let c = constraint("a", "(b c)")?;
        assert_eq!(c.children(), Err(Error::WrongComplexity(Complexity::Failure)));
        let c = constraint("(@ _P x)", "(a b c d)")?;
        assert_eq!(c.children(), Err(Error::WrongComplexity(Complexity::Efa)));
        Ok(())
    }

    #[test]
    fn apply() -> Result<(), Error> {
        let c = constraint("_A", "(f x)")?;
        assert!(c.can_apply());
        let target = Expr::parse("(g _A (h _A) _B)")?;
        let copy = target.clone();
        let result = c.applied_to(&target)?;
        assert_eq!(result.to_string(), "(g (f x) (h (f x)) _B)");
        assert_eq!(target, copy);

        // in place
        let mut target = Expr::parse("{ :_A (→ _A _B) }")?;
        c.apply_to(&mut target)?;
        assert_eq!(target.to_string(), "{ :(f x) (→ (f x) _B) }");

        // metavariables as binding parameters
        let c = constraint("_x", "y")?;
        let target = Expr::parse("(∀ _x , (P _x))")?;
        assert_eq!(c.applied_to(&target)?.to_string(), "(∀ y , (P y))");
        let c = constraint("_x", "(f y)")?;
        assert_eq!(c.applied_to(&target), Err(Error::ParamNotSymbol));

        let c = constraint("(f _A)", "(f x)")?;
        assert!(!c.can_apply());
        assert_eq!(c.applied_to(&target), Err(Error::NotApplicable));
        Ok(())
    }

    #[test]
    fn after_substituting() -> Result<(), Error> {
        let c = constraint("(f _A _B)", "(f x y)")?;
        assert_eq!(constraint("_B", "(g _A)"), Err(Error::InvalidConstraint));
        let subs = [constraint("_A", "x")?, constraint("_B", "y")?];
        let c = c.after_substituting(&subs)?;
        assert_eq!(c.complexity(), Complexity::Success);
        assert_eq!(c.after_substituting(&[c.clone()]), Err(Error::NotApplicable));
        Ok(())
    }

    #[test]
    fn parameter_values() -> Result<(), Error> {
        let prepare = |s| -> Result<_, Error> { Ok(debruijn::encode(&Expr::parse(s)?).without_bindings()) };
        let target = prepare("(∀ r , (P r))")?;
        let param = target.child(2).ok_or(Error::ParamNotSymbol)?;
        assert!(param.get_symb().map_or(false, |s| s.is_param()));

        let c = Constraint::new(Expr::meta("x"), param)?;
        assert_eq!(c.instantiation().map(|(_, v)| v), Some(Expr::symb("r")));
        assert_eq!(c.applied_to(&Expr::parse("(Q _x)")?)?, Expr::parse("(Q r)")?);

        // the instantiated binding still matches the binding it stems from
        let pattern = c.applied_to(&prepare("(∀ _x , (P _x))")?)?;
        assert_eq!(Constraint::new(pattern, target.clone())?.complexity(), Complexity::Success);
        let c = Constraint::new(Expr::meta("x"), Expr::symb("s"))?;
        let pattern = c.applied_to(&prepare("(∀ _x , (P _x))")?)?;
        assert_eq!(Constraint::new(pattern, target)?.complexity(), Complexity::Failure);
        Ok(())
    }

    #[test]
    fn transform() -> Result<(), Error> {
        let c = constraint("(∀ _x , (@ _P _x))", "(∀ y , (@ Q y))")?;
        let encoded = c.debruijn_encode();
        assert_eq!(encoded.to_string(), "((∀ _x , (@ _P β0.0)),(∀ y , (@ Q β0.0)))");
        assert_eq!(encoded.debruijn_decode(), c);

        let removed = encoded.remove_bindings();
        let p = "(@binding ∀ _x (@ _P β0.0))";
        assert_eq!(removed.pattern.to_string(), p);
        assert_eq!(removed.complexity(), Complexity::Children);
        Ok(())
    }
}
