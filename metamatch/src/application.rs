use crate::symbol::BINDING;
use crate::{Attrs, Expr};
use alloc::vec::Vec;
use core::fmt::{self, Display};

/// Application, consisting of an operator followed by its operands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Appl {
    pub args: Vec<Expr>,
    pub attrs: Attrs,
}

impl Appl {
    /// Return true if the application was obtained from
    /// a binding by [`Expr::without_bindings`].
    ///
    /// The last argument of such an application is
    /// in the scope of the binding.
    pub fn is_binding(&self) -> bool {
        self.args.len() >= 4 && matches!(&self.args[0], Expr::Symb(s) if s.is(BINDING))
    }
}

pub fn format<T: Display>(args: &[T], f: &mut fmt::Formatter) -> fmt::Result {
    write!(f, "(")?;
    let mut iter = args.iter();
    if let Some(head) = iter.next() {
        write!(f, "{}", head)?;
    }
    for t in iter {
        write!(f, " {}", t)?;
    }
    write!(f, ")")
}
