//! Metavariables.
//!
//! A metavariable is a [`Symbol`] of kind [`Kind::Meta`].
//! In the textual syntax, metavariables are prefixed with an underscore,
//! such as `_P` in `(@ _P _x)`.

use crate::symbol::Kind;
use crate::{Expr, Symbol};
use alloc::collections::BTreeSet;
use alloc::string::{String, ToString};

impl Symbol {
    /// Return the same symbol as metavariable.
    pub fn into_meta(self) -> Self {
        self.into_kind(Kind::Meta)
    }
}

impl Expr {
    /// Return true if the expression is a lone metavariable.
    pub fn is_meta(&self) -> bool {
        matches!(self, Self::Symb(s) if s.is_meta())
    }

    /// Return true if the expression contains a metavariable.
    pub fn has_meta(&self) -> bool {
        self.any_symb(&|s| s.is_meta())
    }

    /// Return the names of all metavariables in the expression.
    pub fn metas(&self) -> BTreeSet<String> {
        let mut metas = BTreeSet::new();
        self.for_each_symb(&mut |s| {
            if s.is_meta() {
                metas.insert(s.text.to_string());
            }
        });
        metas
    }

    /// Turn every symbol with one of the given names into a metavariable.
    pub fn with_metas(&self, names: &[&str]) -> Self {
        self.map_symbs(&|s| {
            if s.kind == Kind::Const && names.contains(&&*s.text) {
                s.clone().into_meta()
            } else {
                s.clone()
            }
        })
    }
}

#[test]
fn metas() -> Result<(), crate::Error> {
    let e = Expr::parse("(this (is an example example) (with example))")?;
    assert!(!e.has_meta());
    let e = e.with_metas(&["example", "this"]);
    assert!(e.has_meta());
    assert!(!e.is_meta());
    let metas: alloc::vec::Vec<_> = e.metas().into_iter().collect();
    assert_eq!(metas, ["example", "this"]);
    assert!(Expr::meta("x").is_meta());
    Ok(())
}
