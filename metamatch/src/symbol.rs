//! Atomic symbols.

use crate::Attrs;
use alloc::rc::Rc;
use alloc::string::String;
use core::fmt::{self, Display};

/// Head of an expression function, such as `(@ x , (f x))`.
pub const EF: &str = "@lambda";
/// First child of an expression function application, such as `(@ P x)`.
pub const EFA: &str = "@apply";
/// First child of a binding that was turned into an application.
pub const BINDING: &str = "@binding";

/// Role of a symbol.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Kind {
    /// ordinary symbol, identified by its text
    Const,
    /// placeholder that may be instantiated by matching
    Meta,
    /// de Bruijn-encoded parameter slot of a binding
    ///
    /// The text of such a symbol is only a hint for decoding;
    /// two parameter slots are equal regardless of their texts.
    Param,
}

/// Atomic expression.
#[derive(Clone, Debug)]
pub struct Symbol {
    pub text: Rc<str>,
    pub kind: Kind,
    pub attrs: Attrs,
}

impl Symbol {
    /// Create an ordinary symbol.
    pub fn new(text: &str) -> Self {
        Self::with_kind(text, Kind::Const)
    }

    /// Create a metavariable.
    pub fn meta(text: &str) -> Self {
        Self::with_kind(text, Kind::Meta)
    }

    pub fn with_kind(text: &str, kind: Kind) -> Self {
        let text = Rc::from(text);
        let attrs = Attrs::new();
        Self { text, kind, attrs }
    }

    /// Return the same symbol with a different kind.
    pub fn into_kind(self, kind: Kind) -> Self {
        Self { kind, ..self }
    }

    pub fn with_attr(mut self, key: &str, value: &str) -> Self {
        self.attrs.insert(String::from(key), String::from(value));
        self
    }

    pub fn is_meta(&self) -> bool {
        self.kind == Kind::Meta
    }

    pub fn is_param(&self) -> bool {
        self.kind == Kind::Param
    }

    /// Return true if the symbol is one of the reserved markers
    /// [`EF`], [`EFA`], or [`BINDING`].
    pub fn is_marker(&self) -> bool {
        self.kind == Kind::Const && [EF, EFA, BINDING].contains(&&*self.text)
    }

    /// Return true if the symbol is the given reserved marker.
    pub fn is(&self, marker: &str) -> bool {
        self.kind == Kind::Const && &*self.text == marker
    }

    /// Return true if both symbols have the same name and kind.
    ///
    /// Unlike equality, this disregards attributes.
    pub fn same_name(&self, other: &Self) -> bool {
        self.kind == other.kind && self.text == other.text
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.text, &other.text)
            && self.kind == other.kind
            && self.attrs.ptr_eq(&other.attrs)
    }
}

impl PartialEq for Symbol {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
            && (self.kind == Kind::Param || self.text == other.text)
            && self.attrs == other.attrs
    }
}

impl Eq for Symbol {}

/// Return true if the text has to be quoted to be read back.
fn needs_quotes(s: &str) -> bool {
    s.is_empty()
        || s.starts_with("//")
        || s.chars().any(|c| c.is_whitespace() || "(){}[],:\"".contains(c))
}

impl Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.is(EF) || self.is(EFA) {
            return write!(f, "@");
        }
        if self.is_meta() {
            write!(f, "_")?;
        }
        if needs_quotes(&self.text) {
            write!(f, "\"{}\"", self.text)
        } else {
            write!(f, "{}", self.text)
        }
    }
}
