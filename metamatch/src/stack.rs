//! Scopes of bound parameters, innermost first.

use alloc::vec::Vec;

/// A `Vec` that is iterated from the last to the first pushed element.
///
/// The nth element of a `Stack` is the nth-*last* pushed element.
/// This is convenient when dealing with de Bruijn indices:
/// when the stack holds the parameters of the enclosing bindings,
/// the nth element holds the parameters of the binding
/// that is n bindings away from the current position.
#[derive(Clone, Debug)]
pub struct Stack<A>(Vec<A>);

impl<A> Stack<A> {
    /// Create an empty stack.
    pub fn new() -> Self {
        Default::default()
    }

    /// Return the number of elements on the stack.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Return true if the stack contains no elements.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Obtain the nth element counted from the top of the stack.
    pub fn get(&self, n: usize) -> Option<&A> {
        self.iter().nth(n)
    }

    /// Push an element on the stack, run a function on it, then pop the element.
    ///
    /// This is to simulate function calls like `f(Cons(x, l))`,
    /// which assume that `l` is not changed in this call.
    pub fn with_pushed<F, Y>(&mut self, x: A, f: F) -> Y
    where
        F: FnOnce(&mut Stack<A>) -> Y,
    {
        self.0.push(x);
        let y = f(self);
        self.0.pop();
        y
    }

    /// Find the topmost element for which the function yields a value.
    ///
    /// Return the position of the element counted from the top and the value.
    pub fn find_map<Y>(&self, f: impl Fn(&A) -> Option<Y>) -> Option<(usize, Y)> {
        self.iter().enumerate().find_map(|(i, x)| Some((i, f(x)?)))
    }

    /// Iterate through the elements of the stack starting from the top.
    pub fn iter(&self) -> impl Iterator<Item = &A> {
        self.0.iter().rev()
    }
}

impl<A> Default for Stack<A> {
    fn default() -> Self {
        Self(Vec::new())
    }
}

#[test]
fn scope() {
    let mut st: Stack<&str> = Stack::new();
    let found = st.with_pushed("x", |st| {
        st.with_pushed("y", |st| (st.get(0).copied(), st.find_map(|v| (*v == "x").then(|| 1))))
    });
    assert_eq!(found, (Some("y"), Some((1, 1))));
    assert!(st.is_empty());
}
