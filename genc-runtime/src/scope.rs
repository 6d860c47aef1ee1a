use crate::executor_value::ExecutorValue;
use arcstr::ArcStr;
use triomphe::Arc;

/// An immutable, persistent linked stack of `(name, executor-value)`
/// bindings. Scopes are cheap to share: a lambda captures the `Scope` Arc
/// active at its evaluation site, and many lambdas may alias the same
/// parent frame. Lookups walk parent links innermost-first, so a nested
/// binding shadows an outer one of the same name.
#[derive(Clone)]
pub struct Scope {
    frame: Option<Arc<Frame>>,
}

struct Frame {
    name: ArcStr,
    value: ExecutorValue,
    parent: Scope,
}

impl Scope {
    pub fn empty() -> Self {
        Scope { frame: None }
    }

    /// Returns a new scope extending `self` with one more binding. `self`
    /// is untouched; existing handles to it remain valid, which is what
    /// lets many lambdas capture the same parent.
    pub fn bind(&self, name: impl Into<ArcStr>, value: ExecutorValue) -> Scope {
        Scope { frame: Some(Arc::new(Frame { name: name.into(), value, parent: self.clone() })) }
    }

    pub fn lookup(&self, name: &str) -> Option<&ExecutorValue> {
        let mut cursor = self;
        loop {
            match &cursor.frame {
                None => return None,
                Some(frame) => {
                    if frame.name.as_str() == name {
                        return Some(&frame.value);
                    }
                    cursor = &frame.parent;
                }
            }
        }
    }

    /// Names bound at or above this scope, innermost first. Used only for
    /// diagnosable `NotFound` error messages on reference lookup failure.
    pub fn bound_names(&self) -> Vec<ArcStr> {
        let mut names = Vec::new();
        let mut cursor = self;
        while let Some(frame) = &cursor.frame {
            names.push(frame.name.clone());
            cursor = &frame.parent;
        }
        names
    }
}

impl Default for Scope {
    fn default() -> Self {
        Scope::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor_value::ExecutorValue;

    fn dummy(tag: usize) -> ExecutorValue {
        ExecutorValue::Structure(vec![ExecutorValue::Structure(vec![]); tag])
    }

    fn tag_of(v: &ExecutorValue) -> usize {
        match v {
            ExecutorValue::Structure(fields) => fields.len(),
            _ => panic!("expected a Structure test value"),
        }
    }

    #[test]
    fn lookup_finds_innermost_binding() {
        let outer = Scope::empty().bind("x", dummy(1));
        let inner = outer.bind("x", dummy(2));
        assert_eq!(tag_of(inner.lookup("x").unwrap()), 2);
        assert_eq!(tag_of(outer.lookup("x").unwrap()), 1);
    }

    #[test]
    fn lookup_walks_to_parent_for_unshadowed_name() {
        let outer = Scope::empty().bind("x", dummy(1));
        let inner = outer.bind("y", dummy(2));
        assert_eq!(tag_of(inner.lookup("x").unwrap()), 1);
        assert_eq!(tag_of(inner.lookup("y").unwrap()), 2);
    }

    #[test]
    fn lookup_missing_name_is_none() {
        let scope = Scope::empty().bind("x", dummy(1));
        assert!(scope.lookup("z").is_none());
    }

    #[test]
    fn bound_names_lists_innermost_first() {
        let scope = Scope::empty().bind("a", dummy(1)).bind("b", dummy(2));
        assert_eq!(scope.bound_names(), vec![ArcStr::from("b"), ArcStr::from("a")]);
    }
}
