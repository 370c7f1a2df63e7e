//! Memoized value with an explicit "not computed" state.

#[derive(Debug, Clone, Default, PartialEq)]
pub enum Cached<T> {
    #[default]
    Uncomputed,
    Computed(T),
}

impl<T> Cached<T> {
    pub fn is_computed(&self) -> bool {
        matches!(self, Cached::Computed(_))
    }

    pub fn get(&self) -> Option<&T> {
        match self {
            Cached::Computed(v) => Some(v),
            Cached::Uncomputed => None,
        }
    }

    /// Value, computing and storing it first if needed.
    pub fn get_or_insert_with(&mut self, f: impl FnOnce() -> T) -> &T {
        if let Cached::Uncomputed = self {
            *self = Cached::Computed(f());
        }
        match self {
            Cached::Computed(v) => v,
            Cached::Uncomputed => unreachable!("value stored above"),
        }
    }

    /// Fallible variant; nothing is stored on error.
    pub fn get_or_try_insert_with<E>(&mut self, f: impl FnOnce() -> Result<T, E>) -> Result<&T, E> {
        if let Cached::Uncomputed = self {
            *self = Cached::Computed(f()?);
        }
        match self {
            Cached::Computed(v) => Ok(v),
            Cached::Uncomputed => unreachable!("value stored above"),
        }
    }

    pub fn invalidate(&mut self) {
        *self = Cached::Uncomputed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn computes_once() {
        let mut calls = 0;
        let mut c = Cached::default();
        assert!(!c.is_computed());
        assert_eq!(*c.get_or_insert_with(|| { calls += 1; 7 }), 7);
        assert_eq!(*c.get_or_insert_with(|| { calls += 1; 8 }), 7);
        assert_eq!(calls, 1);
        c.invalidate();
        assert_eq!(c.get(), None);
    }

    #[test]
    fn errors_leave_uncomputed() {
        let mut c: Cached<i32> = Cached::Uncomputed;
        let r: Result<&i32, &str> = c.get_or_try_insert_with(|| Err("boom"));
        assert!(r.is_err());
        assert!(!c.is_computed());
        assert_eq!(c.get_or_try_insert_with::<&str>(|| Ok(3)), Ok(&3));
    }
}
