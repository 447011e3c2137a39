//! Shared storage for committed field values.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use parking_lot::RwLock;

/// A handle to a value a field commits into.
///
/// The application keeps one clone and hands another to the field. The field
/// writes only at its commit points (blur, advance, retreat); the application
/// reads whenever it likes.
///
/// # Example
///
/// ```rust
/// use quire::{Bound, MultiSelect, new_options};
///
/// let toppings = Bound::new(Vec::<String>::new());
/// let field = MultiSelect::new()
///     .options(new_options(["Lettuce", "Tomato"]))
///     .value(toppings.clone());
/// # drop(field);
/// assert!(toppings.get().is_empty());
/// ```
pub struct Bound<T>(Arc<RwLock<T>>);

impl<T> Bound<T> {
    /// Wraps an initial value.
    pub fn new(value: T) -> Self {
        Self(Arc::new(RwLock::new(value)))
    }

    /// Replaces the stored value.
    pub fn set(&self, value: T) {
        *self.0.write() = value;
    }

    /// Runs `f` with a reference to the stored value.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.0.read())
    }
}

impl<T: Clone> Bound<T> {
    /// Returns a copy of the stored value.
    pub fn get(&self) -> T {
        self.0.read().clone()
    }
}

impl<T> Clone for Bound<T> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<T: Default> Default for Bound<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

/// Hashes the current contents, so a handle can serve as deferred-evaluation
/// bindings that track live state.
impl<T: Hash> Hash for Bound<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.read().hash(state);
    }
}

impl<T: fmt::Debug> fmt::Debug for Bound<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Bound").field(&*self.0.read()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_storage() {
        let a = Bound::new(1);
        let b = a.clone();
        b.set(7);
        assert_eq!(a.get(), 7);
        assert_eq!(a.with(|v| v + 1), 8);
    }
}
