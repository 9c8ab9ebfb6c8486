//! Index-stable arenas for the compiler.
//!
//! Syntax nodes, symbols and types all live in vector-backed arenas and are
//! referred to by small newtype ids. The id doubles as the identity of the
//! stored object, so caches can key on it directly.

use std::marker::PhantomData;
use std::ops::{Index, IndexMut};

/// A newtype that can index an [`IndexVec`].
pub trait Idx: Copy + Eq {
    fn new(raw: u32) -> Self;
    fn index(self) -> usize;
}

/// Define a `u32` id newtype implementing [`Idx`].
///
/// ```
/// adl_core::define_idx! {
///     /// Identifies a widget.
///     pub struct WidgetId;
/// }
/// use adl_core::Idx;
/// assert_eq!(WidgetId::new(3).index(), 3);
/// ```
#[macro_export]
macro_rules! define_idx {
    ($(#[$meta:meta])* $vis:vis struct $name:ident;) => {
        $(#[$meta])*
        #[derive(Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
        $vis struct $name(pub u32);

        impl $crate::arena::Idx for $name {
            #[inline]
            fn new(raw: u32) -> Self {
                Self(raw)
            }

            #[inline]
            fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl std::fmt::Debug for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }
    };
}

/// A `Vec` indexed by a newtype id. Entries are never removed, so an id stays
/// valid for the lifetime of the arena.
#[derive(Debug, Clone)]
pub struct IndexVec<I: Idx, T> {
    raw: Vec<T>,
    _marker: PhantomData<fn(I) -> I>,
}

impl<I: Idx, T> IndexVec<I, T> {
    pub fn new() -> Self {
        Self {
            raw: Vec::new(),
            _marker: PhantomData,
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            raw: Vec::with_capacity(capacity),
            _marker: PhantomData,
        }
    }

    /// Push a value and return its id.
    pub fn push(&mut self, value: T) -> I {
        let id = self.next_idx();
        self.raw.push(value);
        id
    }

    /// The id the next pushed value will receive.
    pub fn next_idx(&self) -> I {
        I::new(self.raw.len() as u32)
    }

    pub fn get(&self, id: I) -> Option<&T> {
        self.raw.get(id.index())
    }

    pub fn get_mut(&mut self, id: I) -> Option<&mut T> {
        self.raw.get_mut(id.index())
    }

    pub fn len(&self) -> usize {
        self.raw.len()
    }

    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.raw.iter()
    }

    pub fn iter_enumerated(&self) -> impl Iterator<Item = (I, &T)> {
        self.raw
            .iter()
            .enumerate()
            .map(|(i, v)| (I::new(i as u32), v))
    }
}

impl<I: Idx, T> Default for IndexVec<I, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I: Idx, T> Index<I> for IndexVec<I, T> {
    type Output = T;

    #[inline]
    fn index(&self, id: I) -> &T {
        &self.raw[id.index()]
    }
}

impl<I: Idx, T> IndexMut<I> for IndexVec<I, T> {
    #[inline]
    fn index_mut(&mut self, id: I) -> &mut T {
        &mut self.raw[id.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    define_idx! {
        struct TestId;
    }

    #[test]
    fn test_push_returns_sequential_ids() {
        let mut vec: IndexVec<TestId, &str> = IndexVec::new();
        let a = vec.push("a");
        let b = vec.push("b");
        assert_eq!(a, TestId(0));
        assert_eq!(b, TestId(1));
        assert_eq!(vec[b], "b");
        assert_eq!(vec.next_idx(), TestId(2));
    }

    #[test]
    fn test_index_mut() {
        let mut vec: IndexVec<TestId, u32> = IndexVec::new();
        let id = vec.push(1);
        vec[id] += 41;
        assert_eq!(vec.get(id), Some(&42));
        assert!(vec.get(TestId(7)).is_none());
    }

    #[test]
    fn test_iter_enumerated() {
        let mut vec: IndexVec<TestId, char> = IndexVec::new();
        vec.push('x');
        vec.push('y');
        let pairs: Vec<_> = vec.iter_enumerated().map(|(id, c)| (id.0, *c)).collect();
        assert_eq!(pairs, vec![(0, 'x'), (1, 'y')]);
    }

    #[test]
    fn test_debug_format() {
        assert_eq!(format!("{:?}", TestId(5)), "TestId(5)");
    }
}
