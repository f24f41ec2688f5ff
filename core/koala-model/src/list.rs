//! Fixed-length, read-only sequence shared by every aggregate of the model.

use std::fmt;
use std::ops::{Deref, Index};
use std::rc::Rc;

/// Ordered items frozen at construction. Equality is element-wise, in order.
#[derive(Clone)]
pub struct ImmutableList<T> {
    items: Box<[T]>,
}

impl<T> ImmutableList<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self {
            items: items.into_boxed_slice(),
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    /// Index access; negative positions count from the end (`-1` is the last item).
    pub fn at(&self, index: isize) -> Option<&T> {
        let position = if index < 0 {
            self.items.len().checked_sub(index.unsigned_abs())?
        } else {
            index as usize
        };
        self.items.get(position)
    }

    pub fn find(&self, predicate: impl FnMut(&&T) -> bool) -> Option<&T> {
        self.items.iter().find(predicate)
    }

    pub fn find_index(&self, predicate: impl FnMut(&T) -> bool) -> Option<usize> {
        self.items.iter().position(predicate)
    }

    pub fn find_last_index(&self, predicate: impl FnMut(&T) -> bool) -> Option<usize> {
        self.items.iter().rposition(predicate)
    }

    pub fn every(&self, predicate: impl FnMut(&T) -> bool) -> bool {
        self.items.iter().all(predicate)
    }

    pub fn some(&self, predicate: impl FnMut(&T) -> bool) -> bool {
        self.items.iter().any(predicate)
    }

    pub fn for_each(&self, f: impl FnMut(&T)) {
        self.items.iter().for_each(f)
    }

    pub fn map<U>(&self, f: impl FnMut(&T) -> U) -> Vec<U> {
        self.items.iter().map(f).collect()
    }

    pub fn filter(&self, mut predicate: impl FnMut(&T) -> bool) -> Vec<&T> {
        self.items.iter().filter(|item| predicate(item)).collect()
    }

    pub fn fold<B>(&self, init: B, f: impl FnMut(B, &T) -> B) -> B {
        self.items.iter().fold(init, f)
    }

    pub fn fold_right<B>(&self, init: B, f: impl FnMut(B, &T) -> B) -> B {
        self.items.iter().rev().fold(init, f)
    }

    /// Sub-range with the usual negative-offset convention; out of range bounds clamp.
    pub fn slice(&self, start: isize, end: Option<isize>) -> &[T] {
        let len = self.items.len();
        let clamp = |offset: isize| -> usize {
            if offset < 0 {
                len.saturating_sub(offset.unsigned_abs())
            } else {
                (offset as usize).min(len)
            }
        };

        let start = clamp(start);
        let end = end.map(clamp).unwrap_or(len);
        if start >= end {
            &[]
        } else {
            &self.items[start..end]
        }
    }
}

impl<T: PartialEq> ImmutableList<T> {
    pub fn index_of_value(&self, value: &T) -> Option<usize> {
        self.items.iter().position(|item| item == value)
    }

    pub fn last_index_of_value(&self, value: &T) -> Option<usize> {
        self.items.iter().rposition(|item| item == value)
    }

    pub fn includes_value(&self, value: &T) -> bool {
        self.index_of_value(value).is_some()
    }
}

/// Identity lookups: shared items are compared by pointer, not by value.
impl<T> ImmutableList<Rc<T>> {
    pub fn index_of(&self, item: &Rc<T>) -> Option<usize> {
        self.items.iter().position(|other| Rc::ptr_eq(other, item))
    }

    pub fn last_index_of(&self, item: &Rc<T>) -> Option<usize> {
        self.items.iter().rposition(|other| Rc::ptr_eq(other, item))
    }

    pub fn includes(&self, item: &Rc<T>) -> bool {
        self.index_of(item).is_some()
    }

    /// Same objects in the same order.
    pub fn same_items(&self, other: &[Rc<T>]) -> bool {
        self.items.len() == other.len()
            && self.items.iter().zip(other).all(|(a, b)| Rc::ptr_eq(a, b))
    }
}

impl<T> Deref for ImmutableList<T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        &self.items
    }
}

impl<T> Index<usize> for ImmutableList<T> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        &self.items[index]
    }
}

impl<T> Default for ImmutableList<T> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<T> From<Vec<T>> for ImmutableList<T> {
    fn from(items: Vec<T>) -> Self {
        Self::new(items)
    }
}

impl<T> FromIterator<T> for ImmutableList<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<T> IntoIterator for ImmutableList<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_vec().into_iter()
    }
}

impl<'a, T> IntoIterator for &'a ImmutableList<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl<T: PartialEq> PartialEq for ImmutableList<T> {
    fn eq(&self, other: &Self) -> bool {
        self.items.len() == other.items.len()
            && self.items.iter().zip(other.items.iter()).all(|(a, b)| a == b)
    }
}

impl<T: fmt::Debug> fmt::Debug for ImmutableList<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.items.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_identity_versus_value() {
        let a = Rc::new(1);
        let b = Rc::new(1);
        let list = ImmutableList::new(vec![Rc::clone(&a), Rc::clone(&a)]);

        assert_eq!(list.index_of(&a), Some(0));
        assert_eq!(list.last_index_of(&a), Some(1));
        assert!(!list.includes(&b));
        assert!(list.includes_value(&b));
        assert!(list.same_items(&[Rc::clone(&a), a]));
    }

    #[test]
    fn test_slice_bounds() {
        let list: ImmutableList<u8> = vec![0, 1, 2, 3, 4].into();

        assert_eq!(list.slice(1, Some(3)), &[1, 2]);
        assert_eq!(list.slice(-2, None), &[3, 4]);
        assert_eq!(list.slice(3, Some(1)), &[] as &[u8]);
        assert_eq!(list.slice(-10, Some(100)), &[0, 1, 2, 3, 4]);
    }

    proptest! {
        #[test]
        fn test_length_is_fixed(items in proptest::collection::vec(any::<i32>(), 0..32)) {
            let list = ImmutableList::new(items.clone());
            prop_assert_eq!(list.len(), items.len());
            let _ = list.map(|x| x.wrapping_mul(2));
            let _ = list.filter(|x| *x > 0);
            prop_assert_eq!(list.len(), items.len());
        }

        #[test]
        fn test_negative_index(items in proptest::collection::vec(any::<i32>(), 1..32), back in 1usize..32) {
            let list = ImmutableList::new(items.clone());
            let expected = items.len().checked_sub(back).map(|i| items[i]);
            prop_assert_eq!(list.at(-(back as isize)).copied(), expected);
        }

        #[test]
        fn test_search_agrees(items in proptest::collection::vec(0i32..5, 0..32), needle in 0i32..5) {
            let list = ImmutableList::new(items.clone());
            prop_assert_eq!(list.find_index(|x| *x == needle), items.iter().position(|x| *x == needle));
            prop_assert_eq!(list.find_last_index(|x| *x == needle), list.last_index_of_value(&needle));
            prop_assert_eq!(list.some(|x| *x == needle), list.includes_value(&needle));
            prop_assert_eq!(list.every(|x| *x == needle), !list.some(|x| *x != needle));
        }

        #[test]
        fn test_fold_right_is_reversed(items in proptest::collection::vec(0u8..10, 0..16)) {
            let list = ImmutableList::new(items.clone());
            let forward = list.fold(Vec::new(), |mut acc, x| { acc.push(*x); acc });
            let mut backward = list.fold_right(Vec::new(), |mut acc, x| { acc.push(*x); acc });
            backward.reverse();
            prop_assert_eq!(forward, backward);
        }
    }
}
