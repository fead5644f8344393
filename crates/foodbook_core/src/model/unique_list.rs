//! Ordered collection that rejects identity collisions.
//!
//! # Responsibility
//! - Give clients and deliveries one shared duplicate/not-found contract.
//! - Keep insertion order stable across replace operations.
//!
//! # Invariants
//! - No two elements share an identity (`Identified::identity`).
//! - Identity is separate from full equality: two entities may be "the same"
//!   while differing in other attributes.
//! - Failed operations leave the collection untouched.

use crate::model::error::{EntityKind, ModelError, ModelResult};
use std::fmt::Display;

/// Identity contract for entities stored in a `UniqueEntityList`.
pub trait Identified {
    /// Minimal key deciding whether two entities are the same object.
    type Key: PartialEq + Display;

    /// Collection tag used in error reports.
    const KIND: EntityKind;

    fn identity(&self) -> &Self::Key;

    fn is_same_identity(&self, other: &Self) -> bool {
        self.identity() == other.identity()
    }
}

/// Insertion-ordered list with identity uniqueness.
///
/// Reads go through `as_slice`/`iter`, which borrow immutably, so callers can
/// never mutate the backing sequence behind the list's checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniqueEntityList<T> {
    items: Vec<T>,
}

impl<T> Default for UniqueEntityList<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T: Identified> UniqueEntityList<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true when an element with the same identity exists.
    pub fn contains(&self, item: &T) -> bool {
        self.contains_key(item.identity())
    }

    pub fn contains_key(&self, key: &T::Key) -> bool {
        self.position_of(key).is_some()
    }

    /// Looks up one element by identity key.
    pub fn get(&self, key: &T::Key) -> Option<&T> {
        self.items.iter().find(|item| item.identity() == key)
    }

    /// Appends `item` unless its identity is already present.
    pub fn add(&mut self, item: T) -> ModelResult<()> {
        if self.contains(&item) {
            return Err(ModelError::duplicate(T::KIND, item.identity()));
        }
        self.items.push(item);
        Ok(())
    }

    /// Substitutes `target` with `replacement` at the same position.
    ///
    /// # Errors
    /// - `NotFound` when `target` identity is absent.
    /// - `DuplicateIdentity` when `replacement` changes identity onto one
    ///   already held by another element.
    pub fn replace(&mut self, target: &T, replacement: T) -> ModelResult<()> {
        let index = self
            .position_of(target.identity())
            .ok_or_else(|| ModelError::not_found(T::KIND, target.identity()))?;

        if !target.is_same_identity(&replacement) && self.contains(&replacement) {
            return Err(ModelError::duplicate(T::KIND, replacement.identity()));
        }

        self.items[index] = replacement;
        Ok(())
    }

    /// Removes the element sharing `item`'s identity and returns it.
    pub fn remove(&mut self, item: &T) -> ModelResult<T> {
        let index = self
            .position_of(item.identity())
            .ok_or_else(|| ModelError::not_found(T::KIND, item.identity()))?;
        Ok(self.items.remove(index))
    }

    /// Replaces the whole backing sequence after a pairwise uniqueness check.
    pub fn replace_all(&mut self, items: Vec<T>) -> ModelResult<()> {
        ensure_unique(&items)?;
        self.items = items;
        Ok(())
    }

    /// Removes every element matching `predicate`, keeping order of the rest.
    pub fn remove_where(&mut self, mut predicate: impl FnMut(&T) -> bool) -> Vec<T> {
        let (removed, kept): (Vec<T>, Vec<T>) =
            self.items.drain(..).partition(|item| predicate(item));
        self.items = kept;
        removed
    }

    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn position_of(&self, key: &T::Key) -> Option<usize> {
        self.items.iter().position(|item| item.identity() == key)
    }
}

impl<T: Clone> UniqueEntityList<T> {
    pub fn to_vec(&self) -> Vec<T> {
        self.items.clone()
    }
}

impl<'a, T> IntoIterator for &'a UniqueEntityList<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// Pairwise identity check; quadratic, which is fine at address-book scale.
pub(crate) fn ensure_unique<T: Identified>(items: &[T]) -> ModelResult<()> {
    for (index, item) in items.iter().enumerate() {
        if items[index + 1..]
            .iter()
            .any(|other| item.is_same_identity(other))
        {
            return Err(ModelError::duplicate(T::KIND, item.identity()));
        }
    }
    Ok(())
}
