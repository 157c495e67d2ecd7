//! # Ordered Child Collection
//!
//! An insertion-ordered container of uniquely keyed members, used for
//! blocks-within-a-region and regions-within-a-layout.
//!
//! Guarantees:
//! - unique key per member
//! - iteration in insertion order, as modified by shifts and moves
//! - O(1) key lookup
//! - `shift` swaps a member with its immediate neighbor, no-op at either
//!   boundary

use serde::de::{SeqAccess, Visitor};
use serde::ser::SerializeSeq;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

/// A member that can live in an [`OrderedSet`].
pub trait Keyed {
    /// Stable identity within the collection (Block uuid, Region name).
    fn key(&self) -> &str;
}

/// Direction for adjacent-swap moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CollectionError {
    #[error("Member not found: {0}")]
    NotFound(String),

    #[error("Duplicate key: {0}")]
    DuplicateKey(String),
}

/// Ordered, uniquely-keyed collection of entities.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderedSet<T> {
    members: Vec<T>,
    index: HashMap<String, usize>,
}

impl<T: Keyed> OrderedSet<T> {
    pub fn new() -> Self {
        Self {
            members: Vec::new(),
            index: HashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    /// Position of a member in iteration order.
    pub fn position(&self, key: &str) -> Option<usize> {
        self.index.get(key).copied()
    }

    pub fn get(&self, key: &str) -> Option<&T> {
        self.position(key).map(|i| &self.members[i])
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut T> {
        let i = self.position(key)?;
        Some(&mut self.members[i])
    }

    pub fn at(&self, index: usize) -> Option<&T> {
        self.members.get(index)
    }

    pub fn first(&self) -> Option<&T> {
        self.members.first()
    }

    pub fn first_mut(&mut self) -> Option<&mut T> {
        self.members.first_mut()
    }

    /// Append a member.
    pub fn push(&mut self, member: T) -> Result<(), CollectionError> {
        let at = self.members.len();
        self.insert_at(member, at)
    }

    /// Insert at an explicit index, clamped to the current length.
    pub fn insert_at(&mut self, member: T, index: usize) -> Result<(), CollectionError> {
        let key = member.key().to_string();
        if self.index.contains_key(&key) {
            return Err(CollectionError::DuplicateKey(key));
        }

        let at = index.min(self.members.len());
        self.members.insert(at, member);
        self.reindex(at);
        Ok(())
    }

    /// Remove a member by key and return it.
    pub fn remove(&mut self, key: &str) -> Result<T, CollectionError> {
        let at = self
            .index
            .remove(key)
            .ok_or_else(|| CollectionError::NotFound(key.to_string()))?;
        let member = self.members.remove(at);
        self.reindex(at);
        Ok(member)
    }

    /// Swap a member with its immediate neighbor.
    ///
    /// Returns `false` (collection unchanged) when the member is already
    /// at the boundary in the requested direction.
    pub fn shift(&mut self, key: &str, direction: Direction) -> Result<bool, CollectionError> {
        let at = self
            .position(key)
            .ok_or_else(|| CollectionError::NotFound(key.to_string()))?;

        let neighbor = match direction {
            Direction::Up => {
                if at == 0 {
                    return Ok(false);
                }
                at - 1
            }
            Direction::Down => {
                if at + 1 >= self.members.len() {
                    return Ok(false);
                }
                at + 1
            }
        };

        self.members.swap(at, neighbor);
        self.reindex(at.min(neighbor));
        Ok(true)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.members.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, T> {
        self.members.iter_mut()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.members.iter().map(|m| m.key())
    }

    // Restore key -> position mapping from `from` onward.
    fn reindex(&mut self, from: usize) {
        for (i, member) in self.members.iter().enumerate().skip(from) {
            self.index.insert(member.key().to_string(), i);
        }
    }
}

impl<T: Keyed> Default for OrderedSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Keyed> FromIterator<T> for OrderedSet<T> {
    /// Collects members in order; later duplicates are dropped.
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut set = Self::new();
        for member in iter {
            let _ = set.push(member);
        }
        set
    }
}

impl<T: Keyed> IntoIterator for OrderedSet<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.members.into_iter()
    }
}

impl<'a, T: Keyed> IntoIterator for &'a OrderedSet<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.members.iter()
    }
}

impl<T: Keyed + Serialize> Serialize for OrderedSet<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.members.len()))?;
        for member in &self.members {
            seq.serialize_element(member)?;
        }
        seq.end()
    }
}

impl<'de, T: Keyed + Deserialize<'de>> Deserialize<'de> for OrderedSet<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct SetVisitor<T>(std::marker::PhantomData<T>);

        impl<'de, T: Keyed + Deserialize<'de>> Visitor<'de> for SetVisitor<T> {
            type Value = OrderedSet<T>;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a sequence of uniquely keyed members")
            }

            fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
                let mut set = OrderedSet::new();
                while let Some(member) = seq.next_element::<T>()? {
                    set.push(member)
                        .map_err(|e| serde::de::Error::custom(e.to_string()))?;
                }
                Ok(set)
            }
        }

        deserializer.deserialize_seq(SetVisitor(std::marker::PhantomData))
    }
}
