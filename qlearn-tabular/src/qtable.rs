//! Table of action values.
use serde::{de::Deserializer, ser::Serializer, Deserialize, Serialize};
use std::{
    borrow::Borrow,
    collections::HashMap,
    hash::{Hash, Hasher},
    iter::FromIterator,
};
use xxhash_rust::xxh3::Xxh3Builder;

/// A `(state, action)` key seen through references.
///
/// Lets the table look up `(&S, &A)` against stored `(S, A)` keys without
/// cloning either half.
trait KeyPair<S, A> {
    fn state(&self) -> &S;
    fn action(&self) -> &A;
}

impl<S, A> KeyPair<S, A> for (S, A) {
    fn state(&self) -> &S {
        &self.0
    }

    fn action(&self) -> &A {
        &self.1
    }
}

impl<S, A> KeyPair<S, A> for (&S, &A) {
    fn state(&self) -> &S {
        self.0
    }

    fn action(&self) -> &A {
        self.1
    }
}

impl<'a, S: 'a, A: 'a> Borrow<dyn KeyPair<S, A> + 'a> for (S, A) {
    fn borrow(&self) -> &(dyn KeyPair<S, A> + 'a) {
        self
    }
}

// Must agree with the `Hash` impl of tuples: state first, then action.
impl<S: Hash, A: Hash> Hash for dyn KeyPair<S, A> + '_ {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.state().hash(state);
        self.action().hash(state);
    }
}

impl<S: Eq, A: Eq> PartialEq for dyn KeyPair<S, A> + '_ {
    fn eq(&self, other: &Self) -> bool {
        self.state() == other.state() && self.action() == other.action()
    }
}

impl<S: Eq, A: Eq> Eq for dyn KeyPair<S, A> + '_ {}

/// Action values keyed by `(state, action)`.
///
/// A pair that was never written reads as `0.0`. Reads never insert, and
/// entries are never removed.
#[derive(Clone, Debug)]
pub struct QTable<S, A> {
    values: HashMap<(S, A), f64, Xxh3Builder>,
}

impl<S, A> Default for QTable<S, A> {
    fn default() -> Self {
        Self {
            values: HashMap::default(),
        }
    }
}

impl<S, A> QTable<S, A>
where
    S: Eq + Hash,
    A: Eq + Hash,
{
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the value of `(state, action)`, `0.0` if it was never written.
    pub fn get(&self, state: &S, action: &A) -> f64 {
        self.values
            .get(&(state, action) as &dyn KeyPair<S, A>)
            .copied()
            .unwrap_or(0.0)
    }

    /// Returns `true` if `(state, action)` has been written.
    pub fn contains(&self, state: &S, action: &A) -> bool {
        self.values
            .contains_key(&(state, action) as &dyn KeyPair<S, A>)
    }

    /// Writes the value of `(state, action)`.
    pub fn set(&mut self, state: S, action: A, value: f64) {
        self.values.insert((state, action), value);
    }

    /// Writes the value of `(state, action)`, cloning the key only when the
    /// pair is new.
    pub fn set_ref(&mut self, state: &S, action: &A, value: f64)
    where
        S: Clone,
        A: Clone,
    {
        match self
            .values
            .get_mut(&(state, action) as &dyn KeyPair<S, A>)
        {
            Some(v) => *v = value,
            None => {
                self.values.insert((state.clone(), action.clone()), value);
            }
        }
    }
}

impl<S, A> QTable<S, A> {
    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if nothing has been written.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterates over the stored entries in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&S, &A, f64)> {
        self.values.iter().map(|((s, a), v)| (s, a, *v))
    }
}

impl<S, A> FromIterator<(S, A, f64)> for QTable<S, A>
where
    S: Eq + Hash,
    A: Eq + Hash,
{
    fn from_iter<I: IntoIterator<Item = (S, A, f64)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().map(|(s, a, v)| ((s, a), v)).collect(),
        }
    }
}

#[derive(Serialize)]
struct EntryRef<'a, S, A> {
    state: &'a S,
    action: &'a A,
    value: f64,
}

#[derive(Deserialize)]
struct Entry<S, A> {
    state: S,
    action: A,
    value: f64,
}

/// Serialized as a sequence of `{state, action, value}` entries, since
/// composite keys are not valid map keys in most formats.
impl<S, A> Serialize for QTable<S, A>
where
    S: Serialize,
    A: Serialize,
{
    fn serialize<Ser: Serializer>(&self, serializer: Ser) -> Result<Ser::Ok, Ser::Error> {
        serializer.collect_seq(self.values.iter().map(|((state, action), value)| EntryRef {
            state,
            action,
            value: *value,
        }))
    }
}

impl<'de, S, A> Deserialize<'de> for QTable<S, A>
where
    S: Deserialize<'de> + Eq + Hash,
    A: Deserialize<'de> + Eq + Hash,
{
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let entries = Vec::<Entry<S, A>>::deserialize(deserializer)?;
        Ok(entries
            .into_iter()
            .map(|e| (e.state, e.action, e.value))
            .collect())
    }
}
