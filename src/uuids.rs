//! Typed Uuids

use std::{
    cmp::Ordering,
    fmt::{Debug, Display, Formatter, Result as FmtResult},
    hash::{Hash, Hasher},
    marker::PhantomData,
    str::FromStr,
};

use serde::{Deserialize, Deserializer};
use uuid::Uuid;

/// A [`Uuid`] tagged with the entity it identifies, so a store id cannot be
/// passed where an order id is expected.
pub struct TypedUuid<T>(Uuid, PhantomData<T>);

impl<T> TypedUuid<T> {
    /// Wrap an existing uuid.
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid, PhantomData)
    }

    /// Generate a new random id.
    #[must_use]
    pub fn new_v4() -> Self {
        Self::from_uuid(Uuid::new_v4())
    }

    /// Unwrap into the underlying uuid.
    #[must_use]
    pub const fn into_uuid(self) -> Uuid {
        self.0
    }
}

impl<T> Clone for TypedUuid<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for TypedUuid<T> {}

impl<T> Debug for TypedUuid<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        Debug::fmt(&self.0, f)
    }
}

impl<T> Display for TypedUuid<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        Display::fmt(&self.0, f)
    }
}

impl<T> PartialEq for TypedUuid<T> {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl<T> Eq for TypedUuid<T> {}

impl<T> Hash for TypedUuid<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}

impl<T> PartialOrd for TypedUuid<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for TypedUuid<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.cmp(&other.0)
    }
}

impl<T> From<Uuid> for TypedUuid<T> {
    fn from(uuid: Uuid) -> Self {
        Self::from_uuid(uuid)
    }
}

impl<T> FromStr for TypedUuid<T> {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self::from_uuid)
    }
}

impl<'de, T> Deserialize<'de> for TypedUuid<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Uuid::deserialize(deserializer).map(Self::from_uuid)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use testresult::TestResult;

    use super::*;

    #[derive(Debug)]
    struct Marker;

    #[test]
    fn parses_and_displays_hyphenated_form() -> TestResult {
        let raw = "6f1c2a3e-9a5b-4c1d-8e2f-0a1b2c3d4e5f";
        let id: TypedUuid<Marker> = raw.parse()?;

        assert_eq!(id.to_string(), raw);
        assert_eq!(id.into_uuid(), Uuid::parse_str(raw)?);

        Ok(())
    }

    #[test]
    fn equal_ids_hash_together() {
        let id = TypedUuid::<Marker>::new_v4();
        let copy = id;

        let set: HashSet<_> = [id, copy].into_iter().collect();

        assert_eq!(set.len(), 1);
    }

    #[test]
    fn deserializes_from_yaml_string() -> TestResult {
        let id: TypedUuid<Marker> =
            serde_norway::from_str("\"6f1c2a3e-9a5b-4c1d-8e2f-0a1b2c3d4e5f\"")?;

        assert_eq!(id.to_string(), "6f1c2a3e-9a5b-4c1d-8e2f-0a1b2c3d4e5f");

        Ok(())
    }
}
