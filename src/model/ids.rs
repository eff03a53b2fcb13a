// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Pageflow-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Pageflow and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::borrow::{Borrow, Cow};
use std::fmt;
use std::marker::PhantomData;
use std::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};

use schemars::{json_schema, JsonSchema, Schema, SchemaGenerator};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

/// A stable identifier used across the model, the HTTP routes and the graph projection.
///
/// Ids are opaque strings. The only enforced rule is that an id is a non-empty path segment
/// (no `/`), because ids appear inside route paths like `/api/forms/<form_id>/conditions/<id>`
/// and inside derived node ids like `condition-<id>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Id<T> {
    value: String,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Id<T> {
    pub fn new(value: impl Into<String>) -> Result<Self, IdError> {
        let value = value.into();
        validate_id_segment(&value)?;
        Ok(Self { value, _marker: PhantomData })
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }

    pub fn into_string(self) -> String {
        self.value
    }

    fn generated(value: String) -> Self {
        debug_assert!(validate_id_segment(&value).is_ok());
        Self { value, _marker: PhantomData }
    }
}

impl<T> fmt::Display for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

impl<T> AsRef<str> for Id<T> {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl<T> Borrow<str> for Id<T> {
    fn borrow(&self) -> &str {
        self.as_str()
    }
}

impl<T> FromStr for Id<T> {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s.to_owned())
    }
}

impl<T> TryFrom<String> for Id<T> {
    type Error = IdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl<T> Serialize for Id<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.value)
    }
}

impl<'de, T> Deserialize<'de> for Id<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::new(raw).map_err(de::Error::custom)
    }
}

impl<T> JsonSchema for Id<T> {
    fn inline_schema() -> bool {
        true
    }

    fn schema_name() -> Cow<'static, str> {
        Cow::Borrowed("Id")
    }

    fn json_schema(_generator: &mut SchemaGenerator) -> Schema {
        json_schema!({
            "type": "string",
            "minLength": 1,
            "pattern": "^[^/]+$"
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdError {
    #[error("id must not be empty")]
    Empty,
    #[error("id must not contain '/'")]
    ContainsSlash,
}

fn validate_id_segment(value: &str) -> Result<(), IdError> {
    if value.is_empty() {
        return Err(IdError::Empty);
    }
    if value.contains('/') {
        return Err(IdError::ContainsSlash);
    }
    Ok(())
}

/// Serde adapter for optional ids that travel as `""` when absent.
///
/// Conditions store `elementId: ""` when their source page has no elements.
pub mod blank_as_none {
    use serde::{de, Deserialize, Deserializer, Serializer};

    use super::Id;

    pub fn serialize<S, T>(id: &Option<Id<T>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(id.as_ref().map(Id::as_str).unwrap_or(""))
    }

    pub fn deserialize<'de, D, T>(deserializer: D) -> Result<Option<Id<T>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<String>::deserialize(deserializer)? {
            None => Ok(None),
            Some(raw) if raw.is_empty() => Ok(None),
            Some(raw) => Id::new(raw).map(Some).map_err(de::Error::custom),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FormIdTag {}
pub type FormId = Id<FormIdTag>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PageIdTag {}
pub type PageId = Id<PageIdTag>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ElementIdTag {}
pub type ElementId = Id<ElementIdTag>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ConditionIdTag {}
pub type ConditionId = Id<ConditionIdTag>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum IdClock {
    System,
    Sequential,
}

/// Allocates timestamp-derived ids (`<prefix>-<stamp>`).
///
/// Stamps are milliseconds since the Unix epoch, bumped so that every allocation is strictly
/// greater than the previous one. Ids are never reused by the same allocator. Once the stamp
/// reaches `u64::MAX`, ids continue as `<prefix>-<u64::MAX>-<n>`.
#[derive(Debug, Clone)]
pub struct IdAllocator {
    clock: IdClock,
    last: Option<u64>,
    overflow: u64,
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::new()
    }
}

impl IdAllocator {
    pub fn new() -> Self {
        Self { clock: IdClock::System, last: None, overflow: 0 }
    }

    /// Clock-free allocator producing `start`, `start + 1`, ... (tests, demo data).
    pub fn sequential(start: u64) -> Self {
        Self { clock: IdClock::Sequential, last: start.checked_sub(1), overflow: 0 }
    }

    /// Raises the floor above any numeric suffix found in `ids`, so ids loaded from disk are
    /// never handed out again.
    pub fn observe<'a>(&mut self, ids: impl IntoIterator<Item = &'a str>) {
        for id in ids {
            let mut parts = id.rsplitn(3, '-');
            let tail = parts.next().unwrap_or(id);
            let Ok(stamp) = tail.parse::<u64>() else {
                continue;
            };
            if parts.next().and_then(|mid| mid.parse::<u64>().ok()) == Some(u64::MAX) {
                self.last = Some(u64::MAX);
                self.overflow = self.overflow.max(stamp);
            } else {
                self.last = Some(self.last.map_or(stamp, |last| last.max(stamp)));
            }
        }
    }

    /// The next stamp, or `None` once stamps are exhausted.
    pub fn next_stamp(&mut self) -> Option<u64> {
        let now = match self.clock {
            IdClock::System => SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
                .unwrap_or(0),
            IdClock::Sequential => 0,
        };
        let next = match self.last {
            Some(last) => now.max(last.checked_add(1)?),
            None => now,
        };
        self.last = Some(next);
        Some(next)
    }

    fn next_suffix(&mut self) -> String {
        match self.next_stamp() {
            Some(stamp) => stamp.to_string(),
            None => {
                self.overflow = self.overflow.saturating_add(1);
                format!("{}-{}", u64::MAX, self.overflow)
            }
        }
    }

    pub fn page_id(&mut self) -> PageId {
        Id::generated(format!("page-{}", self.next_suffix()))
    }

    pub fn element_id(&mut self) -> ElementId {
        Id::generated(format!("element-{}", self.next_suffix()))
    }

    pub fn condition_id(&mut self) -> ConditionId {
        Id::generated(format!("condition-{}", self.next_suffix()))
    }
}
