//! Path parameter validation: ranges, patterns, enums, UUIDs, route ordering,
//! and sub-path capture. Each file is an independent module.

use serde::{Deserialize, Serialize};

pub mod annotated;
pub mod basic;
pub mod enums;
pub mod invoice;
pub mod multiple;
pub mod numeric;
pub mod ordering;
pub mod project;
pub mod string;
pub mod subpath;

/// Positive user identifier, reusable in any path or query struct.
///
/// Values below 1 are rejected while deserializing, so every extractor that
/// contains a `UserId` reports them as a 422.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct UserId(i64);

impl UserId {
    pub fn get(self) -> i64 {
        self.0
    }
}

impl TryFrom<i64> for UserId {
    type Error = String;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        if value >= 1 {
            Ok(Self(value))
        } else {
            Err(format!("user id must be >= 1, got {}", value))
        }
    }
}

impl From<UserId> for i64 {
    fn from(id: UserId) -> Self {
        id.0
    }
}
