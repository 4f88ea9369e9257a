//! Time-ordered record identifiers
//!
//! Every captured webhook is keyed by a UUIDv7: the top 48 bits hold the Unix
//! timestamp in milliseconds and the remaining 74 bits are random (with a
//! per-process counter when several ids land in the same millisecond). The
//! canonical text form is lowercase and fixed-width, so comparing two ids as
//! strings gives the same answer as comparing their creation times. This is
//! what lets the list endpoint page with `id < cursor` instead of offsets.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::{NoContext, Timestamp, Uuid};

use crate::error::IdError;

/// Identifier of a captured webhook
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(Uuid);

impl RecordId {
    /// Generate a fresh id for the current instant.
    ///
    /// Needs no coordination; ids generated later in the same process always
    /// sort after earlier ones.
    pub fn generate() -> Self {
        Self(Uuid::now_v7())
    }

    /// Generate an id whose timestamp component is `at`.
    ///
    /// Used when backfilling records with historical creation times.
    pub fn at(at: DateTime<Utc>) -> Self {
        let seconds = at.timestamp().max(0) as u64;
        let ts = Timestamp::from_unix(NoContext, seconds, at.timestamp_subsec_nanos());
        Self(Uuid::new_v7(ts))
    }

    /// Parse and canonicalize user supplied id text.
    ///
    /// Accepts any UUID spelling (hyphenated, simple, braced or URN) so the
    /// canonical form can be compared against stored ids.
    pub fn parse(input: &str) -> Result<Self, IdError> {
        Uuid::try_parse(input.trim())
            .map(Self)
            .map_err(|_| IdError::Malformed {
                input: input.to_string(),
            })
    }

    /// Milliseconds since the Unix epoch encoded in the id, if it is a v7 id
    pub fn timestamp_millis(&self) -> Option<u64> {
        self.0.get_timestamp().map(|ts| {
            let (seconds, nanos) = ts.to_unix();
            seconds * 1000 + u64::from(nanos) / 1_000_000
        })
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

impl FromStr for RecordId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
