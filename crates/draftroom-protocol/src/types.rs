//! Identity types shared by every layer of the draft room.
//!
//! These are "newtype wrappers" around strings. A `TeamId` and a `UserId`
//! are both strings on the wire, but mixing them up in Rust is a compile
//! error. `#[serde(transparent)]` keeps the JSON representation a plain
//! string, so `TeamId("team-1")` is `"team-1"`, not `{"0":"team-1"}`.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Identifies a team (a fantasy franchise) within one league.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct TeamId(pub String);

/// Identifies a human user, as decoded from their bearer token.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct UserId(pub String);

/// Identifies a league. One league has exactly one draft room.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct LeagueId(pub String);

/// Identifies a real-world player that can be nominated.
///
/// Player feeds disagree on whether ids are numbers or strings, so both
/// are accepted on input; the id is always written back as a string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct PlayerId(pub String);

impl<'de> Deserialize<'de> for PlayerId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(u64),
            Text(String),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Number(n) => PlayerId(n.to_string()),
            Raw::Text(s) => PlayerId(s),
        })
    }
}

macro_rules! string_id {
    ($($name:ident),*) => {
        $(
            impl $name {
                /// Returns the id as a string slice.
                pub fn as_str(&self) -> &str {
                    &self.0
                }
            }

            impl fmt::Display for $name {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(&self.0)
                }
            }

            impl From<&str> for $name {
                fn from(s: &str) -> Self {
                    Self(s.to_owned())
                }
            }

            impl From<String> for $name {
                fn from(s: String) -> Self {
                    Self(s)
                }
            }
        )*
    };
}

string_id!(TeamId, UserId, LeagueId, PlayerId);
