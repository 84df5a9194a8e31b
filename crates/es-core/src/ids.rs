//! Validated object identifiers.
//!
//! Identifiers end up as object names in EnergyPlus input files, so they must
//! be non-empty, at most [`Identifier::MAX_LEN`] characters, and free of the
//! characters that delimit IDF fields and comments.

use std::borrow::Borrow;
use std::fmt;
use std::ops::Deref;

use crate::{CoreError, CoreResult};

/// Characters that cannot appear in an identifier.
const ILLEGAL: [char; 5] = [',', ';', '!', '\n', '\t'];

/// A unique name for a schedule object.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(into = "String", try_from = "String")
)]
pub struct Identifier(String);

impl Identifier {
    pub const MAX_LEN: usize = 100;

    pub fn new(s: impl Into<String>) -> CoreResult<Self> {
        let s = s.into();
        if s.is_empty() {
            return Err(CoreError::InvalidIdentifier(s, "must not be empty"));
        }
        if s.chars().count() > Self::MAX_LEN {
            return Err(CoreError::InvalidIdentifier(s, "longer than 100 characters"));
        }
        if s.contains(ILLEGAL) {
            return Err(CoreError::InvalidIdentifier(
                s,
                "contains one of the characters , ; ! \\n \\t",
            ));
        }
        Ok(Self(s))
    }

    /// Build an identifier from arbitrary text by dropping illegal characters
    /// and truncating.  Empty input becomes `"Unnamed"`.
    pub fn clean(s: &str) -> Self {
        let cleaned: String = s
            .chars()
            .filter(|c| !ILLEGAL.contains(c))
            .take(Self::MAX_LEN)
            .collect();
        if cleaned.is_empty() {
            Self("Unnamed".to_string())
        } else {
            Self(cleaned)
        }
    }

    /// `"{self}{suffix}"`, cleaned.  Used for identifiers of derived objects.
    pub fn with_suffix(&self, suffix: &str) -> Self {
        Self::clean(&format!("{}{}", self.0, suffix))
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Deref for Identifier {
    type Target = str;
    fn deref(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Identifier {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for Identifier {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<Identifier> for String {
    fn from(id: Identifier) -> String {
        id.0
    }
}

impl TryFrom<String> for Identifier {
    type Error = CoreError;
    fn try_from(s: String) -> CoreResult<Self> {
        Self::new(s)
    }
}

impl TryFrom<&str> for Identifier {
    type Error = CoreError;
    fn try_from(s: &str) -> CoreResult<Self> {
        Self::new(s)
    }
}
