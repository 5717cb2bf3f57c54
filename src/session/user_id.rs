//! Fully qualified user identifiers (`@localpart:domain`).

use std::fmt;
use std::str::FromStr;

use crate::error::{MatrixError, MatrixResult};

/// A user identifier such as `@alice:example.org`.
///
/// Parsing is lenient about the localpart character set, since historical
/// user ids on real servers do not always follow the current grammar.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UserId {
    id: String,
    colon: usize,
}

impl UserId {
    pub fn parse(id: &str) -> MatrixResult<Self> {
        let invalid = || MatrixError::InvalidResponse(format!("not a valid user id: {}", id));
        if !id.starts_with('@') {
            return Err(invalid());
        }
        let colon = id.find(':').ok_or_else(invalid)?;
        if colon == 1 || colon == id.len() - 1 {
            return Err(invalid());
        }
        Ok(Self {
            id: id.to_string(),
            colon,
        })
    }

    /// Build an id from caller-supplied parts. Bad parts are a caller error,
    /// not a server one.
    pub fn from_localpart(localpart: &str, domain: &str) -> MatrixResult<Self> {
        Self::parse(&format!("@{}:{}", localpart, domain)).map_err(|_| {
            MatrixError::InvalidState(format!(
                "Cannot build a user id from localpart {:?} and domain {:?}",
                localpart, domain
            ))
        })
    }

    pub fn as_str(&self) -> &str {
        &self.id
    }

    pub fn localpart(&self) -> &str {
        &self.id[1..self.colon]
    }

    /// Server name, including any port.
    pub fn domain(&self) -> &str {
        &self.id[self.colon + 1..]
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id)
    }
}

impl FromStr for UserId {
    type Err = MatrixError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
