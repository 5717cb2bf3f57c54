//! Client capability set.
//!
//! A single client type covers regular users, application services acting
//! for virtual users, and administrative registration. Which of those a
//! handle may do is decided by configuration at construction time.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::{MatrixError, MatrixResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// Regular client-server calls. Always present.
    Standard,
    /// Act on behalf of other users via the `user_id` query parameter.
    VirtualImpersonation,
    /// Register accounts with the server's shared secret.
    AdminRegistration,
}

impl Capability {
    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::Standard => "standard",
            Capability::VirtualImpersonation => "virtual_impersonation",
            Capability::AdminRegistration => "admin_registration",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Capabilities(BTreeSet<Capability>);

impl Default for Capabilities {
    fn default() -> Self {
        Self::standard()
    }
}

impl Capabilities {
    pub fn standard() -> Self {
        Self(BTreeSet::from([Capability::Standard]))
    }

    pub fn with(mut self, capability: Capability) -> Self {
        self.0.insert(capability);
        self
    }

    pub fn contains(&self, capability: Capability) -> bool {
        self.0.contains(&capability)
    }

    /// Fail with `InvalidState` unless `capability` is enabled.
    pub fn require(&self, capability: Capability) -> MatrixResult<()> {
        if self.contains(capability) {
            Ok(())
        } else {
            Err(MatrixError::InvalidState(format!(
                "this client was not configured with the {} capability",
                capability.as_str()
            )))
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = Capability> + '_ {
        self.0.iter().copied()
    }
}

impl FromIterator<Capability> for Capabilities {
    fn from_iter<I: IntoIterator<Item = Capability>>(iter: I) -> Self {
        iter.into_iter().fold(Self::standard(), Self::with)
    }
}
