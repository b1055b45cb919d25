//! Validation of the egress address reported by the probed target

use std::collections::BTreeSet;

/// Egress addresses the probe is allowed to leave through.
///
/// Membership is exact and case-sensitive. An empty set accepts nothing, so
/// with no configured addresses every successful probe counts as a mismatch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpectedEgressSet {
    addresses: BTreeSet<String>,
}

/// Outcome of checking one observed egress token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EgressCheck {
    Expected,
    Mismatch,
}

impl ExpectedEgressSet {
    /// Parse a comma separated list. Entries are trimmed and blanks dropped.
    pub fn parse(raw: &str) -> Self {
        raw.split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .collect()
    }

    pub fn contains(&self, token: &str) -> bool {
        self.addresses.contains(token)
    }

    pub fn check(&self, token: &str) -> EgressCheck {
        if self.contains(token) {
            EgressCheck::Expected
        } else {
            EgressCheck::Mismatch
        }
    }

    pub fn is_empty(&self) -> bool {
        self.addresses.is_empty()
    }

    pub fn len(&self) -> usize {
        self.addresses.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.addresses.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for ExpectedEgressSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            addresses: iter.into_iter().map(Into::into).collect(),
        }
    }
}
