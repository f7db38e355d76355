//! Deciding which of two same-named plugins is stale.
//!
//! The decision is an ordered chain: equal digests mean the archives are
//! identical; otherwise the lower version is obsolete; with equal versions
//! the older file is obsolete; and with equal timestamps too the first
//! argument is designated obsolete and the coin-flip is logged.

use std::fmt;

use serde::Serialize;

use crate::plugin::Plugin;
use crate::{Error, Result};

/// Which argument of [`decide`] a decision refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    First,
    Second,
}

/// The signal an obsolescence decision was based on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Basis {
    Version,
    Timestamp,
    /// No signal distinguished the two; the first argument was picked.
    Arbitrary,
}

impl fmt::Display for Basis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Version => f.write_str("older version"),
            Self::Timestamp => f.write_str("older timestamp"),
            Self::Arbitrary => f.write_str("arbitrary tie-break"),
        }
    }
}

/// Outcome of comparing two records of the same plugin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", rename_all = "lowercase")]
pub enum Decision {
    /// Same content; neither is obsolete.
    Identical,
    Obsolete { side: Side, basis: Basis },
}

impl Decision {
    /// The obsolete one of `first` and `second`, if any.
    pub fn obsolete<'a>(&self, first: &'a Plugin, second: &'a Plugin) -> Option<&'a Plugin> {
        match self {
            Self::Identical => None,
            Self::Obsolete {
                side: Side::First, ..
            } => Some(first),
            Self::Obsolete {
                side: Side::Second,
                ..
            } => Some(second),
        }
    }

    pub fn is_arbitrary(&self) -> bool {
        matches!(
            self,
            Self::Obsolete {
                basis: Basis::Arbitrary,
                ..
            }
        )
    }
}

/// Decide which of `first` and `second` is obsolete.
///
/// # Errors
///
/// [`Error::InvariantViolation`] if the plugins have different names.
pub fn decide(first: &Plugin, second: &Plugin) -> Result<Decision> {
    if first.name != second.name {
        return Err(Error::InvariantViolation(format!(
            "cannot decide obsolescence between differently named plugins '{}' and '{}'",
            first.name, second.name
        )));
    }

    if first.digest == second.digest {
        return Ok(Decision::Identical);
    }

    let older = |first_is_older: bool, basis| Decision::Obsolete {
        side: if first_is_older { Side::First } else { Side::Second },
        basis,
    };

    let (a, b) = (first.effective_version(), second.effective_version());
    if a != b {
        return Ok(older(a < b, Basis::Version));
    }

    if first.modified != second.modified {
        return Ok(older(first.modified < second.modified, Basis::Timestamp));
    }

    tracing::info!(
        plugin = %first.name,
        version = %a,
        "Plugins {} and {} differ in content but share version and timestamp; arbitrarily treating {} as obsolete",
        first.path.display(),
        second.path.display(),
        first.path.display()
    );
    Ok(older(true, Basis::Arbitrary))
}
