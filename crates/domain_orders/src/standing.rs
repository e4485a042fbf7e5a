//! Document supersession
//!
//! Shipments and invoices attached to an order can be cancelled-and-redone
//! upstream. Instead of scattering "ignored"/"recreated" id sets across the
//! order, every such document carries its own standing: it is either the
//! active version, ignored without replacement, or superseded by a newer
//! document.

use serde::{Deserialize, Serialize};

/// Lifecycle standing of a versioned business document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "standing", content = "by", rename_all = "snake_case")]
pub enum Standing<Id> {
    /// The current, authoritative version
    Active,
    /// Dropped without a replacement
    Ignored,
    /// Replaced by the document with the given id
    Superseded(Id),
}

impl<Id> Standing<Id> {
    /// Returns true for the active version
    pub fn is_active(&self) -> bool {
        matches!(self, Standing::Active)
    }

    /// Returns true for ignored or superseded documents
    pub fn is_exception(&self) -> bool {
        !self.is_active()
    }
}

impl<Id> Default for Standing<Id> {
    fn default() -> Self {
        Standing::Active
    }
}
