//! crates/summary_core/src/authz.rs
//!
//! The single ownership check shared by every operation that reads or
//! mutates a document.

use crate::domain::{Document, User};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Allowed,
    Forbidden,
}

/// Decides whether `caller` may act on `document`. Only the owner may.
pub fn authorize(caller: &User, document: &Document) -> Access {
    if document.user_id == caller.id {
        Access::Allowed
    } else {
        Access::Forbidden
    }
}
