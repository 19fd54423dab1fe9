//! `uniasia-core` - shared domain primitives.
//!
//! Pure value types only (no IO); every other crate in the workspace builds on
//! these.

pub mod email;
pub mod error;
pub mod id;
pub mod value_object;

pub use email::EmailAddress;
pub use error::{DomainError, DomainResult};
pub use id::{NotificationId, ProductId};
pub use value_object::ValueObject;
