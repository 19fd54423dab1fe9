//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects are immutable and compared by their attribute values. Two
/// `EmailAddress` values holding the same normalized address are the same
/// recipient, no matter where they were parsed from.
///
/// ```ignore
/// let a = EmailAddress::parse("Ops@Example.com")?;
/// let b = EmailAddress::parse(" ops@example.com ")?;
/// assert_eq!(a, b);
/// ```
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
