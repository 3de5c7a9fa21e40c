//! Shared primitive types used across the entire engine.

/// Stable identifier of the brand whose customers are being analyzed.
pub type BrandId = String;

/// Stable customer identifier, as recorded on transactions.
pub type CustomerId = String;

/// Product/service category identifier.
pub type CategoryId = String;
