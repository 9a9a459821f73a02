//! Domain layer
//!
//! Pure domain identifiers with zero infrastructure dependencies beyond the
//! sqlx encode/decode glue needed to bind them directly in queries.

pub mod id;

pub use id::UserId;
