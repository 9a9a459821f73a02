//! Repository implementations over the SQLite backing store.

pub mod user;

pub use user::{SqlxUserRepository, UserRepository};
