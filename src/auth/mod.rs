//! Authentication and session lifecycle subsystem.
//!
//! Registration, email verification, password hashing, session credential
//! issuance, and the authorization gate that resolves a session cookie back
//! to an identity on every protected request.

pub mod hashing;
pub mod login;
pub mod middleware;
pub mod registration;
pub mod session;
pub mod user;
pub mod validation;
pub mod verification;

pub use login::{LoginOutcome, LoginService};
pub use middleware::AuthenticatedUser;
pub use registration::{RegistrationOutcome, RegistrationService};
pub use session::{SessionError, SessionService, SESSION_COOKIE_NAME};
pub use user::{AuthRecord, NewUser, User};
