//! `sparekeep-auth`: authentication/authorization boundary.
//!
//! Decoupled from HTTP and storage: token verification, role policy, user
//! profiles and the session state machine.

pub mod authorize;
pub mod claims;
pub mod jwt;
pub mod permissions;
pub mod profile;
pub mod roles;
pub mod session;

pub use authorize::{AuthzError, authorize};
pub use claims::{AccessClaims, TokenError, validate_claims};
pub use jwt::{Hs256JwtValidator, JwtValidator};
pub use permissions::Permission;
pub use profile::{AccountStatus, StoredProfile, UserProfile};
pub use roles::Role;
pub use session::{Session, SessionEvent};
