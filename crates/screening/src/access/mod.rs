//! Session lookup and flat per-resource permissions.

pub mod permissions;
pub mod session;

pub use permissions::{Action, Grant, PermissionSet, Resource};
pub use session::{session_token, AccessError, Actor, Authenticator, SessionRepository, User};
