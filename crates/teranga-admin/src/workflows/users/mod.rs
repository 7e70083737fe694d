//! Platform accounts: tourists, guides, organizers and staff.

pub mod domain;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{UserAccount, UserDraft, UserId, UserStatus};
pub use router::user_router;
pub use service::{UserQuery, UserService, UserStats};
