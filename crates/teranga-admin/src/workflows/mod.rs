pub mod accommodations;
pub mod actor;
pub mod articles;
pub mod catalog;
pub mod listings;
pub mod users;

pub use actor::{Actor, ActorRole};
