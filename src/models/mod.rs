//! Domain models for the node registry.

mod node;
mod user;

pub use node::Node;
pub use user::{LoginCredentials, NewUser, User, UserEnvelope, UserView};
