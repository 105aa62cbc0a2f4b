//! Credential handling: password hashing and login tokens.

mod password;
mod token;

pub use password::{hash_password, verify_decoy, verify_password};
#[cfg(test)]
pub(crate) use password::decoy_used;
pub use token::{Claims, TokenIssuer};
