mod password;
mod token;
mod user;

pub use password::{hash_password, verify_password};
pub use token::{AuthToken, AUTH_TOKEN_COOKIE};
pub use user::{Rights, User};
