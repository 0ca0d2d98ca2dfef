use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::{api::auth::hash_password, db::admin::Admin};

pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Raw admin credentials, received from a user. These are never stored directly,
/// since the password is in plaintext.
#[derive(Clone, Deserialize, Serialize)]
pub struct AdminCredentials {
    pub username: String,
    pub password: String,
}

impl AdminCredentials {
    /// Are these credentials acceptable for a new account?
    pub fn is_acceptable(&self) -> bool {
        !self.username.trim().is_empty() && self.password.len() >= MIN_PASSWORD_LENGTH
    }
}

impl TryFrom<AdminCredentials> for Admin {
    type Error = Error;

    /// Convert [`AdminCredentials`] to a new [`Admin`] by hashing the password.
    /// This enforces that the username is non-empty, and the password meets minimum length.
    fn try_from(cred: AdminCredentials) -> Result<Self> {
        if !cred.is_acceptable() {
            return Err(Error::bad_request("Illegal admin credentials".to_string()));
        }
        Ok(Self {
            password_hash: hash_password(&cred.password)?,
            username: cred.username,
            registration: rand::random(),
        })
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_passwords_rejected() {
        let mut cred = AdminCredentials::example1();
        cred.password = "1234567".to_string();
        assert!(Admin::try_from(cred).is_err());
        assert!(Admin::try_from(AdminCredentials::empty()).is_err());
    }

    #[test]
    fn password_is_hashed() {
        let cred = AdminCredentials::example1();
        let admin = Admin::try_from(cred.clone()).unwrap();
        assert_eq!(admin.username, cred.username);
        assert_ne!(admin.password_hash, cred.password);
        assert!(admin.verify_password(&cred.password).unwrap());
        assert!(!admin.verify_password("not the password").unwrap());
    }
}
