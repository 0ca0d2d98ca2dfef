use argon2::Error as Argon2Error;
use mongodb::{bson::doc, error::Error as DbError, Database};
use rocket::{futures::TryStreamExt, http::Status, tokio::sync::Mutex};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::{
    api::{admin::AdminCredentials, auth::verify_password},
    mongodb::Coll,
};

/// Username of the admin created when there are none.
pub const DEFAULT_ADMIN_USERNAME: &str = "admin";

/// An admin user, keyed by username.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Admin {
    #[serde(rename = "_id")]
    pub username: String,
    pub password_hash: String,
    /// Random per account, so a recreated admin of the same name is a new account.
    pub registration: u32,
}

impl Admin {
    /// Check whether the given password is correct.
    pub fn verify_password(&self, password: &str) -> std::result::Result<bool, Argon2Error> {
        verify_password(&self.password_hash, password)
    }
}

/// All admin accounts, mirrored to the database when there is one.
pub struct AdminStore {
    admins: Mutex<Vec<Admin>>,
    coll: Option<Coll<Admin>>,
}

impl AdminStore {
    /// An admin store that lives only as long as the process.
    pub fn in_memory() -> Self {
        Self {
            admins: Mutex::new(Vec::new()),
            coll: None,
        }
    }

    /// Load every admin from the database.
    pub async fn load(db: &Database) -> std::result::Result<Self, DbError> {
        let coll = Coll::<Admin>::from_db(db);
        let admins: Vec<Admin> = coll.find(None, None).await?.try_collect().await?;
        debug!("Loaded {} admins", admins.len());
        Ok(Self {
            admins: Mutex::new(admins),
            coll: Some(coll),
        })
    }

    /// Ensure there is at least one admin, creating the default one if not.
    pub async fn ensure_admin_exists(&self, default_password: &str) -> Result<()> {
        if !self.admins.lock().await.is_empty() {
            return Ok(());
        }
        let admin = Admin::try_from(AdminCredentials {
            username: DEFAULT_ADMIN_USERNAME.to_string(),
            password: default_password.to_string(),
        })?;
        self.create(admin).await?;
        warn!("No admins found, created default admin {DEFAULT_ADMIN_USERNAME}");
        Ok(())
    }

    pub async fn create(&self, admin: Admin) -> Result<()> {
        let mut admins = self.admins.lock().await;
        if admins.iter().any(|a| a.username == admin.username) {
            return Err(Error::Status(
                Status::BadRequest,
                format!("Admin username already in use: {}", admin.username),
            ));
        }
        if let Some(coll) = &self.coll {
            coll.insert_one(&admin, None).await?;
        }
        info!("Created admin {}", admin.username);
        admins.push(admin);
        Ok(())
    }

    pub async fn find(&self, username: &str) -> Option<Admin> {
        self.admins
            .lock()
            .await
            .iter()
            .find(|admin| admin.username == username)
            .cloned()
    }

    /// All admin usernames, oldest first.
    pub async fn usernames(&self) -> Vec<String> {
        self.admins
            .lock()
            .await
            .iter()
            .map(|admin| admin.username.clone())
            .collect()
    }

    /// Delete an admin, never the last one.
    pub async fn delete(&self, username: &str) -> Result<()> {
        let mut admins = self.admins.lock().await;
        let index = admins
            .iter()
            .position(|admin| admin.username == username)
            .ok_or_else(|| Error::not_found(format!("Admin {username}")))?;
        if admins.len() == 1 {
            return Err(Error::Status(
                Status::UnprocessableEntity,
                "Cannot delete last admin!".to_string(),
            ));
        }
        if let Some(coll) = &self.coll {
            coll.delete_one(doc! { "_id": username }, None).await?;
        }
        admins.remove(index);
        info!("Deleted admin {username}");
        Ok(())
    }
}
