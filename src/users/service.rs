use std::sync::Arc;

use tracing::error;

use crate::users::dto::{
    BulkUserEntry, CreateUserRequest, FindUsersQuery, Reply, UpdateUserRequest,
};
use crate::users::filter::UserFilter;
use crate::users::password::PasswordHasher;
use crate::users::repo::{NewUser, UserChanges, UserStore};

/// Create-time failures translated into a 400 reply instead of an error.
#[derive(Debug, thiserror::Error)]
pub enum CreateRejection {
    #[error("Passwords do not match")]
    PasswordMismatch,
    #[error("User already exists")]
    EmailTaken,
}

/// User lifecycle rules over an injected store and password hasher.
///
/// Every operation yields the `{code, message}` envelope; store failures
/// outside the create path propagate to the caller.
#[derive(Clone)]
pub struct UserService {
    store: Arc<dyn UserStore>,
    hasher: Arc<dyn PasswordHasher>,
}

impl UserService {
    pub fn new(store: Arc<dyn UserStore>, hasher: Arc<dyn PasswordHasher>) -> Self {
        Self { store, hasher }
    }

    /// Rejects mismatched confirmations and duplicate emails (any status),
    /// then inserts an active row with the hashed credential.
    pub async fn create_user(&self, req: CreateUserRequest) -> anyhow::Result<Reply> {
        if req.password != req.password_confirmation {
            return Ok(Reply::text(400, CreateRejection::PasswordMismatch.to_string()));
        }

        let existing = self
            .store
            .find_one(&UserFilter::new().email(&req.email))
            .await?;
        if existing.is_some() {
            return Ok(Reply::text(400, CreateRejection::EmailTaken.to_string()));
        }

        let password_hash = self.hasher.hash(&req.password)?;
        let user = self
            .store
            .create(NewUser {
                name: req.name,
                email: req.email,
                password_hash,
                cellphone: req.cellphone,
                status: true,
            })
            .await?;

        Ok(Reply::text(
            200,
            format!("User created successfully with ID: {}", user.id),
        ))
    }

    /// 200 with the active row, or with `null` when none matches.
    pub async fn get_user_by_id(&self, id: i64) -> anyhow::Result<Reply> {
        let user = self
            .store
            .find_one(&UserFilter::new().id(id).status(true))
            .await?;
        Ok(Reply::user(user))
    }

    /// Merges caller fields over the current active row; a supplied password
    /// is re-hashed, an absent one carries the stored hash through. The
    /// write filters by id only, not by status.
    pub async fn update_user(&self, id: i64, req: UpdateUserRequest) -> anyhow::Result<Reply> {
        let current = self
            .store
            .find_one(&UserFilter::new().id(id).status(true))
            .await?;

        let password_hash = match req.password {
            Some(plain) => Some(self.hasher.hash(&plain)?),
            None => current.as_ref().map(|u| u.password_hash.clone()),
        };
        let changes = UserChanges {
            name: req.name.or_else(|| current.as_ref().map(|u| u.name.clone())),
            password_hash,
            cellphone: req.cellphone.or_else(|| current.map(|u| u.cellphone)),
            status: None,
        };

        self.store.update(changes, &UserFilter::new().id(id)).await?;
        Ok(Reply::text(200, "User updated successfully"))
    }

    /// Soft delete: flips `status` to false. The row stays in storage and
    /// no existence check gates the write. Hard deletion is not exposed.
    pub async fn delete_user(&self, id: i64) -> anyhow::Result<Reply> {
        let changes = UserChanges {
            status: Some(false),
            ..UserChanges::default()
        };
        self.store.update(changes, &UserFilter::new().id(id)).await?;
        Ok(Reply::text(200, "User deleted successfully"))
    }

    /// All active rows. Store failures are logged and re-raised rather than
    /// folded into the envelope.
    pub async fn get_all_users(&self) -> anyhow::Result<Reply> {
        match self.store.find_all(&UserFilter::new().status(true)).await {
            Ok(users) => Ok(Reply::users(users)),
            Err(e) => {
                error!(error = %e, "failed to list users");
                Err(e)
            }
        }
    }

    pub async fn find_users(&self, query: FindUsersQuery) -> anyhow::Result<Reply> {
        let filter = UserFilter::from_query(&query);
        let users = self.store.find_all(&filter).await?;
        Ok(Reply::users(users))
    }

    /// Inserts entries one at a time in input order; duplicates and store
    /// errors are counted as failures without aborting the batch, and
    /// already-inserted entries are never rolled back.
    pub async fn bulk_create_users(&self, entries: Vec<BulkUserEntry>) -> Reply {
        let mut created = 0usize;
        let mut failed = 0usize;

        for entry in entries {
            match self.insert_entry(entry).await {
                Ok(true) => created += 1,
                Ok(false) => failed += 1,
                Err(e) => {
                    error!(error = %e, "bulk create entry failed");
                    failed += 1;
                }
            }
        }

        Reply::text(200, format!("Created successfully: {created}, failed: {failed}"))
    }

    async fn insert_entry(&self, entry: BulkUserEntry) -> anyhow::Result<bool> {
        let existing = self
            .store
            .find_one(&UserFilter::new().email(&entry.email))
            .await?;
        if existing.is_some() {
            return Ok(false);
        }

        let password_hash = self.hasher.hash(&entry.password)?;
        self.store
            .create(NewUser {
                name: entry.name,
                email: entry.email,
                password_hash,
                cellphone: entry.cellphone,
                status: true,
            })
            .await?;
        Ok(true)
    }
}
