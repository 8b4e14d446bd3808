use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use time::OffsetDateTime;

use crate::users::filter::{Predicate, Scalar, UserFilter};

/// User record in the database.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String, // bcrypt hash, not exposed in JSON
    pub cellphone: String,
    pub status: bool, // false = soft-deleted
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Fields for a fresh row; the store assigns id and updated_at.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub cellphone: String,
    pub status: bool,
}

/// Partial update; `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub name: Option<String>,
    pub password_hash: Option<String>,
    pub cellphone: Option<String>,
    pub status: Option<bool>,
}

impl UserChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.password_hash.is_none()
            && self.cellphone.is_none()
            && self.status.is_none()
    }
}

/// Persistence collaborator for the users collection.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_one(&self, filter: &UserFilter) -> anyhow::Result<Option<User>>;
    async fn find_all(&self, filter: &UserFilter) -> anyhow::Result<Vec<User>>;
    async fn create(&self, user: NewUser) -> anyhow::Result<User>;
    /// Applies `changes` to every row matching `filter`, returning the
    /// number of rows touched.
    async fn update(&self, changes: UserChanges, filter: &UserFilter) -> anyhow::Result<u64>;
}

#[derive(Clone)]
pub struct PgUserStore {
    db: PgPool,
}

impl PgUserStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

const SELECT_USER: &str =
    "SELECT id, name, email, password_hash, cellphone, status, updated_at FROM users";

fn push_where(qb: &mut QueryBuilder<'_, Postgres>, filter: &UserFilter) {
    let mut keyword = " WHERE ";
    for (field, pred) in filter.iter() {
        qb.push(keyword);
        keyword = " AND ";
        qb.push(field.column());
        match pred {
            Predicate::Equals(Scalar::Int(value)) => {
                qb.push(" = ").push_bind(*value);
            }
            Predicate::Equals(Scalar::Bool(value)) => {
                qb.push(" = ").push_bind(*value);
            }
            Predicate::Equals(Scalar::Text(value)) => {
                qb.push(" = ").push_bind(value.clone());
            }
            Predicate::Contains(fragment) => {
                qb.push(" LIKE ").push_bind(format!("%{fragment}%"));
            }
            Predicate::LessThan(bound) => {
                qb.push(" < ").push_bind(*bound);
            }
            Predicate::GreaterThan(bound) => {
                qb.push(" > ").push_bind(*bound);
            }
        }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_one(&self, filter: &UserFilter) -> anyhow::Result<Option<User>> {
        let mut qb = QueryBuilder::new(SELECT_USER);
        push_where(&mut qb, filter);
        qb.push(" LIMIT 1");
        let user = qb.build_query_as::<User>().fetch_optional(&self.db).await?;
        Ok(user)
    }

    async fn find_all(&self, filter: &UserFilter) -> anyhow::Result<Vec<User>> {
        let mut qb = QueryBuilder::new(SELECT_USER);
        push_where(&mut qb, filter);
        let users = qb.build_query_as::<User>().fetch_all(&self.db).await?;
        Ok(users)
    }

    async fn create(&self, user: NewUser) -> anyhow::Result<User> {
        let created = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (name, email, password_hash, cellphone, status)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, name, email, password_hash, cellphone, status, updated_at
            "#,
        )
        .bind(user.name)
        .bind(user.email)
        .bind(user.password_hash)
        .bind(user.cellphone)
        .bind(user.status)
        .fetch_one(&self.db)
        .await?;
        Ok(created)
    }

    async fn update(&self, changes: UserChanges, filter: &UserFilter) -> anyhow::Result<u64> {
        if changes.is_empty() {
            return Ok(0);
        }
        let mut qb = QueryBuilder::new("UPDATE users SET updated_at = now()");
        if let Some(name) = changes.name {
            qb.push(", name = ").push_bind(name);
        }
        if let Some(password_hash) = changes.password_hash {
            qb.push(", password_hash = ").push_bind(password_hash);
        }
        if let Some(cellphone) = changes.cellphone {
            qb.push(", cellphone = ").push_bind(cellphone);
        }
        if let Some(status) = changes.status {
            qb.push(", status = ").push_bind(status);
        }
        push_where(&mut qb, filter);
        let result = qb.build().execute(&self.db).await?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn user_json_omits_password_hash() {
        let user = User {
            id: 7,
            name: "Ana".into(),
            email: "ana@example.com".into(),
            password_hash: "$2b$10$secret".into(),
            cellphone: "555-0100".into(),
            status: true,
            updated_at: datetime!(2024-03-01 12:00 UTC),
        };
        let json = serde_json::to_value(&user).expect("serialize user");
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["email"], "ana@example.com");
        assert_eq!(json["status"], true);
    }
}
