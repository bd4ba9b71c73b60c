use sqlx::SqlitePool;
use time::OffsetDateTime;

use crate::auth::repo_types::{ProfileUpdate, User, UserSummary};

const USER_COLUMNS: &str =
    "id, username, password_hash, email, first_name, last_name, phone, address, created_at";

impl User {
    /// Find a user by exact (case-sensitive) username.
    pub async fn find_by_username(db: &SqlitePool, username: &str) -> sqlx::Result<Option<User>> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = ?"
        ))
        .bind(username)
        .fetch_optional(db)
        .await
    }

    pub async fn find_by_id(db: &SqlitePool, id: i64) -> sqlx::Result<Option<User>> {
        sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?"))
            .bind(id)
            .fetch_optional(db)
            .await
    }

    #[cfg_attr(not(test), allow(dead_code))]
    pub async fn get_user_id(db: &SqlitePool, username: &str) -> sqlx::Result<Option<i64>> {
        sqlx::query_scalar::<_, i64>("SELECT id FROM users WHERE username = ?")
            .bind(username)
            .fetch_optional(db)
            .await
    }

    /// Insert a user with an already-derived credential.
    ///
    /// Username uniqueness is enforced by the `UNIQUE` index, so concurrent
    /// registrations of the same name cannot both succeed.
    pub async fn create(db: &SqlitePool, username: &str, password_hash: &str) -> sqlx::Result<User> {
        sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (username, password_hash, created_at)
            VALUES (?, ?, ?)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(username)
        .bind(password_hash)
        .bind(OffsetDateTime::now_utc().unix_timestamp())
        .fetch_one(db)
        .await
    }

    /// Overwrite the profile fields. Returns false when the user is gone.
    pub async fn update_profile(
        db: &SqlitePool,
        id: i64,
        profile: &ProfileUpdate,
    ) -> sqlx::Result<bool> {
        let res = sqlx::query(
            r#"
            UPDATE users
               SET email = ?, first_name = ?, last_name = ?, phone = ?, address = ?
             WHERE id = ?
            "#,
        )
        .bind(&profile.email)
        .bind(&profile.first_name)
        .bind(&profile.last_name)
        .bind(&profile.phone)
        .bind(&profile.address)
        .bind(id)
        .execute(db)
        .await?;
        Ok(res.rows_affected() > 0)
    }

    pub async fn list(db: &SqlitePool) -> sqlx::Result<Vec<UserSummary>> {
        sqlx::query_as::<_, UserSummary>(
            "SELECT id, username, created_at FROM users ORDER BY created_at DESC, id DESC",
        )
        .fetch_all(db)
        .await
    }

    pub async fn count(db: &SqlitePool) -> sqlx::Result<i64> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
            .fetch_one(db)
            .await
    }
}
