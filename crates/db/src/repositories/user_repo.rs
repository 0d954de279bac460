//! Repository for the `users` table.
//!
//! Every read joins `roles` so callers get the role name alongside the row.

use roofline_core::types::DbId;
use sqlx::PgPool;

use crate::models::user::{CreateUser, UpdateUser, User};

/// Select list over `users u JOIN roles r`.
const COLUMNS: &str = "u.id, u.external_id, u.email, u.display_name, u.role_id, \
                       r.name AS role, u.lbp_number, u.phone, u.is_active, \
                       u.last_seen_at, u.created_at, u.updated_at";

pub struct UserRepo;

impl UserRepo {
    /// Insert a new user, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateUser) -> Result<User, sqlx::Error> {
        let query = format!(
            "WITH u AS (
                INSERT INTO users (external_id, email, display_name, role_id, lbp_number, phone)
                VALUES ($1, $2, $3, $4, $5, $6)
                RETURNING *
             )
             SELECT {COLUMNS} FROM u JOIN roles r ON r.id = u.role_id"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(&input.external_id)
            .bind(&input.email)
            .bind(&input.display_name)
            .bind(input.role_id)
            .bind(&input.lbp_number)
            .bind(&input.phone)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<User>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM users u JOIN roles r ON r.id = u.role_id WHERE u.id = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a user by identity-provider subject.
    pub async fn find_by_external_id(
        pool: &PgPool,
        external_id: &str,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM users u JOIN roles r ON r.id = u.role_id WHERE u.external_id = $1"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(external_id)
            .fetch_optional(pool)
            .await
    }

    /// List users, optionally restricted to one role, ordered by display name.
    pub async fn list(pool: &PgPool, role: Option<&str>) -> Result<Vec<User>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM users u JOIN roles r ON r.id = u.role_id
             WHERE ($1::TEXT IS NULL OR r.name = $1)
             ORDER BY u.display_name ASC"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(role)
            .fetch_all(pool)
            .await
    }

    /// Active users holding any of the given roles (notification recipients).
    pub async fn list_active_by_roles(
        pool: &PgPool,
        roles: &[&str],
    ) -> Result<Vec<User>, sqlx::Error> {
        let names: Vec<String> = roles.iter().map(|r| r.to_string()).collect();
        let query = format!(
            "SELECT {COLUMNS} FROM users u JOIN roles r ON r.id = u.role_id
             WHERE u.is_active AND r.name = ANY($1)
             ORDER BY u.id ASC"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(&names)
            .fetch_all(pool)
            .await
    }

    /// Update a user. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateUser,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!(
            "WITH u AS (
                UPDATE users SET
                    email = COALESCE($2, email),
                    display_name = COALESCE($3, display_name),
                    role_id = COALESCE($4, role_id),
                    lbp_number = COALESCE($5, lbp_number),
                    phone = COALESCE($6, phone),
                    is_active = COALESCE($7, is_active)
                WHERE id = $1
                RETURNING *
             )
             SELECT {COLUMNS} FROM u JOIN roles r ON r.id = u.role_id"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(&input.email)
            .bind(&input.display_name)
            .bind(input.role_id)
            .bind(&input.lbp_number)
            .bind(&input.phone)
            .bind(input.is_active)
            .fetch_optional(pool)
            .await
    }

    /// Stamp `last_seen_at` after a successful token check.
    pub async fn touch_last_seen(pool: &PgPool, id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE users SET last_seen_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }
}
