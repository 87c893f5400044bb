use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use sqlx::PgPool;

use crate::principal::errors::StoreError;
use crate::principal::errors::UniqueField;
use crate::principal::models::ContactAddress;
use crate::principal::models::DisplayName;
use crate::principal::models::NewPrincipal;
use crate::principal::models::Principal;
use crate::principal::models::PrincipalId;
use crate::principal::ports::PrincipalRepository;

const USERNAME_CONSTRAINT: &str = "users_username_key";
const EMAIL_CONSTRAINT: &str = "users_email_key";

pub struct PostgresPrincipalRepository {
    pool: PgPool,
}

impl PostgresPrincipalRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct PrincipalRow {
    id: i64,
    username: String,
    email: String,
    password_hash: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<PrincipalRow> for Principal {
    type Error = StoreError;

    fn try_from(row: PrincipalRow) -> Result<Self, Self::Error> {
        Ok(Principal {
            id: PrincipalId(row.id),
            display_name: DisplayName::new(row.username)
                .map_err(|e| StoreError::Database(format!("corrupt username column: {}", e)))?,
            contact_address: ContactAddress::new(row.email)
                .map_err(|e| StoreError::Database(format!("corrupt email column: {}", e)))?,
            secret_hash: row.password_hash,
            created_at: row.created_at,
        })
    }
}

fn database_error(e: sqlx::Error) -> StoreError {
    StoreError::Database(e.to_string())
}

/// Field behind a unique constraint; any other unique constraint is still a conflict.
fn unique_field(constraint: Option<&str>) -> UniqueField {
    match constraint {
        Some(USERNAME_CONSTRAINT) => UniqueField::DisplayName,
        Some(EMAIL_CONSTRAINT) => UniqueField::ContactAddress,
        _ => UniqueField::Other,
    }
}

fn insert_error(e: sqlx::Error) -> StoreError {
    if let Some(db_err) = e.as_database_error() {
        if db_err.is_unique_violation() {
            return StoreError::UniquenessViolation(unique_field(db_err.constraint()));
        }
    }
    database_error(e)
}

#[async_trait]
impl PrincipalRepository for PostgresPrincipalRepository {
    async fn find_by_identity(
        &self,
        display_name: &DisplayName,
        contact_address: &ContactAddress,
    ) -> Result<Option<Principal>, StoreError> {
        let row = sqlx::query_as::<_, PrincipalRow>(
            r#"
            SELECT id, username, email, password_hash, created_at
            FROM users
            WHERE username = $1 OR email = $2
            LIMIT 1
            "#,
        )
        .bind(display_name.as_str())
        .bind(contact_address.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(database_error)?;

        row.map(Principal::try_from).transpose()
    }

    async fn find_by_display_name(
        &self,
        display_name: &DisplayName,
    ) -> Result<Option<Principal>, StoreError> {
        let row = sqlx::query_as::<_, PrincipalRow>(
            r#"
            SELECT id, username, email, password_hash, created_at
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(display_name.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(database_error)?;

        row.map(Principal::try_from).transpose()
    }

    async fn find_by_contact(
        &self,
        contact_address: &ContactAddress,
    ) -> Result<Option<Principal>, StoreError> {
        let row = sqlx::query_as::<_, PrincipalRow>(
            r#"
            SELECT id, username, email, password_hash, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(contact_address.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(database_error)?;

        row.map(Principal::try_from).transpose()
    }

    async fn insert(&self, principal: NewPrincipal) -> Result<Principal, StoreError> {
        let row = sqlx::query_as::<_, PrincipalRow>(
            r#"
            INSERT INTO users (username, email, password_hash)
            VALUES ($1, $2, $3)
            RETURNING id, username, email, password_hash, created_at
            "#,
        )
        .bind(principal.display_name.as_str())
        .bind(principal.contact_address.as_str())
        .bind(&principal.secret_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(insert_error)?;

        Principal::try_from(row)
    }
}
