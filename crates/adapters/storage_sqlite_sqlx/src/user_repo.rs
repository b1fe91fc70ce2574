//! `SQLite` implementation of [`UserRepository`].

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqlitePool};

use bizdir_app::ports::UserRepository;
use bizdir_domain::error::{BizDirError, ValidationError};
use bizdir_domain::id::UserId;
use bizdir_domain::time;
use bizdir_domain::user::{AuthToken, NewUser, User};

use crate::error::{StorageError, decode_error, is_unique_violation};

/// Wrapper for converting database rows into domain [`User`].
struct Wrapper(User);

impl Wrapper {
    fn maybe(value: Option<Self>) -> Option<User> {
        value.map(|w| w.0)
    }
}

impl<'r> FromRow<'r, SqliteRow> for Wrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self(User {
            id: UserId::new(row.try_get("id")?),
            email: row.try_get("email")?,
            name: row.try_get("name")?,
            password_hash: row.try_get("password_hash")?,
            is_active: row.try_get("is_active")?,
            is_staff: row.try_get("is_staff")?,
            is_superuser: row.try_get("is_superuser")?,
        }))
    }
}

/// Row wrapper for [`AuthToken`].
struct TokenWrapper(AuthToken);

impl<'r> FromRow<'r, SqliteRow> for TokenWrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let created: String = row.try_get("created")?;
        let created = chrono::DateTime::parse_from_rfc3339(&created)
            .map_err(decode_error)?
            .to_utc();

        Ok(Self(AuthToken {
            key: row.try_get("key")?,
            user_id: UserId::new(row.try_get("user_id")?),
            created,
        }))
    }
}

const INSERT: &str = r"
    INSERT INTO users (email, name, password_hash, is_staff, is_superuser)
    VALUES (?, ?, ?, ?, ?)
";
const SELECT_BY_ID: &str = "SELECT * FROM users WHERE id = ?";
const SELECT_BY_EMAIL: &str = "SELECT * FROM users WHERE email = ?";
const UPDATE: &str = r"
    UPDATE users
    SET name = ?, password_hash = ?, is_active = ?, is_staff = ?, is_superuser = ?
    WHERE id = ?
";

const INSERT_TOKEN: &str = r"
    INSERT INTO auth_tokens (key, user_id, created) VALUES (?, ?, ?)
    ON CONFLICT (user_id) DO NOTHING
";
const SELECT_TOKEN_BY_USER: &str = "SELECT * FROM auth_tokens WHERE user_id = ?";
const SELECT_BY_TOKEN: &str = r"
    SELECT users.* FROM users
    JOIN auth_tokens ON auth_tokens.user_id = users.id
    WHERE auth_tokens.key = ?
";

/// `SQLite`-backed user and token repository.
#[derive(Clone)]
pub struct SqliteUserRepository {
    pool: SqlitePool,
}

impl SqliteUserRepository {
    /// Create a new repository using the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl UserRepository for SqliteUserRepository {
    async fn create(&self, user: NewUser) -> Result<User, BizDirError> {
        let result = sqlx::query(INSERT)
            .bind(&user.email)
            .bind(&user.name)
            .bind(&user.password_hash)
            .bind(user.is_staff)
            .bind(user.is_superuser)
            .execute(&self.pool)
            .await;

        let done = match result {
            Ok(done) => done,
            Err(err) if is_unique_violation(&err) => {
                return Err(ValidationError::EmailTaken.into());
            }
            Err(err) => return Err(StorageError::from(err).into()),
        };

        Ok(User {
            id: UserId::new(done.last_insert_rowid()),
            email: user.email,
            name: user.name,
            password_hash: user.password_hash,
            is_active: true,
            is_staff: user.is_staff,
            is_superuser: user.is_superuser,
        })
    }

    async fn get_by_id(&self, id: UserId) -> Result<Option<User>, BizDirError> {
        let row: Option<Wrapper> = sqlx::query_as(SELECT_BY_ID)
            .bind(id.as_i64())
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::from)?;

        Ok(Wrapper::maybe(row))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, BizDirError> {
        let row: Option<Wrapper> = sqlx::query_as(SELECT_BY_EMAIL)
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::from)?;

        Ok(Wrapper::maybe(row))
    }

    async fn update(&self, user: User) -> Result<User, BizDirError> {
        sqlx::query(UPDATE)
            .bind(&user.name)
            .bind(&user.password_hash)
            .bind(user.is_active)
            .bind(user.is_staff)
            .bind(user.is_superuser)
            .bind(user.id.as_i64())
            .execute(&self.pool)
            .await
            .map_err(StorageError::from)?;

        Ok(user)
    }

    async fn get_or_create_token(
        &self,
        user_id: UserId,
        candidate_key: String,
    ) -> Result<AuthToken, BizDirError> {
        sqlx::query(INSERT_TOKEN)
            .bind(&candidate_key)
            .bind(user_id.as_i64())
            .bind(time::now().to_rfc3339())
            .execute(&self.pool)
            .await
            .map_err(StorageError::from)?;

        let row: TokenWrapper = sqlx::query_as(SELECT_TOKEN_BY_USER)
            .bind(user_id.as_i64())
            .fetch_one(&self.pool)
            .await
            .map_err(StorageError::from)?;

        Ok(row.0)
    }

    async fn find_by_token(&self, key: &str) -> Result<Option<User>, BizDirError> {
        let row: Option<Wrapper> = sqlx::query_as(SELECT_BY_TOKEN)
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::from)?;

        Ok(Wrapper::maybe(row))
    }
}
