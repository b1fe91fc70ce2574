//! `SQLite` implementation of [`BusinessRepository`].
//!
//! Relationship rows live in `business_categories` and `business_services`.
//! Every write touching a business and its links runs in one transaction.

use std::collections::BTreeSet;
use std::str::FromStr;

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, QueryBuilder, Row, Sqlite, SqliteConnection, SqlitePool};

use bizdir_app::ports::BusinessRepository;
use bizdir_domain::attribute::AttributeKind;
use bizdir_domain::business::{Business, BusinessDraft, BusinessFilter};
use bizdir_domain::error::BizDirError;
use bizdir_domain::id::{AttributeId, BusinessId, UserId};

use crate::error::{StorageError, decode_error};

/// Wrapper for converting database rows into domain [`Business`].
struct Wrapper(Business);

impl Wrapper {
    fn maybe(value: Option<Self>) -> Option<Business> {
        value.map(|w| w.0)
    }
}

impl<'r> FromRow<'r, SqliteRow> for Wrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let category_ids: Option<String> = row.try_get("category_ids")?;
        let service_ids: Option<String> = row.try_get("service_ids")?;

        Ok(Self(Business {
            id: BusinessId::new(row.try_get("id")?),
            owner_id: UserId::new(row.try_get("user_id")?),
            name: row.try_get("name")?,
            image: row.try_get("image")?,
            categories: parse_ids(category_ids.as_deref())?,
            services: parse_ids(service_ids.as_deref())?,
        }))
    }
}

/// Decode a `group_concat` column into an id set.
fn parse_ids(raw: Option<&str>) -> Result<BTreeSet<AttributeId>, sqlx::Error> {
    raw.unwrap_or_default()
        .split(',')
        .filter(|item| !item.is_empty())
        .map(|item| AttributeId::from_str(item).map_err(decode_error))
        .collect()
}

const SELECT: &str = r"
    SELECT b.id, b.user_id, b.name, b.image,
        (SELECT group_concat(category_id) FROM business_categories
            WHERE business_id = b.id) AS category_ids,
        (SELECT group_concat(service_id) FROM business_services
            WHERE business_id = b.id) AS service_ids
    FROM businesses b
";
const INSERT: &str = "INSERT INTO businesses (user_id, name) VALUES (?, ?)";
const UPDATE_NAME: &str = "UPDATE businesses SET name = ? WHERE id = ? AND user_id = ?";
const UPDATE_IMAGE: &str = "UPDATE businesses SET image = ? WHERE id = ? AND user_id = ?";
const DELETE_BY_ID: &str = "DELETE FROM businesses WHERE id = ? AND user_id = ?";

const INSERT_CATEGORY_LINK: &str =
    "INSERT INTO business_categories (business_id, category_id) VALUES (?, ?)";
const INSERT_SERVICE_LINK: &str =
    "INSERT INTO business_services (business_id, service_id) VALUES (?, ?)";
const DELETE_CATEGORY_LINKS: &str = "DELETE FROM business_categories WHERE business_id = ?";
const DELETE_SERVICE_LINKS: &str = "DELETE FROM business_services WHERE business_id = ?";

const fn link_table(kind: AttributeKind) -> (&'static str, &'static str) {
    match kind {
        AttributeKind::Category => ("business_categories", "category_id"),
        AttributeKind::Service => ("business_services", "service_id"),
    }
}

/// Replace both relationship sets of `id` with the draft's.
async fn replace_links(
    conn: &mut SqliteConnection,
    id: BusinessId,
    draft: &BusinessDraft,
) -> Result<(), sqlx::Error> {
    sqlx::query(DELETE_CATEGORY_LINKS)
        .bind(id.as_i64())
        .execute(&mut *conn)
        .await?;
    sqlx::query(DELETE_SERVICE_LINKS)
        .bind(id.as_i64())
        .execute(&mut *conn)
        .await?;

    for category in &draft.categories {
        sqlx::query(INSERT_CATEGORY_LINK)
            .bind(id.as_i64())
            .bind(category.as_i64())
            .execute(&mut *conn)
            .await?;
    }
    for service in &draft.services {
        sqlx::query(INSERT_SERVICE_LINK)
            .bind(id.as_i64())
            .bind(service.as_i64())
            .execute(&mut *conn)
            .await?;
    }

    Ok(())
}

/// `SQLite`-backed business repository.
#[derive(Clone)]
pub struct SqliteBusinessRepository {
    pool: SqlitePool,
}

impl SqliteBusinessRepository {
    /// Create a new repository using the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl BusinessRepository for SqliteBusinessRepository {
    async fn create(&self, owner: UserId, draft: BusinessDraft) -> Result<Business, BizDirError> {
        let mut tx = self.pool.begin().await.map_err(StorageError::from)?;

        let done = sqlx::query(INSERT)
            .bind(owner.as_i64())
            .bind(&draft.name)
            .execute(&mut *tx)
            .await
            .map_err(StorageError::from)?;
        let id = BusinessId::new(done.last_insert_rowid());

        replace_links(&mut tx, id, &draft)
            .await
            .map_err(StorageError::from)?;
        tx.commit().await.map_err(StorageError::from)?;

        Ok(Business {
            id,
            owner_id: owner,
            name: draft.name,
            image: None,
            categories: draft.categories,
            services: draft.services,
        })
    }

    async fn get_by_id(
        &self,
        owner: UserId,
        id: BusinessId,
    ) -> Result<Option<Business>, BizDirError> {
        let row: Option<Wrapper> = QueryBuilder::<Sqlite>::new(SELECT)
            .push(" WHERE b.id = ")
            .push_bind(id.as_i64())
            .push(" AND b.user_id = ")
            .push_bind(owner.as_i64())
            .build_query_as()
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::from)?;

        Ok(Wrapper::maybe(row))
    }

    async fn list(
        &self,
        owner: UserId,
        filter: &BusinessFilter,
    ) -> Result<Vec<Business>, BizDirError> {
        let mut builder = QueryBuilder::<Sqlite>::new(SELECT);
        builder.push(" WHERE b.user_id = ");
        builder.push_bind(owner.as_i64());

        for kind in [AttributeKind::Category, AttributeKind::Service] {
            let Some(wanted) = filter.links(kind) else {
                continue;
            };
            let (table, column) = link_table(kind);
            builder.push(format!(
                " AND EXISTS (SELECT 1 FROM {table} l WHERE l.business_id = b.id AND l.{column} IN ("
            ));
            let mut separated = builder.separated(", ");
            for id in wanted {
                separated.push_bind(id.as_i64());
            }
            separated.push_unseparated("))");
        }

        builder.push(" ORDER BY b.name DESC, b.id DESC");

        let rows: Vec<Wrapper> = builder
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::from)?;

        Ok(rows.into_iter().map(|w| w.0).collect())
    }

    async fn update(
        &self,
        owner: UserId,
        id: BusinessId,
        draft: BusinessDraft,
    ) -> Result<Option<Business>, BizDirError> {
        let mut tx = self.pool.begin().await.map_err(StorageError::from)?;

        let done = sqlx::query(UPDATE_NAME)
            .bind(&draft.name)
            .bind(id.as_i64())
            .bind(owner.as_i64())
            .execute(&mut *tx)
            .await
            .map_err(StorageError::from)?;
        if done.rows_affected() == 0 {
            return Ok(None);
        }

        replace_links(&mut tx, id, &draft)
            .await
            .map_err(StorageError::from)?;
        tx.commit().await.map_err(StorageError::from)?;

        self.get_by_id(owner, id).await
    }

    async fn set_image(
        &self,
        owner: UserId,
        id: BusinessId,
        path: String,
    ) -> Result<Option<Business>, BizDirError> {
        let done = sqlx::query(UPDATE_IMAGE)
            .bind(&path)
            .bind(id.as_i64())
            .bind(owner.as_i64())
            .execute(&self.pool)
            .await
            .map_err(StorageError::from)?;
        if done.rows_affected() == 0 {
            return Ok(None);
        }

        self.get_by_id(owner, id).await
    }

    async fn delete(&self, owner: UserId, id: BusinessId) -> Result<bool, BizDirError> {
        let done = sqlx::query(DELETE_BY_ID)
            .bind(id.as_i64())
            .bind(owner.as_i64())
            .execute(&self.pool)
            .await
            .map_err(StorageError::from)?;

        Ok(done.rows_affected() > 0)
    }
}
