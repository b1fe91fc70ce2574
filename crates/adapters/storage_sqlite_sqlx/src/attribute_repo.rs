//! `SQLite` implementation of [`AttributeRepository`].
//!
//! Categories and services live in twin tables; the queries differ only in
//! table and link column names.

use std::collections::BTreeSet;

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, QueryBuilder, Row, Sqlite, SqlitePool};

use bizdir_app::ports::AttributeRepository;
use bizdir_domain::attribute::{Attribute, AttributeKind, NewAttribute};
use bizdir_domain::error::BizDirError;
use bizdir_domain::id::{AttributeId, UserId};

use crate::error::{StorageError, decode_error};

/// Wrapper for converting database rows into domain [`Attribute`].
struct Wrapper(Attribute);

impl<'r> FromRow<'r, SqliteRow> for Wrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let kind: String = row.try_get("kind")?;
        let kind = match kind.as_str() {
            "category" => AttributeKind::Category,
            "service" => AttributeKind::Service,
            other => return Err(decode_error(UnknownKind(other.to_string()))),
        };

        Ok(Self(Attribute {
            id: AttributeId::new(row.try_get("id")?),
            owner_id: UserId::new(row.try_get("user_id")?),
            kind,
            name: row.try_get("name")?,
        }))
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown attribute kind {0:?}")]
struct UnknownKind(String);

/// Per-kind SQL statements.
struct Queries {
    insert: &'static str,
    select: &'static str,
    list: &'static str,
    list_assigned: &'static str,
}

const CATEGORY_QUERIES: Queries = Queries {
    insert: "INSERT INTO categories (user_id, name) VALUES (?, ?)",
    select: "SELECT id, user_id, name, 'category' AS kind FROM categories",
    list: r"
        SELECT id, user_id, name, 'category' AS kind FROM categories
        WHERE user_id = ?
        ORDER BY name DESC, id DESC
    ",
    list_assigned: r"
        SELECT DISTINCT c.id, c.user_id, c.name, 'category' AS kind
        FROM categories c
        JOIN business_categories bc ON bc.category_id = c.id
        JOIN businesses b ON b.id = bc.business_id
        WHERE c.user_id = ? AND b.user_id = ?
        ORDER BY c.name DESC, c.id DESC
    ",
};

const SERVICE_QUERIES: Queries = Queries {
    insert: "INSERT INTO services (user_id, name) VALUES (?, ?)",
    select: "SELECT id, user_id, name, 'service' AS kind FROM services",
    list: r"
        SELECT id, user_id, name, 'service' AS kind FROM services
        WHERE user_id = ?
        ORDER BY name DESC, id DESC
    ",
    list_assigned: r"
        SELECT DISTINCT s.id, s.user_id, s.name, 'service' AS kind
        FROM services s
        JOIN business_services bs ON bs.service_id = s.id
        JOIN businesses b ON b.id = bs.business_id
        WHERE s.user_id = ? AND b.user_id = ?
        ORDER BY s.name DESC, s.id DESC
    ",
};

fn queries(kind: AttributeKind) -> &'static Queries {
    match kind {
        AttributeKind::Category => &CATEGORY_QUERIES,
        AttributeKind::Service => &SERVICE_QUERIES,
    }
}

/// `SQLite`-backed category and service repository.
#[derive(Clone)]
pub struct SqliteAttributeRepository {
    pool: SqlitePool,
}

impl SqliteAttributeRepository {
    /// Create a new repository using the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl AttributeRepository for SqliteAttributeRepository {
    async fn create(
        &self,
        owner: UserId,
        attribute: NewAttribute,
    ) -> Result<Attribute, BizDirError> {
        let done = sqlx::query(queries(attribute.kind).insert)
            .bind(owner.as_i64())
            .bind(&attribute.name)
            .execute(&self.pool)
            .await
            .map_err(StorageError::from)?;

        Ok(Attribute {
            id: AttributeId::new(done.last_insert_rowid()),
            owner_id: owner,
            kind: attribute.kind,
            name: attribute.name,
        })
    }

    async fn list(
        &self,
        owner: UserId,
        kind: AttributeKind,
        assigned_only: bool,
    ) -> Result<Vec<Attribute>, BizDirError> {
        let queries = queries(kind);
        let rows: Vec<Wrapper> = if assigned_only {
            sqlx::query_as(queries.list_assigned)
                .bind(owner.as_i64())
                .bind(owner.as_i64())
                .fetch_all(&self.pool)
                .await
        } else {
            sqlx::query_as(queries.list)
                .bind(owner.as_i64())
                .fetch_all(&self.pool)
                .await
        }
        .map_err(StorageError::from)?;

        Ok(rows.into_iter().map(|w| w.0).collect())
    }

    async fn find_by_ids(
        &self,
        owner: UserId,
        kind: AttributeKind,
        ids: &BTreeSet<AttributeId>,
    ) -> Result<Vec<Attribute>, BizDirError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut builder: QueryBuilder<'_, Sqlite> = QueryBuilder::new(queries(kind).select);
        builder.push(" WHERE user_id = ");
        builder.push_bind(owner.as_i64());
        builder.push(" AND id IN (");
        let mut separated = builder.separated(", ");
        for id in ids {
            separated.push_bind(id.as_i64());
        }
        separated.push_unseparated(") ORDER BY id");

        let rows: Vec<Wrapper> = builder
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::from)?;

        Ok(rows.into_iter().map(|w| w.0).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::Config;

    async fn setup() -> (SqliteAttributeRepository, SqlitePool) {
        let db = Config {
            database_url: "sqlite::memory:".to_string(),
        }
        .build()
        .await
        .unwrap();
        let pool = db.pool().clone();
        for email in ["one@test.com", "two@test.com"] {
            sqlx::query("INSERT INTO users (email, password_hash) VALUES (?, 'x')")
                .bind(email)
                .execute(&pool)
                .await
                .unwrap();
        }
        (SqliteAttributeRepository::new(pool.clone()), pool)
    }

    const OWNER: UserId = UserId::new(1);
    const OTHER: UserId = UserId::new(2);

    async fn create(
        repo: &SqliteAttributeRepository,
        owner: UserId,
        kind: AttributeKind,
        name: &str,
    ) -> Attribute {
        repo.create(owner, NewAttribute::new(kind, Some(name.into())).unwrap())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn should_list_owner_attributes_by_name_descending() {
        let (repo, _) = setup().await;
        create(&repo, OWNER, AttributeKind::Category, "Cooking").await;
        create(&repo, OWNER, AttributeKind::Category, "Programming").await;
        create(&repo, OTHER, AttributeKind::Category, "Zoology").await;
        create(&repo, OWNER, AttributeKind::Service, "Frontend").await;

        let names: Vec<String> = repo
            .list(OWNER, AttributeKind::Category, false)
            .await
            .unwrap()
            .into_iter()
            .map(|a| a.name)
            .collect();
        assert_eq!(names, ["Programming", "Cooking"]);
    }

    #[tokio::test]
    async fn should_return_only_linked_attributes_when_assigned_only() {
        let (repo, pool) = setup().await;
        let linked = create(&repo, OWNER, AttributeKind::Service, "Service 1").await;
        create(&repo, OWNER, AttributeKind::Service, "Service 2").await;

        sqlx::query("INSERT INTO businesses (id, user_id, name) VALUES (10, 1, 'Biz')")
            .execute(&pool)
            .await
            .unwrap();
        sqlx::query("INSERT INTO business_services (business_id, service_id) VALUES (10, ?)")
            .bind(linked.id.as_i64())
            .execute(&pool)
            .await
            .unwrap();

        let listed = repo.list(OWNER, AttributeKind::Service, true).await.unwrap();
        assert_eq!(listed, vec![linked]);
    }

    #[tokio::test]
    async fn should_list_linked_attribute_once_when_shared_by_businesses() {
        let (repo, pool) = setup().await;
        let linked = create(&repo, OWNER, AttributeKind::Category, "Shared").await;

        for business_id in [10, 11] {
            sqlx::query("INSERT INTO businesses (id, user_id, name) VALUES (?, 1, 'Biz')")
                .bind(business_id)
                .execute(&pool)
                .await
                .unwrap();
            sqlx::query(
                "INSERT INTO business_categories (business_id, category_id) VALUES (?, ?)",
            )
            .bind(business_id)
            .bind(linked.id.as_i64())
            .execute(&pool)
            .await
            .unwrap();
        }

        let listed = repo
            .list(OWNER, AttributeKind::Category, true)
            .await
            .unwrap();
        assert_eq!(listed, vec![linked]);
    }

    #[tokio::test]
    async fn should_resolve_only_owner_ids_of_requested_kind() {
        let (repo, _) = setup().await;
        let mine = create(&repo, OWNER, AttributeKind::Category, "Mine").await;
        let foreign = create(&repo, OTHER, AttributeKind::Category, "Foreign").await;
        let service = create(&repo, OWNER, AttributeKind::Service, "Service").await;

        let ids = BTreeSet::from([mine.id, foreign.id, service.id, AttributeId::new(999)]);
        let found = repo
            .find_by_ids(OWNER, AttributeKind::Category, &ids)
            .await
            .unwrap();
        assert_eq!(found, vec![mine]);
    }

    #[tokio::test]
    async fn should_return_empty_when_no_ids_requested() {
        let (repo, _) = setup().await;
        let found = repo
            .find_by_ids(OWNER, AttributeKind::Service, &BTreeSet::new())
            .await
            .unwrap();
        assert!(found.is_empty());
    }
}
