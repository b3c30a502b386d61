//! PostgreSQL store: parameterized SQL per entity with soft-delete
//! predicates, plus database and table bootstrap.

use async_trait::async_trait;
use sqlx::postgres::{PgArguments, PgRow};
use sqlx::{ConnectOptions, PgPool, Row};
use std::marker::PhantomData;
use std::str::FromStr;
use uuid::Uuid;

use super::{EntityStore, Scope};
use crate::domain::{CatalogEntity, Category, Genre, Record};
use crate::error::AppError;

pub type PgQuery<'q> = sqlx::query::Query<'q, sqlx::Postgres, PgArguments>;

/// SQL mapping for one entity type: table name, attribute columns, and the
/// bind/decode hooks the generic store builds its statements around.
pub trait PgEntity: CatalogEntity {
    const TABLE: &'static str;
    /// Attribute columns, in bind order, between `id` and the timestamps.
    const DATA_COLUMNS: &'static [&'static str];
    /// Attribute column definitions for bootstrap DDL.
    const DATA_COLUMN_DDL: &'static str;

    /// Bind the attribute columns in `DATA_COLUMNS` order.
    fn bind_data<'q>(&'q self, query: PgQuery<'q>) -> PgQuery<'q>;
    fn decode_row(row: &PgRow) -> Result<Self, sqlx::Error>;
}

impl PgEntity for Category {
    const TABLE: &'static str = "categories";
    const DATA_COLUMNS: &'static [&'static str] = &["name", "description", "is_active"];
    const DATA_COLUMN_DDL: &'static str =
        "name VARCHAR(255) NOT NULL, description TEXT, is_active BOOLEAN NOT NULL DEFAULT TRUE";

    fn bind_data<'q>(&'q self, query: PgQuery<'q>) -> PgQuery<'q> {
        query
            .bind(&self.name)
            .bind(&self.description)
            .bind(self.is_active)
    }

    fn decode_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        Ok(Category {
            name: row.try_get("name")?,
            description: row.try_get("description")?,
            is_active: row.try_get("is_active")?,
        })
    }
}

impl PgEntity for Genre {
    const TABLE: &'static str = "genres";
    const DATA_COLUMNS: &'static [&'static str] = &["name", "is_active"];
    const DATA_COLUMN_DDL: &'static str =
        "name VARCHAR(255) NOT NULL, is_active BOOLEAN NOT NULL DEFAULT TRUE";

    fn bind_data<'q>(&'q self, query: PgQuery<'q>) -> PgQuery<'q> {
        query.bind(&self.name).bind(self.is_active)
    }

    fn decode_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        Ok(Genre {
            name: row.try_get("name")?,
            is_active: row.try_get("is_active")?,
        })
    }
}

pub struct PgEntityStore<T> {
    pool: PgPool,
    _entity: PhantomData<fn() -> T>,
}

impl<T> Clone for PgEntityStore<T> {
    fn clone(&self) -> Self {
        PgEntityStore {
            pool: self.pool.clone(),
            _entity: PhantomData,
        }
    }
}

impl<T: PgEntity> PgEntityStore<T> {
    pub fn new(pool: PgPool) -> Self {
        PgEntityStore {
            pool,
            _entity: PhantomData,
        }
    }

    fn column_list() -> String {
        let mut cols = vec!["id"];
        cols.extend_from_slice(T::DATA_COLUMNS);
        cols.extend_from_slice(&["created_at", "updated_at", "deleted_at"]);
        cols.join(", ")
    }

    fn insert_sql() -> String {
        let placeholders: Vec<String> = (1..=T::DATA_COLUMNS.len() + 4)
            .map(|n| format!("${}", n))
            .collect();
        format!(
            "INSERT INTO {} ({}) VALUES ({})",
            T::TABLE,
            Self::column_list(),
            placeholders.join(", ")
        )
    }

    fn select_sql(scope: Scope) -> String {
        format!(
            "SELECT {} FROM {} WHERE id = $1{}",
            Self::column_list(),
            T::TABLE,
            scope_predicate(scope, " AND ")
        )
    }

    fn list_sql(scope: Scope) -> String {
        format!(
            "SELECT {} FROM {}{} ORDER BY created_at",
            Self::column_list(),
            T::TABLE,
            scope_predicate(scope, " WHERE ")
        )
    }

    fn update_sql() -> String {
        let assignments: Vec<String> = T::DATA_COLUMNS
            .iter()
            .enumerate()
            .map(|(i, col)| format!("{} = ${}", col, i + 2))
            .collect();
        let next = T::DATA_COLUMNS.len() + 2;
        format!(
            "UPDATE {} SET {}, updated_at = ${}, deleted_at = ${} WHERE id = $1",
            T::TABLE,
            assignments.join(", "),
            next,
            next + 1
        )
    }
}

fn scope_predicate(scope: Scope, keyword: &str) -> String {
    match scope {
        Scope::Active => format!("{}deleted_at IS NULL", keyword),
        Scope::WithDeleted => String::new(),
    }
}

fn record_from_row<T: PgEntity>(row: &PgRow) -> Result<Record<T>, sqlx::Error> {
    Ok(Record {
        id: row.try_get("id")?,
        attrs: T::decode_row(row)?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
        deleted_at: row.try_get("deleted_at")?,
    })
}

#[async_trait]
impl<T: PgEntity> EntityStore<T> for PgEntityStore<T> {
    async fn insert(&self, record: Record<T>) -> Result<Record<T>, AppError> {
        let sql = Self::insert_sql();
        tracing::debug!(sql = %sql, id = %record.id, "insert");
        let query = sqlx::query(&sql).bind(record.id);
        record
            .attrs
            .bind_data(query)
            .bind(record.created_at)
            .bind(record.updated_at)
            .bind(record.deleted_at)
            .execute(&self.pool)
            .await?;
        Ok(record)
    }

    async fn fetch(&self, id: Uuid, scope: Scope) -> Result<Option<Record<T>>, AppError> {
        let sql = Self::select_sql(scope);
        tracing::debug!(sql = %sql, id = %id, "fetch");
        let row = sqlx::query(&sql).bind(id).fetch_optional(&self.pool).await?;
        row.map(|r| record_from_row(&r)).transpose().map_err(AppError::Db)
    }

    async fn list(&self, scope: Scope) -> Result<Vec<Record<T>>, AppError> {
        let sql = Self::list_sql(scope);
        tracing::debug!(sql = %sql, "list");
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;
        rows.iter()
            .map(|r| record_from_row(r))
            .collect::<Result<Vec<_>, _>>()
            .map_err(AppError::Db)
    }

    async fn save(&self, record: &Record<T>) -> Result<(), AppError> {
        let sql = Self::update_sql();
        tracing::debug!(sql = %sql, id = %record.id, "save");
        let query = sqlx::query(&sql).bind(record.id);
        let result = record
            .attrs
            .bind_data(query)
            .bind(record.updated_at)
            .bind(record.deleted_at)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(record.id.to_string()));
        }
        Ok(())
    }

    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").fetch_optional(&self.pool).await?;
        Ok(())
    }
}

/// Create the catalog tables if they do not exist. Idempotent; call before
/// serving traffic.
pub async fn ensure_catalog_tables(pool: &PgPool) -> Result<(), AppError> {
    create_entity_table::<Category>(pool).await?;
    create_entity_table::<Genre>(pool).await
}

async fn create_entity_table<T: PgEntity>(pool: &PgPool) -> Result<(), AppError> {
    let ddl = format!(
        r#"
        CREATE TABLE IF NOT EXISTS {} (
            id UUID PRIMARY KEY,
            {},
            created_at TIMESTAMPTZ NOT NULL,
            updated_at TIMESTAMPTZ NOT NULL,
            deleted_at TIMESTAMPTZ
        )
        "#,
        T::TABLE,
        T::DATA_COLUMN_DDL
    );
    sqlx::query(&ddl).execute(pool).await?;
    Ok(())
}

/// Ensure the database in `database_url` exists; create it if not. Connects
/// to the default `postgres` database to run CREATE DATABASE. Call before
/// creating the main pool.
pub async fn ensure_database_exists(database_url: &str) -> Result<(), AppError> {
    let (admin_url, db_name) = parse_db_name_from_url(database_url)?;
    if db_name.is_empty() || db_name == "postgres" {
        return Ok(());
    }
    let opts = sqlx::postgres::PgConnectOptions::from_str(&admin_url)
        .map_err(|e| AppError::BadRequest(format!("invalid DATABASE_URL: {}", e)))?;
    let mut conn: sqlx::PgConnection = opts.connect().await.map_err(AppError::Db)?;
    let exists: (bool,) =
        sqlx::query_as("SELECT EXISTS(SELECT 1 FROM pg_database WHERE datname = $1)")
            .bind(&db_name)
            .fetch_one(&mut conn)
            .await
            .map_err(AppError::Db)?;
    if !exists.0 {
        let quoted = quote_ident(&db_name);
        sqlx::query(&format!("CREATE DATABASE {}", quoted))
            .execute(&mut conn)
            .await
            .map_err(AppError::Db)?;
    }
    Ok(())
}

fn parse_db_name_from_url(url: &str) -> Result<(String, String), AppError> {
    let path_start = url
        .rfind('/')
        .ok_or_else(|| AppError::BadRequest("DATABASE_URL: no path".into()))?
        + 1;
    let path_and_query = url.get(path_start..).unwrap_or("");
    let db_name = path_and_query.split('?').next().unwrap_or("").trim();
    let base = url.get(..path_start).unwrap_or(url);
    let admin_url = format!("{}postgres", base);
    Ok((admin_url, db_name.to_string()))
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('\\', "\\\\").replace('"', "\\\""))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_statements_cover_every_column() {
        let sql = PgEntityStore::<Category>::insert_sql();
        assert_eq!(
            sql,
            "INSERT INTO categories (id, name, description, is_active, created_at, \
             updated_at, deleted_at) VALUES ($1, $2, $3, $4, $5, $6, $7)"
        );

        let sql = PgEntityStore::<Category>::update_sql();
        assert_eq!(
            sql,
            "UPDATE categories SET name = $2, description = $3, is_active = $4, \
             updated_at = $5, deleted_at = $6 WHERE id = $1"
        );
    }

    #[test]
    fn active_scope_filters_soft_deleted_rows() {
        let sql = PgEntityStore::<Genre>::select_sql(Scope::Active);
        assert!(sql.ends_with("WHERE id = $1 AND deleted_at IS NULL"));

        let sql = PgEntityStore::<Genre>::select_sql(Scope::WithDeleted);
        assert!(sql.ends_with("WHERE id = $1"));

        let sql = PgEntityStore::<Genre>::list_sql(Scope::Active);
        assert!(sql.contains("WHERE deleted_at IS NULL"));
    }

    #[test]
    fn admin_url_swaps_database_name() {
        let (admin, name) =
            parse_db_name_from_url("postgres://localhost:5432/catalog?sslmode=disable").unwrap();
        assert_eq!(admin, "postgres://localhost:5432/postgres");
        assert_eq!(name, "catalog");
    }
}
