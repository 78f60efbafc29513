//! Pass-through PostgreSQL backend: each operation is one statement against a mapped table.

use crate::deps::Injected;
use crate::error::AppError;
use crate::model::{present_fields, GenerateId, Resource};
use crate::sql::{self, PgBindValue, QueryBuf, TableMapping};
use crate::storage::StorageBackend;
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use sqlx::ConnectOptions;
use sqlx::PgPool;
use std::any::TypeId;
use std::marker::PhantomData;
use std::str::FromStr;

fn generated_id<I: GenerateId + Serialize>() -> Result<Value, AppError> {
    Ok(serde_json::to_value(I::generate())?)
}

/// Postgres type of common id types, so the id parameter is cast instead of bound as text.
fn pg_id_type<I: 'static>() -> Option<&'static str> {
    let id = TypeId::of::<I>();
    if id == TypeId::of::<uuid::Uuid>() {
        Some("uuid")
    } else if id == TypeId::of::<i64>() {
        Some("int8")
    } else if id == TypeId::of::<i32>() {
        Some("int4")
    } else {
        None
    }
}

fn with_id_type<I: 'static>(mut mapping: TableMapping) -> TableMapping {
    if mapping.id_type.is_none() {
        mapping.id_type = pg_id_type::<I>().map(String::from);
    }
    mapping
}

pub struct PgStorage<M: Resource> {
    pool: PgPool,
    mapping: TableMapping,
    /// Set when ids are assigned by the application instead of a column default.
    id_generator: Option<fn() -> Result<Value, AppError>>,
    _model: PhantomData<fn() -> M>,
}

impl<M: Resource> PgStorage<M> {
    /// An unset `mapping.id_type` is filled in for `Uuid`, `i64` and `i32` ids.
    /// Other id types bind as text unless `id_column(.., Some(type))` says otherwise.
    pub fn new(pool: PgPool, mapping: TableMapping) -> Self {
        PgStorage {
            pool,
            mapping: with_id_type::<M::Id>(mapping),
            id_generator: None,
            _model: PhantomData,
        }
    }

    /// Generate ids in the application (for tables without an id default).
    pub fn generate_ids(mut self) -> Self
    where
        M::Id: GenerateId,
    {
        self.id_generator = Some(generated_id::<M::Id>);
        self
    }

    async fn fetch_optional(&self, q: &QueryBuf) -> Result<Option<M>, AppError> {
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let mut query = sqlx::query(&q.sql);
        for p in &q.params {
            query = query.bind(PgBindValue::from_json(p));
        }
        let row = query.fetch_optional(&self.pool).await?;
        row.map(|r| decode_row::<M>(&r)).transpose()
    }

    async fn fetch_all(&self, q: &QueryBuf) -> Result<Vec<M>, AppError> {
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let mut query = sqlx::query(&q.sql);
        for p in &q.params {
            query = query.bind(PgBindValue::from_json(p));
        }
        let rows = query.fetch_all(&self.pool).await?;
        rows.iter().map(decode_row::<M>).collect()
    }

    async fn execute(&self, q: &QueryBuf) -> Result<u64, AppError> {
        tracing::debug!(sql = %q.sql, params = ?q.params, "execute");
        let mut query = sqlx::query(&q.sql);
        for p in &q.params {
            query = query.bind(PgBindValue::from_json(p));
        }
        Ok(query.execute(&self.pool).await?.rows_affected())
    }
}

#[async_trait]
impl<M: Resource> StorageBackend<M> for PgStorage<M> {
    async fn list(&self, _injected: &Injected) -> Result<Vec<M>, AppError> {
        self.fetch_all(&sql::select_list(&self.mapping)).await
    }

    async fn create(&self, input: M::Create, _injected: &Injected) -> Result<M, AppError> {
        let mut body = match serde_json::to_value(input)? {
            Value::Object(m) => m,
            _ => return Err(AppError::Internal("create input must serialize to a JSON object".into())),
        };
        body.remove(&self.mapping.id_column);
        if let Some(generate) = self.id_generator {
            body.insert(self.mapping.id_column.clone(), generate()?);
        }
        let q = sql::insert(&self.mapping, &body);
        self.fetch_optional(&q)
            .await?
            .ok_or_else(|| AppError::Db(sqlx::Error::RowNotFound))
    }

    async fn get(&self, id: &M::Id, _injected: &Injected) -> Result<Option<M>, AppError> {
        let q = sql::select_by_id(&self.mapping, serde_json::to_value(id)?);
        self.fetch_optional(&q).await
    }

    async fn update(&self, id: &M::Id, input: M::Update, _injected: &Injected) -> Result<M, AppError> {
        let id_value = serde_json::to_value(id)?;
        let body = present_fields(serde_json::to_value(input)?, &self.mapping.id_column)?;
        let q = match sql::update(&self.mapping, id_value.clone(), &body) {
            Some(q) => q,
            None => sql::select_by_id(&self.mapping, id_value),
        };
        self.fetch_optional(&q)
            .await?
            .ok_or_else(|| AppError::NotFound(id.to_string()))
    }

    async fn delete(&self, id: &M::Id, _injected: &Injected) -> Result<(), AppError> {
        let q = sql::delete(&self.mapping, serde_json::to_value(id)?);
        let affected = self.execute(&q).await?;
        tracing::debug!(table = %self.mapping.table, id = %id, affected, "delete");
        Ok(())
    }
}

fn decode_row<M: Resource>(row: &sqlx::postgres::PgRow) -> Result<M, AppError> {
    Ok(serde_json::from_value(row_to_json(row))?)
}

fn row_to_json(row: &sqlx::postgres::PgRow) -> Value {
    use sqlx::Column;
    use sqlx::Row;
    let mut map = serde_json::Map::new();
    for col in row.columns() {
        let name = col.name();
        map.insert(name.to_string(), cell_to_value(row, name));
    }
    Value::Object(map)
}

fn cell_to_value(row: &sqlx::postgres::PgRow, name: &str) -> Value {
    use sqlx::Row;
    if let Ok(Some(n)) = row.try_get::<Option<i16>, _>(name) {
        return Value::Number(n.into());
    }
    if let Ok(Some(n)) = row.try_get::<Option<i32>, _>(name) {
        return Value::Number(n.into());
    }
    if let Ok(Some(n)) = row.try_get::<Option<i64>, _>(name) {
        return Value::Number(n.into());
    }
    if let Ok(Some(n)) = row.try_get::<Option<f32>, _>(name) {
        if let Some(n) = serde_json::Number::from_f64(n as f64) {
            return Value::Number(n);
        }
    }
    if let Ok(Some(n)) = row.try_get::<Option<f64>, _>(name) {
        if let Some(n) = serde_json::Number::from_f64(n) {
            return Value::Number(n);
        }
    }
    if let Ok(Some(b)) = row.try_get::<Option<bool>, _>(name) {
        return Value::Bool(b);
    }
    if let Ok(Some(u)) = row.try_get::<Option<uuid::Uuid>, _>(name) {
        return Value::String(u.to_string());
    }
    if let Ok(Some(d)) = row.try_get::<Option<chrono::DateTime<chrono::Utc>>, _>(name) {
        return Value::String(d.to_rfc3339());
    }
    if let Ok(Some(d)) = row.try_get::<Option<chrono::NaiveDateTime>, _>(name) {
        return Value::String(d.format("%Y-%m-%dT%H:%M:%S%.f").to_string());
    }
    if let Ok(Some(d)) = row.try_get::<Option<chrono::NaiveDate>, _>(name) {
        return Value::String(d.format("%Y-%m-%d").to_string());
    }
    if let Ok(Some(s)) = row.try_get::<Option<String>, _>(name) {
        return Value::String(s);
    }
    if let Ok(Some(j)) = row.try_get::<Option<Value>, _>(name) {
        return j;
    }
    Value::Null
}

/// Ensure the database in `database_url` exists; create it if not. Connects to the
/// default `postgres` database to run CREATE DATABASE. Call before creating the main pool.
pub async fn ensure_database_exists(database_url: &str) -> Result<(), AppError> {
    let (admin_url, db_name) = parse_db_name_from_url(database_url)?;
    if db_name.is_empty() || db_name == "postgres" {
        return Ok(());
    }
    let opts = sqlx::postgres::PgConnectOptions::from_str(&admin_url)
        .map_err(|e| AppError::BadRequest(format!("invalid DATABASE_URL: {}", e)))?;
    let mut conn: sqlx::PgConnection = opts.connect().await?;
    let exists: (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM pg_database WHERE datname = $1)")
        .bind(&db_name)
        .fetch_one(&mut conn)
        .await?;
    if !exists.0 {
        tracing::info!(database = %db_name, "creating database");
        sqlx::query(&format!("CREATE DATABASE {}", quote_ident(&db_name)))
            .execute(&mut conn)
            .await?;
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
    Ok((format!("{}postgres", base), db_name.to_string()))
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
