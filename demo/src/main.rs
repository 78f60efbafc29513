//! Demo server: an in-memory `items` resource, an optional schema-driven
//! resource, and the same items table over PostgreSQL when `DATABASE_URL` is set.
//!
//! Run from repo root: `cargo run -p autocrud-demo`

use autocrud::logging::DEFAULT_FILTER;
use autocrud::{
    common_routes, ensure_database_exists, header_provider, init_tracing, load_schema_file, CrudRoute, CrudRouter,
    DynamicRecord, MemoryStorage, PgStorage, Resource, RouteDependencies, ServerConfig, TableMapping, USER_HEADER,
};
use axum::Router;
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use uuid::Uuid;

#[derive(Clone, Debug, Serialize, Deserialize)]
struct Item {
    id: Uuid,
    name: String,
    price: f64,
    in_stock: bool,
}

#[derive(Serialize, Deserialize)]
struct ItemCreate {
    name: String,
    price: f64,
    in_stock: bool,
}

#[derive(Serialize, Deserialize)]
struct ItemUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    in_stock: Option<bool>,
}

impl Resource for Item {
    type Id = Uuid;
    type Create = ItemCreate;
    type Update = ItemUpdate;
}

const CREATE_ITEMS_TABLE: &str = "CREATE TABLE IF NOT EXISTS items (
    id UUID PRIMARY KEY,
    name TEXT NOT NULL,
    price DOUBLE PRECISION NOT NULL,
    in_stock BOOLEAN NOT NULL
)";

/// Writes require the caller to identify themselves.
fn write_dependencies() -> RouteDependencies {
    RouteDependencies::new()
        .route(CrudRoute::Create, header_provider("user", USER_HEADER))
        .route(CrudRoute::Update, header_provider("user", USER_HEADER))
        .route(CrudRoute::Delete, header_provider("user", USER_HEADER))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = ServerConfig::from_env()?;
    init_tracing(DEFAULT_FILTER);

    let items = CrudRouter::<Item, MemoryStorage<Item>>::new(MemoryStorage::new())
        .dependencies(write_dependencies())
        .body_limit(config.body_limit)
        .prefix("/api/v1/items")
        .build()?;
    let mut app: Router = common_routes().merge(items);

    if let Some(path) = &config.schema_path {
        let schema = load_schema_file(path).await?;
        tracing::info!(model = %schema.name, path = %path.display(), "mounting schema resource");
        let records = CrudRouter::<DynamicRecord, MemoryStorage<DynamicRecord>>::new(MemoryStorage::new())
            .schema(schema)
            .body_limit(config.body_limit)
            .prefix("/api/v1/records")
            .build()?;
        app = app.merge(records);
    }

    if let Some(database_url) = &config.database_url {
        ensure_database_exists(database_url).await?;
        let pool = sqlx::postgres::PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect(database_url)
            .await?;
        sqlx::query(CREATE_ITEMS_TABLE).execute(&pool).await?;
        let mapping = TableMapping::new("items")
            .id_column("id", Some("uuid"))
            .column("name")
            .typed_column("price", "float8")
            .typed_column("in_stock", "bool");
        let pg_items = CrudRouter::<Item, PgStorage<Item>>::new(PgStorage::new(pool, mapping).generate_ids())
            .dependencies(write_dependencies())
            .body_limit(config.body_limit)
            .prefix("/api/v1/pg/items")
            .build()?;
        app = app.merge(pg_items);
    }

    let listener = TcpListener::bind(config.bind).await?;
    tracing::info!("autocrud demo listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}
