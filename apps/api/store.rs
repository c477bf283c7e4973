use anyhow::{Context, Result};
use async_trait::async_trait;
use govhub_db::models::post;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use std::time::Duration;
use tracing::debug;
use utils::errors::{DATABASE_CONNECTION_FAILED, DATABASE_FETCH_POSTS_FAILED};

/// Off-chain post metadata lookup, scoped to a proposal-type collection.
#[async_trait]
pub trait PostStore: Send + Sync {
    async fn posts_by_ids(&self, collection: &str, ids: &[String]) -> Result<Vec<post::Model>>;
}

pub struct DbPostStore {
    conn: DatabaseConnection,
}

impl DbPostStore {
    pub fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl PostStore for DbPostStore {
    async fn posts_by_ids(&self, collection: &str, ids: &[String]) -> Result<Vec<post::Model>> {
        debug!(collection = %collection, ids = ?ids, "Fetching posts by id");

        post::Entity::find()
            .filter(post::Column::ProposalType.eq(collection))
            .filter(post::Column::Id.is_in(ids.iter().map(String::as_str)))
            .all(&self.conn)
            .await
            .context(DATABASE_FETCH_POSTS_FAILED)
    }
}

pub async fn connect(database_url: &str) -> Result<DatabaseConnection> {
    let mut opt = sea_orm::ConnectOptions::new(database_url.to_string());
    opt.max_connections(25)
        .min_connections(5)
        .connect_timeout(Duration::from_secs(15))
        .acquire_timeout(Duration::from_secs(30))
        .idle_timeout(Duration::from_secs(5 * 60))
        .max_lifetime(Duration::from_secs(30 * 60))
        .sqlx_logging(false);

    sea_orm::Database::connect(opt)
        .await
        .context(DATABASE_CONNECTION_FAILED)
}
