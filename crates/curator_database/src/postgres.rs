//! PostgreSQL metadata store.

use crate::models::{GalleryImageRow, NewBlocklistRow};
use crate::schema::{gallery_images, ingest_blocklist};
use crate::{DatabaseConfig, MetadataStore, normalize_record};
use curator_core::{GalleryCounts, GalleryImage, Orientation};
use curator_error::{CuratorResult, DatabaseError, DatabaseErrorKind};
use diesel::dsl::{count_star, exists, max};
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::upsert::excluded;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Connection pool type used by the Postgres store.
pub type PgPool = Pool<ConnectionManager<PgConnection>>;

/// Apply pending schema migrations.
///
/// # Errors
///
/// Returns a `Migration` error if any migration fails.
pub fn run_migrations(conn: &mut PgConnection) -> Result<Vec<String>, DatabaseError> {
    conn.run_pending_migrations(MIGRATIONS)
        .map(|versions| versions.iter().map(ToString::to_string).collect())
        .map_err(|e| DatabaseError::new(DatabaseErrorKind::Migration(e.to_string())))
}

/// Metadata store backed by PostgreSQL.
///
/// Every call checks a connection out of an r2d2 pool on the blocking
/// thread pool. The unique constraints in the schema reject conflicting
/// inserts from any process.
#[derive(Clone)]
pub struct PostgresMetadataStore {
    pool: PgPool,
}

impl std::fmt::Debug for PostgresMetadataStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostgresMetadataStore")
            .field("max_size", &self.pool.max_size())
            .finish_non_exhaustive()
    }
}

impl PostgresMetadataStore {
    /// Wrap an existing pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Build a pool from configuration, warm it up, and run migrations if
    /// enabled.
    ///
    /// # Errors
    ///
    /// Returns a configuration error without a URL, a `Connection` error if
    /// the pool cannot be built, or a `Migration` error.
    #[tracing::instrument(skip(config), fields(pool_size = *config.pool_size()))]
    pub async fn connect(config: &DatabaseConfig) -> CuratorResult<Self> {
        let url = config.resolved_url()?;
        let pool_size = (*config.pool_size()).max(1);
        let migrate = *config.run_migrations();

        let pool = tokio::task::spawn_blocking(move || -> Result<PgPool, DatabaseError> {
            let manager = ConnectionManager::<PgConnection>::new(url);
            let pool = Pool::builder()
                .max_size(pool_size)
                .build(manager)
                .map_err(|e| {
                    DatabaseError::new(DatabaseErrorKind::Connection(format!(
                        "Failed to create connection pool: {}",
                        e
                    )))
                })?;

            if migrate {
                let mut conn = pool
                    .get()
                    .map_err(|e| DatabaseError::new(DatabaseErrorKind::Connection(e.to_string())))?;
                let applied = run_migrations(&mut conn)?;
                if !applied.is_empty() {
                    tracing::info!(migrations = ?applied, "Applied pending migrations");
                }
            }
            Ok(pool)
        })
        .await
        .map_err(|e| DatabaseError::new(DatabaseErrorKind::Query(e.to_string())))??;

        tracing::info!("Connected Postgres metadata store");
        Ok(Self { pool })
    }

    /// Apply pending migrations through the pool.
    ///
    /// # Errors
    ///
    /// Returns a `Migration` error if any migration fails.
    pub async fn migrate(&self) -> CuratorResult<Vec<String>> {
        self.with_conn(run_migrations).await
    }

    /// Run a blocking diesel operation on a pooled connection.
    async fn with_conn<T, F>(&self, op: F) -> CuratorResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut PgConnection) -> Result<T, DatabaseError> + Send + 'static,
    {
        let pool = self.pool.clone();
        let result = tokio::task::spawn_blocking(move || {
            let mut conn = pool
                .get()
                .map_err(|e| DatabaseError::new(DatabaseErrorKind::Connection(e.to_string())))?;
            op(&mut conn)
        })
        .await
        .map_err(|e| DatabaseError::new(DatabaseErrorKind::Query(e.to_string())))?;
        Ok(result?)
    }
}

#[async_trait::async_trait]
impl MetadataStore for PostgresMetadataStore {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    #[tracing::instrument(skip(self))]
    async fn is_blocked(&self, source_key: &str) -> CuratorResult<bool> {
        let key = source_key.trim().to_string();
        if key.is_empty() {
            return Ok(false);
        }
        self.with_conn(move |conn| {
            Ok(diesel::select(exists(
                ingest_blocklist::table.filter(ingest_blocklist::block_key.eq(key)),
            ))
            .get_result::<bool>(conn)?)
        })
        .await
    }

    #[tracing::instrument(skip(self))]
    async fn exists_by_source_key(&self, source_key: &str) -> CuratorResult<bool> {
        let key = source_key.trim().to_string();
        self.with_conn(move |conn| {
            Ok(diesel::select(exists(
                gallery_images::table.filter(gallery_images::source_key.eq(key)),
            ))
            .get_result::<bool>(conn)?)
        })
        .await
    }

    #[tracing::instrument(skip(self))]
    async fn exists_by_fingerprint(&self, sha256: &str) -> CuratorResult<bool> {
        let sha256 = sha256.trim().to_lowercase();
        self.with_conn(move |conn| {
            Ok(diesel::select(exists(
                gallery_images::table.filter(gallery_images::sha256.eq(sha256)),
            ))
            .get_result::<bool>(conn)?)
        })
        .await
    }

    #[tracing::instrument(skip(self), fields(orientation = %orientation))]
    async fn next_sequence(&self, orientation: Orientation) -> CuratorResult<i64> {
        self.with_conn(move |conn| {
            let current: Option<i64> = gallery_images::table
                .filter(gallery_images::orientation.eq(orientation.as_str()))
                .select(max(gallery_images::seq))
                .first(conn)?;
            Ok(current.unwrap_or(0).max(0) + 1)
        })
        .await
    }

    #[tracing::instrument(skip(self, image), fields(source_key = %image.source_key, seq = image.seq))]
    async fn insert(&self, image: GalleryImage) -> CuratorResult<GalleryImage> {
        let image = normalize_record(image)?;
        let row = GalleryImageRow::try_from(&image)?;

        self.with_conn(move |conn| {
            diesel::insert_into(gallery_images::table)
                .values(&row)
                .execute(conn)?;
            Ok(())
        })
        .await?;

        tracing::debug!(id = %image.id, blob_key = %image.blob_key, "Inserted gallery record");
        Ok(image)
    }

    #[tracing::instrument(skip(self))]
    async fn count_active_by_orientation(&self) -> CuratorResult<GalleryCounts> {
        let rows = self
            .with_conn(|conn| {
                Ok(gallery_images::table
                    .filter(gallery_images::status.eq("active"))
                    .group_by(gallery_images::orientation)
                    .select((gallery_images::orientation, count_star()))
                    .load::<(String, i64)>(conn)?)
            })
            .await?;

        let mut counts = GalleryCounts::default();
        for (orientation, count) in rows {
            match orientation.parse::<Orientation>() {
                Ok(orientation) => counts.set(orientation, count),
                Err(e) => tracing::warn!(error = %e, "Ignoring rows with unknown orientation"),
            }
        }
        Ok(counts)
    }

    #[tracing::instrument(skip(self))]
    async fn get_by_source_key(&self, source_key: &str) -> CuratorResult<Option<GalleryImage>> {
        let key = source_key.trim().to_string();
        let row = self
            .with_conn(move |conn| {
                Ok(gallery_images::table
                    .filter(gallery_images::source_key.eq(key))
                    .select(GalleryImageRow::as_select())
                    .first(conn)
                    .optional()?)
            })
            .await?;

        match row {
            Some(row) => Ok(Some(GalleryImage::try_from(row)?)),
            None => Ok(None),
        }
    }

    #[tracing::instrument(skip(self))]
    async fn block_source(&self, source_key: &str, reason: Option<&str>) -> CuratorResult<bool> {
        let key = source_key.trim().to_string();
        if key.is_empty() {
            return Ok(false);
        }
        let entry = NewBlocklistRow {
            block_key: key,
            reason: reason
                .map(str::trim)
                .filter(|r| !r.is_empty())
                .map(str::to_string),
        };

        self.with_conn(move |conn| {
            diesel::insert_into(ingest_blocklist::table)
                .values(&entry)
                .on_conflict(ingest_blocklist::block_key)
                .do_update()
                .set(ingest_blocklist::reason.eq(excluded(ingest_blocklist::reason)))
                .execute(conn)?;
            Ok(true)
        })
        .await
    }

    #[tracing::instrument(skip(self))]
    async fn unblock_source(&self, source_key: &str) -> CuratorResult<bool> {
        let key = source_key.trim().to_string();
        let removed = self
            .with_conn(move |conn| {
                Ok(diesel::delete(
                    ingest_blocklist::table.filter(ingest_blocklist::block_key.eq(key)),
                )
                .execute(conn)?)
            })
            .await?;
        Ok(removed > 0)
    }
}
