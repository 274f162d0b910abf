//! SurrealDB implementation of [`MediaFileRepository`].

use aisle_core::error::PanelResult;
use aisle_core::models::file::{CreateMediaFile, MediaFile, MediaKind};
use aisle_core::repository::MediaFileRepository;
use chrono::{DateTime, Utc};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;

use crate::error::DbError;
use crate::id::next_id;

#[derive(Debug, SurrealValue)]
struct MediaRow {
    tenant_id: i64,
    kind: String,
    url: String,
    display_name: Option<String>,
    display_order: i64,
    created_at: DateTime<Utc>,
}

impl MediaRow {
    fn into_file(self, id: i64) -> Result<MediaFile, DbError> {
        Ok(MediaFile {
            id,
            tenant_id: self.tenant_id,
            kind: parse_kind(&self.kind)?,
            url: self.url,
            display_name: self.display_name,
            display_order: self.display_order,
            created_at: self.created_at,
        })
    }
}

#[derive(Debug, SurrealValue)]
struct MediaRowWithId {
    record_id: i64,
    tenant_id: i64,
    kind: String,
    url: String,
    display_name: Option<String>,
    display_order: i64,
    created_at: DateTime<Utc>,
}

impl MediaRowWithId {
    fn into_file(self) -> Result<MediaFile, DbError> {
        Ok(MediaFile {
            id: self.record_id,
            tenant_id: self.tenant_id,
            kind: parse_kind(&self.kind)?,
            url: self.url,
            display_name: self.display_name,
            display_order: self.display_order,
            created_at: self.created_at,
        })
    }
}

fn parse_kind(s: &str) -> Result<MediaKind, DbError> {
    MediaKind::parse(s).map_err(|_| DbError::Query(format!("unknown media kind: {s}")))
}

/// SurrealDB implementation of the media file repository.
#[derive(Clone)]
pub struct SurrealMediaFileRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealMediaFileRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }

    fn file_not_found(id: i64) -> DbError {
        DbError::NotFound {
            entity: "media_file".into(),
            id: id.to_string(),
        }
    }
}

impl<C: Connection> MediaFileRepository for SurrealMediaFileRepository<C> {
    async fn create(&self, input: CreateMediaFile) -> PanelResult<MediaFile> {
        let id = next_id(&self.db, "media_file").await?;

        let result = self
            .db
            .query(
                "CREATE type::record('media_file', $id) SET \
                 tenant_id = $tenant_id, kind = $kind, url = $url, \
                 display_name = $display_name, \
                 display_order = $display_order",
            )
            .bind(("id", id))
            .bind(("tenant_id", input.tenant_id))
            .bind(("kind", input.kind.as_str().to_string()))
            .bind(("url", input.url))
            .bind(("display_name", input.display_name))
            .bind(("display_order", input.display_order))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<MediaRow> = result.take(0).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| Self::file_not_found(id))?;

        Ok(row.into_file(id)?)
    }

    async fn list(&self, tenant_id: i64, kind: Option<MediaKind>) -> PanelResult<Vec<MediaFile>> {
        let mut conditions = vec!["tenant_id = $tenant_id"];
        if kind.is_some() {
            conditions.push("kind = $kind");
        }
        let predicate = conditions.join(" AND ");

        let query = format!(
            "SELECT meta::id(id) AS record_id, * \
             FROM media_file \
             WHERE {predicate} \
             ORDER BY display_order ASC, created_at ASC"
        );
        let mut builder = self.db.query(&query).bind(("tenant_id", tenant_id));
        if let Some(k) = kind {
            builder = builder.bind(("kind", k.as_str().to_string()));
        }
        let mut result = builder.await.map_err(DbError::from)?;

        let rows: Vec<MediaRowWithId> = result.take(0).map_err(DbError::from)?;
        let files = rows
            .into_iter()
            .map(MediaRowWithId::into_file)
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(files)
    }

    async fn set_display_order(
        &self,
        tenant_id: i64,
        id: i64,
        display_order: i64,
    ) -> PanelResult<MediaFile> {
        let mut result = self
            .db
            .query(
                "UPDATE type::record('media_file', $id) SET \
                 display_order = $display_order \
                 WHERE tenant_id = $tenant_id",
            )
            .bind(("id", id))
            .bind(("tenant_id", tenant_id))
            .bind(("display_order", display_order))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<MediaRow> = result.take(0).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| Self::file_not_found(id))?;

        Ok(row.into_file(id)?)
    }

    async fn delete(&self, tenant_id: i64, id: i64) -> PanelResult<()> {
        self.db
            .query(
                "DELETE type::record('media_file', $id) \
                 WHERE tenant_id = $tenant_id",
            )
            .bind(("id", id))
            .bind(("tenant_id", tenant_id))
            .await
            .map_err(DbError::from)?;

        Ok(())
    }
}
