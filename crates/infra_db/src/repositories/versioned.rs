//! Generic repository for effective-dated tables
//!
//! Reference data and document configuration share one table layout: an id,
//! kind-specific payload columns, then the effective period and audit
//! columns. [`VersionedTable`] describes the kind-specific part and
//! [`PgVersionStore`] implements the [`VersionStore`] port once for both.

use std::marker::PhantomData;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::query_builder::Separated;
use sqlx::{FromRow, PgConnection, PgPool, Postgres, QueryBuilder};
use tracing::{debug, instrument};

use core_kernel::{DomainPort, EntityId, HealthCheckResult, HealthCheckable, PortError};
use domain_reference::{NewVersion, RecordPayload, Supersession, VersionStore, VersionedRecord};

use crate::error::DatabaseError;
use crate::health::ping;
use crate::temporal::{push_active_at, PERIOD_AND_AUDIT_COLUMNS};

/// Mapping of a record payload onto its table
pub trait VersionedTable: RecordPayload {
    /// Table name
    const TABLE: &'static str;

    /// Payload columns, comma separated, in the order `push_payload` binds them
    const PAYLOAD_COLUMNS: &'static str;

    /// Full row as selected by [`PgVersionStore`]
    type Row: for<'r> FromRow<'r, PgRow> + Send + Unpin + 'static;

    /// Binds the payload values for an INSERT
    fn push_payload<'args>(&self, values: &mut Separated<'_, 'args, Postgres, &'static str>);

    /// Appends `AND column = value` for every field set on `filter`
    fn push_filter<'args>(filter: &Self::Filter, builder: &mut QueryBuilder<'args, Postgres>);

    fn from_row(row: Self::Row) -> VersionedRecord<Self>;
}

fn columns<P: VersionedTable>() -> String {
    format!("id, {}, {}", P::PAYLOAD_COLUMNS, PERIOD_AND_AUDIT_COLUMNS)
}

/// PostgreSQL implementation of [`VersionStore`] for one record kind
#[derive(Debug, Clone)]
pub struct PgVersionStore<P: VersionedTable> {
    pool: PgPool,
    _payload: PhantomData<fn() -> P>,
}

impl<P: VersionedTable> PgVersionStore<P> {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            _payload: PhantomData,
        }
    }

    /// SELECT over the table, restricted to versions active at `active_at` when given
    fn select(active_at: Option<DateTime<Utc>>) -> QueryBuilder<'static, Postgres> {
        let mut builder = QueryBuilder::new(format!(
            "SELECT {} FROM {} WHERE 1=1",
            columns::<P>(),
            P::TABLE
        ));
        if let Some(at) = active_at {
            push_active_at(&mut builder, at);
        }
        builder
    }

    async fn fetch_matching(
        conn: &mut PgConnection,
        filter: Option<&P::Filter>,
        active_at: Option<DateTime<Utc>>,
    ) -> Result<Vec<VersionedRecord<P>>, DatabaseError> {
        let mut builder = Self::select(active_at);
        if let Some(filter) = filter {
            P::push_filter(filter, &mut builder);
        }
        builder.push(" ORDER BY id");

        let rows = builder.build_query_as::<P::Row>().fetch_all(&mut *conn).await?;
        Ok(rows.into_iter().map(P::from_row).collect())
    }

    async fn insert_version(
        conn: &mut PgConnection,
        version: &NewVersion<P>,
    ) -> Result<VersionedRecord<P>, DatabaseError> {
        let mut builder = QueryBuilder::new(format!(
            "INSERT INTO {} ({}, {}) ",
            P::TABLE,
            P::PAYLOAD_COLUMNS,
            PERIOD_AND_AUDIT_COLUMNS
        ));
        builder.push_values(std::iter::once(version), |mut values, version| {
            version.payload.push_payload(&mut values);
            values
                .push_bind(version.period.from)
                .push_bind(version.period.to)
                .push_bind(version.audit.created_by.clone())
                .push_bind(version.audit.created_at)
                .push_bind(version.audit.last_updated_by.clone())
                .push_bind(version.audit.last_updated_at);
        });
        builder.push(" RETURNING ");
        builder.push(columns::<P>());

        let row = builder.build_query_as::<P::Row>().fetch_one(&mut *conn).await?;
        Ok(P::from_row(row))
    }

    async fn lock_version(
        conn: &mut PgConnection,
        id: P::Id,
    ) -> Result<VersionedRecord<P>, DatabaseError> {
        let mut builder = Self::select(None);
        builder.push(" AND id = ");
        builder.push_bind(id.raw());
        builder.push(" FOR UPDATE");

        let row = builder
            .build_query_as::<P::Row>()
            .fetch_optional(&mut *conn)
            .await?
            .ok_or_else(|| DatabaseError::not_found(P::KIND, id))?;
        Ok(P::from_row(row))
    }

    /// Closes every version matching `key` that is active at `active_at`
    async fn close_active(
        conn: &mut PgConnection,
        key: &P::Filter,
        active_at: DateTime<Utc>,
        closed_at: DateTime<Utc>,
        actor: &str,
    ) -> Result<Vec<VersionedRecord<P>>, DatabaseError> {
        let mut builder = QueryBuilder::new(format!("UPDATE {} SET effective_to = ", P::TABLE));
        builder.push_bind(closed_at);
        builder.push(", last_updated_by = ");
        builder.push_bind(actor.to_string());
        builder.push(", last_updated_at = ");
        builder.push_bind(active_at);
        builder.push(" WHERE 1=1");
        P::push_filter(key, &mut builder);
        push_active_at(&mut builder, active_at);
        builder.push(" RETURNING ");
        builder.push(columns::<P>());

        let rows = builder.build_query_as::<P::Row>().fetch_all(&mut *conn).await?;
        Ok(rows.into_iter().map(P::from_row).collect())
    }

    async fn close_version(
        conn: &mut PgConnection,
        id: P::Id,
        closed_at: DateTime<Utc>,
        actor: &str,
        touched_at: DateTime<Utc>,
    ) -> Result<VersionedRecord<P>, DatabaseError> {
        let mut builder = QueryBuilder::new(format!("UPDATE {} SET effective_to = ", P::TABLE));
        builder.push_bind(closed_at);
        builder.push(", last_updated_by = ");
        builder.push_bind(actor.to_string());
        builder.push(", last_updated_at = ");
        builder.push_bind(touched_at);
        builder.push(" WHERE id = ");
        builder.push_bind(id.raw());
        builder.push(" RETURNING ");
        builder.push(columns::<P>());

        let row = builder
            .build_query_as::<P::Row>()
            .fetch_optional(&mut *conn)
            .await?
            .ok_or_else(|| DatabaseError::not_found(P::KIND, id))?;
        Ok(P::from_row(row))
    }
}

impl<P: VersionedTable> DomainPort for PgVersionStore<P> {}

#[async_trait]
impl<P: VersionedTable> HealthCheckable for PgVersionStore<P> {
    async fn health_check(&self) -> HealthCheckResult {
        ping(&self.pool, P::TABLE).await
    }
}

#[async_trait]
impl<P: VersionedTable> VersionStore<P> for PgVersionStore<P> {
    #[instrument(skip(self), fields(table = P::TABLE))]
    async fn find_by_id(&self, id: P::Id) -> Result<Option<VersionedRecord<P>>, PortError> {
        let mut builder = Self::select(None);
        builder.push(" AND id = ");
        builder.push_bind(id.raw());

        let row = builder
            .build_query_as::<P::Row>()
            .fetch_optional(&self.pool)
            .await
            .map_err(DatabaseError::from)?;
        Ok(row.map(P::from_row))
    }

    #[instrument(skip(self), fields(table = P::TABLE))]
    async fn find_all(
        &self,
        active_at: Option<DateTime<Utc>>,
    ) -> Result<Vec<VersionedRecord<P>>, PortError> {
        let mut conn = self.pool.acquire().await.map_err(DatabaseError::from)?;
        let records = Self::fetch_matching(&mut conn, None, active_at).await?;
        debug!(count = records.len(), "Listed versions");
        Ok(records)
    }

    #[instrument(skip(self), fields(table = P::TABLE))]
    async fn find_matching(
        &self,
        filter: &P::Filter,
        active_at: Option<DateTime<Utc>>,
    ) -> Result<Vec<VersionedRecord<P>>, PortError> {
        let mut conn = self.pool.acquire().await.map_err(DatabaseError::from)?;
        let records = Self::fetch_matching(&mut conn, Some(filter), active_at).await?;
        debug!(count = records.len(), "Listed matching versions");
        Ok(records)
    }

    #[instrument(skip(self, version), fields(table = P::TABLE))]
    async fn insert(&self, version: NewVersion<P>) -> Result<VersionedRecord<P>, PortError> {
        let mut conn = self.pool.acquire().await.map_err(DatabaseError::from)?;
        let record = Self::insert_version(&mut conn, &version).await?;
        debug!(id = %record.id, "Inserted version");
        Ok(record)
    }

    #[instrument(skip(self, replacement), fields(table = P::TABLE))]
    async fn supersede(
        &self,
        id: P::Id,
        closed_at: DateTime<Utc>,
        replacement: NewVersion<P>,
    ) -> Result<Supersession<P>, PortError> {
        let mut tx = self.pool.begin().await.map_err(DatabaseError::from)?;

        let target = Self::lock_version(&mut tx, id).await?;
        let now = replacement.period.from;
        let closed = Self::close_active(
            &mut tx,
            &target.payload.key_filter(),
            now,
            closed_at,
            &replacement.audit.created_by,
        )
        .await?;
        let inserted = Self::insert_version(&mut tx, &replacement).await?;
        let key = replacement.payload.key_filter();
        let active = Self::fetch_matching(&mut tx, Some(&key), Some(now)).await?;

        tx.commit()
            .await
            .map_err(|e| DatabaseError::TransactionFailed(e.to_string()))?;

        debug!(target = %id, closed = closed.len(), inserted = %inserted.id, active = active.len(), "Superseded version");
        Ok(Supersession { closed, inserted, active })
    }

    #[instrument(skip(self), fields(table = P::TABLE))]
    async fn close(
        &self,
        id: P::Id,
        closed_at: DateTime<Utc>,
        actor: &str,
        touched_at: DateTime<Utc>,
    ) -> Result<VersionedRecord<P>, PortError> {
        let mut conn = self.pool.acquire().await.map_err(DatabaseError::from)?;
        let record = Self::close_version(&mut conn, id, closed_at, actor, touched_at).await?;
        debug!(id = %record.id, "Closed version");
        Ok(record)
    }
}
