//! Temporal record store
//!
//! Application service for effective-dated records. Records are never
//! rewritten in place: an update closes the current version one second
//! before "now" and inserts a replacement effective from "now"; a delete only
//! closes.

use std::sync::Arc;

use tracing::{info, warn};

use core_kernel::{closing_instant, Clock, OperationMetadata};

use crate::error::RecordError;
use crate::ports::VersionStore;
use crate::record::{EmptyLookup, NewVersion, RecordPayload, VersionedRecord};

const SYSTEM_ACTOR: &str = "system";

fn actor_of(metadata: &OperationMetadata) -> &str {
    metadata.initiated_by.as_deref().unwrap_or(SYSTEM_ACTOR)
}

fn correlation_of(metadata: &OperationMetadata) -> &str {
    metadata.correlation_id.as_deref().unwrap_or("-")
}

/// Versioned CRUD over one record kind
pub struct TemporalRecordStore<P: RecordPayload> {
    port: Arc<dyn VersionStore<P>>,
    clock: Arc<dyn Clock>,
}

impl<P: RecordPayload> Clone for TemporalRecordStore<P> {
    fn clone(&self) -> Self {
        Self {
            port: Arc::clone(&self.port),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<P: RecordPayload> TemporalRecordStore<P> {
    pub fn new(port: Arc<dyn VersionStore<P>>, clock: Arc<dyn Clock>) -> Self {
        Self { port, clock }
    }

    /// Stores a first version, effective from now with no end
    ///
    /// No uniqueness check is made on the business key.
    pub async fn create(
        &self,
        payload: P,
        metadata: &OperationMetadata,
    ) -> Result<VersionedRecord<P>, RecordError> {
        info!(
            kind = P::KIND,
            actor = actor_of(metadata),
            correlation_id = correlation_of(metadata),
            ?payload,
            "Creating record"
        );

        let now = self.clock.now();
        let record = self
            .port
            .insert(NewVersion::effective_from(payload, actor_of(metadata), now))
            .await?;

        info!(kind = P::KIND, id = %record.id, "Created record");
        Ok(record)
    }

    /// Replaces version `id` with a new version carrying `payload`
    ///
    /// The version of `id`'s business key that is active now is closed one
    /// second ago. That is `id` itself unless it was already superseded, in
    /// which case its end is left alone. Returns the inserted version, which
    /// has a new id. If the read-back no longer sees it as active (e.g.
    /// another writer closed it in between) the closed version is returned
    /// instead.
    pub async fn update(
        &self,
        id: P::Id,
        payload: P,
        metadata: &OperationMetadata,
    ) -> Result<VersionedRecord<P>, RecordError> {
        info!(
            kind = P::KIND,
            %id,
            actor = actor_of(metadata),
            correlation_id = correlation_of(metadata),
            "Updating record"
        );

        let Some(existing) = self.port.find_by_id(id).await? else {
            return Err(RecordError::not_found(P::KIND, id));
        };

        let now = self.clock.now();
        let replacement = NewVersion::effective_from(payload, actor_of(metadata), now);
        let outcome = self.port.supersede(id, closing_instant(now), replacement).await?;

        if let Some(active) = outcome.active_replacement() {
            info!(kind = P::KIND, old_id = %id, new_id = %active.id, "Updated record");
            return Ok(active.clone());
        }

        warn!(kind = P::KIND, %id, "No active version found after update. Returning closed version.");
        Ok(outcome.closed.into_iter().next().unwrap_or(existing))
    }

    /// Logically deletes `id` by ending its effective period one second ago
    ///
    /// Deleting an already closed version moves its end again.
    pub async fn delete(&self, id: P::Id, metadata: &OperationMetadata) -> Result<(), RecordError> {
        info!(
            kind = P::KIND,
            %id,
            actor = actor_of(metadata),
            correlation_id = correlation_of(metadata),
            "Deleting record (logical delete)"
        );

        if self.port.find_by_id(id).await?.is_none() {
            return Err(RecordError::not_found(P::KIND, id));
        }

        let now = self.clock.now();
        self.port
            .close(id, closing_instant(now), actor_of(metadata), now)
            .await?;

        info!(kind = P::KIND, %id, "Performed logical delete");
        Ok(())
    }

    /// Loads a version whether or not it is active
    pub async fn get_by_id(&self, id: P::Id) -> Result<VersionedRecord<P>, RecordError> {
        info!(kind = P::KIND, %id, "Fetching record");

        self.port
            .find_by_id(id)
            .await?
            .ok_or_else(|| RecordError::not_found(P::KIND, id))
    }

    /// Lists active versions, or every version when `include_historic`
    pub async fn list(&self, include_historic: bool) -> Result<Vec<VersionedRecord<P>>, RecordError> {
        info!(kind = P::KIND, historic = include_historic, "Listing records");

        let active_at = (!include_historic).then(|| self.clock.now());
        let records = self.port.find_all(active_at).await?;

        info!(kind = P::KIND, count = records.len(), historic = include_historic, "Listed records");
        Ok(records)
    }

    /// Lists versions matching `filter`, applying the kind's empty-result policy
    pub async fn list_by_key(
        &self,
        filter: &P::Filter,
        include_historic: bool,
    ) -> Result<Vec<VersionedRecord<P>>, RecordError> {
        info!(kind = P::KIND, ?filter, historic = include_historic, "Searching records");

        let active_at = (!include_historic).then(|| self.clock.now());
        let records = self.port.find_matching(filter, active_at).await?;

        if records.is_empty() {
            return match P::on_empty_lookup(filter, include_historic) {
                EmptyLookup::NotFound(message) => Err(RecordError::NotFound(message)),
                EmptyLookup::Empty => {
                    warn!(kind = P::KIND, ?filter, historic = include_historic, "No records found");
                    Ok(records)
                }
            };
        }

        info!(kind = P::KIND, count = records.len(), "Found records");
        Ok(records)
    }
}
