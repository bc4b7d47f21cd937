//! Snapshot construction from remote ground truth.

use spoke_gateways::ResourceGateway;
use spoke_types::{ResourceRecord, Snapshot};

use crate::error::WorkflowError;

/// Pulls per-index state from the resource gateway and folds it into typed
/// records.
///
/// Data flows one way: the builder only reads. Any underlying query failure
/// aborts the whole build; a partially-filled snapshot is never handed out.
pub struct SnapshotBuilder<'a, R> {
    resources: &'a R,
}

impl<'a, R: ResourceGateway> SnapshotBuilder<'a, R> {
    pub fn new(resources: &'a R) -> Self {
        Self { resources }
    }

    /// Query the fleet size, then every index, into one consistent snapshot.
    pub async fn build(&self) -> Result<Snapshot, WorkflowError> {
        let count = self
            .resources
            .resource_count()
            .await
            .map_err(WorkflowError::SnapshotUnavailable)?;

        let mut records = Vec::with_capacity(count as usize);
        for index in 0..count {
            records.push(self.fetch_record(index).await?);
        }

        tracing::debug!(resources = count, "snapshot built");
        Ok(Snapshot::new(records))
    }

    /// Re-query a single index.
    ///
    /// Produces exactly what [`SnapshotBuilder::build`] would yield for this
    /// index against the same remote state; the three per-index queries are
    /// shared, so the two paths cannot diverge.
    pub async fn refresh_one(&self, index: u32) -> Result<ResourceRecord, WorkflowError> {
        self.fetch_record(index).await
    }

    async fn fetch_record(&self, index: u32) -> Result<ResourceRecord, WorkflowError> {
        let available = self
            .resources
            .is_available(index)
            .await
            .map_err(WorkflowError::SnapshotUnavailable)?;
        let held_by = self
            .resources
            .current_holder(index)
            .await
            .map_err(WorkflowError::SnapshotUnavailable)?;
        let inspected_by = self
            .resources
            .current_inspector(index)
            .await
            .map_err(WorkflowError::SnapshotUnavailable)?;

        Ok(ResourceRecord {
            available,
            held_by,
            inspected_by,
        })
    }
}
