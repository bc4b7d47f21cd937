//! Resource records and the snapshot they roll up into.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::AccountId;

/// Derived view of one shared resource, never authoritative.
///
/// Authoritative state lives in the remote resource contract; a record is
/// rebuilt from ground truth after every settle. At most one of `held_by`
/// and `inspected_by` reflects a given identity at a time: the contract keeps
/// each resource free, held, or under inspection, never two at once.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ResourceRecord {
    pub available: bool,
    pub held_by: Option<AccountId>,
    pub inspected_by: Option<AccountId>,
}

impl ResourceRecord {
    /// A free resource with no holder and no inspector.
    #[must_use]
    pub fn free() -> Self {
        Self {
            available: true,
            held_by: None,
            inspected_by: None,
        }
    }

    /// Whether `identity` currently holds this resource.
    ///
    /// Another identity's hold is not "in use" from this client's view, but
    /// still makes the resource unavailable.
    #[must_use]
    pub fn in_use_by(&self, identity: &AccountId) -> bool {
        self.held_by.as_ref() == Some(identity)
    }

    /// Whether `identity` currently has this resource under inspection.
    #[must_use]
    pub fn under_inspection_by(&self, identity: &AccountId) -> bool {
        self.inspected_by.as_ref() == Some(identity)
    }

    /// Whether `identity` can return this resource (holds it or inspects it).
    #[must_use]
    pub fn returnable_by(&self, identity: &AccountId) -> bool {
        self.in_use_by(identity) || self.under_inspection_by(identity)
    }
}

/// Ordered, cheaply-cloneable view of the whole fleet.
///
/// Length equals the resource count queried once per session. Updates never
/// mutate in place: [`Snapshot::with_updated`] produces a new snapshot, so a
/// consumer holding a clone keeps a coherent view across a settle.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Snapshot {
    records: Arc<[ResourceRecord]>,
}

impl Snapshot {
    #[must_use]
    pub fn new(records: Vec<ResourceRecord>) -> Self {
        Self {
            records: records.into(),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: u32) -> Option<&ResourceRecord> {
        self.records.get(index as usize)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ResourceRecord> {
        self.records.iter()
    }

    /// A new snapshot with the record at `index` replaced.
    ///
    /// Out-of-range indices leave the snapshot unchanged; the fleet size is
    /// fixed for the session.
    #[must_use]
    pub fn with_updated(&self, index: u32, record: ResourceRecord) -> Self {
        let index = index as usize;
        if index >= self.records.len() {
            return self.clone();
        }
        let mut records: Vec<ResourceRecord> = self.records.to_vec();
        records[index] = record;
        Self::new(records)
    }
}

impl<'a> IntoIterator for &'a Snapshot {
    type Item = &'a ResourceRecord;
    type IntoIter = std::slice::Iter<'a, ResourceRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account(id: &str) -> AccountId {
        AccountId::new(id).unwrap()
    }

    #[test]
    fn record_view_is_identity_relative() {
        let record = ResourceRecord {
            available: false,
            held_by: Some(account("bob.testnet")),
            inspected_by: None,
        };
        let alice = account("alice.testnet");
        let bob = account("bob.testnet");

        assert!(record.in_use_by(&bob));
        assert!(record.returnable_by(&bob));
        assert!(!record.in_use_by(&alice));
        assert!(!record.returnable_by(&alice));
    }

    #[test]
    fn with_updated_replaces_without_mutating_original() {
        let original = Snapshot::new(vec![ResourceRecord::free(); 3]);
        let held = ResourceRecord {
            available: false,
            held_by: Some(account("alice.testnet")),
            inspected_by: None,
        };

        let updated = original.with_updated(1, held.clone());

        assert_eq!(original.get(1), Some(&ResourceRecord::free()));
        assert_eq!(updated.get(1), Some(&held));
        assert_eq!(updated.get(0), Some(&ResourceRecord::free()));
        assert_eq!(updated.len(), 3);
    }

    #[test]
    fn with_updated_out_of_range_is_noop() {
        let snapshot = Snapshot::new(vec![ResourceRecord::free(); 2]);
        let updated = snapshot.with_updated(5, ResourceRecord::default());
        assert_eq!(updated, snapshot);
    }

    #[test]
    fn clones_share_storage_until_replaced() {
        let snapshot = Snapshot::new(vec![ResourceRecord::free(); 2]);
        let reader = snapshot.clone();
        let updated = snapshot.with_updated(0, ResourceRecord::default());
        // The pre-update clone still sees the old record.
        assert!(reader.get(0).unwrap().available);
        assert!(!updated.get(0).unwrap().available);
    }
}
