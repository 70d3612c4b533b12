//! In-memory complaint store, scoped by tenant.
//!
//! The store holds the canonical record values; mutations flow through the
//! lifecycle policy first and the accepted result replaces the stored value
//! wholesale. Reference codes are allocated from a per-tenant counter so
//! they stay unique within a tenant.

use chrono::{DateTime, Utc};
use ombud_common::complaint::{ComplaintDraft, ComplaintRecord};
use ombud_common::identity::Identity;
use std::collections::HashMap;
use tracing::info;
use uuid::Uuid;

/// First reference number handed out per tenant (`#Ref-1001`).
const REFERENCE_SEED: u32 = 1000;

/// Tenant-scoped complaint collection.
#[derive(Default)]
pub struct ComplaintStore {
    records: HashMap<Uuid, ComplaintRecord>,
    next_reference: HashMap<String, u32>,
}

impl ComplaintStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create and insert a record from a validated draft.
    pub fn create(
        &mut self,
        draft: ComplaintDraft,
        owner: &Identity,
        now: DateTime<Utc>,
    ) -> ComplaintRecord {
        let reference = self.allocate_reference(&owner.tenant_id);
        let record = ComplaintRecord::create(draft, owner, reference, now);
        info!(reference = %record.reference, tenant = %record.tenant_id, "complaint created");
        self.records.insert(record.id, record.clone());
        record
    }

    pub fn get(&self, id: &Uuid) -> Option<&ComplaintRecord> {
        self.records.get(id)
    }

    /// Replace a stored record with an accepted mutation's result.
    pub fn replace(&mut self, record: ComplaintRecord) {
        self.records.insert(record.id, record);
    }

    /// All records of a tenant, oldest first.
    pub fn list_for_tenant(&self, tenant_id: &str) -> Vec<ComplaintRecord> {
        let mut records: Vec<ComplaintRecord> = self
            .records
            .values()
            .filter(|r| r.tenant_id == tenant_id)
            .cloned()
            .collect();
        records.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.reference.cmp(&b.reference)));
        records
    }

    /// All records owned by one consumer, oldest first.
    pub fn list_for_owner(&self, owner_id: Uuid) -> Vec<ComplaintRecord> {
        let mut records: Vec<ComplaintRecord> = self
            .records
            .values()
            .filter(|r| r.owner_id == owner_id)
            .cloned()
            .collect();
        records.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.reference.cmp(&b.reference)));
        records
    }

    fn allocate_reference(&mut self, tenant_id: &str) -> String {
        let counter = self
            .next_reference
            .entry(tenant_id.to_string())
            .or_insert(REFERENCE_SEED);
        *counter += 1;
        format!("#Ref-{counter}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ombud_common::complaint::ComplaintCategory;
    use ombud_common::identity::Role;

    fn draft(title: &str) -> ComplaintDraft {
        ComplaintDraft {
            category: ComplaintCategory::ServiceQuality,
            title: title.to_string(),
            description: "Support call went unanswered for a week".to_string(),
        }
    }

    #[test]
    fn test_references_are_sequential_per_tenant() {
        let mut store = ComplaintStore::new();
        let acme = Identity::new("Dana Vega", Role::Consumer, "acme");
        let globex = Identity::new("Riley Chen", Role::Consumer, "globex");
        let now = Utc::now();

        let a = store.create(draft("First"), &acme, now);
        let b = store.create(draft("Second"), &acme, now);
        let c = store.create(draft("Other tenant"), &globex, now);

        assert_eq!(a.reference, "#Ref-1001");
        assert_eq!(b.reference, "#Ref-1002");
        assert_eq!(c.reference, "#Ref-1001", "counters are per tenant");
    }

    #[test]
    fn test_listing_scopes_by_tenant_and_owner() {
        let mut store = ComplaintStore::new();
        let dana = Identity::new("Dana Vega", Role::Consumer, "acme");
        let riley = Identity::new("Riley Chen", Role::Consumer, "acme");
        let now = Utc::now();

        store.create(draft("Dana's first"), &dana, now);
        store.create(draft("Riley's first"), &riley, now);
        store.create(draft("Dana's second"), &dana, now + chrono::Duration::seconds(1));

        assert_eq!(store.list_for_tenant("acme").len(), 3);
        assert_eq!(store.list_for_tenant("globex").len(), 0);

        let mine = store.list_for_owner(dana.id);
        assert_eq!(mine.len(), 2);
        assert_eq!(mine[0].title, "Dana's first");
        assert_eq!(mine[1].title, "Dana's second");
    }

    #[test]
    fn test_replace_swaps_the_stored_value() {
        let mut store = ComplaintStore::new();
        let dana = Identity::new("Dana Vega", Role::Consumer, "acme");
        let record = store.create(draft("Original"), &dana, Utc::now());

        let mut updated = record.clone();
        updated.title = "Amended".to_string();
        store.replace(updated);

        assert_eq!(store.get(&record.id).unwrap().title, "Amended");
    }
}
