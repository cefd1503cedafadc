//! Categorized, searchable views over a viewer's request list.
//!
//! The dashboards render one denormalized [`RequestView`] per request row,
//! partitioned into status buckets. Bucket membership is the shared
//! effective-status derivation, the same one the contract applies, so a
//! live request whose records were all deleted shows up under "revoked" even
//! though its persisted status still reads sent or approved, and the bucket
//! counts always sum to the total.

use healthchain_common::resolution::{bucket_for, Bucket, RequestFacts};
use healthchain_common::RequestStatus;

/// A requested document as the viewer sees it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecordRef {
    pub id: u64,
    pub title: String,
    pub deleted: bool,
}

impl RecordRef {
    /// Title with the soft-delete tag the tables render.
    pub fn display_title(&self) -> String {
        if self.deleted {
            format!("{} (Deleted)", self.title)
        } else {
            self.title.clone()
        }
    }
}

/// One request row joined with everything the tables display.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RequestView {
    pub id: u64,
    pub doctor_wallet: String,
    pub patient_wallet: String,
    pub doctor_name: String,
    pub purpose: String,
    pub status: RequestStatus,
    pub denial_reason: Option<String>,
    /// Empty for a general (all-records) request.
    pub records: Vec<RecordRef>,
    pub sent_at: u64,
    pub responded_at: Option<u64>,
    pub expires_at: Option<u64>,
}

impl RequestView {
    fn facts(&self) -> RequestFacts {
        RequestFacts {
            status: self.status,
            expires_at: self.expires_at.unwrap_or(0),
            all_records_deleted: !self.records.is_empty()
                && self.records.iter().all(|r| r.deleted),
        }
    }

    /// Persisted status overlaid with expiry and implicit revocation.
    pub fn effective_status(&self, now: u64) -> RequestStatus {
        healthchain_common::resolution::effective_status(self.facts(), now)
    }

    pub fn bucket(&self, now: u64) -> Option<Bucket> {
        bucket_for(self.facts(), now)
    }

    /// Case-insensitive substring match over doctor name, doctor wallet,
    /// purpose, and requested document titles.
    fn matches(&self, needle: &str) -> bool {
        if needle.is_empty() {
            return true;
        }
        self.doctor_name.to_lowercase().contains(needle)
            || self.doctor_wallet.to_lowercase().contains(needle)
            || self.purpose.to_lowercase().contains(needle)
            || self
                .records
                .iter()
                .any(|r| r.title.to_lowercase().contains(needle))
    }
}

/// A request list partitioned into display buckets. Built in one pass so the
/// counts and the lists cannot disagree.
#[derive(Debug, Default)]
pub struct Categorized<'a> {
    pub all: Vec<&'a RequestView>,
    pub pending: Vec<&'a RequestView>,
    pub approved: Vec<&'a RequestView>,
    pub declined: Vec<&'a RequestView>,
    pub expired: Vec<&'a RequestView>,
    pub revoked: Vec<&'a RequestView>,
}

impl<'a> Categorized<'a> {
    pub fn bucket(&self, bucket: Bucket) -> &[&'a RequestView] {
        match bucket {
            Bucket::Pending => &self.pending,
            Bucket::Approved => &self.approved,
            Bucket::Declined => &self.declined,
            Bucket::Expired => &self.expired,
            Bucket::Revoked => &self.revoked,
        }
    }

    pub fn count(&self, bucket: Bucket) -> usize {
        self.bucket(bucket).len()
    }

    pub fn total(&self) -> usize {
        self.all.len()
    }
}

/// Partition a viewer's request list, newest-first order preserved.
pub fn partition<'a>(views: &'a [RequestView], now: u64) -> Categorized<'a> {
    let mut categorized = Categorized::default();
    for view in views {
        let bucket = match view.bucket(now) {
            Some(bucket) => bucket,
            None => continue,
        };
        categorized.all.push(view);
        match bucket {
            Bucket::Pending => categorized.pending.push(view),
            Bucket::Approved => categorized.approved.push(view),
            Bucket::Declined => categorized.declined.push(view),
            Bucket::Expired => categorized.expired.push(view),
            Bucket::Revoked => categorized.revoked.push(view),
        }
    }
    categorized
}

/// Active-category filter and free-text search combined with AND semantics:
/// a row must be in the selected bucket (if any) and match the query (if
/// non-empty).
pub fn filter<'a>(
    views: &'a [RequestView],
    category: Option<Bucket>,
    query: &str,
    now: u64,
) -> Vec<&'a RequestView> {
    let needle = query.trim().to_lowercase();
    views
        .iter()
        .filter(|view| match (view.bucket(now), category) {
            (None, _) => false,
            (Some(_), None) => true,
            (Some(bucket), Some(wanted)) => bucket == wanted,
        })
        .filter(|view| view.matches(&needle))
        .collect()
}
