//! Backing-store seams
//!
//! The pipeline reads test definitions and appends response and
//! result records; it never updates a record in place, so concurrent
//! runs need no write coordination. Schema administration belongs to
//! the store implementation, not here.

use crate::error::StoreError;
use crate::types::{AssessmentResult, ResponseRecord, TestDefinition};

/// Read-only access to test definitions.
#[async_trait::async_trait]
pub trait TestStore: Send + Sync {
    /// Fetch a test by id; `None` when the id is unknown.
    async fn get_test(&self, test_id: &str) -> Result<Option<TestDefinition>, StoreError>;
}

/// Append-only per-question diagnostic records.
#[async_trait::async_trait]
pub trait ResponseStore: Send + Sync {
    async fn record_response(&self, record: ResponseRecord) -> Result<(), StoreError>;
}

/// Append-only assessment results, readable for the dashboard.
#[async_trait::async_trait]
pub trait ResultStore: Send + Sync {
    async fn record_result(&self, result: AssessmentResult) -> Result<(), StoreError>;

    /// All results for one student, for dashboard display.
    async fn list_results(&self, student_email: &str)
        -> Result<Vec<AssessmentResult>, StoreError>;
}
