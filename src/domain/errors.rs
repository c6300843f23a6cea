//! Structured error types for the profiler model
//!
//! Using thiserror for automatic Display implementation and error chaining.
//!
//! Only protocol misuse surfaces as an error: it signals a defect in the
//! integrating code, not bad data. Data-level anomalies (undefined heap
//! objects, lookups that miss) are handled by pruning and `Option` returns
//! respectively.

use super::types::CollectionId;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum HeapError {
    #[error("cannot add heap objects to {0}: snapshot already finalized")]
    SealedSnapshot(CollectionId),

    #[error("back references for {0} already initialized")]
    AlreadyFinalized(CollectionId),
}
