use thiserror::Error;

/// Failures that end an operation before anything is persisted.
#[derive(Debug, Error)]
pub enum RecapError {
    #[error("document '{document_id}' could not be read")]
    DocumentUnreadable {
        document_id: String,
        #[source]
        source: anyhow::Error,
    },
    #[error("record sets could not be enumerated")]
    SourcesUnavailable {
        #[source]
        source: anyhow::Error,
    },
    #[error("record set '{record_set_id}' could not be read")]
    SourceUnreadable {
        record_set_id: String,
        #[source]
        source: anyhow::Error,
    },
}
