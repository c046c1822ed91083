use thiserror::Error;

use crate::record::Collection;

#[derive(Error, Debug)]
pub enum AnalyticsError {
    #[error("Severity rating out of range: {0} (expected 1..=10)")]
    SeverityOutOfRange(i64),

    #[error("Collection not available: {0}")]
    MissingCollection(Collection),

    #[error("Failed to read {collection}: {source}")]
    Io {
        collection: Collection,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed {collection} record: {source}")]
    Deserialize {
        collection: Collection,
        #[source]
        source: serde_json::Error,
    },
}

pub type Result<T> = std::result::Result<T, AnalyticsError>;
