//! Store error type

use crate::key::DocId;

/// Error from a keyed store operation.
#[derive(Debug)]
pub enum StoreError {
    /// The target document id does not exist in the collection.
    UnknownId { collection: String, id: DocId },
    Io(std::io::Error),
    Json(serde_json::Error),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownId { collection, id } => {
                write!(f, "no document {id} in collection {collection}")
            }
            Self::Io(e) => write!(f, "IO: {e}"),
            Self::Json(e) => write!(f, "JSON: {e}"),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<std::io::Error> for StoreError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::DocId;

    #[test]
    fn unknown_id_display() {
        let err = StoreError::UnknownId {
            collection: "sources".to_string(),
            id: DocId::from_raw(3),
        };
        let msg = format!("{err}");
        assert!(msg.contains("sources"));
        assert!(msg.contains("00000003"));
    }
}
