use serde::Serialize;

/// Body of a `documents:runQuery` request.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunQueryRequest {
    pub structured_query: StructuredQuery,
}

/// The subset of Firestore's `StructuredQuery` this service issues.
#[derive(Debug, Clone, Default, Serialize)]
pub struct StructuredQuery {
    pub from: Vec<CollectionSelector>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionSelector {
    pub collection_id: String,
    /// Match every collection with this id below the query parent, not just direct children
    pub all_descendants: bool,
}

impl StructuredQuery {
    /// Every document in collections named `collection_id`, at any depth.
    pub fn collection_group(collection_id: impl Into<String>) -> Self {
        Self {
            from: vec![CollectionSelector {
                collection_id: collection_id.into(),
                all_descendants: true,
            }],
        }
    }

    pub fn into_request(self) -> RunQueryRequest {
        RunQueryRequest { structured_query: self }
    }
}
