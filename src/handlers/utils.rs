use serde::Deserialize;

use crate::error::ApiError;

/// `?subCollection=` as sent by the dashboard
#[derive(Debug, Default, Deserialize)]
pub struct SubCollectionQuery {
    #[serde(rename = "subCollection")]
    pub sub_collection: Option<String>,
}

impl SubCollectionQuery {
    /// The trimmed sub-collection id, or 400 when missing or blank
    pub fn require(&self) -> Result<&str, ApiError> {
        self.sub_collection
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ApiError::bad_request("subCollection query parameter is required"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn require_rejects_missing_and_blank() {
        assert!(SubCollectionQuery::default().require().is_err());
        let blank = SubCollectionQuery { sub_collection: Some("  ".into()) };
        assert_eq!(blank.require().unwrap_err().status_code(), 400);
    }

    #[test]
    fn require_trims() {
        let q = SubCollectionQuery { sub_collection: Some(" I001 ".into()) };
        assert_eq!(q.require().unwrap(), "I001");
    }
}
