use serde::Serialize;
use serde_json::{Map, Value};

use crate::config::CollectionsConfig;
use crate::firestore::value::{array_values, map_fields, string_at_or_empty};
use crate::firestore::{Document, FirestoreClient, FirestoreError};

/// Separator between the parts of a `combinedField`
const SEPARATOR: &str = " - ";

/// A document flattened for a dashboard table.
///
/// `fields` keeps the raw typed Firestore encoding so panels can still dig into it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardRow {
    pub combined_field: String,
    pub name: String,
    pub fields: Map<String, Value>,
}

/// `"{subCollection} - {orderNumber} - {createdAt} - {datePosted}"`
pub fn latest_order_row(sub_collection: &str, doc: &Document) -> DashboardRow {
    let parts = [
        sub_collection.to_string(),
        string_at_or_empty(&doc.fields, &["orderNumber"]),
        string_at_or_empty(&doc.fields, &["createdAt"]),
        string_at_or_empty(&doc.fields, &["datePosted"]),
    ];

    DashboardRow {
        combined_field: parts.join(SEPARATOR),
        name: doc.name.clone(),
        fields: doc.fields.clone(),
    }
}

/// One row per entry of `originalPayload.StoreOrders`:
/// `"{OrderNumber} - {BillTo.State} - {BillTo.StoreCode} - {BillTo.Suburb} - {errorMessage}"`
pub fn dead_letter_rows(doc: &Document) -> Vec<DashboardRow> {
    let payload = doc.fields.get("originalPayload").and_then(map_fields);
    let store_orders = payload
        .and_then(|p| p.get("StoreOrders"))
        .and_then(array_values)
        .unwrap_or_default();

    if store_orders.is_empty() {
        tracing::debug!("Dead letter {} has no store orders", doc.name);
        return Vec::new();
    }

    let order_number = payload
        .map(|p| string_at_or_empty(p, &["OrderNumber"]))
        .unwrap_or_default();
    let error_message = string_at_or_empty(&doc.fields, &["errorMessage"]);

    store_orders
        .iter()
        .map(|store_order| {
            let (state, store_code, suburb) = match map_fields(store_order) {
                Some(order) => (
                    string_at_or_empty(order, &["BillTo", "State"]),
                    string_at_or_empty(order, &["BillTo", "StoreCode"]),
                    string_at_or_empty(order, &["BillTo", "Suburb"]),
                ),
                None => Default::default(),
            };

            let combined_field = [
                order_number.as_str(),
                state.as_str(),
                store_code.as_str(),
                suburb.as_str(),
                error_message.as_str(),
            ]
            .join(SEPARATOR);

            DashboardRow {
                combined_field,
                name: doc.name.clone(),
                fields: doc.fields.clone(),
            }
        })
        .collect()
}

/// Fetches the fixed dashboard queries and flattens the results.
#[derive(Debug, Clone)]
pub struct DashboardService {
    client: FirestoreClient,
    collections: CollectionsConfig,
}

impl DashboardService {
    pub fn new(client: FirestoreClient, collections: CollectionsConfig) -> Self {
        Self { client, collections }
    }

    pub fn client(&self) -> &FirestoreClient {
        &self.client
    }

    pub fn restaurants_collection(&self) -> &str {
        &self.collections.restaurants
    }

    /// Every document of the restaurants collection, all pages.
    pub async fn restaurants(&self) -> Result<Vec<Document>, FirestoreError> {
        self.client.list_documents(&self.collections.restaurants).await
    }

    /// Orders in every `sub_collection` collection, anywhere in the database.
    pub async fn latest_orders(&self, sub_collection: &str) -> Result<Vec<DashboardRow>, FirestoreError> {
        let documents = self.client.collection_group(sub_collection, None).await?;
        Ok(documents
            .iter()
            .map(|doc| latest_order_row(sub_collection, doc))
            .collect())
    }

    /// Dead letters filed under `sub_collection` (a date such as `2024-12-16`),
    /// one row per store order.
    pub async fn dead_letters(&self, sub_collection: &str) -> Result<Vec<DashboardRow>, FirestoreError> {
        let parent = Some(self.collections.dead_letters_parent.as_str()).filter(|p| !p.is_empty());
        let documents = self.client.collection_group(sub_collection, parent).await?;

        Ok(documents
            .iter()
            .filter(|doc| !doc.fields.is_empty())
            .flat_map(dead_letter_rows)
            .collect())
    }
}
