pub mod client;
pub mod document;
pub mod error;
pub mod query;
pub mod value;

pub use client::FirestoreClient;
pub use document::Document;
pub use error::FirestoreError;
pub use query::{CollectionSelector, RunQueryRequest, StructuredQuery};
