use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use tokio::sync::OnceCell;
use tracing::debug;

use crate::config::StoreSettings;

use super::error::{CollaboratorError, check_status};
use super::retry::RetryPolicy;
use super::{DocumentMetadata, DocumentStore, PriceFilter, StoredDocument};

const SERVICE: &str = "document store";

/// Turns query text into the vector space the listings were indexed with.
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, CollaboratorError>;
}

/// Read-only client for a Chroma collection of accommodation listings.
pub struct ChromaStore {
    http: Client,
    base_url: String,
    collection: String,
    collection_id: OnceCell<String>,
    embedder: Arc<dyn Embedder>,
    timeout: Duration,
    retry: RetryPolicy,
}

#[derive(Debug, Deserialize)]
struct CollectionInfo {
    id: String,
}

#[derive(Debug, Serialize)]
struct QueryRequest<'a> {
    query_embeddings: Vec<&'a [f32]>,
    n_results: usize,
    #[serde(rename = "where")]
    filter: Value,
    include: [&'static str; 3],
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct QueryResponse {
    ids: Vec<Vec<String>>,
    documents: Vec<Vec<Option<String>>>,
    metadatas: Vec<Vec<Option<Map<String, Value>>>>,
}

impl ChromaStore {
    pub fn new(
        settings: &StoreSettings,
        embedder: Arc<dyn Embedder>,
        retry: RetryPolicy,
    ) -> Result<Self, CollaboratorError> {
        let timeout = Duration::from_secs(settings.timeout_secs);
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|source| CollaboratorError::Network {
                service: SERVICE,
                source,
            })?;

        Ok(Self {
            http,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            collection: settings.collection.clone(),
            collection_id: OnceCell::new(),
            embedder,
            timeout,
            retry,
        })
    }

    async fn collection_id(&self) -> Result<&str, CollaboratorError> {
        let id = self
            .collection_id
            .get_or_try_init(|| async {
                let url = format!("{}/api/v1/collections/{}", self.base_url, self.collection);
                let info = self
                    .retry
                    .run("collection_lookup", || self.lookup_collection(&url))
                    .await?;
                debug!(collection = %self.collection, id = %info.id, "resolved collection");
                Ok::<_, CollaboratorError>(info.id)
            })
            .await?;
        Ok(id.as_str())
    }

    async fn lookup_collection(&self, url: &str) -> Result<CollectionInfo, CollaboratorError> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|err| CollaboratorError::from_reqwest(SERVICE, self.timeout, err))?;

        check_status(SERVICE, response)
            .await?
            .json::<CollectionInfo>()
            .await
            .map_err(|err| CollaboratorError::from_reqwest(SERVICE, self.timeout, err))
    }

    async fn query_once(
        &self,
        url: &str,
        body: &QueryRequest<'_>,
    ) -> Result<QueryResponse, CollaboratorError> {
        let response = self
            .http
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|err| CollaboratorError::from_reqwest(SERVICE, self.timeout, err))?;

        check_status(SERVICE, response)
            .await?
            .json::<QueryResponse>()
            .await
            .map_err(|err| CollaboratorError::from_reqwest(SERVICE, self.timeout, err))
    }
}

#[async_trait]
impl DocumentStore for ChromaStore {
    async fn query(
        &self,
        text: &str,
        filter: PriceFilter,
        top_k: usize,
    ) -> Result<Vec<StoredDocument>, CollaboratorError> {
        let collection_id = self.collection_id().await?;
        let embedding = self.embedder.embed(text).await?;

        let url = format!("{}/api/v1/collections/{}/query", self.base_url, collection_id);
        let body = QueryRequest {
            query_embeddings: vec![embedding.as_slice()],
            n_results: top_k,
            filter: json!({ "price": { "$lte": filter.price_ceiling } }),
            include: ["documents", "metadatas", "distances"],
        };

        debug!(ceiling = filter.price_ceiling, top_k, "store query");
        let response = self
            .retry
            .run("store_query", || self.query_once(&url, &body))
            .await?;

        Ok(into_documents(response))
    }
}

fn into_documents(response: QueryResponse) -> Vec<StoredDocument> {
    let QueryResponse {
        ids,
        documents,
        metadatas,
    } = response;

    let ids = ids.into_iter().next().unwrap_or_default();
    let mut documents = documents.into_iter().next().unwrap_or_default().into_iter();
    let mut metadatas = metadatas.into_iter().next().unwrap_or_default().into_iter();

    ids.into_iter()
        .map(|id| {
            let document = documents.next().flatten().unwrap_or_default();
            let metadata = metadatas.next().flatten().unwrap_or_default();
            StoredDocument {
                document,
                metadata: into_metadata(id, metadata),
            }
        })
        .collect()
}

fn into_metadata(record_id: String, mut raw: Map<String, Value>) -> DocumentMetadata {
    let id = match raw.remove("id") {
        Some(Value::String(id)) => Some(id),
        Some(Value::Number(id)) => Some(id.to_string()),
        _ => Some(record_id),
    };
    let price = raw.remove("price").and_then(|price| match price {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => super::parsing::parse_amount(&text),
        _ => None,
    });
    let url = match raw.remove("url") {
        Some(Value::String(url)) => Some(url),
        _ => None,
    };

    DocumentMetadata {
        id,
        price,
        url,
        extra: raw.into_iter().collect::<BTreeMap<_, _>>(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flattens_first_query_row() {
        let response: QueryResponse = serde_json::from_value(json!({
            "ids": [["a1", "b2"]],
            "documents": [["Name: Loft", null]],
            "metadatas": [[
                { "id": "1001", "price": 120.5, "url": "https://x/1001", "bedrooms": 1 },
                null
            ]],
            "distances": [[0.1, 0.2]]
        }))
        .unwrap();

        let documents = into_documents(response);
        assert_eq!(documents.len(), 2);
        assert_eq!(documents[0].document, "Name: Loft");
        assert_eq!(documents[0].metadata.id.as_deref(), Some("1001"));
        assert_eq!(documents[0].metadata.price, Some(120.5));
        assert_eq!(documents[0].metadata.extra["bedrooms"], json!(1));
        assert_eq!(documents[1].document, "");
        assert_eq!(documents[1].metadata.id.as_deref(), Some("b2"));
        assert_eq!(documents[1].metadata.price, None);
    }

    #[test]
    fn empty_response_yields_no_documents() {
        assert!(into_documents(QueryResponse::default()).is_empty());
    }
}
