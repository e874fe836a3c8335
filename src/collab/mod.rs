//! External collaborators behind request/response traits.
//!
//! The pipeline only sees [`TextGenerator`], [`WebSearch`] and
//! [`DocumentStore`]. The HTTP implementations wrap every call in a timeout and
//! a bounded [`RetryPolicy`], so stages get a typed result and never have to
//! tell a transport failure apart from a legitimately empty answer.

pub mod chroma;
pub mod error;
pub mod openai;
pub(crate) mod parsing;
pub mod retry;
pub mod tavily;

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use chroma::ChromaStore;
pub use error::CollaboratorError;
pub use openai::OpenAiClient;
pub use retry::RetryPolicy;
pub use tavily::TavilySearch;

use crate::config::Config;

/// Shape the generator is asked to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub system: Option<String>,
    pub user: String,
    pub format: ResponseFormat,
}

impl GenerationRequest {
    pub fn json(system: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            system: Some(system.into()),
            user: user.into(),
            format: ResponseFormat::Json,
        }
    }

    pub fn text(user: impl Into<String>) -> Self {
        Self {
            system: None,
            user: user.into(),
            format: ResponseFormat::Text,
        }
    }
}

#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, request: GenerationRequest) -> Result<String, CollaboratorError>;

    /// Generate and parse the first JSON object in the reply.
    async fn generate_json(
        &self,
        request: GenerationRequest,
    ) -> Result<serde_json::Value, CollaboratorError> {
        let reply = self.generate(request).await?;
        let fragment = parsing::extract_json_object(&reply).ok_or_else(|| {
            CollaboratorError::malformed("text generation", "reply did not contain a JSON object")
        })?;
        serde_json::from_str(fragment).map_err(|err| {
            CollaboratorError::malformed("text generation", format!("invalid JSON: {err}"))
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchDepth {
    Basic,
    Advanced,
}

impl fmt::Display for SearchDepth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchDepth::Basic => write!(f, "basic"),
            SearchDepth::Advanced => write!(f, "advanced"),
        }
    }
}

/// One ranked search snippet.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SearchHit {
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub url: String,
}

#[async_trait]
pub trait WebSearch: Send + Sync {
    async fn search(
        &self,
        query: &str,
        depth: SearchDepth,
        max_results: usize,
    ) -> Result<Vec<SearchHit>, CollaboratorError>;
}

/// Metadata filter applied by the store before ranking.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceFilter {
    pub price_ceiling: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentMetadata {
    pub id: Option<String>,
    pub price: Option<f64>,
    pub url: Option<String>,
    pub extra: BTreeMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StoredDocument {
    pub document: String,
    pub metadata: DocumentMetadata,
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn query(
        &self,
        text: &str,
        filter: PriceFilter,
        top_k: usize,
    ) -> Result<Vec<StoredDocument>, CollaboratorError>;
}

/// Handles to every collaborator a pipeline run needs.
#[derive(Clone)]
pub struct Collaborators {
    pub text: Arc<dyn TextGenerator>,
    pub search: Arc<dyn WebSearch>,
    pub store: Arc<dyn DocumentStore>,
}

impl Collaborators {
    /// Build the HTTP-backed collaborators described by `config`.
    pub fn from_config(config: &Config) -> Result<Self, CollaboratorError> {
        let retry = RetryPolicy::from(config.retry);
        let llm = Arc::new(OpenAiClient::new(&config.llm, retry)?);
        let search = Arc::new(TavilySearch::new(&config.search, retry)?);
        let store = Arc::new(ChromaStore::new(&config.store, llm.clone(), retry)?);

        Ok(Self {
            text: llm,
            search,
            store,
        })
    }
}

#[cfg(test)]
mod tests;

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    type Handler = dyn Fn(&GenerationRequest) -> Result<String, CollaboratorError> + Send + Sync;

    /// Generator that answers through a closure and counts calls.
    pub struct MockGenerator {
        handler: Box<Handler>,
        calls: AtomicUsize,
        requests: Mutex<Vec<GenerationRequest>>,
    }

    impl MockGenerator {
        pub fn new<F>(handler: F) -> Self
        where
            F: Fn(&GenerationRequest) -> Result<String, CollaboratorError> + Send + Sync + 'static,
        {
            Self {
                handler: Box::new(handler),
                calls: AtomicUsize::new(0),
                requests: Mutex::new(Vec::new()),
            }
        }

        pub fn replying(reply: impl Into<String>) -> Self {
            let reply = reply.into();
            Self::new(move |_| Ok(reply.clone()))
        }

        pub fn failing() -> Self {
            Self::new(|_| {
                Err(CollaboratorError::Http {
                    service: "text generation",
                    status: 503,
                    message: "unavailable".to_string(),
                })
            })
        }

        pub fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        pub fn requests(&self) -> Vec<GenerationRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl TextGenerator for MockGenerator {
        async fn generate(&self, request: GenerationRequest) -> Result<String, CollaboratorError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.requests.lock().unwrap().push(request.clone());
            (self.handler)(&request)
        }
    }

    /// Search that returns fixed hits, or fails when built with `failing`.
    pub struct MockSearch {
        hits: Vec<SearchHit>,
        fail: bool,
        queries: Mutex<Vec<String>>,
    }

    impl MockSearch {
        pub fn with_hits(hits: Vec<SearchHit>) -> Self {
            Self {
                hits,
                fail: false,
                queries: Mutex::new(Vec::new()),
            }
        }

        pub fn failing() -> Self {
            Self {
                hits: Vec::new(),
                fail: true,
                queries: Mutex::new(Vec::new()),
            }
        }

        pub fn queries(&self) -> Vec<String> {
            self.queries.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl WebSearch for MockSearch {
        async fn search(
            &self,
            query: &str,
            _depth: SearchDepth,
            max_results: usize,
        ) -> Result<Vec<SearchHit>, CollaboratorError> {
            self.queries.lock().unwrap().push(query.to_string());
            if self.fail {
                return Err(CollaboratorError::Timeout {
                    service: "web search",
                    elapsed: std::time::Duration::from_secs(1),
                });
            }
            Ok(self.hits.iter().take(max_results).cloned().collect())
        }
    }

    /// Store that returns documents priced at or under the ceiling.
    pub struct MockStore {
        documents: Vec<StoredDocument>,
        fail: bool,
        ceilings: Mutex<Vec<f64>>,
    }

    impl MockStore {
        pub fn with_documents(documents: Vec<StoredDocument>) -> Self {
            Self {
                documents,
                fail: false,
                ceilings: Mutex::new(Vec::new()),
            }
        }

        pub fn empty() -> Self {
            Self::with_documents(Vec::new())
        }

        pub fn failing() -> Self {
            Self {
                documents: Vec::new(),
                fail: true,
                ceilings: Mutex::new(Vec::new()),
            }
        }

        pub fn ceilings(&self) -> Vec<f64> {
            self.ceilings.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl DocumentStore for MockStore {
        async fn query(
            &self,
            _text: &str,
            filter: PriceFilter,
            top_k: usize,
        ) -> Result<Vec<StoredDocument>, CollaboratorError> {
            self.ceilings.lock().unwrap().push(filter.price_ceiling);
            if self.fail {
                return Err(CollaboratorError::Unauthorized {
                    service: "document store",
                });
            }
            Ok(self
                .documents
                .iter()
                .filter(|doc| {
                    doc.metadata
                        .price
                        .is_none_or(|price| price <= filter.price_ceiling)
                })
                .take(top_k)
                .cloned()
                .collect())
        }
    }

    pub fn listing(id: &str, price: f64, document: &str) -> StoredDocument {
        StoredDocument {
            document: document.to_string(),
            metadata: DocumentMetadata {
                id: Some(id.to_string()),
                price: Some(price),
                url: Some(format!("https://listings.example/{id}")),
                extra: BTreeMap::new(),
            },
        }
    }

    #[tokio::test]
    async fn generate_json_parses_fenced_reply() {
        let generator = MockGenerator::replying("```json\n{\"origin\":\"London\"}\n```");
        let value = generator
            .generate_json(GenerationRequest::json("sys", "user"))
            .await
            .unwrap();
        assert_eq!(value["origin"], "London");
    }

    #[tokio::test]
    async fn generate_json_surfaces_parse_failures() {
        let generator = MockGenerator::replying("I could not find anything");
        let err = generator
            .generate_json(GenerationRequest::json("sys", "user"))
            .await
            .unwrap_err();
        assert!(matches!(err, CollaboratorError::Malformed { .. }));
    }
}
