use std::sync::Arc;
use std::time::Duration;

use httpmock::prelude::*;
use serde_json::json;

use crate::config::{LlmSettings, SearchSettings, StoreSettings};

use super::{
    ChromaStore, CollaboratorError, DocumentStore, GenerationRequest, OpenAiClient, PriceFilter,
    RetryPolicy, SearchDepth, TavilySearch, TextGenerator, WebSearch,
};

fn fast_retry() -> RetryPolicy {
    RetryPolicy::new(3, Duration::from_millis(1))
}

fn llm_settings(server: &MockServer) -> LlmSettings {
    LlmSettings {
        api_key: "test-key".to_string(),
        base_url: server.base_url(),
        model: "gpt-4o-mini".to_string(),
        embedding_model: "text-embedding-3-small".to_string(),
        timeout_secs: 5,
        max_tokens: 512,
        user_agent: "nomad/test".to_string(),
    }
}

fn completion(content: &str) -> serde_json::Value {
    json!({
        "choices": [
            {
                "message": { "role": "assistant", "content": content },
                "finish_reason": "stop"
            }
        ]
    })
}

#[tokio::test]
async fn generate_json_requests_json_object_format() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/chat/completions")
                .header("Authorization", "Bearer test-key")
                .json_body(json!({
                    "model": "gpt-4o-mini",
                    "messages": [
                        { "role": "system", "content": "extract" },
                        { "role": "user", "content": "London to Tokyo" }
                    ],
                    "max_tokens": 512,
                    "temperature": 0.0,
                    "response_format": { "type": "json_object" }
                }));
            then.status(200)
                .json_body(completion(r#"{"origin":"London","destinations":["Tokyo"]}"#));
        })
        .await;

    let client = OpenAiClient::new(&llm_settings(&server), fast_retry()).unwrap();
    let value = client
        .generate_json(GenerationRequest::json("extract", "London to Tokyo"))
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(value["origin"], "London");
    assert_eq!(value["destinations"][0], "Tokyo");
}

#[tokio::test]
async fn text_generation_omits_response_format() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/chat/completions")
                .json_body(json!({
                    "model": "gpt-4o-mini",
                    "messages": [ { "role": "user", "content": "rewrite this" } ],
                    "max_tokens": 512,
                    "temperature": 0.0
                }));
            then.status(200)
                .json_body(completion("  best ramen shops in Osaka  "));
        })
        .await;

    let client = OpenAiClient::new(&llm_settings(&server), fast_retry()).unwrap();
    let reply = client
        .generate(GenerationRequest::text("rewrite this"))
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(reply, "best ramen shops in Osaka");
}

#[tokio::test]
async fn server_errors_are_retried_up_to_the_limit() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/chat/completions");
            then.status(503).body("overloaded");
        })
        .await;

    let client = OpenAiClient::new(&llm_settings(&server), fast_retry()).unwrap();
    let err = client
        .generate(GenerationRequest::text("hello"))
        .await
        .unwrap_err();

    mock.assert_hits_async(3).await;
    assert!(matches!(err, CollaboratorError::Http { status: 503, .. }));
}

#[tokio::test]
async fn unauthorized_is_not_retried() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/chat/completions");
            then.status(401).body("bad key");
        })
        .await;

    let client = OpenAiClient::new(&llm_settings(&server), fast_retry()).unwrap();
    let err = client
        .generate(GenerationRequest::text("hello"))
        .await
        .unwrap_err();

    mock.assert_hits_async(1).await;
    assert!(matches!(err, CollaboratorError::Unauthorized { .. }));
}

#[tokio::test]
async fn empty_choices_are_malformed() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/chat/completions");
            then.status(200).json_body(json!({ "choices": [] }));
        })
        .await;

    let client = OpenAiClient::new(&llm_settings(&server), fast_retry()).unwrap();
    let err = client
        .generate(GenerationRequest::text("hello"))
        .await
        .unwrap_err();

    assert!(matches!(err, CollaboratorError::Malformed { .. }));
}

#[tokio::test]
async fn tavily_search_returns_ranked_hits() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/search").json_body(json!({
                "api_key": "search-key",
                "query": "things to do in Kyoto",
                "search_depth": "advanced",
                "max_results": 2
            }));
            then.status(200).json_body(json!({
                "query": "things to do in Kyoto",
                "results": [
                    { "title": "Temples", "url": "https://a.example", "content": "Visit Kiyomizu-dera", "score": 0.9 },
                    { "title": "Food", "url": "https://b.example", "content": "Nishiki market", "score": 0.8 },
                    { "title": "Extra", "url": "https://c.example", "content": "Ignored", "score": 0.1 }
                ]
            }));
        })
        .await;

    let settings = SearchSettings {
        api_key: "search-key".to_string(),
        base_url: server.base_url(),
        timeout_secs: 5,
    };
    let search = TavilySearch::new(&settings, fast_retry()).unwrap();
    let hits = search
        .search("things to do in Kyoto", SearchDepth::Advanced, 2)
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(hits.len(), 2);
    assert_eq!(hits[0].url, "https://a.example");
    assert_eq!(hits[1].content, "Nishiki market");
}

#[tokio::test]
async fn chroma_query_embeds_filters_and_caches_collection() {
    let server = MockServer::start_async().await;

    let lookup = server
        .mock_async(|when, then| {
            when.method(GET).path("/api/v1/collections/tokyo_listings");
            then.status(200)
                .json_body(json!({ "id": "col-123", "name": "tokyo_listings" }));
        })
        .await;

    let embeddings = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/embeddings")
                .json_body(json!({
                    "model": "text-embedding-3-small",
                    "input": "Best stay in Tokyo for quiet trip"
                }));
            then.status(200)
                .json_body(json!({ "data": [ { "embedding": [0.25, 0.5] } ] }));
        })
        .await;

    let query = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/api/v1/collections/col-123/query")
                .json_body(json!({
                    "query_embeddings": [[0.25, 0.5]],
                    "n_results": 3,
                    "where": { "price": { "$lte": 800.0 } },
                    "include": ["documents", "metadatas", "distances"]
                }));
            then.status(200).json_body(json!({
                "ids": [["1001"]],
                "documents": [["Name: Shibuya loft. Guest Vibe: quiet"]],
                "metadatas": [[ { "id": "1001", "price": 150.0, "url": "https://listing/1001" } ]],
                "distances": [[0.12]]
            }));
        })
        .await;

    let embedder = Arc::new(OpenAiClient::new(&llm_settings(&server), fast_retry()).unwrap());
    let store_settings = StoreSettings {
        base_url: server.base_url(),
        collection: "tokyo_listings".to_string(),
        top_k: 3,
        timeout_secs: 5,
    };
    let store = ChromaStore::new(&store_settings, embedder, fast_retry()).unwrap();

    for _ in 0..2 {
        let docs = store
            .query(
                "Best stay in Tokyo for quiet trip",
                PriceFilter {
                    price_ceiling: 800.0,
                },
                3,
            )
            .await
            .unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].metadata.price, Some(150.0));
        assert_eq!(docs[0].metadata.url.as_deref(), Some("https://listing/1001"));
    }

    lookup.assert_hits_async(1).await;
    embeddings.assert_hits_async(2).await;
    query.assert_hits_async(2).await;
}
