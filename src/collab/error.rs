//! Collaborator error types

use reqwest::{Response, StatusCode};
use std::time::Duration;
use thiserror::Error;

/// Failure talking to an external collaborator (LLM, search, document store).
#[derive(Debug, Error)]
pub enum CollaboratorError {
    #[error("{service} rate limited the request, retry after {retry_after:?}")]
    RateLimited {
        service: &'static str,
        retry_after: Duration,
    },

    #[error("{service} returned HTTP {status}: {message}")]
    Http {
        service: &'static str,
        status: u16,
        message: String,
    },

    #[error("{service} rejected the credentials")]
    Unauthorized { service: &'static str },

    #[error("network error calling {service}: {source}")]
    Network {
        service: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{service} timed out after {elapsed:?}")]
    Timeout {
        service: &'static str,
        elapsed: Duration,
    },

    #[error("malformed response from {service}: {detail}")]
    Malformed {
        service: &'static str,
        detail: String,
    },
}

impl CollaboratorError {
    pub fn malformed(service: &'static str, detail: impl Into<String>) -> Self {
        CollaboratorError::Malformed {
            service,
            detail: detail.into(),
        }
    }

    /// Map a transport failure, keeping timeouts distinct from other network errors.
    pub fn from_reqwest(service: &'static str, timeout: Duration, source: reqwest::Error) -> Self {
        if source.is_timeout() {
            CollaboratorError::Timeout {
                service,
                elapsed: timeout,
            }
        } else if source.is_decode() {
            CollaboratorError::Malformed {
                service,
                detail: source.to_string(),
            }
        } else {
            CollaboratorError::Network { service, source }
        }
    }

    /// Check if this error is worth another attempt
    pub fn is_retryable(&self) -> bool {
        match self {
            CollaboratorError::RateLimited { .. } => true,
            CollaboratorError::Http { status, .. } => {
                matches!(*status, 408 | 429) || *status >= 500
            }
            CollaboratorError::Network { .. } => true,
            CollaboratorError::Timeout { .. } => true,
            CollaboratorError::Unauthorized { .. } => false,
            CollaboratorError::Malformed { .. } => false,
        }
    }

    /// Server-requested delay, if any
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            CollaboratorError::RateLimited { retry_after, .. } => Some(*retry_after),
            _ => None,
        }
    }
}

/// Turn a non-success HTTP status into the matching error variant.
pub(crate) async fn check_status(
    service: &'static str,
    response: Response,
) -> Result<Response, CollaboratorError> {
    match response.status() {
        status if status.is_success() => Ok(response),
        StatusCode::TOO_MANY_REQUESTS => {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|value| value.to_str().ok())
                .and_then(|value| value.parse::<u64>().ok())
                .unwrap_or(1);
            Err(CollaboratorError::RateLimited {
                service,
                retry_after: Duration::from_secs(retry_after),
            })
        }
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            Err(CollaboratorError::Unauthorized { service })
        }
        status => {
            let message = response.text().await.unwrap_or_default();
            Err(CollaboratorError::Http {
                service,
                status: status.as_u16(),
                message,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_retryable() {
        assert!(
            CollaboratorError::RateLimited {
                service: "search",
                retry_after: Duration::from_secs(2)
            }
            .is_retryable()
        );

        assert!(
            CollaboratorError::Http {
                service: "llm",
                status: 503,
                message: "unavailable".to_string()
            }
            .is_retryable()
        );

        assert!(
            !CollaboratorError::Http {
                service: "llm",
                status: 400,
                message: "bad request".to_string()
            }
            .is_retryable()
        );

        assert!(
            CollaboratorError::Timeout {
                service: "store",
                elapsed: Duration::from_secs(30)
            }
            .is_retryable()
        );

        assert!(!CollaboratorError::Unauthorized { service: "llm" }.is_retryable());
        assert!(!CollaboratorError::malformed("llm", "not json").is_retryable());
    }

    #[test]
    fn test_retry_after() {
        let err = CollaboratorError::RateLimited {
            service: "llm",
            retry_after: Duration::from_secs(7),
        };
        assert_eq!(err.retry_after(), Some(Duration::from_secs(7)));
        assert_eq!(
            CollaboratorError::Unauthorized { service: "llm" }.retry_after(),
            None
        );
    }

    #[test]
    fn display_names_the_service() {
        let err = CollaboratorError::malformed("document store", "missing ids");
        assert_eq!(
            err.to_string(),
            "malformed response from document store: missing ids"
        );
    }
}
