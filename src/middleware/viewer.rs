use axum::{async_trait, extract::FromRequestParts, http::request::Parts};

use crate::error::AppError;

/// HTTP header carrying the authenticated account id
///
/// Authentication itself is terminated upstream; the gateway forwards the
/// resolved account id in this header. Anything unparseable is treated as an
/// unauthenticated request.
pub const VIEWER_ID_HEADER: &str = "x-viewer-id";

/// Identity of the requesting user, extracted from the gateway header
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ViewerId(pub i64);

impl std::fmt::Display for ViewerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for ViewerId
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(VIEWER_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.parse::<i64>().ok())
            .map(ViewerId)
            .ok_or_else(|| AppError::Unauthorized("Missing viewer identity".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    async fn extract(header: Option<&'static str>) -> Result<ViewerId, AppError> {
        let mut builder = Request::builder().uri("/newsfeed/10");
        if let Some(value) = header {
            builder = builder.header(VIEWER_ID_HEADER, value);
        }
        let (mut parts, _) = builder.body(()).unwrap().into_parts();
        ViewerId::from_request_parts(&mut parts, &()).await
    }

    #[tokio::test]
    async fn test_extracts_numeric_id() {
        let viewer = extract(Some("42")).await.unwrap();
        assert_eq!(viewer, ViewerId(42));
    }

    #[tokio::test]
    async fn test_rejects_missing_header() {
        assert!(matches!(
            extract(None).await,
            Err(AppError::Unauthorized(_))
        ));
    }

    #[tokio::test]
    async fn test_rejects_garbage_header() {
        assert!(matches!(
            extract(Some("not-a-number")).await,
            Err(AppError::Unauthorized(_))
        ));
    }
}
