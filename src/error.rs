use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::auth::{jwt::TokenError, password::PasswordError};
use crate::db::RepoError;

/// Every failure a request can end in, mapped onto one HTTP status each.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Authentication(String),
    #[error("{0}")]
    Authorization(String),
    #[error("{0}")]
    NotFound(String),
    #[error("email already registered")]
    DuplicateEmail,
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Authentication(_) => "AUTHENTICATION_ERROR",
            Self::Authorization(_) => "AUTHORIZATION_ERROR",
            Self::NotFound(_) => "NOT_FOUND",
            Self::DuplicateEmail => "DUPLICATE_EMAIL",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Authentication(_) => StatusCode::UNAUTHORIZED,
            Self::Authorization(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::DuplicateEmail => StatusCode::CONFLICT,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        // 4xx already show up in the trace layer's response event.
        if let Self::Internal(ref e) = self {
            tracing::error!(error = ?e, "internal error");
        }
        let body = serde_json::json!({
            "kind": self.kind(),
            "message": self.to_string(),
        });
        (self.status(), Json(body)).into_response()
    }
}

impl From<RepoError> for ApiError {
    fn from(e: RepoError) -> Self {
        match e {
            RepoError::NotFound(what) => ApiError::NotFound(format!("{what} not found")),
            RepoError::DuplicateEmail => ApiError::DuplicateEmail,
            RepoError::InvalidReference(what) => ApiError::Validation(format!("unknown {what}")),
            RepoError::Internal(e) => ApiError::Internal(e),
        }
    }
}

impl From<PasswordError> for ApiError {
    fn from(e: PasswordError) -> Self {
        ApiError::Internal(anyhow::Error::new(e))
    }
}

impl From<TokenError> for ApiError {
    fn from(e: TokenError) -> Self {
        match e {
            TokenError::Invalid => ApiError::Authentication("invalid or expired token".into()),
            TokenError::Signing(_) => ApiError::Internal(anyhow::Error::new(e)),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_of(err: ApiError) -> (StatusCode, serde_json::Value) {
        let resp = err.into_response();
        let status = resp.status();
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn taxonomy_maps_to_statuses() {
        let cases = [
            (ApiError::Validation("bad".into()), StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            (ApiError::Authentication("who".into()), StatusCode::UNAUTHORIZED, "AUTHENTICATION_ERROR"),
            (ApiError::Authorization("no".into()), StatusCode::FORBIDDEN, "AUTHORIZATION_ERROR"),
            (ApiError::NotFound("gone".into()), StatusCode::NOT_FOUND, "NOT_FOUND"),
            (ApiError::DuplicateEmail, StatusCode::CONFLICT, "DUPLICATE_EMAIL"),
        ];
        for (err, status, kind) in cases {
            let (got_status, json) = body_of(err).await;
            assert_eq!(got_status, status);
            assert_eq!(json["kind"], kind);
        }
    }

    #[tokio::test]
    async fn internal_errors_hide_their_cause() {
        let (status, json) = body_of(ApiError::Internal(anyhow::anyhow!("connection refused"))).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["kind"], "INTERNAL_ERROR");
        assert_eq!(json["message"], "internal error");
    }

    #[test]
    fn repo_errors_are_classified() {
        assert!(matches!(
            ApiError::from(RepoError::NotFound("company")),
            ApiError::NotFound(msg) if msg == "company not found"
        ));
        assert!(matches!(ApiError::from(RepoError::DuplicateEmail), ApiError::DuplicateEmail));
        assert!(matches!(
            ApiError::from(RepoError::InvalidReference("skill")),
            ApiError::Validation(msg) if msg == "unknown skill"
        ));
        assert!(matches!(
            ApiError::from(RepoError::Internal(anyhow::anyhow!("boom"))),
            ApiError::Internal(_)
        ));
    }

    #[test]
    fn invalid_token_is_an_authentication_error() {
        assert!(matches!(ApiError::from(TokenError::Invalid), ApiError::Authentication(_)));
    }
}
