use crate::api::AppState;
use crate::domain::id::generate_id;
use crate::error::AppError;
use axum::{
    Json,
    extract::{FromRequest, FromRequestParts, Request},
    http::{HeaderValue, header, request::Parts},
};
use base64::Engine;
use tower_http::request_id::{MakeRequestId, RequestId};

/// Extractor that enforces HTTP Basic credentials on a route. The check is
/// delegated to the state's [`CredentialVerifier`], so the comparison scheme
/// can be swapped without touching the handlers.
///
/// [`CredentialVerifier`]: crate::services::auth_service::CredentialVerifier
#[derive(Debug)]
pub struct BasicAuth {
    pub username: String,
}

impl FromRequestParts<AppState> for BasicAuth {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let auth_header = parts.headers.get(header::AUTHORIZATION).ok_or(AppError::Auth)?;

        let auth_str = auth_header.to_str().map_err(|_| AppError::Auth)?;
        let encoded = auth_str.strip_prefix("Basic ").ok_or(AppError::Auth)?;

        let decoded =
            base64::engine::general_purpose::STANDARD.decode(encoded.trim()).map_err(|_| AppError::Auth)?;
        let decoded = String::from_utf8(decoded).map_err(|_| AppError::Auth)?;
        let (username, password) = decoded.split_once(':').ok_or(AppError::Auth)?;

        if !state.credentials.verify(username, password) {
            return Err(AppError::Auth);
        }

        Ok(Self { username: username.to_string() })
    }
}

/// JSON body extractor whose rejection deliberately does not say which field
/// was missing or malformed.
#[derive(Debug)]
pub struct AppJson<T>(pub T);

impl<T, S> FromRequest<S> for AppJson<T>
where
    T: serde::de::DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => {
                tracing::debug!(error = %rejection, "Request body rejected");
                Err(AppError::MissingField)
            }
        }
    }
}

/// Stamps requests that arrive without an `x-request-id` with a fresh random
/// token.
#[derive(Clone, Copy, Debug)]
pub struct MakeRequestToken;

impl MakeRequestId for MakeRequestToken {
    fn make_request_id<B>(&mut self, _request: &axum::http::Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&generate_id(16)).ok().map(RequestId::new)
    }
}
