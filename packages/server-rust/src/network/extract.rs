//! JSON body extractors answering malformed input with the error envelope.

use axum::extract::{FromRequest, Request};
use bytes::Bytes;
use depot_core::Validate;
use serde::de::DeserializeOwned;

use super::error::ApiError;

/// Decodes the request body as JSON.
///
/// Unlike `axum::Json`, rejections are [`ApiError::Validation`], so a
/// malformed body or unknown enum value gets the standard 400 envelope.
#[derive(Debug, Clone)]
pub struct JsonBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|rejection| ApiError::malformed(rejection.body_text()))?;
        let value = serde_json::from_slice(&bytes).map_err(|err| ApiError::malformed(err.to_string()))?;
        Ok(Self(value))
    }
}

/// [`JsonBody`] followed by field validation.
#[derive(Debug, Clone)]
pub struct ValidJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let JsonBody(value) = JsonBody::<T>::from_request(req, state).await?;
        value.validate()?;
        Ok(Self(value))
    }
}
