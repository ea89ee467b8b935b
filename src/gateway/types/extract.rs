//! Request body extractor with validation.
//!
//! Clients post either JSON or HTML-form bodies; both decode into the same
//! request type, which is then checked with `validator`.

use axum::{
    Form, Json,
    extract::{FromRequest, Request},
    http::header,
};
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationErrors};

use super::error::ApiError;

/// Body decoded from JSON or `application/x-www-form-urlencoded`, then validated
#[derive(Debug, Clone)]
pub struct ValidatedBody<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedBody<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_form = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.starts_with("application/x-www-form-urlencoded"));

        let value = if is_form {
            let Form(value) = Form::<T>::from_request(req, state)
                .await
                .map_err(|e| ApiError::bad_request(format!("Invalid form body: {}", e.body_text())))?;
            value
        } else {
            let Json(value) = Json::<T>::from_request(req, state)
                .await
                .map_err(|e| ApiError::bad_request(format!("Invalid JSON: {}", e.body_text())))?;
            value
        };

        value
            .validate()
            .map_err(|e| ApiError::bad_request(validation_message(&e)))?;

        Ok(Self(value))
    }
}

/// Flatten field errors into `"field: message"` pairs, sorted by field.
pub fn validation_message(errors: &ValidationErrors) -> String {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));

    fields
        .iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| match &e.message {
                Some(msg) => format!("{}: {}", field, msg),
                None => format!("{}: invalid value ({})", field, e.code),
            })
        })
        .collect::<Vec<_>>()
        .join("; ")
}
