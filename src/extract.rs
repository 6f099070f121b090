use crate::errors::AppError;
use axum::extract::{FromRequest, FromRequestParts};

/// `axum::Json` that answers malformed bodies with the JSON error shape.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct JsonBody<T>(pub T);

/// `axum::extract::Query` with the same error shape.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct QueryParams<T>(pub T);
