//! Request extractors whose rejections surface as [`ServerError::Validation`].
//!
//! axum's stock `Json` and `Path` reject with 415/422 and a plain-text body;
//! these wrappers route the same failures through the JSON error envelope.

use axum::extract::{FromRequest, FromRequestParts};

use crate::error::ServerError;

/// `axum::Json` with a 400 validation envelope on malformed or mistyped bodies.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ServerError))]
pub struct ValidJson<T>(pub T);

/// `axum::extract::Path` with a 400 validation envelope on unparsable segments.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ServerError))]
pub struct ValidPath<T>(pub T);
