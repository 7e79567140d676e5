//! Configuration snapshot endpoint

use axum::{
    extract::{Query, State, rejection::QueryRejection},
    http::header,
    response::{IntoResponse, Response},
};
use tracing::debug;

use super::state::AppState;
use super::types::ApiError;

/// Header reporting whether the payload came from the cache or the store
pub const ORIGIN_HEADER: &str = "x-config-origin";

const LABEL_PARAM: &str = "label_filter";

/// Raw query pairs, in the order they appear
///
/// Decoding into pairs instead of a struct keeps repeated parameters from
/// turning into an extractor rejection.
pub type QueryPairs = Vec<(String, String)>;

/// First `label_filter` value of the query, if any
pub fn label_param(pairs: &[(String, String)]) -> Option<&str> {
    pairs
        .iter()
        .find(|(name, _)| name == LABEL_PARAM)
        .map(|(_, value)| value.as_str())
}

/// `GET /get_config?label_filter=<label>`
pub async fn get_config(
    State(state): State<AppState>,
    query: Result<Query<QueryPairs>, QueryRejection>,
) -> Result<Response, ApiError> {
    let Query(pairs) = query.map_err(|rejection| {
        debug!(error = %rejection, "Unreadable query string");
        ApiError::missing_label()
    })?;

    let payload = state.handler.handle(label_param(&pairs)).await?;

    Ok((
        [
            (header::CONTENT_TYPE, "application/json"),
            (header::HeaderName::from_static(ORIGIN_HEADER), payload.origin.as_str()),
        ],
        payload.body,
    )
        .into_response())
}
