//! Request and response shape checks, run before anything touches the network or the store.
use crate::protocol::MAX_CONTENT_FILTERS;
use crate::request::{HistoryQuery, HistoryRequest};
use crate::response::HistoryResponse;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("missing request id")]
    MissingRequestId,

    #[error("missing query")]
    MissingQuery,

    #[error("no pubsub topic or content topics to resolve one from")]
    EmptyContentFilters,

    #[error("the number of content filters exceeds the limit: {0} > {}", MAX_CONTENT_FILTERS)]
    TooManyContentFilters(usize),

    #[error("one or more content topics specified is empty")]
    EmptyContentTopic,

    #[error("request id mismatch")]
    RequestIdMismatch,

    #[error("invalid message: {0}")]
    InvalidMessage(&'static str),
}

pub fn validate_query(query: &HistoryQuery) -> Result<(), ValidationError> {
    if query.content_topics.len() > MAX_CONTENT_FILTERS {
        return Err(ValidationError::TooManyContentFilters(
            query.content_topics.len(),
        ));
    }

    if query.content_topics.iter().any(|topic| topic.is_empty()) {
        return Err(ValidationError::EmptyContentTopic);
    }

    Ok(())
}

/// Queries sent to a remote peer must name a pubsub topic, or at least one content topic it can
/// be derived from.
pub fn validate_outbound_query(query: &HistoryQuery) -> Result<(), ValidationError> {
    validate_query(query)?;

    if query.pubsub_topic.is_none() && query.content_topics.is_empty() {
        return Err(ValidationError::EmptyContentFilters);
    }

    Ok(())
}

pub fn validate_request(request: &HistoryRequest) -> Result<(), ValidationError> {
    if request.request_id.is_empty() {
        return Err(ValidationError::MissingRequestId);
    }

    validate_query(&request.query)
}

pub fn validate_response(
    response: &HistoryResponse,
    request_id: &str,
) -> Result<(), ValidationError> {
    if response.request_id.is_empty() {
        return Err(ValidationError::MissingRequestId);
    }

    if response.request_id != request_id {
        return Err(ValidationError::RequestIdMismatch);
    }

    if let Ok(body) = &response.result {
        if body
            .messages
            .iter()
            .any(|message| message.content_topic.is_empty())
        {
            return Err(ValidationError::InvalidMessage("missing content topic"));
        }
    }

    Ok(())
}
