use crate::response::{HistoryErrorKind, HistoryResponse, HistoryResponseBody};
use crate::rpc::{history_response, HistoryResponse as HistoryResponseProto, HistoryRpc, PagingInfo};

impl From<i32> for HistoryErrorKind {
    fn from(error: i32) -> Self {
        match error {
            e if e == history_response::Error::InvalidCursor as i32 => {
                HistoryErrorKind::InvalidCursor
            }
            _ => HistoryErrorKind::Unknown(error),
        }
    }
}

impl From<HistoryErrorKind> for i32 {
    fn from(err: HistoryErrorKind) -> Self {
        match err {
            HistoryErrorKind::InvalidCursor => history_response::Error::InvalidCursor as i32,
            HistoryErrorKind::Unknown(code) => code,
        }
    }
}

impl From<HistoryRpc> for HistoryResponse {
    /// Some store nodes omit the response field when there is nothing to return, so a missing
    /// response reads as an empty, complete page.
    fn from(rpc: HistoryRpc) -> Self {
        let response = match rpc.response {
            Some(response) => response,
            None => {
                return HistoryResponse {
                    request_id: rpc.request_id,
                    result: Ok(HistoryResponseBody::default()),
                }
            }
        };

        if response.error != history_response::Error::None as i32 {
            return HistoryResponse {
                request_id: rpc.request_id,
                result: Err(response.error.into()),
            };
        }

        let next_page = response
            .paging_info
            .and_then(|info| info.cursor)
            .map(Into::into);

        HistoryResponse {
            request_id: rpc.request_id,
            result: Ok(HistoryResponseBody {
                messages: response.messages.into_iter().map(Into::into).collect(),
                next_page,
            }),
        }
    }
}

impl From<HistoryResponse> for HistoryRpc {
    fn from(response: HistoryResponse) -> Self {
        let response_proto = match response.result {
            Err(err) => HistoryResponseProto {
                messages: vec![],
                paging_info: None,
                error: err.into(),
            },
            Ok(body) => HistoryResponseProto {
                paging_info: Some(PagingInfo {
                    page_size: body.messages.len() as u64,
                    cursor: body.next_page.map(Into::into),
                    direction: Default::default(),
                }),
                messages: body.messages.into_iter().map(Into::into).collect(),
                error: history_response::Error::None as i32,
            },
        };

        HistoryRpc {
            request_id: response.request_id,
            query: None,
            response: Some(response_proto),
        }
    }
}
