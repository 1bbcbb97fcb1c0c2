//! Protobuf wire representation of the history protocol and its conversions from and into the
//! domain types.
pub use proto::waku::store::v2beta4::*;

mod pagination;
mod proto;
mod request;
mod response;
