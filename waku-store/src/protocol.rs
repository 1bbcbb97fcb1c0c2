use waku_core::message::MAX_WAKU_MESSAGE_SIZE;

pub const PROTOCOL_ID: &str = "/vac/waku/store/2.0.0-beta4";

pub const DEFAULT_PAGE_SIZE: u64 = 20;

pub const MAX_PAGE_SIZE: u64 = 100;

pub const MAX_CONTENT_FILTERS: usize = 10;

/// Largest history frame a node reads or writes: a full page of maximum size messages plus a
/// 64kB safety buffer for protocol overhead.
pub const MAX_PROTOBUF_SIZE: usize = MAX_PAGE_SIZE as usize * MAX_WAKU_MESSAGE_SIZE + 64 * 1024;
