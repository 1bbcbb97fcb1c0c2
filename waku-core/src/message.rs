use byte_unit::MEBIBYTE;

pub use digest::*;
pub use message::*;

mod digest;
mod message;
pub mod proto;
mod traits;

/// In bytes. Corresponds to the PubSub default.
pub const MAX_WAKU_MESSAGE_SIZE: usize = MEBIBYTE as usize;
