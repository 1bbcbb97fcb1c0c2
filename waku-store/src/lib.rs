pub use client::*;
pub use crate::config::*;
pub use envelope::*;
pub use error::*;
pub use memory::*;
pub use options::*;
pub use pagination::*;
pub use peer_manager::*;
pub use protocol::*;
pub use provider::*;
pub use request::*;
pub use response::*;
pub use store::*;
pub use timesource::*;
pub use transport::*;

mod client;
pub mod codec;
mod config;
mod envelope;
mod error;
mod memory;
mod options;
mod pagination;
mod peer_manager;
mod protocol;
mod provider;
mod request;
mod response;
mod resume;
pub mod rpc;
mod server;
mod store;
mod timesource;
mod transport;
pub mod validation;
