pub use namespaced::*;
pub use topic::*;

mod namespaced;
mod topic;
