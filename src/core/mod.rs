//! Core primitives for revcompare (no presentation dependencies).

mod config;
mod diff;
mod repo;
mod service;
mod status;
mod text;
mod tree;

pub use config::*;
pub use diff::*;
pub use repo::*;
pub use service::*;
pub use status::*;
pub use text::*;
pub use tree::*;
