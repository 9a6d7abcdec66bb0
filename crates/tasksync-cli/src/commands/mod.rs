pub mod backoff;
pub mod comments;
pub mod common;
pub mod completions;
pub mod resolve;
