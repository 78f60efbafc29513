//! Request extractors.

pub mod request_meta;
pub use request_meta::{RequestMeta, USER_HEADER};
