//! Domain types shared by the storage layer, the upstream catalog client and
//! the HTTP handlers. Nothing in this crate performs I/O.

pub mod character;
pub mod error;
pub mod json;
pub mod post;
pub mod selector;
pub mod types;
