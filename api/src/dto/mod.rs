//! Request and response bodies

pub mod sessions;

pub use sessions::*;
