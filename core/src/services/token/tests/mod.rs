//! Tests for token variants and the token factory

pub(crate) mod mocks;
