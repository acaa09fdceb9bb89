//! Tests for authentication session flows
