//! Tests for the signing service

mod header_tests;
mod service_tests;
