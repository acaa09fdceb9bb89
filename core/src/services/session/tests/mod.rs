//! Tests for the session store

mod store_tests;
