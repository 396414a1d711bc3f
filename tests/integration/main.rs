//! Integration tests against mock HTTP servers

mod crawl_tests;
mod providers_tests;
mod search_tests;
