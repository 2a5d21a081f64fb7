//! Integration tests driving the HTTP router and the book stores

mod api_tests;
mod store_tests;
