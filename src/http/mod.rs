//! HTTP client module for upstream catalog requests.

mod client;
mod status;

pub use client::HttpClient;
pub use status::describe_failure;
