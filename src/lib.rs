pub mod catalog;
pub mod commands;
pub mod error;
pub mod http;
pub mod manifest;
pub mod provider;
pub mod resolution;
pub mod runtime;
pub mod version;
