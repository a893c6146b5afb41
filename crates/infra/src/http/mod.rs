//! HTTP transport shared by the API client, probe and log shipping

pub mod client;

pub use client::{status_failure, validate_http_url, HttpClient, HttpClientBuilder};
