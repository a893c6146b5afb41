//! EduBrain API client
//!
//! Wraps [`crate::http::HttpClient`] with credential headers, cache busting on
//! `GET`, envelope normalisation and routing of failures through the shared
//! [`edubrain_core::ErrorHandler`].

pub mod client;

pub use client::ApiClient;
