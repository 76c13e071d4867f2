//! Cartero — photo + message in, mailed postcard out.
//!
//! The core is the submission pipeline: validate the request, enforce the
//! send quota and single-use codes, render the back-side artifact, build
//! and send the provider request, and normalize whatever comes back.

pub mod artifact;
pub mod config;
pub mod error;
pub mod http;
pub mod pipeline;
pub mod provider;
pub mod quota;
pub mod request;
