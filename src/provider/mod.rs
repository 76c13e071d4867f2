//! Outbound integration with the print-and-mail provider.
//!
//! Split into three concerns: building the outbound request in whichever
//! wire shape the deployment needs ([`request`]), performing the HTTP call
//! ([`client`]), and normalizing the provider's heterogeneous replies into
//! the internal taxonomy ([`response`]).

pub mod client;
pub mod request;
pub mod response;

pub use client::{ProviderClient, RawResponse};
pub use request::{AuthPlacement, OutboundBody, OutboundRequest, ProviderRequestBuilder, WireShape};
pub use response::{SubmissionResult, normalize};
