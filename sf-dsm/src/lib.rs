//! DSM Web API transport for Synofan
//!
//! Implements [`sf_core::ManagementApi`] over HTTPS using the appliance's
//! `auth.cgi` / `entry.cgi` endpoints.

pub mod client;
pub mod protocol;

pub use client::DsmClient;
pub use protocol::{ApiEnvelope, ApiErrorBody, LoginData, TokenData};
