//! API module for Microsoft Graph interactions

mod client;
pub mod groups;
pub mod intune;

pub use client::GraphClient;
