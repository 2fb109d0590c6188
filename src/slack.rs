//! A client for the parts of Slack's Web API we use.
//!
//! Each module extends [api::SlackClient] with the endpoints for its area,
//! keeping request and response shapes next to the calls that use them.

pub mod api;
pub mod auth;
pub mod block;
pub mod channel;
pub mod error;
pub mod file;
pub mod mention;
pub mod message;
pub mod user;
