//! # Channel Lifecycle
//!
//! Deploy, inspect, extend, time out and settle payment channel contracts.
//!
//! - `client.rs`: [`ChannelClient`], one signing identity's view of its channels.
//! - `info.rs`: [`ChannelInfo`], the decoded `getInfo` tuple.
//! - `error.rs`: [`ChannelError`].

pub mod client;
pub mod info;

mod error;

pub use client::{ChannelClient, ReadRetry};
pub use error::ChannelError;
pub use info::ChannelInfo;
