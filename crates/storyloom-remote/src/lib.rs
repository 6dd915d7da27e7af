#![doc = include_str!("../README.md")]
#![deny(unused_crate_dependencies)]

mod client;
mod config;
mod error;
mod wire;

pub use client::HttpStoryClient;
pub use config::RemoteConfig;
pub use error::{RemoteError, RemoteResult};

#[cfg(test)]
use storyloom_session as _;
#[cfg(test)]
use tokio as _;
