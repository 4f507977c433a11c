//! Command-line argument groups.

mod client;
mod log;
mod server;

pub use client::{ClientArgs, DownloadArgs, ListArgs, UploadArgs};
pub use log::LogArgs;
pub use server::ServerArgs;
