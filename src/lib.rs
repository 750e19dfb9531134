pub mod api;
pub mod config;
pub mod downloader;
pub mod server;

#[cfg(test)]
mod test_support;

pub use config::ResolverConfig;
pub use server::{router, run, AppState};
