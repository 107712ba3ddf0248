pub mod config;
pub mod error;
pub mod fetch;
pub mod http;
pub mod manifest;
pub mod sources;

pub use config::FetchConfig;
pub use error::FetchError;
pub use fetch::{FetchReport, Fetcher, Strategy};
pub use http::{ReqwestTransport, Transport};

pub type Result<T> = anyhow::Result<T>;
