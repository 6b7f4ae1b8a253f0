mod config;
mod error;
mod store;

pub use config::HttpContentConfig;
pub use error::{ContentStoreError, ContentStoreResult};
pub use store::HttpContentStore;
