pub mod config;
pub mod error;
pub mod feed;
pub mod ingest;
pub mod scheduler;
pub mod session;
pub mod storage;
pub mod user;

pub use config::AppConfig;
pub use error::{Error, Result};
pub use session::Session;
pub use user::User;
