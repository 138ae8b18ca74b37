mod client;
mod errors;
mod query;
mod user_agent;
pub use self::client::{Client, ClientOptions, ProxyConfig, DEFAULT_TIMEOUT_SECS};
pub use self::errors::Error;
pub use self::query::{DirectoryQuery, Query, DEFAULT_AGENT_TYPE};
