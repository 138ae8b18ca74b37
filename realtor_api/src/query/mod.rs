mod common;
pub use self::common::{Query, QueryCommon};

mod directory;
pub use self::directory::{DirectoryQuery, DEFAULT_AGENT_TYPE};
