use url::Url;

use super::{common::QueryCommon, Query};

/// Agent type filter used by the public directory.
pub const DEFAULT_AGENT_TYPE: &str = "nar";

/// One page of the agent directory for a city.
///
/// `city` is expected in slug form (`san-diego`) and `state` as an
/// uppercase code; see the library's validation helpers.
#[derive(Clone, Debug)]
pub struct DirectoryQuery {
    pub common: QueryCommon,
    pub city: String,
    pub state: String,
    pub agent_type: String,
}

impl DirectoryQuery {
    pub fn new(city: &str, state: &str) -> Self {
        Self {
            common: QueryCommon::default(),
            city: city.to_string(),
            state: state.to_string(),
            agent_type: DEFAULT_AGENT_TYPE.to_string(),
        }
    }

    pub fn with_agent_type(mut self, agent_type: &str) -> Self {
        self.agent_type = agent_type.to_string();
        self
    }
}

impl Query for DirectoryQuery {
    fn get_common(&mut self) -> &mut QueryCommon {
        &mut self.common
    }

    fn add_to_url(&self, url: &Url) -> Url {
        let mut url = url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .push("realestateagents")
                .push(&format!("{}_{}", self.city, self.state))
                .push(&format!("agenttype-{}", self.agent_type));
            if self.common.page >= 2 {
                segments.push(&format!("pg-{}", self.common.page));
            }
        }
        url
    }
}
