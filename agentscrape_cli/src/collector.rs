//! Cross-page accumulation of agent records.

use std::collections::HashSet;

use agentscrape_lib::AgentRecord;

/// Collects agents across pages, keeping the first sighting of each name
/// (case-insensitive) in the order pages were read.
#[derive(Default)]
pub struct AgentCollector {
    seen: HashSet<String>,
    agents: Vec<AgentRecord>,
}

impl AgentCollector {
    /// Adds the records whose name has not been seen before and returns how
    /// many were new.
    pub fn absorb(&mut self, records: Vec<AgentRecord>) -> usize {
        let before = self.agents.len();
        for record in records {
            if self.seen.insert(record.key()) {
                self.agents.push(record);
            }
        }
        self.agents.len() - before
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn into_agents(self) -> Vec<AgentRecord> {
        self.agents
    }
}
