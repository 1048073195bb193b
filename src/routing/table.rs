//! Agent-name to endpoint lookup with default fallback.

use std::collections::HashMap;

use crate::message::{FieldExt, Message};

/// Message field naming the destination agent.
const DESTINATION_FIELD: &str = "to";

/// How a target endpoint was chosen for a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// The destination name matched a route table entry.
    Named { agent: String, url: String },
    /// The destination name was present but unknown; default used.
    UnknownAgent { agent: String, url: String },
    /// No destination field; default used directly.
    Default { url: String },
}

impl Resolution {
    pub fn url(&self) -> &str {
        match self {
            Resolution::Named { url, .. }
            | Resolution::UnknownAgent { url, .. }
            | Resolution::Default { url } => url,
        }
    }
}

/// Read-only name-to-endpoint mapping, loaded once at startup.
#[derive(Debug, Clone)]
pub struct RouteTable {
    agents: HashMap<String, String>,
    default_url: String,
}

impl RouteTable {
    pub fn new(agents: HashMap<String, String>, default_url: impl Into<String>) -> Self {
        Self {
            agents,
            default_url: default_url.into(),
        }
    }

    pub fn default_url(&self) -> &str {
        &self.default_url
    }

    /// Resolve a target endpoint for a message. Always succeeds.
    pub fn resolve(&self, message: &Message) -> Resolution {
        match message.get_str(DESTINATION_FIELD).filter(|a| !a.is_empty()) {
            Some(agent) => match self.agents.get(agent) {
                Some(url) => Resolution::Named {
                    agent: agent.to_string(),
                    url: url.clone(),
                },
                None => Resolution::UnknownAgent {
                    agent: agent.to_string(),
                    url: self.default_url.clone(),
                },
            },
            None => Resolution::Default {
                url: self.default_url.clone(),
            },
        }
    }
}
