use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// An issue as returned by the API. Only the fields this tool reads are kept.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Issue {
    pub number: u64,
    pub title: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub body: String,
    pub state: IssueState,
    /// `YYYY-MM-DDTHH:MM:SSZ`, kept verbatim so that parse failures surface at use
    pub updated_at: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueState {
    Open,
    Closed,
}

impl IssueState {
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueState::Open => "open",
            IssueState::Closed => "closed",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "open" => Some(IssueState::Open),
            "closed" => Some(IssueState::Closed),
            _ => None,
        }
    }
}

impl fmt::Display for IssueState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Creation payload
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewIssue<'a> {
    pub title: &'a str,
    pub body: &'a str,
}

/// Partial update payload. Fields left as `None` are not serialized and stay
/// unchanged on the server.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct IssueUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<IssueState>,
}

impl IssueUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the title. An empty title counts as not supplied.
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = non_empty(title.into());
        self
    }

    /// Sets the body. An empty body counts as not supplied.
    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = non_empty(body.into());
        self
    }

    pub fn state(mut self, state: IssueState) -> Self {
        self.state = Some(state);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.body.is_none() && self.state.is_none()
    }
}

/// What `close_if_stale` did with an issue
#[derive(Debug, Clone, PartialEq)]
pub enum CloseOutcome {
    Closed(Issue),
    Unchanged {
        number: u64,
        title: String,
        state: IssueState,
    },
}

fn non_empty(value: String) -> Option<String> {
    if value.is_empty() { None } else { Some(value) }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Option::unwrap_or_default)
}
