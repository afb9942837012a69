pub mod cli;
pub mod config;
pub mod error;
pub mod github;
pub mod output;
pub mod run;
pub mod storage;
pub mod summary;

pub use error::{Error, Result};
pub use github::client::IssueClient;
pub use github::issues::{CloseOutcome, Issue, IssueState, IssueUpdate};
pub use github::repo::RepoRef;
