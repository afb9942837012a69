use crate::cli::parser::{self, Command};
use crate::config;
use crate::github::client::IssueClient;
use crate::github::issues::{CloseOutcome, Issue};
use crate::output;
use crate::storage::{self, FileTokenStorage, TokenStorage};
use crate::summary;
use anyhow::{Context, Result};
use std::io::Write;

/// Executes one command. Everything printed for the user also goes to
/// `stdout_additional` when it is given.
pub fn run(args: Vec<String>, mut stdout_additional: Option<&mut dyn Write>) -> Result<()> {
    let out = &mut stdout_additional;
    match parser::parse_args(&args) {
        Command::Help => output::println(parser::USAGE, out)?,
        Command::Unknown(message) => {
            return Err(anyhow::anyhow!(
                "{message}\nRun `issuekeeper help` for usage."
            ));
        }
        Command::TokenSet { token } => {
            FileTokenStorage::new()?
                .save(token.trim())
                .context("Failed to save token")?;
            output::println("✓ Token saved", out)?;
        }
        Command::TokenClear => {
            FileTokenStorage::new()?
                .delete()
                .context("Failed to delete token")?;
            output::println("✓ Token removed", out)?;
        }
        Command::List { repo, output: file } => {
            let client = build_client()?;
            let issues = client
                .list_issues(&repo.owner, &repo.repo)
                .with_context(|| format!("Failed to list issues of {repo}"))?;
            for issue in &issues {
                output::println(&summary::format_line(issue), out)?;
            }
            if let Some(file) = file {
                client
                    .save_to_file(&issues, &file)
                    .with_context(|| format!("Failed to write {file}"))?;
                output::println(&format!("Saved {} issues to {file}", issues.len()), out)?;
            }
        }
        Command::Create { repo, title, body } => {
            let issue = build_client()?
                .create_issue(&repo.owner, &repo.repo, &title, &body)
                .with_context(|| format!("Failed to create issue in {repo}"))?;
            output::println(
                &format!("Created issue #{}: {}", issue.number, issue.title),
                out,
            )?;
        }
        Command::Update {
            repo,
            number,
            update,
        } => {
            let issue = build_client()?
                .update_issue(&repo.owner, &repo.repo, number, &update)
                .with_context(|| format!("Failed to update issue #{number} in {repo}"))?;
            output::println(
                &format!("Updated issue #{} ({})", issue.number, issue.state),
                out,
            )?;
        }
        Command::Delete { repo, number } => {
            build_client()?
                .delete_issue(&repo.owner, &repo.repo, number)
                .with_context(|| format!("Failed to delete issue #{number} in {repo}"))?;
            output::println(&format!("Deleted issue #{number}"), out)?;
        }
        Command::CloseStale {
            repo,
            days,
            comment,
        } => {
            let project_config = load_config()?;
            let days = config::resolve_stale_days(&project_config, days)?;
            let client = build_client_with(&project_config)?;
            let issues = client
                .list_issues(&repo.owner, &repo.repo)
                .with_context(|| format!("Failed to list issues of {repo}"))?;
            let comment = comment.unwrap_or_else(|| config::DEFAULT_CLOSE_COMMENT.to_string());
            for issue in &issues {
                let outcome = client
                    .close_if_stale(&repo.owner, &repo.repo, issue, days, &comment)
                    .with_context(|| format!("Failed to process issue #{}", issue.number))?;
                let line = close_report(issue, &outcome);
                output::println(&line, out)?;
            }
        }
    }
    Ok(())
}

/// One line per issue handled by `close-stale`.
fn close_report(issue: &Issue, outcome: &CloseOutcome) -> String {
    match outcome {
        CloseOutcome::Closed(closed) => format!("Closed issue #{}: {}", closed.number, issue.title),
        CloseOutcome::Unchanged {
            number,
            title,
            state,
        } => format!("Issue #{number}: {title} - {state}"),
    }
}

fn load_config() -> Result<std::collections::HashMap<config::ConfigKey, serde_json::Value>> {
    let cwd = std::env::current_dir().context("Failed to get current directory")?;
    config::load_project_config(&cwd)
}

fn build_client() -> Result<IssueClient> {
    build_client_with(&load_config()?)
}

fn build_client_with(
    project_config: &std::collections::HashMap<config::ConfigKey, serde_json::Value>,
) -> Result<IssueClient> {
    let base_url =
        config::resolve_api_base_url(project_config, std::env::var(config::API_URL_ENV).ok())?;
    let token = storage::resolve_token(
        std::env::var(storage::TOKEN_ENV).ok(),
        &FileTokenStorage::new()?,
    )?
    .with_context(|| {
        format!(
            "No token found. Set {} or run `issuekeeper token set <TOKEN>`.",
            storage::TOKEN_ENV
        )
    })?;
    IssueClient::new(&token, &base_url).context("Failed to create HTTP client")
}
