use crate::github::issues::{IssueState, IssueUpdate};
use crate::github::repo::RepoRef;

/// Enum representing CLI commands
#[derive(Debug, PartialEq)]
pub enum Command {
    List {
        repo: RepoRef,
        output: Option<String>,
    },
    Create {
        repo: RepoRef,
        title: String,
        body: String,
    },
    Update {
        repo: RepoRef,
        number: u64,
        update: IssueUpdate,
    },
    Delete {
        repo: RepoRef,
        number: u64,
    },
    CloseStale {
        repo: RepoRef,
        days: Option<u32>,
        comment: Option<String>,
    },
    TokenSet {
        token: String,
    },
    TokenClear,
    Help,
    Unknown(String),
}

pub const USAGE: &str = "\
Usage: issuekeeper <command>

Commands:
  list <owner>/<repo> [--output FILE]
  create <owner>/<repo> <title> [body]
  update <owner>/<repo> <number> [--title T] [--body B] [--state open|closed]
  delete <owner>/<repo> <number>
  close-stale <owner>/<repo> [days] [comment]
  token set <TOKEN>
  token clear
  help";

/// Parse command line arguments and return a Command
///
/// # Arguments
/// * `args` - Command line arguments (including program name)
///
/// # Returns
/// * `Command` - The parsed command. Malformed input yields `Command::Unknown`
///   carrying a message for the user.
pub fn parse_args(args: &[String]) -> Command {
    let words: Vec<&str> = args.iter().skip(1).map(String::as_str).collect();
    parse_words(&words).unwrap_or_else(Command::Unknown)
}

fn parse_words(words: &[&str]) -> Result<Command, String> {
    match words {
        [] | ["help"] => Ok(Command::Help),
        ["list", repo, options @ ..] => Ok(Command::List {
            repo: parse_repo(repo)?,
            output: parse_list_options(options)?,
        }),
        ["create", repo, title] | ["create", repo, title, _] if title.is_empty() => {
            let _ = parse_repo(repo)?;
            Err("Issue title must not be empty.".to_string())
        }
        ["create", repo, title] => Ok(Command::Create {
            repo: parse_repo(repo)?,
            title: title.to_string(),
            body: String::new(),
        }),
        ["create", repo, title, body] => Ok(Command::Create {
            repo: parse_repo(repo)?,
            title: title.to_string(),
            body: body.to_string(),
        }),
        ["update", repo, number, options @ ..] => Ok(Command::Update {
            repo: parse_repo(repo)?,
            number: parse_number(number)?,
            update: parse_update_options(options)?,
        }),
        ["delete", repo, number] => Ok(Command::Delete {
            repo: parse_repo(repo)?,
            number: parse_number(number)?,
        }),
        ["close-stale", repo, rest @ ..] if rest.len() <= 2 => Ok(Command::CloseStale {
            repo: parse_repo(repo)?,
            days: rest.first().map(|days| parse_days(days)).transpose()?,
            comment: rest.get(1).map(|c| c.to_string()),
        }),
        ["token", "set", token] => Ok(Command::TokenSet {
            token: token.to_string(),
        }),
        ["token", "clear"] => Ok(Command::TokenClear),
        [cmd @ ("list" | "create" | "update" | "delete" | "close-stale" | "token"), ..] => {
            Err(format!("Invalid arguments for `{cmd}`."))
        }
        [cmd, ..] => Err(format!("Unknown command: {cmd}")),
    }
}

fn parse_repo(value: &str) -> Result<RepoRef, String> {
    value.parse()
}

fn parse_number(value: &str) -> Result<u64, String> {
    value
        .parse()
        .map_err(|_| format!("Invalid issue number '{value}'."))
}

fn parse_days(value: &str) -> Result<u32, String> {
    value
        .parse()
        .map_err(|_| format!("Invalid number of days '{value}'."))
}

fn parse_list_options(options: &[&str]) -> Result<Option<String>, String> {
    match options {
        [] => Ok(None),
        ["--output", file] if !file.is_empty() => Ok(Some(file.to_string())),
        ["--output"] => Err("Missing value for --output".to_string()),
        [other, ..] => Err(format!("Unknown option {other}")),
    }
}

fn parse_update_options(options: &[&str]) -> Result<IssueUpdate, String> {
    let mut update = IssueUpdate::new();
    let mut iter = options.iter();
    while let Some(flag) = iter.next() {
        let value = iter
            .next()
            .ok_or_else(|| format!("Missing value for {flag}"))?;
        update = match *flag {
            "--title" => update.title(*value),
            "--body" => update.body(*value),
            "--state" => update.state(
                IssueState::parse(value)
                    .ok_or_else(|| format!("Invalid state '{value}'. Use open or closed."))?,
            ),
            other => return Err(format!("Unknown option {other}")),
        };
    }
    Ok(update)
}
