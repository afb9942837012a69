use crate::IssuekeeperWorld;
use chrono::{Duration, Utc};
use cucumber::gherkin::Step;
use cucumber::{given, then, when};
use httpmock::Method::PATCH;
use httpmock::prelude::*;
use serde_json::json;

const TOKEN: &str = "acceptance-token";

fn server(world: &IssuekeeperWorld) -> &MockServer {
    world
        .server
        .as_ref()
        .expect("Mock server not started. Add `Given a mock issue server`.")
}

fn issues_path(repo: &str) -> String {
    format!("/repos/{repo}/issues")
}

fn timestamp_days_ago(days: i64) -> String {
    (Utc::now() - Duration::days(days))
        .format("%Y-%m-%dT%H:%M:%SZ")
        .to_string()
}

/// Splits a command line on whitespace, keeping single-quoted runs together.
fn split_args(command: &str) -> Vec<String> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut quoted = false;
    for c in command.chars() {
        match c {
            '\'' => quoted = !quoted,
            c if c.is_whitespace() && !quoted => {
                if !current.is_empty() {
                    args.push(std::mem::take(&mut current));
                }
            }
            c => current.push(c),
        }
    }
    if !current.is_empty() {
        args.push(current);
    }
    args
}

#[given("a mock issue server")]
async fn given_mock_issue_server(world: &mut IssuekeeperWorld) {
    world.server = Some(MockServer::start_async().await);
    world.workdir = Some(tempfile::tempdir().expect("Failed to create working directory"));
}

#[given(regex = r#"^the repository "(.*)" has issues:$"#)]
async fn given_repository_has_issues(world: &mut IssuekeeperWorld, repo: String, step: &Step) {
    let table = step.table.as_ref().expect("Expected a table of issues");
    let issues: Vec<serde_json::Value> = table
        .rows
        .iter()
        .skip(1)
        .map(|row| {
            let number: u64 = row[0].parse().expect("Invalid issue number");
            let days: i64 = row[2].parse().expect("Invalid day count");
            json!({
                "number": number,
                "title": row[1],
                "body": "",
                "state": "open",
                "updated_at": timestamp_days_ago(days)
            })
        })
        .collect();

    server(world)
        .mock_async(|when, then| {
            when.method(GET)
                .path(issues_path(&repo))
                .header("Authorization", format!("token {TOKEN}"));
            then.status(200).json_body(json!(issues));
        })
        .await;
}

#[given(regex = r#"^the server creates issues in "(.*)" as number (\d+)$"#)]
async fn given_server_creates_issues(world: &mut IssuekeeperWorld, repo: String, number: u64) {
    server(world)
        .mock_async(|when, then| {
            when.method(POST).path(issues_path(&repo));
            then.status(201).json_body(json!({
                "number": number,
                "title": "Found a bug",
                "body": "",
                "state": "open",
                "updated_at": timestamp_days_ago(0)
            }));
        })
        .await;
}

#[given(regex = r#"^the server rejects issues in "(.*)" with status (\d+) and message "(.*)"$"#)]
async fn given_server_rejects_issues(
    world: &mut IssuekeeperWorld,
    repo: String,
    status: u16,
    message: String,
) {
    server(world)
        .mock_async(|when, then| {
            when.method(POST).path(issues_path(&repo));
            then.status(status).json_body(json!({ "message": message }));
        })
        .await;
}

#[given(regex = r#"^the server closes issue (\d+) in "([^"]*)"$"#)]
async fn given_server_closes_issue(world: &mut IssuekeeperWorld, number: u64, repo: String) {
    server(world)
        .mock_async(|when, then| {
            when.method(PATCH)
                .path(format!("{}/{number}", issues_path(&repo)))
                .json_body_partial(r#"{"state": "closed"}"#);
            then.status(200).json_body(json!({
                "number": number,
                "title": "Closed issue",
                "body": "",
                "state": "closed",
                "updated_at": timestamp_days_ago(0)
            }));
        })
        .await;
}

#[given(regex = r#"^the server closes issue (\d+) in "(.*)" with comment "(.*)"$"#)]
async fn given_server_closes_issue_with_comment(
    world: &mut IssuekeeperWorld,
    number: u64,
    repo: String,
    comment: String,
) {
    server(world)
        .mock_async(|when, then| {
            when.method(PATCH)
                .path(format!("{}/{number}", issues_path(&repo)))
                .json_body(json!({ "state": "closed", "body": comment }));
            then.status(200).json_body(json!({
                "number": number,
                "title": "Closed issue",
                "body": comment,
                "state": "closed",
                "updated_at": timestamp_days_ago(0)
            }));
        })
        .await;
}

#[given(regex = r#"^the server deletes issue (\d+) in "(.*)"$"#)]
async fn given_server_deletes_issue(world: &mut IssuekeeperWorld, number: u64, repo: String) {
    server(world)
        .mock_async(|when, then| {
            when.method(DELETE)
                .path(format!("{}/{number}", issues_path(&repo)));
            then.status(204);
        })
        .await;
}

#[given(regex = r#"^issue (\d+) does not exist in "(.*)"$"#)]
async fn given_issue_does_not_exist(world: &mut IssuekeeperWorld, number: u64, repo: String) {
    server(world)
        .mock_async(|when, then| {
            when.path(format!("{}/{number}", issues_path(&repo)));
            then.status(404).json_body(json!({ "message": "Not Found" }));
        })
        .await;
}

#[when(regex = r"^I run `issuekeeper (.*)`$")]
async fn when_run_issuekeeper(world: &mut IssuekeeperWorld, command: String) {
    let workdir = world
        .workdir
        .as_ref()
        .expect("Working directory not prepared")
        .path()
        .to_path_buf();
    let base_url = server(world).base_url();

    let output = std::process::Command::new(env!("CARGO_BIN_EXE_issuekeeper"))
        .args(split_args(&command))
        .current_dir(&workdir)
        .env("ISSUEKEEPER_API_URL", base_url)
        .env("GITHUB_TOKEN", TOKEN)
        .env("HOME", &workdir)
        .env_remove("RUST_LOG")
        .output()
        .unwrap_or_else(|e| panic!("Failed to execute issuekeeper: {}", e));

    world.captured_output = output.stdout;
    world.captured_error = output.stderr;
    world.command_status = Some(output.status);
}

fn assert_succeeded(world: &IssuekeeperWorld) {
    assert!(
        world.command_status.is_some_and(|s| s.success()),
        "Command failed with status {:?}:\n{}",
        world.command_status,
        String::from_utf8_lossy(&world.captured_error)
    );
}

#[then(regex = r#"^the output should be "(.*)"$"#)]
async fn then_output_should_be(world: &mut IssuekeeperWorld, expected_output: String) {
    assert_succeeded(world);
    let output = String::from_utf8(world.captured_output.clone()).expect("Invalid UTF-8");
    assert_eq!(output.trim_end(), expected_output);
}

#[then("the output should be:")]
async fn then_output_should_be_block(world: &mut IssuekeeperWorld, step: &Step) {
    assert_succeeded(world);
    let expected = step.docstring.as_ref().expect("Expected docstring");
    let output = String::from_utf8(world.captured_output.clone()).expect("Invalid UTF-8");
    assert_eq!(output.trim(), expected.trim());
}

#[then(regex = r#"^the file "(.*)" should contain:$"#)]
async fn then_file_should_contain(world: &mut IssuekeeperWorld, file: String, step: &Step) {
    assert_succeeded(world);
    let expected = step.docstring.as_ref().expect("Expected docstring");
    let path = world
        .workdir
        .as_ref()
        .expect("Working directory not prepared")
        .path()
        .join(file);
    let content = std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read {:?}: {}", path, e));
    assert_eq!(content, format!("{}\n", expected.trim()));
}

#[then(regex = r#"^the command should fail with "(.*)"$"#)]
async fn then_command_should_fail_with(world: &mut IssuekeeperWorld, expected_error: String) {
    assert!(
        world.command_status.is_some_and(|s| !s.success()),
        "Command should have failed but succeeded with status: {:?}",
        world.command_status
    );
    let error = String::from_utf8(world.captured_error.clone()).expect("Invalid UTF-8");
    assert!(
        error.contains(&expected_error),
        "Expected error containing '{}', but got:\n---\n{}\n---",
        expected_error,
        error
    );
}
