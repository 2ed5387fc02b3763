use assert_cmd::Command;
use predicates::prelude::*;
use std::fs::write;
use tempfile::NamedTempFile;

#[test]
fn help_lists_generate_subcommand() {
    let mut cmd = Command::cargo_bin("autoindex").expect("Binary exists");

    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("generate"));
}

#[test]
fn generate_without_bucket_or_config_fails() {
    let mut cmd = Command::cargo_bin("autoindex").expect("Binary exists");

    cmd.arg("generate")
        .arg("--base-dir")
        .arg("www/files")
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "Either --config or both --base-dir and --bucket are required",
        ));
}

#[test]
fn generate_with_missing_config_file_fails() {
    let mut cmd = Command::cargo_bin("autoindex").expect("Binary exists");

    cmd.arg("generate")
        .arg("--config")
        .arg("/definitely/not/here/autoindex.yaml")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read config file"));
}

#[test]
fn generate_with_invalid_timezone_fails_before_listing() {
    let config = NamedTempFile::new().expect("Creating temp config file failed");
    write(
        config.path(),
        b"base_dir: ./tmp/files\nbucket: caian-org\ntimezone: Atlantis/Lost_City\n",
    )
    .expect("Writing temp config failed");
    let mut cmd = Command::cargo_bin("autoindex").expect("Binary exists");

    cmd.arg("generate")
        .arg("--config")
        .arg(config.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Atlantis/Lost_City"));
}

use std::fmt;
use std::sync::{Arc, Mutex};
use tracing::field::{Field, Visit};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{layer::Context, Layer, Registry};

/// Records the `message` of every event emitted while `run` executes.
struct MessageLog {
    messages: Arc<Mutex<Vec<String>>>,
}

struct MessageField<'a>(&'a mut Option<String>);

impl Visit for MessageField<'_> {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            *self.0 = Some(format!("{value:?}"));
        }
    }
}

impl<S> Layer<S> for MessageLog
where
    S: tracing::Subscriber,
{
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        let mut message = None;
        event.record(&mut MessageField(&mut message));
        if let Some(message) = message {
            self.messages.lock().unwrap().push(message);
        }
    }
}

#[tokio::test]
async fn run_emits_trace_initialised_before_loading_config() {
    use autoindex::cli::{run, Cli, Commands};

    let messages = Arc::new(Mutex::new(Vec::new()));
    let subscriber = Registry::default().with(MessageLog {
        messages: messages.clone(),
    });
    let _guard = tracing::subscriber::set_default(subscriber);

    let cli = Cli {
        command: Commands::Generate {
            config: Some(std::path::PathBuf::from("missing-autoindex.yaml")),
            base_dir: None,
            bucket: None,
        },
    };

    let result = run(cli).await;
    assert!(result.is_err(), "a missing config file stops the run before S3 is contacted");

    let messages = messages.lock().unwrap();
    assert_eq!(
        messages.first().map(String::as_str),
        Some("trace_initialised"),
        "got: {messages:?}"
    );
    assert!(
        messages.iter().any(|m| m.contains("Failed to read config file")),
        "got: {messages:?}"
    );
}
