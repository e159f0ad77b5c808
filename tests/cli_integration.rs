//! End-to-end tests for the git-nostr binary.
//!
//! Relays are spool directories (`file://` URLs) inside a temp dir and the
//! owner is given as a hex key, so no network access is needed.

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const IDENTITY: &str = "3bf0c63fcb93463407af97a5e5ee64fa883d107ef9e558472c4eb9aaaefa459d";

struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn new() -> Self {
        let ws = Self {
            dir: TempDir::new().unwrap(),
        };
        let config = format!(
            "relays = [\"file://{}\", \"file://{}\"]\nidentity = \"{}\"\ngit_ssh_base = \"git@gitnostr.example\"\n\n[timeouts]\npublish_secs = 2\nresolve_secs = 2\n",
            ws.relay("relay-a").display(),
            ws.relay("relay-b").display(),
            IDENTITY
        );
        std::fs::write(ws.config_path(), config).unwrap();
        ws
    }

    fn relay(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    fn config_path(&self) -> PathBuf {
        self.dir.path().join("config.toml")
    }

    fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("git-nostr").unwrap();
        cmd.env("HOME", self.dir.path())
            .env_remove("GIT_NOSTR_CONFIG")
            .env_remove("XDG_CONFIG_HOME")
            .arg("--config")
            .arg(self.config_path());
        cmd
    }
}

fn stored_events(relay: &Path) -> usize {
    std::fs::read_dir(relay)
        .map(|entries| entries.count())
        .unwrap_or(0)
}

mod help {
    use super::*;

    #[test]
    fn help_lists_commands() {
        Command::cargo_bin("git-nostr")
            .unwrap()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("repo"))
            .stdout(predicate::str::contains("config"));
    }

    #[test]
    fn completion_generates_script() {
        Command::cargo_bin("git-nostr")
            .unwrap()
            .args(["completion", "bash"])
            .assert()
            .success()
            .stdout(predicate::str::contains("git-nostr"));
    }
}

mod repo {
    use super::*;

    #[test]
    fn create_publishes_to_every_relay() {
        let ws = Workspace::new();

        ws.cmd()
            .args(["repo", "create", "public"])
            .assert()
            .success()
            .stdout(predicate::str::contains("published repository to"));

        assert_eq!(stored_events(&ws.relay("relay-a")), 1);
        assert_eq!(stored_events(&ws.relay("relay-b")), 1);
    }

    #[test]
    fn create_then_resolve_prints_clone_url() {
        let ws = Workspace::new();

        ws.cmd().args(["repo", "create", "public"]).assert().success();

        ws.cmd()
            .args(["repo", "resolve", &format!("{}:public", IDENTITY)])
            .assert()
            .success()
            .stdout(predicate::str::diff(format!(
                "git@gitnostr.example:{}/public\n",
                IDENTITY
            )));
    }

    #[test]
    fn republishing_replaces_the_announcement() {
        let ws = Workspace::new();

        ws.cmd().args(["repo", "create", "public"]).assert().success();
        ws.cmd().args(["repo", "create", "public"]).assert().success();

        assert_eq!(stored_events(&ws.relay("relay-a")), 1);
    }

    #[test]
    fn invalid_name_is_rejected() {
        let ws = Workspace::new();

        ws.cmd()
            .args(["repo", "create", "my.repo"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("invalid repository name"));

        assert_eq!(stored_events(&ws.relay("relay-a")), 0);
    }

    #[test]
    fn unknown_repository_is_not_found() {
        let ws = Workspace::new();

        ws.cmd().args(["repo", "create", "public"]).assert().success();

        ws.cmd()
            .args(["repo", "resolve", &format!("{}:private", IDENTITY)])
            .assert()
            .failure()
            .stderr(predicate::str::contains("not found"));
    }

    #[test]
    fn malformed_locator_is_rejected() {
        let ws = Workspace::new();

        ws.cmd()
            .args(["repo", "resolve", "no-colon-here"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Invalid locator"));
    }

    #[test]
    fn permission_with_hex_target_is_published() {
        let ws = Workspace::new();

        ws.cmd()
            .args(["repo", "permission", "public", &"b".repeat(64), "WRITE"])
            .assert()
            .success()
            .stdout(predicate::str::contains("published permission to"));

        assert_eq!(stored_events(&ws.relay("relay-a")), 1);
    }

    #[test]
    fn oversized_timeout_is_an_error_not_a_panic() {
        let ws = Workspace::new();

        ws.cmd()
            .args([
                "--timeout",
                "18446744073709551615",
                "repo",
                "resolve",
                &format!("{}:public", IDENTITY),
            ])
            .assert()
            .code(1)
            .stderr(predicate::str::contains("--timeout must be between 1 and"))
            .stderr(predicate::str::contains("panicked").not());
    }

    #[test]
    fn unsupported_relay_scheme_fails() {
        let ws = Workspace::new();

        ws.cmd()
            .args(["--relay", "wss://relay.example", "repo", "create", "public"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("wss://relay.example"));
    }
}

mod config {
    use super::*;

    #[test]
    fn set_then_get_round_trips_through_file() {
        let ws = Workspace::new();

        ws.cmd()
            .args(["config", "set", "resolve.tie_break", "newest"])
            .assert()
            .success();

        ws.cmd()
            .args(["config", "get", "resolve.tie_break"])
            .assert()
            .success()
            .stdout("newest\n");

        let written = std::fs::read_to_string(ws.config_path()).unwrap();
        assert!(written.contains("tie_break"));
        assert!(written.contains(IDENTITY));
    }

    #[test]
    fn invalid_value_is_rejected() {
        let ws = Workspace::new();

        ws.cmd()
            .args(["config", "set", "resolve.tie_break", "oldest"])
            .assert()
            .failure();
    }

    #[test]
    fn list_shows_every_key() {
        let ws = Workspace::new();

        ws.cmd()
            .args(["config", "list"])
            .assert()
            .success()
            .stdout(predicate::str::contains("relays = file://"))
            .stdout(predicate::str::contains("timeouts.resolve_secs = 2"))
            .stdout(predicate::str::contains("resolve.tie_break = (not set)"));
    }
}
