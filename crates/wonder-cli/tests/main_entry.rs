//! Integration tests for the `wonder` binary entry point.
//!
//! Verifies help output, usage errors, and that configuration files and
//! flags decide which daemon the CLI dials.

use std::fs;
use std::net::TcpListener;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::str::contains;
use tempfile::TempDir;

fn closed_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind listener");
    listener.local_addr().expect("local addr").port()
}

#[test]
fn help_lists_the_subcommands() {
    let mut command = cargo_bin_cmd!("wonder");
    command.arg("--help");
    command
        .assert()
        .success()
        .stdout(contains("plant"))
        .stdout(contains("report"));
}

#[test]
fn missing_subcommand_exits_with_failure() {
    let mut command = cargo_bin_cmd!("wonder");
    command.assert().failure().stderr(contains("Usage"));
}

#[test]
fn stage_socket_flag_selects_the_stage() {
    let port = closed_port();
    let mut command = cargo_bin_cmd!("wonder");
    command.args(["--stage-socket", &format!("tcp://127.0.0.1:{port}"), "list"]);
    command
        .assert()
        .failure()
        .stderr(contains(format!("127.0.0.1:{port}")));
}

#[test]
fn configuration_file_selects_the_land_daemon() {
    let port = closed_port();
    let dir = TempDir::new().expect("temporary directory");
    let path = dir.path().join("wonder.toml");
    fs::write(
        &path,
        format!("server_socket = {{ host = \"127.0.0.1\", port = {port} }}\n"),
    )
    .expect("write configuration");

    let mut command = cargo_bin_cmd!("wonder");
    command.arg("--config-path").arg(&path).arg("info");
    command
        .assert()
        .failure()
        .stderr(contains(format!("127.0.0.1:{port}")));
}

#[test]
fn unusable_socket_is_a_configuration_error() {
    let mut command = cargo_bin_cmd!("wonder");
    command.args(["--server-socket", "unix:///tmp/wonder.sock", "info"]);
    command
        .assert()
        .failure()
        .stderr(contains("failed to load configuration"));
}
