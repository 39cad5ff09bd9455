//! Integration tests against a real Docker daemon.
//!
//! These start and remove containers, so they are marked `#[ignore]`.
//! Run with: `cargo test -- --ignored`

use std::process::Command;

use docker_get_run::command::Options;
use docker_get_run::docker::{DockerCli, Error, InspectSource};
use docker_get_run::reconstruct_from;

const IMAGE: &str = "busybox:1.36";

/// Removes the named container when dropped.
struct Container(String);

impl Container {
    fn run(name: &str, args: &[&str]) -> Self {
        let _ = Command::new("docker").args(["rm", "-f", name]).output();
        let status = Command::new("docker")
            .args(["run", "-d", "--name", name])
            .args(args)
            .status()
            .expect("failed to run docker");
        assert!(status.success(), "docker run failed for {name}");
        Self(name.to_string())
    }
}

impl Drop for Container {
    fn drop(&mut self) {
        let _ = Command::new("docker").args(["rm", "-f", &self.0]).output();
    }
}

#[test]
#[ignore]
fn reconstructs_flags_given_on_the_command_line() {
    let _c = Container::run(
        "dgr-live-flags",
        &[
            "-e",
            "GREETING=hello world",
            "-l",
            "team=infra",
            "-p",
            "127.0.0.1:18080:80",
            "--restart",
            "on-failure:3",
            "--cap-add",
            "NET_ADMIN",
            "-m",
            "64m",
            IMAGE,
            "sleep",
            "300",
        ],
    );

    let cli = DockerCli::default();
    cli.ensure_available().expect("docker daemon not reachable");
    let (_, cmd) = reconstruct_from(&cli, "dgr-live-flags", &Options::default()).unwrap();

    assert!(cmd.has("--detach"));
    assert_eq!(cmd.values("--name"), vec!["dgr-live-flags"]);
    assert_eq!(cmd.values("--env"), vec!["GREETING=hello world"]);
    assert_eq!(cmd.values("--label"), vec!["team=infra"]);
    assert_eq!(cmd.values("--publish"), vec!["127.0.0.1:18080:80"]);
    assert_eq!(cmd.values("--restart"), vec!["on-failure:3"]);
    assert_eq!(cmd.values("--cap-add"), vec!["NET_ADMIN"]);
    assert_eq!(cmd.values("--memory"), vec!["64m"]);
    assert_eq!(cmd.image, IMAGE);
    assert_eq!(cmd.args, vec!["sleep", "300"]);
}

#[test]
#[ignore]
fn reconstructed_command_recreates_an_equivalent_container() {
    let _original = Container::run("dgr-live-source", &["-e", "A=1", IMAGE, "sleep", "300"]);

    let cli = DockerCli::default();
    let (_, mut cmd) = reconstruct_from(&cli, "dgr-live-source", &Options::default()).unwrap();

    // Start the copy under a different name.
    for flag in &mut cmd.flags {
        if flag.long == "--name" {
            flag.value = Some("dgr-live-copy".into());
        }
    }
    let _ = Command::new("docker").args(["rm", "-f", "dgr-live-copy"]).output();
    let status = Command::new("docker")
        .args(cmd.argv(false))
        .status()
        .expect("failed to run docker");
    let _copy = Container("dgr-live-copy".into());
    assert!(status.success());

    let (_, copy_cmd) = reconstruct_from(&cli, "dgr-live-copy", &Options::default()).unwrap();
    assert_eq!(copy_cmd.values("--env"), cmd.values("--env"));
    assert_eq!(copy_cmd.args, cmd.args);
    assert_eq!(copy_cmd.image, cmd.image);
}

#[test]
#[ignore]
fn missing_container_is_reported() {
    let cli = DockerCli::default();
    match cli.container("dgr-definitely-not-here") {
        Err(Error::ContainerNotFound(name)) => assert_eq!(name, "dgr-definitely-not-here"),
        other => panic!("expected ContainerNotFound, got: {other:?}"),
    }
}
