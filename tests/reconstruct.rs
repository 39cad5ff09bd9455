//! End-to-end reconstruction from saved `docker inspect` output.

use std::path::PathBuf;

use docker_get_run::command::{
    JsonCommand, Options, RenderOptions, diff_commands, render_json, render_text,
};
use docker_get_run::config::LineStyle;
use docker_get_run::docker::{FileSource, InspectSource};
use docker_get_run::reconstruct_from;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

fn source(container: &str) -> FileSource {
    FileSource::load(&fixture(container), Some(fixture("nginx-image.json").as_path()))
        .expect("failed to load fixtures")
}

#[test]
fn web_container_round_trips_through_the_shell() {
    let src = source("web.json");
    let (_, cmd) = reconstruct_from(&src, "web", &Options::default()).unwrap();
    let text = render_text(&cmd, &RenderOptions::default());

    let mut lines = text.lines();
    let run = shell_words::split(lines.next().unwrap()).unwrap();
    assert_eq!(
        run,
        vec![
            "docker",
            "run",
            "-d",
            "--name",
            "web",
            "-e",
            "TZ=Europe/Oslo",
            "-e",
            "SERVER_NAME=example.org www.example.org",
            "-l",
            "com.docker.compose.project=site",
            "-l",
            "traefik.enable=true",
            "--network",
            "frontend",
            "--ip",
            "172.28.0.10",
            "--network-alias",
            "www",
            "-p",
            "127.0.0.1:8080:80",
            "-p",
            "8443:443",
            "--add-host",
            "upstream:10.1.2.3",
            "-v",
            "/srv/www:/usr/share/nginx/html:ro",
            "--tmpfs",
            "/run:size=16m",
            "--tmpfs",
            "/var/cache/nginx",
            "--restart",
            "unless-stopped",
            "--cap-add",
            "NET_BIND_SERVICE",
            "--cap-drop",
            "ALL",
            "--security-opt",
            "no-new-privileges",
            "-m",
            "256m",
            "--cpus",
            "0.5",
            "--ulimit",
            "nofile=4096",
            "--init",
            "--read-only",
            "--log-opt",
            "max-size=10m",
            "--health-cmd",
            "curl -fsS http://localhost/ || exit 1",
            "--health-interval",
            "30s",
            "--health-timeout",
            "5s",
            "--health-retries",
            "3",
            "nginx:1.25",
        ]
    );

    let followup = shell_words::split(lines.next().unwrap()).unwrap();
    assert_eq!(
        followup,
        vec![
            "docker",
            "network",
            "connect",
            "--alias",
            "nginx-metrics",
            "monitoring",
            "web",
        ]
    );
    assert!(lines.next().is_none());
}

#[test]
fn shell_container_overrides_entrypoint() {
    let src = source("debug-shell.json");
    let (container, cmd) = reconstruct_from(&src, "debug", &Options::default()).unwrap();
    assert_eq!(container.short_name(), "debug");

    let text = render_text(&cmd, &RenderOptions::default());
    assert_eq!(
        shell_words::split(&text).unwrap(),
        vec![
            "docker",
            "run",
            "-i",
            "-t",
            "--rm",
            "--name",
            "debug",
            "--entrypoint",
            "/bin/sh",
            "--network",
            "container:web",
            "--pid",
            "container:web",
            "nginx:1.25",
            "-c",
            "ss -tlnp; exec sh",
        ]
    );
}

#[test]
fn without_image_record_inherited_values_appear() {
    let src = FileSource::load(&fixture("web.json"), None).unwrap();
    let (_, cmd) = reconstruct_from(&src, "web", &Options::default()).unwrap();

    assert!(cmd.values("--env").contains(&"NGINX_VERSION=1.25.4"));
    assert_eq!(cmd.values("--entrypoint"), vec!["/docker-entrypoint.sh"]);
    assert_eq!(cmd.args, vec!["nginx", "-g", "daemon off;"]);
    assert_eq!(cmd.values("--stop-signal"), vec!["SIGQUIT"]);
}

#[test]
fn lookup_by_id_prefix() {
    let src = source("web.json");
    let (container, _) = reconstruct_from(&src, "4f2b8c", &Options::default()).unwrap();
    assert_eq!(container.short_name(), "web");
}

#[test]
fn unknown_container_fails() {
    let src = source("web.json");
    assert!(reconstruct_from(&src, "nope", &Options::default()).is_err());
    assert!(src.container("nope").is_err());
}

#[test]
fn multiline_output_is_still_one_shell_command() {
    let src = source("debug-shell.json");
    let (_, cmd) = reconstruct_from(&src, "debug", &Options::default()).unwrap();
    let opts = RenderOptions {
        style: LineStyle::Multiline,
        ..RenderOptions::default()
    };
    let multi = render_text(&cmd, &opts);
    let single = render_text(&cmd, &RenderOptions::default());

    assert!(multi.lines().count() > 1);
    // Backslash-newline continuations disappear when the shell joins lines.
    let joined = multi.replace(" \\\n", " ");
    assert_eq!(
        shell_words::split(&joined).unwrap(),
        shell_words::split(&single).unwrap()
    );
}

#[test]
fn diff_between_web_and_debug() {
    let src = FileSource::load(&fixture("web.json"), Some(fixture("nginx-image.json").as_path())).unwrap();
    let (web, web_cmd) = reconstruct_from(&src, "web", &Options::default()).unwrap();

    let debug_src = source("debug-shell.json");
    let (debug, debug_cmd) = reconstruct_from(&debug_src, "debug", &Options::default()).unwrap();

    let diff = diff_commands(
        web.short_name(),
        &web_cmd,
        debug.short_name(),
        &debug_cmd,
        &RenderOptions::default(),
    );
    assert!(diff.starts_with("--- web\n+++ debug\n"));
    assert!(diff.lines().any(|l| l == "-    --restart unless-stopped \\"));
    assert!(diff.lines().any(|l| l == "+    --rm \\"));
}

#[test]
fn json_output_lists_every_container() {
    let src = source("web.json");
    let (web, cmd) = reconstruct_from(&src, "web", &Options::default()).unwrap();
    let render = RenderOptions::default();
    let json = render_json(&[JsonCommand::new(web.short_name(), &cmd, &render)]).unwrap();

    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    let entries = value.as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["container"], "web");
    assert_eq!(entries[0]["run"].as_array().unwrap().last().unwrap(), "nginx:1.25");
    assert_eq!(entries[0]["followups"].as_array().unwrap().len(), 1);
}
