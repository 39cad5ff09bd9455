use tracing::{debug, warn};

use super::args::{Flag, RunCommand};
use crate::config::Config;
use crate::docker::types::{
    ContainerConfig, ContainerInspect, DeviceMapping, HostConfig, ImageInspect, PortBinding,
};

/// Docker's default `/dev/shm` size.
const DEFAULT_SHM_SIZE: i64 = 64 * 1024 * 1024;

/// Knobs that change what ends up in the reconstructed command.
#[derive(Debug, Clone)]
pub struct Options {
    pub image_defaults: bool,
    pub keep_name: bool,
    pub exclude_env: Vec<String>,
    pub exclude_label_prefixes: Vec<String>,
    pub default_log_driver: String,
}

impl Default for Options {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for Options {
    fn from(cfg: &Config) -> Self {
        Self {
            image_defaults: cfg.image_defaults,
            keep_name: cfg.keep_name,
            exclude_env: cfg.exclude_env.clone(),
            exclude_label_prefixes: cfg.exclude_label_prefixes.clone(),
            default_log_driver: cfg.default_log_driver.clone(),
        }
    }
}

/// Rebuild the `docker run` invocation that produced `container`.
///
/// Values equal to what `image` already provides are left out, so the result
/// reads like the command a person typed. Without an image record (or with
/// `image_defaults` off) every configured value is emitted.
pub fn reconstruct(
    container: &ContainerInspect,
    image: Option<&ImageInspect>,
    opts: &Options,
) -> RunCommand {
    let empty = ContainerConfig::default();
    let base = match image {
        Some(img) if opts.image_defaults => &img.config,
        _ => &empty,
    };
    let cfg = &container.config;
    let host = &container.host_config;

    let mut flags = Vec::new();
    attach(cfg, host, &mut flags);
    identity(container, base, opts, &mut flags);
    let args = command_line(cfg, base, &mut flags);
    environment(cfg, base, opts, &mut flags);
    let followups = network(container, opts, &mut flags);
    ports(cfg, base, host, &mut flags);
    resolution(host, &mut flags);
    storage(cfg, base, host, &mut flags);
    restart(host, &mut flags);
    security(host, &mut flags);
    resources(host, &mut flags);
    runtime(host, &mut flags);
    logging(host, opts, &mut flags);
    stop(cfg, base, &mut flags);
    health(cfg, base, &mut flags);

    let image = if cfg.image.is_empty() {
        container.image.clone()
    } else {
        cfg.image.clone()
    };

    debug!(
        container = container.short_name(),
        flags = flags.len(),
        "reconstructed run command"
    );

    RunCommand {
        flags,
        image,
        args,
        followups,
    }
}

fn attach(cfg: &ContainerConfig, host: &HostConfig, flags: &mut Vec<Flag>) {
    if !cfg.attach_stdout && !cfg.attach_stderr {
        flags.push(Flag::switch("--detach").with_short("-d"));
    }
    if cfg.open_stdin {
        flags.push(Flag::switch("--interactive").with_short("-i"));
    }
    if cfg.tty {
        flags.push(Flag::switch("--tty").with_short("-t"));
    }
    if host.auto_remove {
        flags.push(Flag::switch("--rm"));
    }
}

fn identity(
    container: &ContainerInspect,
    base: &ContainerConfig,
    opts: &Options,
    flags: &mut Vec<Flag>,
) {
    let cfg = &container.config;
    if opts.keep_name && !container.short_name().is_empty() {
        flags.push(Flag::new("--name", container.short_name()));
    }

    if !cfg.hostname.is_empty()
        && cfg.hostname != container.short_id()
        && !shares_network_namespace(&container.host_config.network_mode)
    {
        flags.push(Flag::new("--hostname", &cfg.hostname).with_short("-h"));
    }
    if !cfg.domainname.is_empty() {
        flags.push(Flag::new("--domainname", &cfg.domainname));
    }
    if !cfg.user.is_empty() && cfg.user != base.user {
        flags.push(Flag::new("--user", &cfg.user).with_short("-u"));
    }
    if !cfg.working_dir.is_empty() && cfg.working_dir != base.working_dir {
        flags.push(Flag::new("--workdir", &cfg.working_dir).with_short("-w"));
    }
}

/// `--entrypoint` takes a single word, so any further entrypoint words move
/// in front of the command. Overriding the entrypoint also discards the
/// image's command, so the full command is repeated in that case.
fn command_line(cfg: &ContainerConfig, base: &ContainerConfig, flags: &mut Vec<Flag>) -> Vec<String> {
    if cfg.entrypoint != base.entrypoint {
        return match cfg.entrypoint.split_first() {
            Some((first, rest)) => {
                flags.push(Flag::new("--entrypoint", first));
                rest.iter().chain(&cfg.cmd).cloned().collect()
            }
            None => {
                flags.push(Flag::new("--entrypoint", ""));
                cfg.cmd.clone()
            }
        };
    }

    if cfg.cmd == base.cmd {
        return Vec::new();
    }
    if cfg.cmd.is_empty() {
        warn!("container clears the image command, which `docker run` cannot express");
    }
    cfg.cmd.clone()
}

fn environment(cfg: &ContainerConfig, base: &ContainerConfig, opts: &Options, flags: &mut Vec<Flag>) {
    for entry in &cfg.env {
        if base.env.contains(entry) {
            continue;
        }
        let name = entry.split_once('=').map_or(entry.as_str(), |(k, _)| k);
        if opts.exclude_env.iter().any(|e| e == name) {
            continue;
        }
        flags.push(Flag::new("--env", entry).with_short("-e"));
    }

    for (key, value) in &cfg.labels {
        if base.labels.get(key) == Some(value) {
            continue;
        }
        if opts
            .exclude_label_prefixes
            .iter()
            .any(|p| key.starts_with(p.as_str()))
        {
            continue;
        }
        flags.push(Flag::new("--label", format!("{key}={value}")).with_short("-l"));
    }
}

fn shares_network_namespace(mode: &str) -> bool {
    mode == "host" || mode.starts_with("container:")
}

fn is_default_network(mode: &str) -> bool {
    matches!(mode, "" | "default" | "bridge")
}

/// Primary network flags; returns `network connect` followups for any
/// additional networks.
fn network(container: &ContainerInspect, opts: &Options, flags: &mut Vec<Flag>) -> Vec<Vec<String>> {
    let mode = container.host_config.network_mode.as_str();
    let primary = if is_default_network(mode) { "bridge" } else { mode };
    if !is_default_network(mode) {
        flags.push(Flag::new("--network", mode));
    }

    let networks = &container.network_settings.networks;
    let implicit = [
        container.short_id(),
        container.short_name(),
        container.config.hostname.as_str(),
    ];
    let aliases_of = |aliases: &[String]| -> Vec<String> {
        aliases
            .iter()
            .filter(|a| !implicit.contains(&a.as_str()))
            .cloned()
            .collect()
    };

    if let Some(ep) = networks.get(primary) {
        if let Some(ipam) = &ep.ipam_config {
            if !ipam.ipv4_address.is_empty() {
                flags.push(Flag::new("--ip", &ipam.ipv4_address));
            }
            if !ipam.ipv6_address.is_empty() {
                flags.push(Flag::new("--ip6", &ipam.ipv6_address));
            }
        }
        for alias in aliases_of(&ep.aliases) {
            flags.push(Flag::new("--network-alias", alias));
        }
    }

    let extra: Vec<_> = networks.iter().filter(|(name, _)| *name != primary).collect();
    if extra.is_empty() {
        return Vec::new();
    }
    if !opts.keep_name || container.short_name().is_empty() {
        warn!(
            networks = ?extra.iter().map(|(n, _)| n.as_str()).collect::<Vec<_>>(),
            "container has no name to attach additional networks to, skipping them"
        );
        return Vec::new();
    }

    extra
        .into_iter()
        .map(|(name, ep)| {
            let mut cmd = vec!["network".to_string(), "connect".to_string()];
            for alias in aliases_of(&ep.aliases) {
                cmd.extend(["--alias".to_string(), alias]);
            }
            if let Some(ipam) = &ep.ipam_config {
                if !ipam.ipv4_address.is_empty() {
                    cmd.extend(["--ip".to_string(), ipam.ipv4_address.clone()]);
                }
                if !ipam.ipv6_address.is_empty() {
                    cmd.extend(["--ip6".to_string(), ipam.ipv6_address.clone()]);
                }
            }
            cmd.push(name.clone());
            cmd.push(container.short_name().to_string());
            cmd
        })
        .collect()
}

/// `80/tcp` → `80`; other protocols keep their suffix.
fn container_port(port: &str) -> &str {
    port.strip_suffix("/tcp").unwrap_or(port)
}

fn port_sort_key(port: &str) -> (u32, String) {
    let (num, proto) = port.split_once('/').unwrap_or((port, "tcp"));
    (num.parse().unwrap_or(u32::MAX), proto.to_string())
}

fn publish_spec(ctr: &str, binding: &PortBinding) -> String {
    let ip = match binding.host_ip.as_str() {
        "" | "0.0.0.0" | "::" => None,
        ip if ip.contains(':') => Some(format!("[{ip}]")),
        ip => Some(ip.to_string()),
    };
    match (ip, binding.host_port.is_empty()) {
        (None, true) => ctr.to_string(),
        (None, false) => format!("{}:{ctr}", binding.host_port),
        (Some(ip), true) => format!("{ip}::{ctr}"),
        (Some(ip), false) => format!("{ip}:{}:{ctr}", binding.host_port),
    }
}

fn ports(cfg: &ContainerConfig, base: &ContainerConfig, host: &HostConfig, flags: &mut Vec<Flag>) {
    if host.publish_all_ports {
        flags.push(Flag::switch("--publish-all").with_short("-P"));
    }

    let mut bound: Vec<_> = host.port_bindings.iter().collect();
    bound.sort_by_key(|(port, _)| port_sort_key(port));

    let mut published: Vec<String> = Vec::new();
    for (port, bindings) in bound {
        let ctr = container_port(port);
        let specs: Vec<String> = match bindings.as_deref() {
            None | Some([]) => vec![ctr.to_string()],
            Some(list) => list.iter().map(|b| publish_spec(ctr, b)).collect(),
        };
        for spec in specs {
            if !published.contains(&spec) {
                published.push(spec);
            }
        }
    }
    for spec in published {
        flags.push(Flag::new("--publish", spec).with_short("-p"));
    }

    let mut exposed: Vec<_> = cfg
        .exposed_ports
        .keys()
        .filter(|p| !base.exposed_ports.contains_key(*p) && !host.port_bindings.contains_key(*p))
        .collect();
    exposed.sort_by_key(|p| port_sort_key(p));
    for port in exposed {
        flags.push(Flag::new("--expose", container_port(port)));
    }
}

fn resolution(host: &HostConfig, flags: &mut Vec<Flag>) {
    for server in &host.dns {
        flags.push(Flag::new("--dns", server));
    }
    for domain in &host.dns_search {
        flags.push(Flag::new("--dns-search", domain));
    }
    for option in &host.dns_options {
        flags.push(Flag::new("--dns-option", option));
    }
    for entry in &host.extra_hosts {
        flags.push(Flag::new("--add-host", entry));
    }
    for link in &host.links {
        flags.push(Flag::new("--link", link_spec(link)));
    }
}

/// Docker stores links as `/db:/web/alias`.
fn link_spec(raw: &str) -> String {
    match raw.split_once(':') {
        Some((source, target)) => {
            let source = source.trim_start_matches('/');
            let alias = target.rsplit('/').next().unwrap_or(target);
            format!("{source}:{alias}")
        }
        None => raw.trim_start_matches('/').to_string(),
    }
}

fn bind_target(bind: &str) -> &str {
    let mut parts = bind.split(':');
    let first = parts.next().unwrap_or(bind);
    parts.next().unwrap_or(first)
}

fn storage(cfg: &ContainerConfig, base: &ContainerConfig, host: &HostConfig, flags: &mut Vec<Flag>) {
    for bind in &host.binds {
        flags.push(Flag::new("--volume", bind).with_short("-v"));
    }

    for mount in &host.mounts {
        let mut spec = format!("type={}", mount.kind);
        if !mount.source.is_empty() {
            spec.push_str(&format!(",source={}", mount.source));
        }
        spec.push_str(&format!(",target={}", mount.target));
        if mount.read_only {
            spec.push_str(",readonly");
        }
        flags.push(Flag::new("--mount", spec));
    }

    let covered: Vec<&str> = host
        .binds
        .iter()
        .map(|b| bind_target(b))
        .chain(host.mounts.iter().map(|m| m.target.as_str()))
        .chain(host.tmpfs.keys().map(String::as_str))
        .collect();
    for path in cfg.volumes.keys() {
        if base.volumes.contains_key(path) || covered.contains(&path.as_str()) {
            continue;
        }
        flags.push(Flag::new("--volume", path).with_short("-v"));
    }

    for (path, options) in &host.tmpfs {
        let spec = if options.is_empty() {
            path.clone()
        } else {
            format!("{path}:{options}")
        };
        flags.push(Flag::new("--tmpfs", spec));
    }

    for source in &host.volumes_from {
        flags.push(Flag::new("--volumes-from", source));
    }
}

fn restart(host: &HostConfig, flags: &mut Vec<Flag>) {
    let policy = &host.restart_policy;
    match policy.name.as_str() {
        "" | "no" => {}
        "on-failure" if policy.maximum_retry_count > 0 => flags.push(Flag::new(
            "--restart",
            format!("on-failure:{}", policy.maximum_retry_count),
        )),
        name => flags.push(Flag::new("--restart", name)),
    }
}

fn device_spec(device: &DeviceMapping) -> String {
    let host = device.path_on_host.as_str();
    let ctr = if device.path_in_container.is_empty() {
        host
    } else {
        device.path_in_container.as_str()
    };
    let perms = device.cgroup_permissions.as_str();
    let default_perms = perms.is_empty() || perms == "rwm";

    let mut spec = host.to_string();
    if ctr != host || !default_perms {
        spec.push(':');
        spec.push_str(ctr);
    }
    if !default_perms {
        spec.push(':');
        spec.push_str(perms);
    }
    spec
}

fn security(host: &HostConfig, flags: &mut Vec<Flag>) {
    if host.privileged {
        flags.push(Flag::switch("--privileged"));
    }
    for cap in &host.cap_add {
        flags.push(Flag::new("--cap-add", cap));
    }
    for cap in &host.cap_drop {
        flags.push(Flag::new("--cap-drop", cap));
    }
    for opt in &host.security_opt {
        flags.push(Flag::new("--security-opt", opt));
    }
    for device in &host.devices {
        flags.push(Flag::new("--device", device_spec(device)));
    }
}

/// Render a byte count with the largest unit that divides it exactly.
pub fn format_bytes(bytes: i64) -> String {
    const UNITS: [(i64, &str); 3] = [(1 << 30, "g"), (1 << 20, "m"), (1 << 10, "k")];
    for (size, suffix) in UNITS {
        if bytes >= size && bytes % size == 0 {
            return format!("{}{suffix}", bytes / size);
        }
    }
    bytes.to_string()
}

/// `NanoCpus` as the decimal accepted by `--cpus`.
pub fn format_cpus(nano: i64) -> String {
    if nano % 1_000_000_000 == 0 {
        (nano / 1_000_000_000).to_string()
    } else {
        (nano as f64 / 1e9).to_string()
    }
}

/// Nanoseconds as a Go duration string in the largest exact unit (`30s`, `500ms`, `2m`).
pub fn format_duration(nanos: i64) -> String {
    const UNITS: [(i64, &str); 5] = [
        (3_600_000_000_000, "h"),
        (60_000_000_000, "m"),
        (1_000_000_000, "s"),
        (1_000_000, "ms"),
        (1_000, "us"),
    ];
    for (size, suffix) in UNITS {
        if nanos % size == 0 {
            return format!("{}{suffix}", nanos / size);
        }
    }
    format!("{nanos}ns")
}

fn resources(host: &HostConfig, flags: &mut Vec<Flag>) {
    if host.memory > 0 {
        flags.push(Flag::new("--memory", format_bytes(host.memory)).with_short("-m"));
    }
    if host.memory_reservation > 0 {
        flags.push(Flag::new(
            "--memory-reservation",
            format_bytes(host.memory_reservation),
        ));
    }
    // Docker fills in twice the memory limit when only `-m` was given.
    if host.memory_swap == -1 {
        flags.push(Flag::new("--memory-swap", "-1"));
    } else if host.memory_swap > 0 && host.memory.checked_mul(2) != Some(host.memory_swap) {
        flags.push(Flag::new("--memory-swap", format_bytes(host.memory_swap)));
    }
    if host.nano_cpus > 0 {
        flags.push(Flag::new("--cpus", format_cpus(host.nano_cpus)));
    }
    if host.cpu_shares > 0 {
        flags.push(Flag::new("--cpu-shares", host.cpu_shares.to_string()).with_short("-c"));
    }
    if !host.cpuset_cpus.is_empty() {
        flags.push(Flag::new("--cpuset-cpus", &host.cpuset_cpus));
    }
    if let Some(limit) = host.pids_limit
        && limit > 0
    {
        flags.push(Flag::new("--pids-limit", limit.to_string()));
    }
    if host.shm_size > 0 && host.shm_size != DEFAULT_SHM_SIZE {
        flags.push(Flag::new("--shm-size", format_bytes(host.shm_size)));
    }
    for ulimit in &host.ulimits {
        let spec = if ulimit.soft == ulimit.hard {
            format!("{}={}", ulimit.name, ulimit.soft)
        } else {
            format!("{}={}:{}", ulimit.name, ulimit.soft, ulimit.hard)
        };
        flags.push(Flag::new("--ulimit", spec));
    }
    for (key, value) in &host.sysctls {
        flags.push(Flag::new("--sysctl", format!("{key}={value}")));
    }
    for group in &host.group_add {
        flags.push(Flag::new("--group-add", group));
    }
}

fn runtime(host: &HostConfig, flags: &mut Vec<Flag>) {
    if host.init == Some(true) {
        flags.push(Flag::switch("--init"));
    }
    if host.readonly_rootfs {
        flags.push(Flag::switch("--read-only"));
    }
    if !matches!(host.ipc_mode.as_str(), "" | "private" | "shareable") {
        flags.push(Flag::new("--ipc", &host.ipc_mode));
    }
    if !host.pid_mode.is_empty() {
        flags.push(Flag::new("--pid", &host.pid_mode));
    }
    if !host.uts_mode.is_empty() {
        flags.push(Flag::new("--uts", &host.uts_mode));
    }
    if !host.userns_mode.is_empty() {
        flags.push(Flag::new("--userns", &host.userns_mode));
    }
    if !matches!(host.runtime.as_str(), "" | "runc") {
        flags.push(Flag::new("--runtime", &host.runtime));
    }
    if !host.cgroup_parent.is_empty() {
        flags.push(Flag::new("--cgroup-parent", &host.cgroup_parent));
    }
    if host.oom_kill_disable == Some(true) {
        flags.push(Flag::switch("--oom-kill-disable"));
    }
    if host.oom_score_adj != 0 {
        flags.push(Flag::new("--oom-score-adj", host.oom_score_adj.to_string()));
    }
}

fn logging(host: &HostConfig, opts: &Options, flags: &mut Vec<Flag>) {
    let log = &host.log_config;
    if !log.kind.is_empty() && log.kind != opts.default_log_driver {
        flags.push(Flag::new("--log-driver", &log.kind));
    }
    for (key, value) in &log.config {
        flags.push(Flag::new("--log-opt", format!("{key}={value}")));
    }
}

fn stop(cfg: &ContainerConfig, base: &ContainerConfig, flags: &mut Vec<Flag>) {
    if !cfg.stop_signal.is_empty() && cfg.stop_signal != base.stop_signal {
        flags.push(Flag::new("--stop-signal", &cfg.stop_signal));
    }
    if let Some(timeout) = cfg.stop_timeout
        && cfg.stop_timeout != base.stop_timeout
    {
        flags.push(Flag::new("--stop-timeout", timeout.to_string()));
    }
}

fn health(cfg: &ContainerConfig, base: &ContainerConfig, flags: &mut Vec<Flag>) {
    let Some(check) = &cfg.healthcheck else {
        return;
    };
    if base.healthcheck.as_ref() == Some(check) {
        return;
    }

    match check.test.split_first() {
        Some((kind, _)) if kind == "NONE" => {
            flags.push(Flag::switch("--no-healthcheck"));
            return;
        }
        Some((kind, rest)) if kind == "CMD-SHELL" => {
            flags.push(Flag::new("--health-cmd", rest.join(" ")));
        }
        Some((kind, rest)) if kind == "CMD" => {
            flags.push(Flag::new("--health-cmd", shell_words::join(rest)));
        }
        // An empty test keeps the image's check and only overrides timings.
        _ => {}
    }

    if check.interval > 0 {
        flags.push(Flag::new("--health-interval", format_duration(check.interval)));
    }
    if check.timeout > 0 {
        flags.push(Flag::new("--health-timeout", format_duration(check.timeout)));
    }
    if check.start_period > 0 {
        flags.push(Flag::new(
            "--health-start-period",
            format_duration(check.start_period),
        ));
    }
    if check.retries > 0 {
        flags.push(Flag::new("--health-retries", check.retries.to_string()));
    }
}
