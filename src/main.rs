use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{ArgAction, Parser, ValueEnum};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use docker_get_run::command::{
    self, JsonCommand, Options, RenderOptions, RunCommand, render_json, render_text,
};
use docker_get_run::config::{self, Config, LineStyle, OutputFormat};
use docker_get_run::docker::{ContainerInspect, DockerCli, FileSource, InspectSource};
use docker_get_run::reconstruct_from;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Format {
    Text,
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "docker-get-run", version)]
#[command(about = "Get a suitable `docker run` command from a running container", long_about = None)]
struct Cli {
    /// Container names or ids
    containers: Vec<String>,

    /// Reconstruct every running container
    #[arg(short, long, conflicts_with_all = ["input", "containers"])]
    all: bool,

    /// Read `docker inspect` JSON from a file instead of the daemon ('-' for stdin)
    #[arg(long, value_name = "FILE")]
    input: Option<PathBuf>,

    /// Read `docker image inspect` JSON used to drop image defaults
    #[arg(long, value_name = "FILE", requires = "input")]
    image_input: Option<PathBuf>,

    /// Put each flag on its own line
    #[arg(short, long)]
    multiline: bool,

    /// Always print long flag names
    #[arg(long)]
    long_flags: bool,

    #[arg(short, long, value_enum)]
    format: Option<Format>,

    /// Also print values the container inherited from its image
    #[arg(long)]
    no_image_defaults: bool,

    /// Leave out --name
    #[arg(long)]
    no_name: bool,

    /// Show how two containers' run commands differ
    #[arg(long)]
    diff: bool,

    /// Docker binary to invoke and print
    #[arg(long, value_name = "BIN")]
    docker: Option<String>,

    /// Config file (default: ./.docker-get-run.yaml, then the user config dir)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Increase log verbosity (repeatable)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    /// Command-line flags override the config file.
    fn apply(&self, cfg: &mut Config) {
        if let Some(bin) = &self.docker {
            cfg.docker = bin.clone();
        }
        if self.multiline {
            cfg.style = LineStyle::Multiline;
        }
        if self.long_flags {
            cfg.long_flags = true;
        }
        match self.format {
            Some(Format::Text) => cfg.format = OutputFormat::Text,
            Some(Format::Json) => cfg.format = OutputFormat::Json,
            None => {}
        }
        if self.no_image_defaults {
            cfg.image_defaults = false;
        }
        if self.no_name {
            cfg.keep_name = false;
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let cwd = std::env::current_dir().context("failed to read the working directory")?;
    let mut cfg = config::resolve(cli.config.as_deref(), &cwd)?;
    cli.apply(&mut cfg);
    debug!(
        docker = %cfg.docker,
        style = cfg.style.as_str(),
        format = cfg.format.as_str(),
        "resolved config"
    );

    let (source, targets) = open_source(&cli, &cfg)?;
    if !has_targets(&cli, &targets)? {
        return Ok(());
    }

    let opts = Options::from(&cfg);
    let render = RenderOptions::from(&cfg);

    if cli.diff {
        let [a, b] = targets.as_slice() else {
            bail!("--diff needs exactly two containers, got {}", targets.len());
        };
        let (ca, ra) = reconstruct_one(source.as_ref(), a, &opts)?;
        let (cb, rb) = reconstruct_one(source.as_ref(), b, &opts)?;
        let diff = command::diff_commands(ca.short_name(), &ra, cb.short_name(), &rb, &render);
        if diff.is_empty() {
            info!("{} and {} would be started the same way", a, b);
        } else {
            print!("{diff}");
        }
        return Ok(());
    }

    let mut results = Vec::with_capacity(targets.len());
    for target in &targets {
        results.push(reconstruct_one(source.as_ref(), target, &opts)?);
    }

    match cfg.format {
        OutputFormat::Text => {
            for (_, cmd) in &results {
                println!("{}", render_text(cmd, &render));
            }
        }
        OutputFormat::Json => {
            let commands: Vec<JsonCommand<'_>> = results
                .iter()
                .map(|(container, cmd)| JsonCommand::new(container.short_name(), cmd, &render))
                .collect();
            println!("{}", render_json(&commands)?);
        }
    }
    Ok(())
}

/// Pick the inspection source and the containers to reconstruct.
fn open_source(cli: &Cli, cfg: &Config) -> Result<(Box<dyn InspectSource>, Vec<String>)> {
    if let Some(input) = &cli.input {
        let source = FileSource::load(input, cli.image_input.as_deref())
            .with_context(|| format!("failed to load {}", input.display()))?;
        let targets = if cli.containers.is_empty() {
            source.containers().iter().map(|c| c.id.clone()).collect()
        } else {
            cli.containers.clone()
        };
        return Ok((Box::new(source), targets));
    }

    let docker = DockerCli::new(cfg.docker.clone());
    docker.ensure_available()?;
    let targets = if cli.all {
        docker.running().context("failed to list running containers")?
    } else {
        cli.containers.clone()
    };
    Ok((Box::new(docker), targets))
}

/// `--all` with nothing running prints nothing; otherwise a target is required.
fn has_targets(cli: &Cli, targets: &[String]) -> Result<bool> {
    if !targets.is_empty() {
        return Ok(true);
    }
    if cli.all {
        info!("no running containers");
        return Ok(false);
    }
    bail!("no containers given; pass a name or id, or use --all");
}

fn reconstruct_one(
    source: &dyn InspectSource,
    target: &str,
    opts: &Options,
) -> Result<(ContainerInspect, RunCommand)> {
    reconstruct_from(source, target, opts)
        .with_context(|| format!("failed to reconstruct {target}"))
}

/// Logs go to stderr so stdout only carries commands. `RUST_LOG` wins over `-v`.
fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn flags_override_config() {
        let cli = Cli::parse_from([
            "docker-get-run",
            "--multiline",
            "--long-flags",
            "--format",
            "json",
            "--no-name",
            "--no-image-defaults",
            "--docker",
            "podman",
            "web",
        ]);
        let mut cfg = Config::default();
        cli.apply(&mut cfg);
        assert_eq!(cfg.style, LineStyle::Multiline);
        assert!(cfg.long_flags);
        assert_eq!(cfg.format, OutputFormat::Json);
        assert!(!cfg.keep_name);
        assert!(!cfg.image_defaults);
        assert_eq!(cfg.docker, "podman");
        assert_eq!(cli.containers, vec!["web"]);
    }

    #[test]
    fn absent_flags_keep_config_values() {
        let cli = Cli::parse_from(["docker-get-run", "web"]);
        let mut cfg = Config {
            style: LineStyle::Multiline,
            ..Config::default()
        };
        cli.apply(&mut cfg);
        assert_eq!(cfg.style, LineStyle::Multiline);
        assert!(cfg.keep_name);
    }

    #[test]
    fn all_conflicts_with_input() {
        let result = Cli::try_parse_from(["docker-get-run", "--all", "--input", "x.json"]);
        assert!(result.is_err());
    }

    #[test]
    fn all_conflicts_with_container_names() {
        let result = Cli::try_parse_from(["docker-get-run", "--all", "web"]);
        assert!(result.is_err());
        assert!(Cli::try_parse_from(["docker-get-run", "--all"]).is_ok());
    }

    #[test]
    fn empty_all_is_not_an_error() {
        let all = Cli::parse_from(["docker-get-run", "--all"]);
        assert!(!has_targets(&all, &[]).unwrap());

        let bare = Cli::parse_from(["docker-get-run"]);
        assert!(has_targets(&bare, &[]).is_err());
        assert!(has_targets(&bare, &["web".to_string()]).unwrap());
    }

    #[test]
    fn image_input_requires_input() {
        let result = Cli::try_parse_from(["docker-get-run", "--image-input", "i.json", "web"]);
        assert!(result.is_err());
    }

    #[test]
    fn verbose_is_counted() {
        let cli = Cli::parse_from(["docker-get-run", "-vv", "web"]);
        assert_eq!(cli.verbose, 2);
    }
}
