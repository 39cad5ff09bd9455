use std::process::{Command, Output, Stdio};

use tracing::debug;

use super::error::{Error, Result};
use super::source::InspectSource;
use super::types::{ContainerInspect, ImageInspect, parse_containers, parse_images};

/// Drives the `docker` CLI as a subprocess.
#[derive(Debug, Clone)]
pub struct DockerCli {
    binary: String,
}

impl DockerCli {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    /// Verify that the Docker daemon is reachable.
    pub fn ensure_available(&self) -> Result<()> {
        let status = Command::new(&self.binary)
            .args(["version", "--format", "{{.Server.Version}}"])
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map_err(|source| Error::Unavailable {
                binary: self.binary.clone(),
                source,
            })?;

        if !status.success() {
            return Err(Error::DaemonDown(status.to_string()));
        }
        Ok(())
    }

    /// Ids of all running containers, full length.
    pub fn running(&self) -> Result<Vec<String>> {
        let out = self.checked(&["ps", "-q", "--no-trunc"])?;
        Ok(out
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(String::from)
            .collect())
    }

    fn output(&self, args: &[&str]) -> Result<Output> {
        debug!(binary = %self.binary, ?args, "running docker");
        Command::new(&self.binary)
            .args(args)
            .stdin(Stdio::null())
            .output()
            .map_err(|source| Error::Unavailable {
                binary: self.binary.clone(),
                source,
            })
    }

    fn checked(&self, args: &[&str]) -> Result<String> {
        let out = self.output(args)?;
        if !out.status.success() {
            return Err(command_failed(args, &out));
        }
        Ok(String::from_utf8_lossy(&out.stdout).into_owned())
    }
}

impl Default for DockerCli {
    fn default() -> Self {
        Self::new("docker")
    }
}

impl InspectSource for DockerCli {
    fn container(&self, reference: &str) -> Result<ContainerInspect> {
        let args = ["inspect", "--type", "container", reference];
        let out = self.output(&args)?;
        if !out.status.success() {
            if is_not_found(&out) {
                return Err(Error::ContainerNotFound(reference.to_string()));
            }
            return Err(command_failed(&args, &out));
        }
        parse_containers(&String::from_utf8_lossy(&out.stdout))?
            .into_iter()
            .next()
            .ok_or_else(|| Error::ContainerNotFound(reference.to_string()))
    }

    fn image(&self, reference: &str) -> Result<Option<ImageInspect>> {
        let args = ["image", "inspect", reference];
        let out = self.output(&args)?;
        if !out.status.success() {
            // The image may have been removed after the container was created.
            if is_not_found(&out) {
                return Ok(None);
            }
            return Err(command_failed(&args, &out));
        }
        Ok(parse_images(&String::from_utf8_lossy(&out.stdout))?
            .into_iter()
            .next())
    }
}

fn is_not_found(out: &Output) -> bool {
    String::from_utf8_lossy(&out.stderr)
        .to_ascii_lowercase()
        .contains("no such")
}

fn command_failed(args: &[&str], out: &Output) -> Error {
    Error::CommandFailed {
        command: args.join(" "),
        status: out.status.to_string(),
        stderr: String::from_utf8_lossy(&out.stderr).trim().to_string(),
    }
}
