use serde::Serialize;

use super::args::RunCommand;
use crate::config::{Config, LineStyle};

/// Continuation between lines of a multiline command.
const CONTINUATION: &str = " \\\n    ";

#[derive(Debug, Clone)]
pub struct RenderOptions {
    pub binary: String,
    pub style: LineStyle,
    pub long_flags: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for RenderOptions {
    fn from(cfg: &Config) -> Self {
        Self {
            binary: cfg.docker.clone(),
            style: cfg.style,
            long_flags: cfg.long_flags,
        }
    }
}

/// Render as shell text, followed by any followup commands on their own lines.
pub fn render_text(cmd: &RunCommand, opts: &RenderOptions) -> String {
    let mut out = match opts.style {
        LineStyle::Single => {
            let mut argv = vec![opts.binary.clone()];
            argv.extend(cmd.argv(opts.long_flags));
            shell_words::join(argv)
        }
        LineStyle::Multiline => multiline(cmd, opts),
    };

    for followup in &cmd.followups {
        out.push('\n');
        out.push_str(&shell_words::join(
            std::iter::once(opts.binary.as_str()).chain(followup.iter().map(String::as_str)),
        ));
    }
    out
}

fn multiline(cmd: &RunCommand, opts: &RenderOptions) -> String {
    let mut lines = vec![shell_words::join([opts.binary.as_str(), "run"])];
    for flag in &cmd.flags {
        lines.push(shell_words::join(flag.tokens(opts.long_flags)));
    }
    lines.push(shell_words::join(
        std::iter::once(&cmd.image).chain(&cmd.args),
    ));
    lines.join(CONTINUATION)
}

/// Machine-readable form of one reconstructed container.
#[derive(Debug, Serialize)]
pub struct JsonCommand<'a> {
    pub container: &'a str,
    pub run: Vec<String>,
    pub followups: Vec<Vec<String>>,
}

impl<'a> JsonCommand<'a> {
    pub fn new(container: &'a str, cmd: &RunCommand, opts: &RenderOptions) -> Self {
        let with_binary = |argv: Vec<String>| {
            std::iter::once(opts.binary.clone())
                .chain(argv)
                .collect::<Vec<_>>()
        };
        Self {
            container,
            run: with_binary(cmd.argv(opts.long_flags)),
            followups: cmd.followups.iter().cloned().map(with_binary).collect(),
        }
    }
}

/// Render every command as one pretty-printed JSON array.
pub fn render_json(commands: &[JsonCommand<'_>]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(commands)
}
