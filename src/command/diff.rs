use similar::{ChangeTag, TextDiff};

use super::args::RunCommand;
use super::render::{RenderOptions, render_text};
use crate::config::LineStyle;

/// Unified diff between two reconstructed commands, one flag per line.
///
/// Returns an empty string when both containers would be started the same way.
pub fn diff_commands(
    label_a: &str,
    a: &RunCommand,
    label_b: &str,
    b: &RunCommand,
    opts: &RenderOptions,
) -> String {
    let opts = RenderOptions {
        style: LineStyle::Multiline,
        ..opts.clone()
    };
    let old = with_trailing_newline(render_text(a, &opts));
    let new = with_trailing_newline(render_text(b, &opts));

    let text_diff = TextDiff::from_lines(&old, &new);
    if text_diff.iter_all_changes().all(|c| c.tag() == ChangeTag::Equal) {
        return String::new();
    }

    text_diff
        .unified_diff()
        .context_radius(3)
        .header(label_a, label_b)
        .to_string()
}

fn with_trailing_newline(mut text: String) -> String {
    text.push('\n');
    text
}
