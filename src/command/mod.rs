// Turning an inspection record into a `docker run` command line.

pub mod args;
pub mod diff;
pub mod mapping;
pub mod render;

pub use args::{Flag, RunCommand};
pub use diff::diff_commands;
pub use mapping::{Options, reconstruct};
pub use render::{JsonCommand, RenderOptions, render_json, render_text};
