mod loader;
mod types;

pub use loader::{CONFIG_FILE, load, load_file, resolve};
pub use types::{Config, LineStyle, OutputFormat};
