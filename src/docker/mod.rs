// Docker access: inspection records from the CLI or from saved JSON.

pub mod engine;
pub mod error;
pub mod source;
pub mod types;

pub use engine::DockerCli;
pub use error::{Error, Result};
pub use source::{FileSource, InspectSource};
pub use types::{ContainerInspect, ImageInspect, parse_containers, parse_images};
