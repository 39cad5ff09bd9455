//! Rebuild a `docker run` command line from an existing container.
//!
//! The flow is inspect → [`command::reconstruct`] → [`command::render_text`]:
//! inspection records come from the `docker` CLI or saved JSON
//! ([`docker::InspectSource`]), and image defaults are subtracted so the
//! output only carries what had to be specified by hand.

pub mod command;
pub mod config;
pub mod docker;

use tracing::warn;

use command::{Options, RunCommand};
use docker::{ContainerInspect, InspectSource};

/// Inspect `reference` through `source` and rebuild its run command.
///
/// A missing image record degrades to emitting every value rather than failing.
pub fn reconstruct_from(
    source: &dyn InspectSource,
    reference: &str,
    opts: &Options,
) -> docker::Result<(ContainerInspect, RunCommand)> {
    let container = source.container(reference)?;
    let image_ref = if container.image.is_empty() {
        container.config.image.as_str()
    } else {
        container.image.as_str()
    };
    let image = if opts.image_defaults && !image_ref.is_empty() {
        let image = source.image(image_ref)?;
        if image.is_none() {
            warn!(
                container = container.short_name(),
                image = image_ref,
                "image not found, image defaults will be included"
            );
        }
        image
    } else {
        None
    };
    let cmd = command::reconstruct(&container, image.as_ref(), opts);
    Ok((container, cmd))
}
