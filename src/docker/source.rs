use std::io::Read;
use std::path::Path;

use super::error::{Error, Result};
use super::types::{ContainerInspect, ImageInspect, parse_containers, parse_images};

/// Where inspection records come from: the live daemon or saved JSON.
pub trait InspectSource {
    fn container(&self, reference: &str) -> Result<ContainerInspect>;

    /// `Ok(None)` when the image no longer exists.
    fn image(&self, reference: &str) -> Result<Option<ImageInspect>>;
}

/// Inspection records read from `docker inspect` output saved to disk.
#[derive(Debug, Clone, Default)]
pub struct FileSource {
    containers: Vec<ContainerInspect>,
    images: Vec<ImageInspect>,
}

impl FileSource {
    pub fn new(containers: Vec<ContainerInspect>, images: Vec<ImageInspect>) -> Self {
        Self { containers, images }
    }

    /// Load container records from `path` (`-` reads stdin) and, optionally,
    /// image records from `image_path`.
    pub fn load(path: &Path, image_path: Option<&Path>) -> Result<Self> {
        let containers = parse_containers(&read_input(path)?)?;
        let images = match image_path {
            Some(p) => parse_images(&read_input(p)?)?,
            None => Vec::new(),
        };
        Ok(Self::new(containers, images))
    }

    pub fn containers(&self) -> &[ContainerInspect] {
        &self.containers
    }
}

impl InspectSource for FileSource {
    fn container(&self, reference: &str) -> Result<ContainerInspect> {
        let wanted = reference.trim_start_matches('/');
        if let Some(found) = self.containers.iter().find(|c| c.short_name() == wanted) {
            return Ok(found.clone());
        }
        if wanted.is_empty() {
            return Err(Error::UnknownReference(reference.to_string()));
        }

        let matches: Vec<_> = self
            .containers
            .iter()
            .filter(|c| c.id.starts_with(wanted))
            .collect();
        match matches.as_slice() {
            [] => Err(Error::UnknownReference(reference.to_string())),
            [one] => Ok((*one).clone()),
            many => Err(Error::AmbiguousReference {
                reference: reference.to_string(),
                matches: many
                    .iter()
                    .map(|c| c.short_id())
                    .collect::<Vec<_>>()
                    .join(", "),
            }),
        }
    }

    fn image(&self, reference: &str) -> Result<Option<ImageInspect>> {
        let digest = reference.trim_start_matches("sha256:");
        if digest.is_empty() {
            return Ok(None);
        }
        Ok(self
            .images
            .iter()
            .find(|i| {
                i.id == reference
                    || i.id.trim_start_matches("sha256:").starts_with(digest)
                    || i.repo_tags.iter().any(|t| t == reference)
            })
            .cloned())
    }
}

fn read_input(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        return Ok(buf);
    }
    Ok(std::fs::read_to_string(path)?)
}
