#![allow(dead_code)]

use methodlens::{CallableHandle, ReflectionSurface, RuntimeImage};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub struct TestProject {
    pub dir: TempDir,
}

impl TestProject {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp dir"),
        }
    }

    pub fn add_file(&self, path: &str, content: &str) -> PathBuf {
        let file_path = self.dir.path().join(path);
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent dirs");
        }
        fs::write(&file_path, content).expect("Failed to write file");
        file_path
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write `image.json` into the project and load it.
    pub fn image(&self, json: &str) -> RuntimeImage {
        let path = self.add_file("image.json", json);
        RuntimeImage::load(path).expect("Failed to load runtime image")
    }
}

pub fn fixture_path(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// The image in `tests/fixtures/image.json`, paths resolved against the fixtures dir.
pub fn fixture_image() -> RuntimeImage {
    RuntimeImage::load(fixture_path("image.json")).expect("Failed to load fixture image")
}

/// Handle for `Owner#name` / `Owner.name`, panicking if the image lacks it.
pub fn handle(image: &RuntimeImage, target: &str) -> CallableHandle {
    let (owner, name) = image
        .parse_target(target)
        .unwrap_or_else(|| panic!("{target} is not in the image"));
    image
        .handle(&owner, &name)
        .unwrap_or_else(|| panic!("{target} has no handle"))
}
