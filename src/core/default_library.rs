use std::path::{Path, PathBuf};

/*
 * The bundled fallback image library. The manifest is compiled into the
 * binary so the list of entries is always available; the image files
 * themselves live under a `resources/` directory next to the executable
 * (or in the working directory during development).
 */

const MANIFEST: &str = include_str!("../../resources/library_list.txt");

pub struct DefaultLibrary {
    // Relative references, e.g. "defaultLibrary/lighthouse.png".
    entries: Vec<String>,
    // Directory the relative references resolve against.
    root: PathBuf,
}

impl DefaultLibrary {
    /// The library shipped with the application.
    pub fn bundled() -> Self {
        let entries = parse_manifest(MANIFEST);
        let root = locate_resource_root();
        log::debug!(
            "DefaultLibrary: {} bundled entries, resource root {:?}",
            entries.len(),
            root
        );
        DefaultLibrary { entries, root }
    }

    /// A library over an arbitrary root, used by tests.
    pub fn with_root(root: PathBuf, entries: Vec<String>) -> Self {
        DefaultLibrary { entries, root }
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// Maps a relative library reference to a filesystem path.
    pub fn resolve(&self, reference: &str) -> PathBuf {
        self.root.join(reference)
    }
}

fn parse_manifest(manifest: &str) -> Vec<String> {
    manifest
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(String::from)
        .collect()
}

/*
 * During development the resources sit in the working directory; an
 * installed build finds them next to the executable.
 */
fn locate_resource_root() -> PathBuf {
    let cwd_resources = Path::new("resources");
    if cwd_resources.is_dir() {
        return cwd_resources.to_path_buf();
    }
    if let Ok(exe) = std::env::current_exe() {
        if let Some(dir) = exe.parent() {
            let beside_exe = dir.join("resources");
            if beside_exe.is_dir() {
                return beside_exe;
            }
        }
    }
    PathBuf::from("resources")
}
