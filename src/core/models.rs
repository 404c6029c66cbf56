use std::path::PathBuf;

/*
 * Core data structures for a creative writing session: the persisted
 * `Session` entity, references to images that have been shown, and the
 * decoded pixel buffer handed to the presentation shell. The text
 * reconciliation policy (splitting free text into paragraph slots without
 * ever deleting trailing slots) lives here as well, since it is a property
 * of the model rather than of any particular storage backend.
 */

/// Prefix that marks an image reference as belonging to the bundled
/// default library rather than the user's file system.
pub const LIBRARY_REF_PREFIX: &str = "defaultLibrary";

// A reference to an image as recorded in the session file. Default-library
// entries keep their relative form so a session stays portable between
// machines; everything else is an absolute filesystem path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ImageRef {
    Library(String),
    File(PathBuf),
}

impl ImageRef {
    pub fn from_src(src: &str) -> Self {
        if src.starts_with(LIBRARY_REF_PREFIX) {
            ImageRef::Library(src.to_string())
        } else {
            ImageRef::File(PathBuf::from(src))
        }
    }

    /// The `src` attribute form this reference is persisted under.
    pub fn src(&self) -> String {
        match self {
            ImageRef::Library(rel) => rel.clone(),
            ImageRef::File(path) => path.to_string_lossy().into_owned(),
        }
    }
}

// Decoded RGBA pixels, ready for the shell to upload as a texture. Kept
// free of any GUI toolkit types so the core stays platform-agnostic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePixels {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl From<image::DynamicImage> for ImagePixels {
    fn from(img: image::DynamicImage) -> Self {
        let rgba = img.to_rgba8();
        ImagePixels {
            width: rgba.width(),
            height: rgba.height(),
            rgba: rgba.into_raw(),
        }
    }
}

/*
 * The root persisted entity: source configuration, the ordered sequence of
 * images already displayed, and the user's text. `shown_images` is
 * append-only for the lifetime of a session; the image pool appends via
 * `record_shown` and nothing ever removes entries.
 */
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub source_directories: Vec<PathBuf>,
    pub include_subdirectories: bool,
    pub use_default_library: bool,
    pub shown_images: Vec<ImageRef>,
    pub title: String,
    pub paragraphs: Vec<String>,
    pub backing_file: PathBuf,
}

impl Session {
    /// Creates a fresh, empty session bound to `backing_file`. The text
    /// starts as a single empty paragraph.
    pub fn new(
        backing_file: PathBuf,
        source_directories: Vec<PathBuf>,
        include_subdirectories: bool,
        use_default_library: bool,
    ) -> Self {
        Session {
            source_directories,
            include_subdirectories,
            use_default_library,
            shown_images: Vec::new(),
            title: String::new(),
            paragraphs: vec![String::new()],
            backing_file,
        }
    }

    pub fn record_shown(&mut self, image: ImageRef) {
        self.shown_images.push(image);
    }

    /*
     * Replaces the text content from the editor's free-form string. The
     * string is split on line breaks and reconciled against the existing
     * paragraph slots: the common prefix is overwritten, surplus existing
     * slots are blanked out (never removed), and surplus new lines are
     * appended as fresh slots. Trailing empty input lines are dropped, but
     * at least one line always remains.
     */
    pub fn set_text(&mut self, raw: &str) {
        let mut lines: Vec<&str> = raw.split('\n').collect();
        while lines.len() > 1 && lines.last().is_some_and(|l| l.is_empty()) {
            lines.pop();
        }

        let common = self.paragraphs.len().min(lines.len());
        for (slot, line) in self.paragraphs.iter_mut().zip(lines.iter()) {
            (*line).clone_into(slot);
        }
        if self.paragraphs.len() > common {
            for slot in self.paragraphs.iter_mut().skip(common) {
                slot.clear();
            }
        } else {
            for line in &lines[common..] {
                self.paragraphs.push((*line).to_string());
            }
        }
    }

    /// The editor-facing text form: every paragraph followed by a line
    /// break, including blanked-out trailing ones.
    pub fn text(&self) -> String {
        let mut out = String::new();
        for p in &self.paragraphs {
            out.push_str(p);
            out.push('\n');
        }
        out
    }

    /// File name component of the backing file, for window titles.
    pub fn file_name(&self) -> String {
        self.backing_file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}
