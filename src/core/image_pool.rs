use crate::core::default_library::DefaultLibrary;
use crate::core::models::{ImagePixels, ImageRef, Session};

use rand::Rng;
use std::collections::HashSet;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use walkdir::WalkDir;

/*
 * The pool of images still eligible to be shown in a session. Candidates
 * come from scanning the session's source directories (optionally
 * recursive) plus the bundled default library, minus everything the
 * session has already displayed. Drawing an image removes it from the
 * pool and appends it to the session's shown list, whether or not the
 * file decodes.
 */

const IMAGE_EXTENSIONS: [&str; 6] = ["png", "jpeg", "jpg", "gif", "bmp", "wbmp"];

#[derive(Debug)]
pub enum ImagePoolError {
    Io(io::Error),
    InvalidSourceDirectory(PathBuf),
    IndexOutOfRange { index: usize, len: usize },
}

impl fmt::Display for ImagePoolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImagePoolError::Io(e) => write!(f, "I/O error: {}", e),
            ImagePoolError::InvalidSourceDirectory(p) => {
                write!(f, "Not a usable image source directory: {:?}", p)
            }
            ImagePoolError::IndexOutOfRange { index, len } => {
                write!(f, "Image index {} out of range (shown: {})", index, len)
            }
        }
    }
}

impl std::error::Error for ImagePoolError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ImagePoolError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for ImagePoolError {
    fn from(err: io::Error) -> Self {
        ImagePoolError::Io(err)
    }
}

pub type Result<T> = std::result::Result<T, ImagePoolError>;

/// Outcome of asking the pool for an image to display. A decode failure is
/// recovered, never an error: the reference stays recorded and the caller
/// gets told which path was unreadable.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchedImage {
    Picture(ImagePixels),
    NoImagesAvailable,
    Broken { path: String },
}

pub struct ImagePool {
    candidates: Vec<ImageRef>,
    library: Arc<DefaultLibrary>,
    last_broken_path: Option<String>,
}

impl ImagePool {
    pub fn new(candidates: Vec<ImageRef>, library: Arc<DefaultLibrary>) -> Self {
        ImagePool {
            candidates,
            library,
            last_broken_path: None,
        }
    }

    pub fn remaining(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_exhausted(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn last_broken_path(&self) -> Option<&str> {
        self.last_broken_path.as_deref()
    }

    /*
     * Draws a uniformly random candidate, records it as shown, and decodes
     * it. An empty pool yields `NoImagesAvailable` and records nothing.
     */
    pub fn draw_next(&mut self, session: &mut Session) -> FetchedImage {
        if self.candidates.is_empty() {
            log::debug!("ImagePool: Draw requested but the pool is exhausted");
            return FetchedImage::NoImagesAvailable;
        }
        let index = rand::rng().random_range(0..self.candidates.len());
        let image = self.candidates.remove(index);
        log::debug!(
            "ImagePool: Drew {:?}, {} candidate(s) remaining",
            image.src(),
            self.candidates.len()
        );
        session.record_shown(image.clone());
        self.decode(&image)
    }

    /*
     * Fetches the image at a position in the session's shown sequence. An
     * index just past the end means "one further than we have gone", which
     * draws a fresh image; anything beyond that is a caller bug.
     */
    pub fn image_at(&mut self, session: &mut Session, index: usize) -> Result<FetchedImage> {
        let len = session.shown_images.len();
        if index < len {
            let image = session.shown_images[index].clone();
            Ok(self.decode(&image))
        } else if index == len {
            Ok(self.draw_next(session))
        } else {
            Err(ImagePoolError::IndexOutOfRange { index, len })
        }
    }

    fn decode(&mut self, image: &ImageRef) -> FetchedImage {
        let path = match image {
            ImageRef::Library(rel) => self.library.resolve(rel),
            ImageRef::File(p) => p.clone(),
        };
        match image::open(&path) {
            Ok(decoded) => FetchedImage::Picture(decoded.into()),
            Err(e) => {
                let path = path.to_string_lossy().into_owned();
                log::warn!("ImagePool: Failed to decode {:?}: {}", path, e);
                self.last_broken_path = Some(path.clone());
                FetchedImage::Broken { path }
            }
        }
    }
}

/*
 * Defines the contract for building an image pool from a session's source
 * configuration. Allows mocking of directory scanning for tests of the
 * application logic.
 */
pub trait ImagePoolProvider: Send + Sync {
    fn compute(&self, session: &Session) -> Result<ImagePool>;
}

pub struct CoreImagePoolProvider {
    library: Arc<DefaultLibrary>,
}

impl CoreImagePoolProvider {
    pub fn new(library: Arc<DefaultLibrary>) -> Self {
        CoreImagePoolProvider { library }
    }
}

impl ImagePoolProvider for CoreImagePoolProvider {
    fn compute(&self, session: &Session) -> Result<ImagePool> {
        let shown: HashSet<&ImageRef> = session.shown_images.iter().collect();
        let mut candidates: Vec<ImageRef> = Vec::new();
        if session.use_default_library {
            for entry in self.library.entries() {
                let candidate = ImageRef::Library(entry.clone());
                if !shown.contains(&candidate) {
                    candidates.push(candidate);
                }
            }
        }
        for dir in &session.source_directories {
            for path in scan_directory(dir, session.include_subdirectories)? {
                let candidate = ImageRef::File(path);
                if !shown.contains(&candidate) {
                    candidates.push(candidate);
                }
            }
        }
        log::info!(
            "ImagePool: Computed pool with {} candidate(s) ({} already shown)",
            candidates.len(),
            session.shown_images.len()
        );
        Ok(ImagePool::new(candidates, Arc::clone(&self.library)))
    }
}

fn scan_directory(dir: &Path, recursive: bool) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(ImagePoolError::InvalidSourceDirectory(dir.to_path_buf()));
    }
    let max_depth = if recursive { usize::MAX } else { 1 };
    let mut out = Vec::new();
    for entry in WalkDir::new(dir).max_depth(max_depth).sort_by_file_name() {
        match entry {
            Ok(e) if e.file_type().is_file() && has_image_extension(e.path()) => {
                out.push(e.into_path());
            }
            Ok(_) => {}
            Err(e) => {
                // An unreadable subtree costs candidates, not the session.
                log::warn!("ImagePool: Skipping unreadable entry under {:?}: {}", dir, e);
            }
        }
    }
    Ok(out)
}

fn has_image_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| {
            let lower = e.to_ascii_lowercase();
            IMAGE_EXTENSIONS.contains(&lower.as_str())
        })
        .unwrap_or(false)
}

/// Neutral pixels shown when the pool has nothing left to offer.
pub fn no_images_placeholder() -> ImagePixels {
    solid_pixels(320, 240, [210, 210, 210, 255])
}

/// Pixels shown in place of a file that failed to decode: a light field
/// with a red diagonal cross.
pub fn broken_image_placeholder() -> ImagePixels {
    let width: u32 = 320;
    let height: u32 = 240;
    let mut img = image::RgbaImage::from_pixel(width, height, image::Rgba([245, 245, 245, 255]));
    let red = image::Rgba([200, 30, 30, 255]);
    for x in 0..width {
        let y = x * height / width;
        for dy in 0..3u32 {
            let yy = (y + dy).min(height - 1);
            img.put_pixel(x, yy, red);
            img.put_pixel(x, height - 1 - yy, red);
        }
    }
    image::DynamicImage::ImageRgba8(img).into()
}

fn solid_pixels(width: u32, height: u32, rgba: [u8; 4]) -> ImagePixels {
    let img = image::RgbaImage::from_pixel(width, height, image::Rgba(rgba));
    image::DynamicImage::ImageRgba8(img).into()
}
