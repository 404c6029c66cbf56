use crate::core::models::Session;
use crate::core::session_xml;

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/*
 * Loading and saving of session files, and the plain-text export. The XML
 * wire format itself lives in `session_xml`; this module owns the error
 * taxonomy, the file-level I/O, and the validation that source directories
 * actually exist before a new session file is written.
 */

#[derive(Debug)]
pub enum SessionStoreError {
    Io(io::Error),
    /// The file is not well-formed XML at all.
    Parse(quick_xml::Error),
    /// The file is well-formed XML but violates the session schema.
    Schema { file: PathBuf, detail: String },
    /// A configured image source directory does not exist or is not a
    /// directory.
    InvalidSourceDirectory(PathBuf),
}

impl fmt::Display for SessionStoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionStoreError::Io(e) => write!(f, "I/O error: {}", e),
            SessionStoreError::Parse(e) => write!(f, "XML parse error: {}", e),
            SessionStoreError::Schema { file, detail } => {
                write!(f, "Invalid session file {:?}: {}", file, detail)
            }
            SessionStoreError::InvalidSourceDirectory(p) => {
                write!(f, "Not a usable image source directory: {:?}", p)
            }
        }
    }
}

impl std::error::Error for SessionStoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SessionStoreError::Io(e) => Some(e),
            SessionStoreError::Parse(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for SessionStoreError {
    fn from(err: io::Error) -> Self {
        SessionStoreError::Io(err)
    }
}

impl From<quick_xml::Error> for SessionStoreError {
    fn from(err: quick_xml::Error) -> Self {
        SessionStoreError::Parse(err)
    }
}

pub type Result<T> = std::result::Result<T, SessionStoreError>;

/*
 * Defines the contract for session file persistence. Allows mocking of
 * storage interactions for tests of the application logic.
 */
pub trait SessionStoreOperations: Send + Sync {
    /// Parses and validates a session file from disk.
    fn load(&self, file: &Path) -> Result<Session>;

    /*
     * Creates a brand-new session and writes its initial file. Source
     * directories are validated before anything touches the disk, so a
     * configuration error never leaves a partial file behind.
     */
    fn create_new(
        &self,
        file: &Path,
        source_directories: Vec<PathBuf>,
        include_subdirectories: bool,
        use_default_library: bool,
    ) -> Result<Session>;

    /// Serializes `session` to its backing file.
    fn save(&self, session: &Session) -> Result<()>;

    /// Writes the session's text (title plus paragraphs) as plain text.
    fn export_text(&self, session: &Session, target: &Path) -> Result<()>;
}

pub struct CoreSessionStore;

impl CoreSessionStore {
    pub fn new() -> Self {
        CoreSessionStore
    }
}

impl Default for CoreSessionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(windows)]
const LINE_ENDING: &str = "\r\n";
#[cfg(not(windows))]
const LINE_ENDING: &str = "\n";

impl SessionStoreOperations for CoreSessionStore {
    fn load(&self, file: &Path) -> Result<Session> {
        log::debug!("SessionStore: Loading session from {:?}", file);
        let content = fs::read_to_string(file)?;
        let session = session_xml::parse_session(&content, file)?;
        log::debug!(
            "SessionStore: Loaded session with {} shown image(s), {} paragraph(s)",
            session.shown_images.len(),
            session.paragraphs.len()
        );
        Ok(session)
    }

    fn create_new(
        &self,
        file: &Path,
        source_directories: Vec<PathBuf>,
        include_subdirectories: bool,
        use_default_library: bool,
    ) -> Result<Session> {
        for dir in &source_directories {
            if !dir.is_dir() {
                log::warn!(
                    "SessionStore: Rejecting new session, source directory invalid: {:?}",
                    dir
                );
                return Err(SessionStoreError::InvalidSourceDirectory(dir.clone()));
            }
        }
        let session = Session::new(
            file.to_path_buf(),
            source_directories,
            include_subdirectories,
            use_default_library,
        );
        self.save(&session)?;
        log::info!("SessionStore: Created new session at {:?}", file);
        Ok(session)
    }

    fn save(&self, session: &Session) -> Result<()> {
        let xml = session_xml::serialize_session(session)?;
        fs::write(&session.backing_file, xml)?;
        log::debug!("SessionStore: Saved session to {:?}", session.backing_file);
        Ok(())
    }

    fn export_text(&self, session: &Session, target: &Path) -> Result<()> {
        let mut out = String::new();
        if !session.title.is_empty() {
            out.push_str(&session.title);
            out.push_str(LINE_ENDING);
            out.push_str(LINE_ENDING);
        }
        for p in &session.paragraphs {
            out.push_str(p);
            out.push_str(LINE_ENDING);
        }
        fs::write(target, out)?;
        log::info!("SessionStore: Exported text to {:?}", target);
        Ok(())
    }
}
