use super::handler::*;

use crate::core::{
    AppPreferences, ConfigError, ConfigManagerOperations, DefaultLibrary, ImagePool,
    ImagePoolError, ImagePoolProvider, ImageRef, Session, SessionStoreError,
    SessionStoreOperations,
};
use crate::ui::i18n::Locale;
use crate::ui::types::{
    AppEvent, ConfirmationContext, ErrorReport, ImageStatus, MenuAction, NewSessionParams,
    PlatformCommand, SaveDialogPurpose,
};

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tempfile::{tempdir, TempDir};

/*
 * Unit tests for `SessionLogic`. Core dependencies are replaced with mock
 * implementations so the tests can drive every workflow through events and
 * inspect the generated commands. Only image decoding runs for real, over
 * files placed in temporary directories.
 */

const VALID_PNG: &[u8] = include_bytes!("../../resources/defaultLibrary/lighthouse.png");

// --- MockSessionStore ---
struct MockSessionStore {
    load_results: Mutex<HashMap<PathBuf, Result<Session, String>>>,
    invalid_directory: Mutex<Option<PathBuf>>,
    save_calls: Mutex<Vec<Session>>,
    save_fails: Mutex<bool>,
    export_calls: Mutex<Vec<(Session, PathBuf)>>,
}

impl MockSessionStore {
    fn new() -> Self {
        MockSessionStore {
            load_results: Mutex::new(HashMap::new()),
            invalid_directory: Mutex::new(None),
            save_calls: Mutex::new(Vec::new()),
            save_fails: Mutex::new(false),
            export_calls: Mutex::new(Vec::new()),
        }
    }

    fn set_load_result(&self, path: &Path, result: Result<Session, String>) {
        self.load_results
            .lock()
            .unwrap()
            .insert(path.to_path_buf(), result);
    }

    fn set_invalid_directory(&self, dir: &Path) {
        *self.invalid_directory.lock().unwrap() = Some(dir.to_path_buf());
    }

    fn set_save_fails(&self, fails: bool) {
        *self.save_fails.lock().unwrap() = fails;
    }

    fn saved_sessions(&self) -> Vec<Session> {
        self.save_calls.lock().unwrap().clone()
    }

    fn exported(&self) -> Vec<(Session, PathBuf)> {
        self.export_calls.lock().unwrap().clone()
    }
}

impl SessionStoreOperations for MockSessionStore {
    fn load(&self, file: &Path) -> Result<Session, SessionStoreError> {
        match self.load_results.lock().unwrap().get(file) {
            Some(Ok(session)) => Ok(session.clone()),
            Some(Err(detail)) => Err(SessionStoreError::Schema {
                file: file.to_path_buf(),
                detail: detail.clone(),
            }),
            None => Err(SessionStoreError::Io(io::Error::new(
                io::ErrorKind::NotFound,
                "no mocked session",
            ))),
        }
    }

    fn create_new(
        &self,
        file: &Path,
        source_directories: Vec<PathBuf>,
        include_subdirectories: bool,
        use_default_library: bool,
    ) -> Result<Session, SessionStoreError> {
        if let Some(bad) = self.invalid_directory.lock().unwrap().clone() {
            return Err(SessionStoreError::InvalidSourceDirectory(bad));
        }
        let session = Session::new(
            file.to_path_buf(),
            source_directories,
            include_subdirectories,
            use_default_library,
        );
        self.save_calls.lock().unwrap().push(session.clone());
        Ok(session)
    }

    fn save(&self, session: &Session) -> Result<(), SessionStoreError> {
        if *self.save_fails.lock().unwrap() {
            return Err(SessionStoreError::Io(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "mocked save failure",
            )));
        }
        self.save_calls.lock().unwrap().push(session.clone());
        Ok(())
    }

    fn export_text(&self, session: &Session, target: &Path) -> Result<(), SessionStoreError> {
        self.export_calls
            .lock()
            .unwrap()
            .push((session.clone(), target.to_path_buf()));
        Ok(())
    }
}

// --- MockImagePoolProvider ---
struct MockImagePoolProvider {
    candidates: Mutex<Vec<ImageRef>>,
    invalid_directory: Mutex<Option<PathBuf>>,
    library: Arc<DefaultLibrary>,
}

impl MockImagePoolProvider {
    fn new() -> Self {
        MockImagePoolProvider {
            candidates: Mutex::new(Vec::new()),
            invalid_directory: Mutex::new(None),
            library: Arc::new(DefaultLibrary::with_root(
                PathBuf::from("/nonexistent"),
                Vec::new(),
            )),
        }
    }

    fn set_candidates(&self, candidates: Vec<ImageRef>) {
        *self.candidates.lock().unwrap() = candidates;
    }

    fn set_invalid_directory(&self, dir: &Path) {
        *self.invalid_directory.lock().unwrap() = Some(dir.to_path_buf());
    }
}

impl ImagePoolProvider for MockImagePoolProvider {
    fn compute(&self, session: &Session) -> Result<ImagePool, ImagePoolError> {
        if let Some(bad) = self.invalid_directory.lock().unwrap().clone() {
            return Err(ImagePoolError::InvalidSourceDirectory(bad));
        }
        let mut candidates = self.candidates.lock().unwrap().clone();
        candidates.retain(|c| !session.shown_images.contains(c));
        Ok(ImagePool::new(candidates, Arc::clone(&self.library)))
    }
}

// --- MockConfigManager ---
struct MockConfigManager {
    saved_preferences: Mutex<Option<(String, AppPreferences)>>,
}

impl MockConfigManager {
    fn new() -> Self {
        MockConfigManager {
            saved_preferences: Mutex::new(None),
        }
    }

    fn saved(&self) -> Option<(String, AppPreferences)> {
        self.saved_preferences.lock().unwrap().clone()
    }
}

impl ConfigManagerOperations for MockConfigManager {
    fn load_preferences(&self, _app_name: &str) -> Result<AppPreferences, ConfigError> {
        Ok(AppPreferences::default())
    }

    fn save_preferences(
        &self,
        app_name: &str,
        preferences: &AppPreferences,
    ) -> Result<(), ConfigError> {
        *self.saved_preferences.lock().unwrap() =
            Some((app_name.to_string(), preferences.clone()));
        Ok(())
    }
}

// --- Test fixture ---
struct Fixture {
    logic: SessionLogic,
    store: Arc<MockSessionStore>,
    pool_provider: Arc<MockImagePoolProvider>,
    config: Arc<MockConfigManager>,
    dir: TempDir,
}

fn setup() -> Fixture {
    let store = Arc::new(MockSessionStore::new());
    let pool_provider = Arc::new(MockImagePoolProvider::new());
    let config = Arc::new(MockConfigManager::new());
    let logic = SessionLogic::new(
        "TestApp".to_string(),
        Arc::clone(&store) as Arc<dyn SessionStoreOperations>,
        Arc::clone(&pool_provider) as Arc<dyn ImagePoolProvider>,
        Arc::clone(&config) as Arc<dyn ConfigManagerOperations>,
    );
    Fixture {
        logic,
        store,
        pool_provider,
        config,
        dir: tempdir().unwrap(),
    }
}

impl Fixture {
    /// Creates `count` decodable image files and registers them as pool
    /// candidates.
    fn add_image_candidates(&self, count: usize) -> Vec<PathBuf> {
        let mut paths = Vec::new();
        for i in 0..count {
            let path = self.dir.path().join(format!("img_{i}.png"));
            std::fs::write(&path, VALID_PNG).unwrap();
            paths.push(path);
        }
        self.pool_provider
            .set_candidates(paths.iter().cloned().map(ImageRef::File).collect());
        paths
    }

    /// Drives the full happy-path new-session flow and drains the commands.
    fn open_fresh_session(&mut self) -> PathBuf {
        let path = self.dir.path().join("fresh.xml");
        let cmds = self.logic.handle_event(AppEvent::NewSessionDialogCompleted {
            result: Some(NewSessionParams {
                path: path.clone(),
                source_directories: vec![self.dir.path().to_path_buf()],
                include_subdirectories: false,
                use_default_library: false,
            }),
        });
        assert!(
            find_show_image(&cmds).is_some(),
            "Session install should display an image"
        );
        path
    }
}

fn find_show_image(cmds: &[PlatformCommand]) -> Option<&ImageStatus> {
    cmds.iter().find_map(|c| match c {
        PlatformCommand::ShowImage { status, .. } => Some(status),
        _ => None,
    })
}

fn find_nav_state(cmds: &[PlatformCommand]) -> Option<(bool, bool)> {
    cmds.iter().rev().find_map(|c| match c {
        PlatformCommand::SetImageNavState {
            prev_enabled,
            next_enabled,
        } => Some((*prev_enabled, *next_enabled)),
        _ => None,
    })
}

fn contains_confirmation(cmds: &[PlatformCommand], wanted: ConfirmationContext) -> bool {
    cmds.iter().any(|c| {
        matches!(c, PlatformCommand::ShowConfirmationDialog { context, .. } if *context == wanted)
    })
}

// --- Tests ---

#[test]
fn test_ui_ready_disables_everything() {
    let mut f = setup();
    let cmds = f.logic.handle_event(AppEvent::MainWindowUiReady);
    assert!(cmds.contains(&PlatformCommand::SetEditorEnabled(false)));
    assert!(cmds.contains(&PlatformCommand::SetSessionMenuEnabled(false)));
    assert_eq!(find_show_image(&cmds), Some(&ImageStatus::NoImagesAvailable));
    assert_eq!(find_nav_state(&cmds), Some((false, false)));
}

#[test]
fn test_menu_new_without_session_shows_dialog_directly() {
    let mut f = setup();
    let cmds = f.logic.handle_event(AppEvent::MenuActionClicked {
        action: MenuAction::NewSession,
    });
    assert_eq!(cmds, vec![PlatformCommand::ShowNewSessionDialog]);
}

#[test]
fn test_new_session_creates_draws_and_saves() {
    let mut f = setup();
    f.add_image_candidates(2);
    let path = f.dir.path().join("story");

    let cmds = f.logic.handle_event(AppEvent::NewSessionDialogCompleted {
        result: Some(NewSessionParams {
            path,
            source_directories: vec![f.dir.path().to_path_buf()],
            include_subdirectories: false,
            use_default_library: false,
        }),
    });

    assert!(cmds.contains(&PlatformCommand::SetEditorEnabled(true)));
    assert!(cmds.contains(&PlatformCommand::SetSessionMenuEnabled(true)));
    assert!(cmds.contains(&PlatformCommand::SetWindowFileLabel {
        file_name: Some("story.xml".to_string()),
    }));
    assert_eq!(find_show_image(&cmds), Some(&ImageStatus::Ok));
    // First image shown, one candidate left: back disabled, forward open.
    assert_eq!(find_nav_state(&cmds), Some((false, true)));

    // The file was written twice: at creation and again after the draw.
    let saved = f.store.saved_sessions();
    assert_eq!(saved.len(), 2);
    assert!(saved[0].shown_images.is_empty());
    assert_eq!(saved[1].shown_images.len(), 1);
    // The chosen name had no extension; it was forced to .xml.
    assert_eq!(saved[1].backing_file.extension().unwrap(), "xml");
}

#[test]
fn test_new_session_cancelled_does_nothing() {
    let mut f = setup();
    let cmds = f
        .logic
        .handle_event(AppEvent::NewSessionDialogCompleted { result: None });
    assert!(cmds.is_empty());
    assert!(f.store.saved_sessions().is_empty());
}

#[test]
fn test_new_session_over_existing_file_asks_before_overwriting() {
    let mut f = setup();
    f.add_image_candidates(1);
    let path = f.dir.path().join("existing.xml");
    std::fs::write(&path, b"old").unwrap();

    let cmds = f.logic.handle_event(AppEvent::NewSessionDialogCompleted {
        result: Some(NewSessionParams {
            path: path.clone(),
            source_directories: Vec::new(),
            include_subdirectories: false,
            use_default_library: true,
        }),
    });
    assert!(contains_confirmation(&cmds, ConfirmationContext::OverwriteSessionFile));
    assert!(f.store.saved_sessions().is_empty());

    // Declining leaves the file alone.
    let cmds = f.logic.handle_event(AppEvent::ConfirmationDialogCompleted {
        context: ConfirmationContext::OverwriteSessionFile,
        confirmed: false,
    });
    assert!(cmds.is_empty());
    assert!(f.store.saved_sessions().is_empty());
}

#[test]
fn test_new_session_overwrite_confirmed_creates() {
    let mut f = setup();
    f.add_image_candidates(1);
    let path = f.dir.path().join("existing.xml");
    std::fs::write(&path, b"old").unwrap();

    f.logic.handle_event(AppEvent::NewSessionDialogCompleted {
        result: Some(NewSessionParams {
            path: path.clone(),
            source_directories: Vec::new(),
            include_subdirectories: false,
            use_default_library: true,
        }),
    });
    let cmds = f.logic.handle_event(AppEvent::ConfirmationDialogCompleted {
        context: ConfirmationContext::OverwriteSessionFile,
        confirmed: true,
    });
    assert!(find_show_image(&cmds).is_some());
    assert!(!f.store.saved_sessions().is_empty());
}

#[test]
fn test_new_session_with_invalid_directory_reports_error() {
    let mut f = setup();
    let bad = f.dir.path().join("missing");
    f.store.set_invalid_directory(&bad);

    let cmds = f.logic.handle_event(AppEvent::NewSessionDialogCompleted {
        result: Some(NewSessionParams {
            path: f.dir.path().join("s.xml"),
            source_directories: vec![bad.clone()],
            include_subdirectories: false,
            use_default_library: false,
        }),
    });
    assert!(cmds.iter().any(|c| matches!(
        c,
        PlatformCommand::ShowErrorDialog {
            report: ErrorReport::InvalidSourceDirectory { dir },
        } if *dir == bad
    )));
    assert!(!cmds.contains(&PlatformCommand::SetEditorEnabled(true)));
}

#[test]
fn test_open_session_draws_fresh_image_and_rewrites_file() {
    let mut f = setup();
    let candidates = f.add_image_candidates(2);
    let file = f.dir.path().join("old.xml");
    let mut session = Session::new(file.clone(), vec![f.dir.path().to_path_buf()], false, false);
    session.title = "Kept".to_string();
    session.set_text("existing text");
    session.record_shown(ImageRef::File(candidates[0].clone()));
    f.store.set_load_result(&file, Ok(session));

    let cmds = f.logic.handle_event(AppEvent::OpenFileDialogCompleted {
        result: Some(file.clone()),
    });

    assert!(cmds.contains(&PlatformCommand::SetEditorContent {
        title: "Kept".to_string(),
        text: "existing text\n".to_string(),
    }));
    assert_eq!(find_show_image(&cmds), Some(&ImageStatus::Ok));
    // One image was already in the history, a fresh one was drawn on top.
    let saved = f.store.saved_sessions();
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0].shown_images.len(), 2);
    // Standing on the newest image with history behind us; one more step
    // forward is still allowed and would hit the placeholder.
    assert_eq!(find_nav_state(&cmds), Some((true, true)));
}

#[test]
fn test_open_unparsable_file_reports_load_error() {
    let mut f = setup();
    let file = f.dir.path().join("broken.xml");
    f.store
        .set_load_result(&file, Err("missing <text> element".to_string()));

    let cmds = f.logic.handle_event(AppEvent::OpenFileDialogCompleted {
        result: Some(file.clone()),
    });
    assert!(cmds.iter().any(|c| matches!(
        c,
        PlatformCommand::ShowErrorDialog {
            report: ErrorReport::SessionLoadFailed { file: f, .. },
        } if *f == file
    )));
}

#[test]
fn test_failed_open_keeps_prior_session() {
    let mut f = setup();
    f.add_image_candidates(1);
    let original = f.open_fresh_session();
    let bad = f.dir.path().join("bad.xml");
    f.store
        .set_load_result(&bad, Err("not a session file".to_string()));

    f.logic.handle_event(AppEvent::MenuActionClicked {
        action: MenuAction::OpenSession,
    });
    f.logic.handle_event(AppEvent::ConfirmationDialogCompleted {
        context: ConfirmationContext::SaveBeforeOpen,
        confirmed: false,
    });
    f.logic.handle_event(AppEvent::OpenFileDialogCompleted {
        result: Some(bad),
    });

    // The original session is still the open one.
    f.logic.handle_event(AppEvent::MenuActionClicked {
        action: MenuAction::Save,
    });
    assert_eq!(
        f.store.saved_sessions().last().unwrap().backing_file,
        original
    );
}

#[test]
fn test_open_with_vanished_directory_reports_error() {
    let mut f = setup();
    let file = f.dir.path().join("old.xml");
    let gone = f.dir.path().join("gone");
    f.store.set_load_result(
        &file,
        Ok(Session::new(file.clone(), vec![gone.clone()], false, false)),
    );
    f.pool_provider.set_invalid_directory(&gone);

    let cmds = f.logic.handle_event(AppEvent::OpenFileDialogCompleted {
        result: Some(file),
    });
    assert!(cmds.iter().any(|c| matches!(
        c,
        PlatformCommand::ShowErrorDialog {
            report: ErrorReport::InvalidSourceDirectory { dir },
        } if *dir == gone
    )));
    assert!(!cmds.contains(&PlatformCommand::SetEditorEnabled(true)));
}

#[test]
fn test_menu_new_with_open_session_asks_to_save_first() {
    let mut f = setup();
    f.add_image_candidates(1);
    f.open_fresh_session();
    let save_count = f.store.saved_sessions().len();

    let cmds = f.logic.handle_event(AppEvent::MenuActionClicked {
        action: MenuAction::NewSession,
    });
    assert!(contains_confirmation(&cmds, ConfirmationContext::SaveBeforeNew));

    // Agreeing saves, then the dialog appears.
    let cmds = f.logic.handle_event(AppEvent::ConfirmationDialogCompleted {
        context: ConfirmationContext::SaveBeforeNew,
        confirmed: true,
    });
    assert!(cmds.contains(&PlatformCommand::ShowNewSessionDialog));
    assert_eq!(f.store.saved_sessions().len(), save_count + 1);
}

#[test]
fn test_save_before_open_declined_skips_saving() {
    let mut f = setup();
    f.add_image_candidates(1);
    f.open_fresh_session();
    let save_count = f.store.saved_sessions().len();

    f.logic.handle_event(AppEvent::MenuActionClicked {
        action: MenuAction::OpenSession,
    });
    let cmds = f.logic.handle_event(AppEvent::ConfirmationDialogCompleted {
        context: ConfirmationContext::SaveBeforeOpen,
        confirmed: false,
    });
    assert!(cmds.contains(&PlatformCommand::ShowOpenFileDialog));
    assert_eq!(f.store.saved_sessions().len(), save_count);
}

#[test]
fn test_editor_changes_are_saved() {
    let mut f = setup();
    f.add_image_candidates(1);
    f.open_fresh_session();

    f.logic.handle_event(AppEvent::EditorChanged {
        title: "My Story".to_string(),
        text: "line one\nline two\n".to_string(),
    });
    f.logic.handle_event(AppEvent::MenuActionClicked {
        action: MenuAction::Save,
    });

    let saved = f.store.saved_sessions();
    let last = saved.last().unwrap();
    assert_eq!(last.title, "My Story");
    assert_eq!(last.paragraphs, vec!["line one", "line two"]);
}

#[test]
fn test_save_as_switches_backing_file() {
    let mut f = setup();
    f.add_image_candidates(1);
    f.open_fresh_session();

    let cmds = f.logic.handle_event(AppEvent::MenuActionClicked {
        action: MenuAction::SaveAs,
    });
    assert!(cmds.iter().any(|c| matches!(
        c,
        PlatformCommand::ShowSaveFileDialog {
            purpose: SaveDialogPurpose::SaveSession,
            ..
        }
    )));

    let target = f.dir.path().join("renamed");
    let cmds = f.logic.handle_event(AppEvent::SaveFileDialogCompleted {
        purpose: SaveDialogPurpose::SaveSession,
        result: Some(target),
    });
    assert!(cmds.contains(&PlatformCommand::SetWindowFileLabel {
        file_name: Some("renamed.xml".to_string()),
    }));
    let saved = f.store.saved_sessions();
    assert_eq!(
        saved.last().unwrap().backing_file,
        f.dir.path().join("renamed.xml")
    );
}

#[test]
fn test_save_as_failure_keeps_original_backing_file() {
    let mut f = setup();
    f.add_image_candidates(1);
    let original = f.open_fresh_session();
    f.store.set_save_fails(true);

    let cmds = f.logic.handle_event(AppEvent::SaveFileDialogCompleted {
        purpose: SaveDialogPurpose::SaveSession,
        result: Some(f.dir.path().join("elsewhere.xml")),
    });
    assert!(cmds
        .iter()
        .any(|c| matches!(c, PlatformCommand::ShowErrorDialog { .. })));
    assert!(!cmds
        .iter()
        .any(|c| matches!(c, PlatformCommand::SetWindowFileLabel { .. })));

    // A later plain Save still writes to the original file.
    f.store.set_save_fails(false);
    f.logic.handle_event(AppEvent::MenuActionClicked {
        action: MenuAction::Save,
    });
    assert_eq!(
        f.store.saved_sessions().last().unwrap().backing_file,
        original
    );
}

#[test]
fn test_export_text_forces_txt_extension() {
    let mut f = setup();
    f.add_image_candidates(1);
    f.open_fresh_session();

    let cmds = f.logic.handle_event(AppEvent::MenuActionClicked {
        action: MenuAction::ExportText,
    });
    assert!(cmds.iter().any(|c| matches!(
        c,
        PlatformCommand::ShowSaveFileDialog {
            purpose: SaveDialogPurpose::ExportText,
            default_file_name,
        } if default_file_name == "fresh.txt"
    )));

    f.logic.handle_event(AppEvent::SaveFileDialogCompleted {
        purpose: SaveDialogPurpose::ExportText,
        result: Some(f.dir.path().join("out")),
    });
    let exported = f.store.exported();
    assert_eq!(exported.len(), 1);
    assert_eq!(exported[0].1, f.dir.path().join("out.txt"));
}

#[test]
fn test_export_over_existing_file_asks_first() {
    let mut f = setup();
    f.add_image_candidates(1);
    f.open_fresh_session();
    let target = f.dir.path().join("out.txt");
    std::fs::write(&target, b"old").unwrap();

    let cmds = f.logic.handle_event(AppEvent::SaveFileDialogCompleted {
        purpose: SaveDialogPurpose::ExportText,
        result: Some(target.clone()),
    });
    assert!(contains_confirmation(&cmds, ConfirmationContext::OverwriteExportFile));
    assert!(f.store.exported().is_empty());

    f.logic.handle_event(AppEvent::ConfirmationDialogCompleted {
        context: ConfirmationContext::OverwriteExportFile,
        confirmed: true,
    });
    assert_eq!(f.store.exported().len(), 1);
}

#[test]
fn test_exit_without_session_quits_after_one_confirmation() {
    let mut f = setup();
    let cmds = f.logic.handle_event(AppEvent::MenuActionClicked {
        action: MenuAction::Exit,
    });
    assert!(contains_confirmation(&cmds, ConfirmationContext::ExitApplication));

    let cmds = f.logic.handle_event(AppEvent::ConfirmationDialogCompleted {
        context: ConfirmationContext::ExitApplication,
        confirmed: true,
    });
    assert_eq!(cmds, vec![PlatformCommand::QuitApplication]);
}

#[test]
fn test_exit_declined_keeps_running() {
    let mut f = setup();
    f.logic.handle_event(AppEvent::WindowCloseRequested);
    let cmds = f.logic.handle_event(AppEvent::ConfirmationDialogCompleted {
        context: ConfirmationContext::ExitApplication,
        confirmed: false,
    });
    assert!(cmds.is_empty());
}

#[test]
fn test_exit_with_session_offers_save_then_quits() {
    let mut f = setup();
    f.add_image_candidates(1);
    f.open_fresh_session();
    let save_count = f.store.saved_sessions().len();

    f.logic.handle_event(AppEvent::WindowCloseRequested);
    let cmds = f.logic.handle_event(AppEvent::ConfirmationDialogCompleted {
        context: ConfirmationContext::ExitApplication,
        confirmed: true,
    });
    assert!(contains_confirmation(&cmds, ConfirmationContext::SaveBeforeExit));

    let cmds = f.logic.handle_event(AppEvent::ConfirmationDialogCompleted {
        context: ConfirmationContext::SaveBeforeExit,
        confirmed: true,
    });
    assert!(cmds.contains(&PlatformCommand::QuitApplication));
    assert_eq!(f.store.saved_sessions().len(), save_count + 1);
}

#[test]
fn test_exit_save_failure_blocks_quit() {
    let mut f = setup();
    f.add_image_candidates(1);
    f.open_fresh_session();
    f.store.set_save_fails(true);

    f.logic.handle_event(AppEvent::WindowCloseRequested);
    f.logic.handle_event(AppEvent::ConfirmationDialogCompleted {
        context: ConfirmationContext::ExitApplication,
        confirmed: true,
    });
    let cmds = f.logic.handle_event(AppEvent::ConfirmationDialogCompleted {
        context: ConfirmationContext::SaveBeforeExit,
        confirmed: true,
    });
    assert!(!cmds.contains(&PlatformCommand::QuitApplication));
    assert!(cmds
        .iter()
        .any(|c| matches!(c, PlatformCommand::ShowErrorDialog { .. })));
}

#[test]
fn test_image_navigation_walks_history_and_frontier() {
    let mut f = setup();
    f.add_image_candidates(2);
    f.open_fresh_session();

    // Draw the second and last candidate.
    let cmds = f.logic.handle_event(AppEvent::NextImageRequested);
    assert_eq!(find_show_image(&cmds), Some(&ImageStatus::Ok));
    assert_eq!(find_nav_state(&cmds), Some((true, true)));

    // Walk back to the first image.
    let cmds = f.logic.handle_event(AppEvent::PreviousImageRequested);
    assert_eq!(find_show_image(&cmds), Some(&ImageStatus::Ok));
    assert_eq!(find_nav_state(&cmds), Some((false, true)));

    // Forward again revisits instead of drawing.
    let cmds = f.logic.handle_event(AppEvent::NextImageRequested);
    assert_eq!(find_nav_state(&cmds), Some((true, true)));

    // The history never lost entries.
    f.logic.handle_event(AppEvent::MenuActionClicked {
        action: MenuAction::Save,
    });
    assert_eq!(f.store.saved_sessions().last().unwrap().shown_images.len(), 2);
}

#[test]
fn test_next_past_exhausted_pool_shows_placeholder_and_returns() {
    let mut f = setup();
    f.add_image_candidates(1);
    f.open_fresh_session();

    // The only candidate is on display; the pool is empty. Stepping
    // forward lands on the past-the-end placeholder.
    let cmds = f.logic.handle_event(AppEvent::NextImageRequested);
    assert_eq!(find_show_image(&cmds), Some(&ImageStatus::NoImagesAvailable));
    assert_eq!(find_nav_state(&cmds), Some((true, false)));

    // Previous recovers the real image.
    let cmds = f.logic.handle_event(AppEvent::PreviousImageRequested);
    assert_eq!(find_show_image(&cmds), Some(&ImageStatus::Ok));

    // The placeholder never entered the history.
    f.logic.handle_event(AppEvent::MenuActionClicked {
        action: MenuAction::Save,
    });
    assert_eq!(f.store.saved_sessions().last().unwrap().shown_images.len(), 1);
}

#[test]
fn test_broken_image_is_recorded_and_reported() {
    let mut f = setup();
    let bad = f.dir.path().join("corrupt.png");
    std::fs::write(&bad, b"garbage").unwrap();
    f.pool_provider
        .set_candidates(vec![ImageRef::File(bad.clone())]);

    let path = f.dir.path().join("s.xml");
    let cmds = f.logic.handle_event(AppEvent::NewSessionDialogCompleted {
        result: Some(NewSessionParams {
            path,
            source_directories: Vec::new(),
            include_subdirectories: false,
            use_default_library: true,
        }),
    });
    match find_show_image(&cmds) {
        Some(ImageStatus::Broken { path }) => assert!(path.ends_with("corrupt.png")),
        other => panic!("Expected Broken status, got {:?}", other),
    }
    // The unreadable file still counts as shown.
    assert_eq!(
        f.store.saved_sessions().last().unwrap().shown_images.len(),
        1
    );
}

#[test]
fn test_language_switch_persists_preference() {
    let mut f = setup();
    let cmds = f.logic.handle_event(AppEvent::MenuActionClicked {
        action: MenuAction::LanguagePtBr,
    });
    assert!(cmds.contains(&PlatformCommand::SetLanguage(Locale::PtBr)));
    let (app_name, prefs) = f.config.saved().unwrap();
    assert_eq!(app_name, "TestApp");
    assert_eq!(prefs.language.as_deref(), Some("pt-BR"));
}
