use crate::core::{
    image_pool, AppPreferences, ConfigManagerOperations, FetchedImage, ImagePool, ImagePoolError,
    ImagePoolProvider, Session, SessionStoreError, SessionStoreOperations,
};
use crate::ui::i18n::Locale;
use crate::ui::types::{
    AppEvent, ConfirmationContext, ErrorReport, ImageStatus, MenuAction, NewSessionParams,
    PlatformCommand, SaveDialogPurpose,
};

use std::ffi::OsString;
use std::path::PathBuf;
use std::sync::Arc;

/*
 * The application logic: consumes `AppEvent`s from the presentation shell
 * and produces `PlatformCommand`s telling it what to do next. All session
 * workflows live here, including the dialog chains (save-before-new,
 * overwrite confirmations, the two-step exit). The shell stays a thin
 * translator, so every workflow is testable with mocked services.
 */

const SESSION_EXTENSION: &str = "xml";
const EXPORT_EXTENSION: &str = "txt";

// A session together with its image pool and the position currently on
// display. `cursor` indexes the shown sequence; it may sit one past the
// end when the pool ran dry at the frontier.
struct OpenSessionState {
    session: Session,
    pool: ImagePool,
    cursor: usize,
}

// Remembers which workflow a dialog completion belongs to.
#[derive(Debug, Clone, PartialEq)]
enum PendingAction {
    CreateSession(NewSessionParams),
    SaveSessionAs(PathBuf),
    ExportText(PathBuf),
    Quit,
}

pub struct SessionLogic {
    app_name: String,
    store: Arc<dyn SessionStoreOperations>,
    pool_provider: Arc<dyn ImagePoolProvider>,
    config: Arc<dyn ConfigManagerOperations>,
    open: Option<OpenSessionState>,
    pending_action: Option<PendingAction>,
    commands: Vec<PlatformCommand>,
}

impl SessionLogic {
    pub fn new(
        app_name: String,
        store: Arc<dyn SessionStoreOperations>,
        pool_provider: Arc<dyn ImagePoolProvider>,
        config: Arc<dyn ConfigManagerOperations>,
    ) -> Self {
        SessionLogic {
            app_name,
            store,
            pool_provider,
            config,
            open: None,
            pending_action: None,
            commands: Vec::new(),
        }
    }

    pub fn handle_event(&mut self, event: AppEvent) -> Vec<PlatformCommand> {
        log::trace!("SessionLogic: Handling event {:?}", event);
        match event {
            AppEvent::MainWindowUiReady => self.on_ui_ready(),
            AppEvent::WindowCloseRequested => self.on_exit_requested(),
            AppEvent::MenuActionClicked { action } => self.on_menu_action(action),
            AppEvent::EditorChanged { title, text } => self.on_editor_changed(title, text),
            AppEvent::NewSessionDialogCompleted { result } => self.on_new_session_dialog(result),
            AppEvent::OpenFileDialogCompleted { result } => self.on_open_file_dialog(result),
            AppEvent::SaveFileDialogCompleted { purpose, result } => {
                self.on_save_file_dialog(purpose, result)
            }
            AppEvent::ConfirmationDialogCompleted { context, confirmed } => {
                self.on_confirmation(context, confirmed)
            }
            AppEvent::NextImageRequested => self.on_next_image(),
            AppEvent::PreviousImageRequested => self.on_previous_image(),
        }
        std::mem::take(&mut self.commands)
    }

    fn enqueue(&mut self, command: PlatformCommand) {
        self.commands.push(command);
    }

    /*
     * ----- Window lifecycle -----
     */

    fn on_ui_ready(&mut self) {
        self.enqueue(PlatformCommand::SetWindowFileLabel { file_name: None });
        self.enqueue(PlatformCommand::SetEditorEnabled(false));
        self.enqueue(PlatformCommand::SetSessionMenuEnabled(false));
        self.enqueue(PlatformCommand::ShowImage {
            pixels: image_pool::no_images_placeholder(),
            status: ImageStatus::NoImagesAvailable,
        });
        self.enqueue(PlatformCommand::SetImageNavState {
            prev_enabled: false,
            next_enabled: false,
        });
    }

    fn on_exit_requested(&mut self) {
        self.enqueue(PlatformCommand::ShowConfirmationDialog {
            context: ConfirmationContext::ExitApplication,
            path: None,
        });
    }

    /*
     * ----- Menu -----
     */

    fn on_menu_action(&mut self, action: MenuAction) {
        match action {
            MenuAction::NewSession => {
                if self.open.is_some() {
                    self.enqueue(PlatformCommand::ShowConfirmationDialog {
                        context: ConfirmationContext::SaveBeforeNew,
                        path: None,
                    });
                } else {
                    self.enqueue(PlatformCommand::ShowNewSessionDialog);
                }
            }
            MenuAction::OpenSession => {
                if self.open.is_some() {
                    self.enqueue(PlatformCommand::ShowConfirmationDialog {
                        context: ConfirmationContext::SaveBeforeOpen,
                        path: None,
                    });
                } else {
                    self.enqueue(PlatformCommand::ShowOpenFileDialog);
                }
            }
            MenuAction::Save => {
                self.save_open_session();
            }
            MenuAction::SaveAs => {
                if let Some(state) = &self.open {
                    self.enqueue(PlatformCommand::ShowSaveFileDialog {
                        purpose: SaveDialogPurpose::SaveSession,
                        default_file_name: state.session.file_name(),
                    });
                }
            }
            MenuAction::ExportText => {
                if let Some(state) = &self.open {
                    let stem = state
                        .session
                        .backing_file
                        .file_stem()
                        .map(|s| s.to_string_lossy().into_owned())
                        .unwrap_or_else(|| "text".to_string());
                    self.enqueue(PlatformCommand::ShowSaveFileDialog {
                        purpose: SaveDialogPurpose::ExportText,
                        default_file_name: format!("{}.{}", stem, EXPORT_EXTENSION),
                    });
                }
            }
            MenuAction::Exit => self.on_exit_requested(),
            MenuAction::LanguageEnUs => self.switch_language(Locale::EnUs),
            MenuAction::LanguagePtBr => self.switch_language(Locale::PtBr),
        }
    }

    fn switch_language(&mut self, locale: Locale) {
        let preferences = AppPreferences {
            language: Some(locale.tag().to_string()),
        };
        if let Err(e) = self.config.save_preferences(&self.app_name, &preferences) {
            log::warn!("SessionLogic: Failed to persist language preference: {}", e);
        }
        self.enqueue(PlatformCommand::SetLanguage(locale));
    }

    /*
     * ----- Editor -----
     */

    fn on_editor_changed(&mut self, title: String, text: String) {
        if let Some(state) = &mut self.open {
            state.session.title = title;
            state.session.set_text(&text);
        }
    }

    /*
     * ----- Dialog completions -----
     */

    fn on_new_session_dialog(&mut self, result: Option<NewSessionParams>) {
        let Some(mut params) = result else {
            log::debug!("SessionLogic: New session dialog cancelled");
            return;
        };
        params.path = force_extension(params.path, SESSION_EXTENSION);
        if params.path.exists() {
            let path = params.path.clone();
            self.pending_action = Some(PendingAction::CreateSession(params));
            self.enqueue(PlatformCommand::ShowConfirmationDialog {
                context: ConfirmationContext::OverwriteSessionFile,
                path: Some(path),
            });
        } else {
            self.create_session(params);
        }
    }

    fn on_open_file_dialog(&mut self, result: Option<PathBuf>) {
        let Some(path) = result else {
            log::debug!("SessionLogic: Open dialog cancelled");
            return;
        };
        let session = match self.store.load(&path) {
            Ok(s) => s,
            Err(e) => {
                log::error!("SessionLogic: Failed to load session {:?}: {}", path, e);
                self.enqueue(PlatformCommand::ShowErrorDialog {
                    report: ErrorReport::SessionLoadFailed {
                        file: path,
                        detail: e.to_string(),
                    },
                });
                return;
            }
        };
        self.install_session(session, true);
    }

    fn on_save_file_dialog(&mut self, purpose: SaveDialogPurpose, result: Option<PathBuf>) {
        let Some(path) = result else {
            log::debug!("SessionLogic: Save dialog ({:?}) cancelled", purpose);
            return;
        };
        match purpose {
            SaveDialogPurpose::SaveSession => {
                let path = force_extension(path, SESSION_EXTENSION);
                let is_current = self
                    .open
                    .as_ref()
                    .is_some_and(|s| s.session.backing_file == path);
                if path.exists() && !is_current {
                    self.pending_action = Some(PendingAction::SaveSessionAs(path.clone()));
                    self.enqueue(PlatformCommand::ShowConfirmationDialog {
                        context: ConfirmationContext::OverwriteSessionFile,
                        path: Some(path),
                    });
                } else {
                    self.save_session_as(path);
                }
            }
            SaveDialogPurpose::ExportText => {
                let path = force_extension(path, EXPORT_EXTENSION);
                if path.exists() {
                    self.pending_action = Some(PendingAction::ExportText(path.clone()));
                    self.enqueue(PlatformCommand::ShowConfirmationDialog {
                        context: ConfirmationContext::OverwriteExportFile,
                        path: Some(path),
                    });
                } else {
                    self.export_text(path);
                }
            }
        }
    }

    fn on_confirmation(&mut self, context: ConfirmationContext, confirmed: bool) {
        match context {
            ConfirmationContext::SaveBeforeNew => {
                if confirmed && !self.save_open_session() {
                    return;
                }
                self.enqueue(PlatformCommand::ShowNewSessionDialog);
            }
            ConfirmationContext::SaveBeforeOpen => {
                if confirmed && !self.save_open_session() {
                    return;
                }
                self.enqueue(PlatformCommand::ShowOpenFileDialog);
            }
            ConfirmationContext::OverwriteSessionFile => {
                match self.pending_action.take() {
                    Some(PendingAction::CreateSession(params)) => {
                        if confirmed {
                            self.create_session(params);
                        }
                    }
                    Some(PendingAction::SaveSessionAs(path)) => {
                        if confirmed {
                            self.save_session_as(path);
                        }
                    }
                    other => {
                        log::warn!(
                            "SessionLogic: Overwrite confirmation with unexpected pending action {:?}",
                            other
                        );
                        self.pending_action = other;
                    }
                }
            }
            ConfirmationContext::OverwriteExportFile => match self.pending_action.take() {
                Some(PendingAction::ExportText(path)) => {
                    if confirmed {
                        self.export_text(path);
                    }
                }
                other => {
                    log::warn!(
                        "SessionLogic: Export confirmation with unexpected pending action {:?}",
                        other
                    );
                    self.pending_action = other;
                }
            },
            ConfirmationContext::ExitApplication => {
                if !confirmed {
                    return;
                }
                if self.open.is_some() {
                    self.pending_action = Some(PendingAction::Quit);
                    self.enqueue(PlatformCommand::ShowConfirmationDialog {
                        context: ConfirmationContext::SaveBeforeExit,
                        path: None,
                    });
                } else {
                    self.enqueue(PlatformCommand::QuitApplication);
                }
            }
            ConfirmationContext::SaveBeforeExit => {
                self.pending_action = None;
                if confirmed && !self.save_open_session() {
                    // The error dialog is already queued; stay running so
                    // the user can rescue the text.
                    return;
                }
                self.enqueue(PlatformCommand::QuitApplication);
            }
        }
    }

    /*
     * ----- Image navigation -----
     */

    fn on_next_image(&mut self) {
        let Some(state) = &mut self.open else {
            return;
        };
        let shown = state.session.shown_images.len();
        if state.cursor >= shown {
            log::trace!("SessionLogic: Next ignored at the frontier of an exhausted pool");
            return;
        }
        let target = state.cursor + 1;
        match state.pool.image_at(&mut state.session, target) {
            Ok(fetched) => {
                state.cursor = target;
                self.show_current_image(fetched);
            }
            Err(ImagePoolError::IndexOutOfRange { index, len }) => {
                log::error!("SessionLogic: Next image index {} out of range ({})", index, len);
            }
            Err(e) => {
                log::error!("SessionLogic: Next image failed: {}", e);
            }
        }
    }

    fn on_previous_image(&mut self) {
        let Some(state) = &mut self.open else {
            return;
        };
        if state.cursor == 0 {
            return;
        }
        let target = state.cursor - 1;
        match state.pool.image_at(&mut state.session, target) {
            Ok(fetched) => {
                state.cursor = target;
                self.show_current_image(fetched);
            }
            Err(e) => {
                log::error!("SessionLogic: Previous image failed: {}", e);
            }
        }
    }

    /*
     * ----- Session workflows -----
     */

    fn create_session(&mut self, params: NewSessionParams) {
        let session = match self.store.create_new(
            &params.path,
            params.source_directories.clone(),
            params.include_subdirectories,
            params.use_default_library,
        ) {
            Ok(s) => s,
            Err(SessionStoreError::InvalidSourceDirectory(dir)) => {
                self.enqueue(PlatformCommand::ShowErrorDialog {
                    report: ErrorReport::InvalidSourceDirectory { dir },
                });
                return;
            }
            Err(e) => {
                log::error!("SessionLogic: Failed to create session: {}", e);
                self.enqueue(PlatformCommand::ShowErrorDialog {
                    report: ErrorReport::SessionSaveFailed {
                        file: params.path,
                        detail: e.to_string(),
                    },
                });
                return;
            }
        };
        self.install_session(session, false);
    }

    /*
     * Makes a loaded or freshly created session the open one: builds its
     * image pool, immediately draws the next image, and rewrites the file
     * so it reflects the new state. `loaded` only affects logging.
     */
    fn install_session(&mut self, mut session: Session, loaded: bool) {
        let mut pool = match self.pool_provider.compute(&session) {
            Ok(p) => p,
            Err(ImagePoolError::InvalidSourceDirectory(dir)) => {
                self.enqueue(PlatformCommand::ShowErrorDialog {
                    report: ErrorReport::InvalidSourceDirectory { dir },
                });
                return;
            }
            Err(e) => {
                log::error!("SessionLogic: Failed to compute image pool: {}", e);
                self.enqueue(PlatformCommand::ShowErrorDialog {
                    report: ErrorReport::PoolComputeFailed {
                        detail: e.to_string(),
                    },
                });
                return;
            }
        };

        let fetched = pool.draw_next(&mut session);
        let shown = session.shown_images.len();
        let cursor = if shown == 0 { 0 } else { shown - 1 };

        if let Err(e) = self.store.save(&session) {
            log::error!("SessionLogic: Failed to write session after install: {}", e);
            self.enqueue(PlatformCommand::ShowErrorDialog {
                report: ErrorReport::SessionSaveFailed {
                    file: session.backing_file.clone(),
                    detail: e.to_string(),
                },
            });
        }

        log::info!(
            "SessionLogic: {} session {:?} ({} image(s) shown, {} in pool)",
            if loaded { "Opened" } else { "Created" },
            session.backing_file,
            shown,
            pool.remaining()
        );

        let file_name = session.file_name();
        let title = session.title.clone();
        let text = session.text();
        self.open = Some(OpenSessionState { session, pool, cursor });

        self.enqueue(PlatformCommand::SetWindowFileLabel {
            file_name: Some(file_name),
        });
        self.enqueue(PlatformCommand::SetEditorContent { title, text });
        self.enqueue(PlatformCommand::SetEditorEnabled(true));
        self.enqueue(PlatformCommand::SetSessionMenuEnabled(true));
        self.show_current_image(fetched);
    }

    // Returns false when saving failed; an error dialog is queued then.
    fn save_open_session(&mut self) -> bool {
        let Some(state) = &self.open else {
            return true;
        };
        match self.store.save(&state.session) {
            Ok(()) => true,
            Err(e) => {
                let file = state.session.backing_file.clone();
                log::error!("SessionLogic: Failed to save session {:?}: {}", file, e);
                self.enqueue(PlatformCommand::ShowErrorDialog {
                    report: ErrorReport::SessionSaveFailed {
                        file,
                        detail: e.to_string(),
                    },
                });
                false
            }
        }
    }

    fn save_session_as(&mut self, path: PathBuf) {
        let Some(state) = &mut self.open else {
            return;
        };
        let previous = std::mem::replace(&mut state.session.backing_file, path);
        let file_name = state.session.file_name();
        if self.save_open_session() {
            self.enqueue(PlatformCommand::SetWindowFileLabel {
                file_name: Some(file_name),
            });
        } else if let Some(state) = &mut self.open {
            // The session stays bound to its old file when the write fails.
            state.session.backing_file = previous;
        }
    }

    fn export_text(&mut self, path: PathBuf) {
        let Some(state) = &self.open else {
            return;
        };
        if let Err(e) = self.store.export_text(&state.session, &path) {
            log::error!("SessionLogic: Failed to export text to {:?}: {}", path, e);
            self.enqueue(PlatformCommand::ShowErrorDialog {
                report: ErrorReport::ExportFailed {
                    file: path,
                    detail: e.to_string(),
                },
            });
        }
    }

    fn show_current_image(&mut self, fetched: FetchedImage) {
        let Some(state) = &self.open else {
            return;
        };
        let command = match fetched {
            FetchedImage::Picture(pixels) => PlatformCommand::ShowImage {
                pixels,
                status: ImageStatus::Ok,
            },
            FetchedImage::Broken { path } => PlatformCommand::ShowImage {
                pixels: image_pool::broken_image_placeholder(),
                status: ImageStatus::Broken { path },
            },
            FetchedImage::NoImagesAvailable => PlatformCommand::ShowImage {
                pixels: image_pool::no_images_placeholder(),
                status: ImageStatus::NoImagesAvailable,
            },
        };
        let prev_enabled = state.cursor > 0;
        let next_enabled = state.cursor < state.session.shown_images.len();
        self.enqueue(command);
        self.enqueue(PlatformCommand::SetImageNavState {
            prev_enabled,
            next_enabled,
        });
    }
}

/*
 * Appends the wanted extension unless the file name already carries it
 * (case-insensitively). A mismatched extension is kept and the wanted one
 * appended after it, so the user's chosen name never loses characters.
 */
fn force_extension(path: PathBuf, extension: &str) -> PathBuf {
    let matches = path
        .extension()
        .is_some_and(|e| e.eq_ignore_ascii_case(extension));
    if matches {
        return path;
    }
    let mut os: OsString = path.into_os_string();
    os.push(".");
    os.push(extension);
    PathBuf::from(os)
}
