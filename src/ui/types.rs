use crate::core::models::ImagePixels;
use crate::ui::i18n::Locale;

use std::path::PathBuf;

/*
 * The vocabulary spoken between the presentation shell and the application
 * logic. The shell reports `AppEvent`s; the logic answers with a list of
 * `PlatformCommand`s describing what the shell should do. Keeping both
 * sides data-only makes the logic testable without any window system.
 */

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    NewSession,
    OpenSession,
    Save,
    SaveAs,
    ExportText,
    Exit,
    LanguageEnUs,
    LanguagePtBr,
}

/// What a save-style file dialog is being shown for, echoed back in the
/// completion event so the logic can route the chosen path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveDialogPurpose {
    SaveSession,
    ExportText,
}

/// Which question a confirmation dialog asked, echoed back on completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmationContext {
    SaveBeforeNew,
    SaveBeforeOpen,
    SaveBeforeExit,
    OverwriteSessionFile,
    OverwriteExportFile,
    ExitApplication,
}

/// Everything the new-session dialog collects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSessionParams {
    pub path: PathBuf,
    pub source_directories: Vec<PathBuf>,
    pub include_subdirectories: bool,
    pub use_default_library: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    MainWindowUiReady,
    WindowCloseRequested,
    MenuActionClicked { action: MenuAction },
    /// The editor content changed; carries the full current title and text.
    EditorChanged { title: String, text: String },
    NewSessionDialogCompleted { result: Option<NewSessionParams> },
    OpenFileDialogCompleted { result: Option<PathBuf> },
    SaveFileDialogCompleted {
        purpose: SaveDialogPurpose,
        result: Option<PathBuf>,
    },
    ConfirmationDialogCompleted {
        context: ConfirmationContext,
        confirmed: bool,
    },
    NextImageRequested,
    PreviousImageRequested,
}

/// Condition attached to a displayed image, so the shell can annotate it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageStatus {
    Ok,
    NoImagesAvailable,
    Broken { path: String },
}

/*
 * A presentable error. Variants carry structured data instead of finished
 * strings so the shell can render them in the active language.
 */
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorReport {
    SessionLoadFailed { file: PathBuf, detail: String },
    SessionSaveFailed { file: PathBuf, detail: String },
    ExportFailed { file: PathBuf, detail: String },
    InvalidSourceDirectory { dir: PathBuf },
    PoolComputeFailed { detail: String },
}

#[derive(Debug, Clone, PartialEq)]
pub enum PlatformCommand {
    /// Updates the window title's file portion; `None` shows no file.
    SetWindowFileLabel { file_name: Option<String> },
    SetEditorContent { title: String, text: String },
    SetEditorEnabled(bool),
    /// Enables or disables the menu entries that need an open session.
    SetSessionMenuEnabled(bool),
    ShowImage {
        pixels: ImagePixels,
        status: ImageStatus,
    },
    SetImageNavState {
        prev_enabled: bool,
        next_enabled: bool,
    },
    ShowNewSessionDialog,
    ShowOpenFileDialog,
    ShowSaveFileDialog {
        purpose: SaveDialogPurpose,
        default_file_name: String,
    },
    ShowConfirmationDialog {
        context: ConfirmationContext,
        path: Option<PathBuf>,
    },
    ShowErrorDialog { report: ErrorReport },
    SetLanguage(Locale),
    QuitApplication,
}
