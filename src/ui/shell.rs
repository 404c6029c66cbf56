use crate::app_logic::SessionLogic;
use crate::ui::i18n::{format_message, Locale};
use crate::ui::types::{
    AppEvent, ConfirmationContext, ErrorReport, ImageStatus, MenuAction, NewSessionParams,
    PlatformCommand, SaveDialogPurpose,
};

use std::collections::VecDeque;
use std::path::PathBuf;

/*
 * The egui presentation shell. It keeps only display state; every decision
 * is made by `SessionLogic`, which the shell drives with `AppEvent`s and
 * obeys through `PlatformCommand`s. File and folder pickers run as native
 * dialogs via `rfd`; confirmations, the new-session form, and error
 * reports render as egui windows.
 */

// Form state of the new-session window while it is open.
struct NewSessionForm {
    path: String,
    directories: Vec<PathBuf>,
    selected: Option<usize>,
    include_subdirectories: bool,
    use_default_library: bool,
}

impl NewSessionForm {
    fn new() -> Self {
        NewSessionForm {
            path: String::new(),
            directories: Vec::new(),
            selected: None,
            include_subdirectories: false,
            use_default_library: true,
        }
    }
}

pub struct CreativeWriterApp {
    logic: SessionLogic,
    locale: Locale,

    // Mirrored display state, written to only by apply_command.
    file_label: Option<String>,
    editor_enabled: bool,
    session_menu_enabled: bool,
    title_text: String,
    editor_text: String,
    image_texture: Option<egui::TextureHandle>,
    image_status: ImageStatus,
    prev_enabled: bool,
    next_enabled: bool,

    // Open dialogs.
    new_session_form: Option<NewSessionForm>,
    confirmation: Option<(ConfirmationContext, Option<PathBuf>)>,
    error_reports: Vec<ErrorReport>,
    show_about: bool,
    show_manual: bool,

    event_queue: VecDeque<AppEvent>,
    processing_events: bool,
    ui_ready_sent: bool,
    allow_close: bool,
}

impl CreativeWriterApp {
    pub fn new(logic: SessionLogic, locale: Locale) -> Self {
        CreativeWriterApp {
            logic,
            locale,
            file_label: None,
            editor_enabled: false,
            session_menu_enabled: false,
            title_text: String::new(),
            editor_text: String::new(),
            image_texture: None,
            image_status: ImageStatus::NoImagesAvailable,
            prev_enabled: false,
            next_enabled: false,
            new_session_form: None,
            confirmation: None,
            error_reports: Vec::new(),
            show_about: false,
            show_manual: false,
            event_queue: VecDeque::new(),
            processing_events: false,
            ui_ready_sent: false,
            allow_close: false,
        }
    }

    /*
     * Feeds an event to the logic and applies the resulting commands.
     * Commands may complete synchronously (native dialogs) and produce
     * follow-up events; the queue keeps the processing iterative.
     */
    fn dispatch(&mut self, ctx: &egui::Context, event: AppEvent) {
        self.event_queue.push_back(event);
        if self.processing_events {
            return;
        }
        self.processing_events = true;
        while let Some(next) = self.event_queue.pop_front() {
            let commands = self.logic.handle_event(next);
            for command in commands {
                self.apply_command(ctx, command);
            }
        }
        self.processing_events = false;
    }

    fn apply_command(&mut self, ctx: &egui::Context, command: PlatformCommand) {
        match command {
            PlatformCommand::SetWindowFileLabel { file_name } => {
                self.file_label = file_name;
                self.push_window_title(ctx);
            }
            PlatformCommand::SetEditorContent { title, text } => {
                self.title_text = title;
                self.editor_text = text;
            }
            PlatformCommand::SetEditorEnabled(enabled) => {
                self.editor_enabled = enabled;
            }
            PlatformCommand::SetSessionMenuEnabled(enabled) => {
                self.session_menu_enabled = enabled;
            }
            PlatformCommand::ShowImage { pixels, status } => {
                let color_image = egui::ColorImage::from_rgba_unmultiplied(
                    [pixels.width as usize, pixels.height as usize],
                    &pixels.rgba,
                );
                self.image_texture = Some(ctx.load_texture(
                    "session_image",
                    color_image,
                    egui::TextureOptions::LINEAR,
                ));
                self.image_status = status;
            }
            PlatformCommand::SetImageNavState {
                prev_enabled,
                next_enabled,
            } => {
                self.prev_enabled = prev_enabled;
                self.next_enabled = next_enabled;
            }
            PlatformCommand::ShowNewSessionDialog => {
                self.new_session_form = Some(NewSessionForm::new());
            }
            PlatformCommand::ShowOpenFileDialog => {
                let result = rfd::FileDialog::new()
                    .add_filter("XML", &["xml"])
                    .pick_file();
                self.dispatch(ctx, AppEvent::OpenFileDialogCompleted { result });
            }
            PlatformCommand::ShowSaveFileDialog {
                purpose,
                default_file_name,
            } => {
                let dialog = rfd::FileDialog::new().set_file_name(&default_file_name);
                let dialog = match purpose {
                    SaveDialogPurpose::SaveSession => dialog.add_filter("XML", &["xml"]),
                    SaveDialogPurpose::ExportText => dialog.add_filter("Text", &["txt"]),
                };
                let result = dialog.save_file();
                self.dispatch(ctx, AppEvent::SaveFileDialogCompleted { purpose, result });
            }
            PlatformCommand::ShowConfirmationDialog { context, path } => {
                self.confirmation = Some((context, path));
            }
            PlatformCommand::ShowErrorDialog { report } => {
                self.error_reports.push(report);
            }
            PlatformCommand::SetLanguage(locale) => {
                self.locale = locale;
                self.push_window_title(ctx);
            }
            PlatformCommand::QuitApplication => {
                self.allow_close = true;
                ctx.send_viewport_cmd(egui::ViewportCommand::Close);
            }
        }
    }

    fn push_window_title(&self, ctx: &egui::Context) {
        let base = self.locale.strings().window_title;
        let title = match &self.file_label {
            Some(file) => format!("{base} - {file}"),
            None => base.to_string(),
        };
        ctx.send_viewport_cmd(egui::ViewportCommand::Title(title));
    }

    fn menu_bar(&mut self, ctx: &egui::Context, ui: &mut egui::Ui) {
        let s = self.locale.strings();
        let mut clicked: Option<MenuAction> = None;

        egui::menu::bar(ui, |ui| {
            ui.menu_button(s.menu_file, |ui| {
                if ui.button(s.menu_new).clicked() {
                    clicked = Some(MenuAction::NewSession);
                    ui.close_menu();
                }
                if ui.button(s.menu_open).clicked() {
                    clicked = Some(MenuAction::OpenSession);
                    ui.close_menu();
                }
                ui.separator();
                if ui
                    .add_enabled(self.session_menu_enabled, egui::Button::new(s.menu_save))
                    .clicked()
                {
                    clicked = Some(MenuAction::Save);
                    ui.close_menu();
                }
                if ui
                    .add_enabled(self.session_menu_enabled, egui::Button::new(s.menu_save_as))
                    .clicked()
                {
                    clicked = Some(MenuAction::SaveAs);
                    ui.close_menu();
                }
                if ui
                    .add_enabled(
                        self.session_menu_enabled,
                        egui::Button::new(s.menu_export_text),
                    )
                    .clicked()
                {
                    clicked = Some(MenuAction::ExportText);
                    ui.close_menu();
                }
                ui.separator();
                if ui.button(s.menu_exit).clicked() {
                    clicked = Some(MenuAction::Exit);
                    ui.close_menu();
                }
            });
            ui.menu_button(s.menu_language, |ui| {
                if ui.button(s.menu_language_en).clicked() {
                    clicked = Some(MenuAction::LanguageEnUs);
                    ui.close_menu();
                }
                if ui.button(s.menu_language_pt).clicked() {
                    clicked = Some(MenuAction::LanguagePtBr);
                    ui.close_menu();
                }
            });
            ui.menu_button(s.menu_help, |ui| {
                if ui.button(s.menu_manual).clicked() {
                    self.show_manual = true;
                    ui.close_menu();
                }
                if ui.button(s.menu_about).clicked() {
                    self.show_about = true;
                    ui.close_menu();
                }
            });
        });

        if let Some(action) = clicked {
            self.dispatch(ctx, AppEvent::MenuActionClicked { action });
        }
    }

    fn image_panel(&mut self, ctx: &egui::Context, ui: &mut egui::Ui) {
        let s = self.locale.strings();
        let mut nav: Option<AppEvent> = None;

        ui.horizontal(|ui| {
            if ui
                .add_enabled(self.prev_enabled, egui::Button::new(s.button_previous))
                .clicked()
            {
                nav = Some(AppEvent::PreviousImageRequested);
            }
            if ui
                .add_enabled(self.next_enabled, egui::Button::new(s.button_next))
                .clicked()
            {
                nav = Some(AppEvent::NextImageRequested);
            }
        });
        ui.separator();

        match &self.image_status {
            ImageStatus::Broken { path } => {
                ui.colored_label(
                    egui::Color32::RED,
                    format_message(s.image_broken, path),
                );
            }
            ImageStatus::NoImagesAvailable => {
                ui.label(s.image_none_available);
            }
            ImageStatus::Ok => {}
        }

        if let Some(texture) = &self.image_texture {
            let available = ui.available_size();
            let tex_size = texture.size_vec2();
            // Shrink to fit, never enlarge.
            let scale = (available.x / tex_size.x)
                .min(available.y / tex_size.y)
                .min(1.0);
            let draw_size = tex_size * scale.max(0.0);
            ui.centered_and_justified(|ui| {
                ui.add(egui::Image::new(egui::load::SizedTexture::new(
                    texture.id(),
                    draw_size,
                )));
            });
        }

        if let Some(event) = nav {
            self.dispatch(ctx, event);
        }
    }

    fn editor_panel(&mut self, ctx: &egui::Context, ui: &mut egui::Ui) {
        let s = self.locale.strings();
        let mut changed = false;

        ui.add_enabled_ui(self.editor_enabled, |ui| {
            ui.horizontal(|ui| {
                ui.label(s.label_story_title);
                let response = ui.add(
                    egui::TextEdit::singleline(&mut self.title_text)
                        .desired_width(f32::INFINITY),
                );
                changed |= response.changed();
            });
            ui.separator();
            egui::ScrollArea::vertical().show(ui, |ui| {
                let response = ui.add_sized(
                    ui.available_size(),
                    egui::TextEdit::multiline(&mut self.editor_text)
                        .font(egui::TextStyle::Monospace),
                );
                changed |= response.changed();
            });
        });

        if changed {
            let event = AppEvent::EditorChanged {
                title: self.title_text.clone(),
                text: self.editor_text.clone(),
            };
            self.dispatch(ctx, event);
        }
    }

    fn confirmation_window(&mut self, ctx: &egui::Context) {
        let Some((context, path)) = self.confirmation.clone() else {
            return;
        };
        let s = self.locale.strings();
        let message = match context {
            ConfirmationContext::SaveBeforeNew
            | ConfirmationContext::SaveBeforeOpen
            | ConfirmationContext::SaveBeforeExit => s.confirm_save_changes.to_string(),
            ConfirmationContext::ExitApplication => s.confirm_exit.to_string(),
            ConfirmationContext::OverwriteSessionFile
            | ConfirmationContext::OverwriteExportFile => {
                let shown = path
                    .as_ref()
                    .map(|p| p.to_string_lossy().into_owned())
                    .unwrap_or_default();
                format_message(s.confirm_overwrite, &shown)
            }
        };

        let mut decision: Option<bool> = None;
        egui::Window::new(s.confirm_title)
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, egui::Vec2::ZERO)
            .show(ctx, |ui| {
                ui.label(message);
                ui.add_space(8.0);
                ui.horizontal(|ui| {
                    if ui.button(s.button_yes).clicked() {
                        decision = Some(true);
                    }
                    if ui.button(s.button_no).clicked() {
                        decision = Some(false);
                    }
                });
            });

        if let Some(confirmed) = decision {
            self.confirmation = None;
            self.dispatch(ctx, AppEvent::ConfirmationDialogCompleted { context, confirmed });
        }
    }

    fn new_session_window(&mut self, ctx: &egui::Context) {
        let Some(mut form) = self.new_session_form.take() else {
            return;
        };
        let s = self.locale.strings();
        // None: stays open. Some(None): cancelled. Some(Some(..)): submit.
        let mut outcome: Option<Option<NewSessionParams>> = None;

        egui::Window::new(s.new_session_title)
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, egui::Vec2::ZERO)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.label(s.label_session_file);
                    ui.add(
                        egui::TextEdit::singleline(&mut form.path).desired_width(320.0),
                    );
                    if ui.button(s.button_browse).clicked() {
                        if let Some(path) = rfd::FileDialog::new()
                            .add_filter("XML", &["xml"])
                            .save_file()
                        {
                            form.path = path.to_string_lossy().into_owned();
                        }
                    }
                });

                ui.add_space(6.0);
                ui.label(s.label_source_directories);
                for (i, dir) in form.directories.iter().enumerate() {
                    let selected = form.selected == Some(i);
                    if ui
                        .selectable_label(selected, dir.display().to_string())
                        .clicked()
                    {
                        form.selected = Some(i);
                    }
                }
                ui.horizontal(|ui| {
                    if ui.button(s.button_add).clicked() {
                        if let Some(dir) = rfd::FileDialog::new().pick_folder() {
                            form.directories.push(dir);
                        }
                    }
                    if ui
                        .add_enabled(form.selected.is_some(), egui::Button::new(s.button_remove))
                        .clicked()
                    {
                        if let Some(i) = form.selected.take() {
                            form.directories.remove(i);
                        }
                    }
                });

                ui.add_space(6.0);
                ui.checkbox(
                    &mut form.include_subdirectories,
                    s.label_include_subdirectories,
                );
                ui.checkbox(&mut form.use_default_library, s.label_use_default_library);

                ui.add_space(8.0);
                ui.horizontal(|ui| {
                    let can_create = !form.path.trim().is_empty()
                        && (form.use_default_library || !form.directories.is_empty());
                    if ui
                        .add_enabled(can_create, egui::Button::new(s.button_create))
                        .clicked()
                    {
                        outcome = Some(Some(NewSessionParams {
                            path: PathBuf::from(form.path.trim()),
                            source_directories: form.directories.clone(),
                            include_subdirectories: form.include_subdirectories,
                            use_default_library: form.use_default_library,
                        }));
                    }
                    if ui.button(s.button_cancel).clicked() {
                        outcome = Some(None);
                    }
                });
            });

        match outcome {
            Some(result) => {
                self.dispatch(ctx, AppEvent::NewSessionDialogCompleted { result });
            }
            None => {
                self.new_session_form = Some(form);
            }
        }
    }

    fn error_window(&mut self, ctx: &egui::Context) {
        let Some(report) = self.error_reports.first().cloned() else {
            return;
        };
        let s = self.locale.strings();
        let message = match &report {
            ErrorReport::SessionLoadFailed { detail, .. } => {
                format_message(s.error_load_session, detail)
            }
            ErrorReport::SessionSaveFailed { detail, .. } => {
                format_message(s.error_save_session, detail)
            }
            ErrorReport::ExportFailed { detail, .. } => {
                format_message(s.error_export_text, detail)
            }
            ErrorReport::InvalidSourceDirectory { dir } => {
                format_message(s.error_invalid_directory, &dir.to_string_lossy())
            }
            ErrorReport::PoolComputeFailed { detail } => {
                format_message(s.error_pool_compute, detail)
            }
        };

        let mut acknowledged = false;
        egui::Window::new(s.error_title)
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, egui::Vec2::ZERO)
            .show(ctx, |ui| {
                ui.label(message);
                ui.add_space(8.0);
                if ui.button(s.button_ok).clicked() {
                    acknowledged = true;
                }
            });
        if acknowledged {
            self.error_reports.remove(0);
        }
    }

    fn help_windows(&mut self, ctx: &egui::Context) {
        let s = self.locale.strings();
        if self.show_about {
            let mut open = true;
            egui::Window::new(s.about_title)
                .collapsible(false)
                .resizable(false)
                .open(&mut open)
                .anchor(egui::Align2::CENTER_CENTER, egui::Vec2::ZERO)
                .show(ctx, |ui| {
                    ui.label(s.about_text);
                });
            self.show_about = open;
        }
        if self.show_manual {
            let mut open = true;
            egui::Window::new(s.manual_title)
                .collapsible(false)
                .open(&mut open)
                .anchor(egui::Align2::CENTER_CENTER, egui::Vec2::ZERO)
                .show(ctx, |ui| {
                    egui::ScrollArea::vertical().show(ui, |ui| {
                        ui.label(s.manual_text);
                    });
                });
            self.show_manual = open;
        }
    }
}

impl eframe::App for CreativeWriterApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if !self.ui_ready_sent {
            self.ui_ready_sent = true;
            self.dispatch(ctx, AppEvent::MainWindowUiReady);
        }

        // Closing goes through the logic's confirmation chain; the window
        // only actually closes once a QuitApplication command arrived.
        if ctx.input(|i| i.viewport().close_requested()) && !self.allow_close {
            ctx.send_viewport_cmd(egui::ViewportCommand::CancelClose);
            self.dispatch(ctx, AppEvent::WindowCloseRequested);
        }

        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            self.menu_bar(ctx, ui);
        });
        egui::SidePanel::left("image_panel")
            .resizable(true)
            .default_width(520.0)
            .show(ctx, |ui| {
                self.image_panel(ctx, ui);
            });
        egui::CentralPanel::default().show(ctx, |ui| {
            self.editor_panel(ctx, ui);
        });

        self.confirmation_window(ctx);
        self.new_session_window(ctx);
        self.error_window(ctx);
        self.help_windows(ctx);
    }
}
