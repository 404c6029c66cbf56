/*
 * Interface languages. All user-visible strings live in per-locale tables
 * here; the shell looks text up through the active `Locale`. Messages with
 * a `{}` marker get the value substituted by the shell at display time.
 */

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Locale {
    #[default]
    EnUs,
    PtBr,
}

impl Locale {
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "en-US" => Some(Locale::EnUs),
            "pt-BR" => Some(Locale::PtBr),
            _ => None,
        }
    }

    pub fn tag(&self) -> &'static str {
        match self {
            Locale::EnUs => "en-US",
            Locale::PtBr => "pt-BR",
        }
    }

    pub fn strings(&self) -> &'static Strings {
        match self {
            Locale::EnUs => &EN_US,
            Locale::PtBr => &PT_BR,
        }
    }
}

pub struct Strings {
    pub window_title: &'static str,

    pub menu_file: &'static str,
    pub menu_new: &'static str,
    pub menu_open: &'static str,
    pub menu_save: &'static str,
    pub menu_save_as: &'static str,
    pub menu_export_text: &'static str,
    pub menu_exit: &'static str,
    pub menu_language: &'static str,
    pub menu_language_en: &'static str,
    pub menu_language_pt: &'static str,
    pub menu_help: &'static str,
    pub menu_manual: &'static str,
    pub menu_about: &'static str,

    pub button_ok: &'static str,
    pub button_cancel: &'static str,
    pub button_yes: &'static str,
    pub button_no: &'static str,
    pub button_create: &'static str,
    pub button_previous: &'static str,
    pub button_next: &'static str,
    pub button_add: &'static str,
    pub button_remove: &'static str,
    pub button_browse: &'static str,

    pub new_session_title: &'static str,
    pub label_session_file: &'static str,
    pub label_source_directories: &'static str,
    pub label_include_subdirectories: &'static str,
    pub label_use_default_library: &'static str,
    pub label_story_title: &'static str,

    pub confirm_title: &'static str,
    pub confirm_save_changes: &'static str,
    pub confirm_exit: &'static str,
    /// `{}` is the file path about to be replaced.
    pub confirm_overwrite: &'static str,

    pub image_none_available: &'static str,
    /// `{}` is the path of the file that failed to decode.
    pub image_broken: &'static str,

    pub error_title: &'static str,
    /// `{}` is the error detail.
    pub error_load_session: &'static str,
    pub error_save_session: &'static str,
    pub error_export_text: &'static str,
    /// `{}` is the offending directory.
    pub error_invalid_directory: &'static str,
    pub error_pool_compute: &'static str,

    pub about_title: &'static str,
    pub about_text: &'static str,
    pub manual_title: &'static str,
    pub manual_text: &'static str,
}

pub static EN_US: Strings = Strings {
    window_title: "Creative Writer",

    menu_file: "File",
    menu_new: "New...",
    menu_open: "Open...",
    menu_save: "Save",
    menu_save_as: "Save As...",
    menu_export_text: "Export Text...",
    menu_exit: "Exit",
    menu_language: "Language",
    menu_language_en: "English (US)",
    menu_language_pt: "Português (Brasil)",
    menu_help: "Help",
    menu_manual: "Manual",
    menu_about: "About",

    button_ok: "OK",
    button_cancel: "Cancel",
    button_yes: "Yes",
    button_no: "No",
    button_create: "Create",
    button_previous: "Previous",
    button_next: "Next",
    button_add: "Add",
    button_remove: "Remove",
    button_browse: "Browse...",

    new_session_title: "New Session",
    label_session_file: "Session file",
    label_source_directories: "Image directories",
    label_include_subdirectories: "Include subdirectories",
    label_use_default_library: "Use the built-in image library",
    label_story_title: "Title",

    confirm_title: "Please confirm",
    confirm_save_changes: "Save the current session first?",
    confirm_exit: "Exit the application?",
    confirm_overwrite: "The file {} already exists. Replace it?",

    image_none_available: "No more images available.",
    image_broken: "Could not display image: {}",

    error_title: "Error",
    error_load_session: "The session file could not be opened: {}",
    error_save_session: "The session could not be saved: {}",
    error_export_text: "The text could not be exported: {}",
    error_invalid_directory: "Not a usable image directory: {}",
    error_pool_compute: "The image collection could not be built: {}",

    about_title: "About Creative Writer",
    about_text: "Creative Writer\n\nA small exercise tool for creative writing: it shows \
you a random image and gives you a place to write about it. Sessions keep track of the \
images you have already seen.",
    manual_title: "Manual",
    manual_text: "Start a new session from File > New: pick a session file, choose one \
or more directories with images (or the built-in library), and start writing. Next shows \
a fresh random image; Previous walks back through the images you have already seen. \
Save stores the text together with the image history, so reopening the session never \
repeats an image.",
};

pub static PT_BR: Strings = Strings {
    window_title: "Creative Writer",

    menu_file: "Arquivo",
    menu_new: "Novo...",
    menu_open: "Abrir...",
    menu_save: "Salvar",
    menu_save_as: "Salvar como...",
    menu_export_text: "Exportar texto...",
    menu_exit: "Sair",
    menu_language: "Idioma",
    menu_language_en: "English (US)",
    menu_language_pt: "Português (Brasil)",
    menu_help: "Ajuda",
    menu_manual: "Manual",
    menu_about: "Sobre",

    button_ok: "OK",
    button_cancel: "Cancelar",
    button_yes: "Sim",
    button_no: "Não",
    button_create: "Criar",
    button_previous: "Anterior",
    button_next: "Próxima",
    button_add: "Adicionar",
    button_remove: "Remover",
    button_browse: "Procurar...",

    new_session_title: "Nova sessão",
    label_session_file: "Arquivo da sessão",
    label_source_directories: "Diretórios de imagens",
    label_include_subdirectories: "Incluir subdiretórios",
    label_use_default_library: "Usar a biblioteca de imagens embutida",
    label_story_title: "Título",

    confirm_title: "Confirme",
    confirm_save_changes: "Salvar a sessão atual primeiro?",
    confirm_exit: "Sair do aplicativo?",
    confirm_overwrite: "O arquivo {} já existe. Substituir?",

    image_none_available: "Não há mais imagens disponíveis.",
    image_broken: "Não foi possível exibir a imagem: {}",

    error_title: "Erro",
    error_load_session: "Não foi possível abrir o arquivo de sessão: {}",
    error_save_session: "Não foi possível salvar a sessão: {}",
    error_export_text: "Não foi possível exportar o texto: {}",
    error_invalid_directory: "Diretório de imagens inválido: {}",
    error_pool_compute: "Não foi possível montar a coleção de imagens: {}",

    about_title: "Sobre o Creative Writer",
    about_text: "Creative Writer\n\nUma pequena ferramenta de exercício para escrita \
criativa: mostra uma imagem aleatória e oferece um espaço para escrever sobre ela. As \
sessões registram as imagens que você já viu.",
    manual_title: "Manual",
    manual_text: "Inicie uma nova sessão em Arquivo > Novo: escolha um arquivo de sessão, \
um ou mais diretórios com imagens (ou a biblioteca embutida) e comece a escrever. \
Próxima mostra uma nova imagem aleatória; Anterior volta pelas imagens já vistas. \
Salvar grava o texto junto com o histórico de imagens, de modo que reabrir a sessão \
nunca repete uma imagem.",
};

/// Substitutes the single `{}` marker in a template.
pub fn format_message(template: &str, value: &str) -> String {
    template.replacen("{}", value, 1)
}
