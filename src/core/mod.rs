/*
 * The application core: session data model, XML persistence, image pool
 * management, the bundled default library, and user preferences. Nothing
 * in here touches the GUI toolkit; the presentation shell talks to these
 * services through the traits they export.
 */
pub mod config;
pub mod default_library;
pub mod image_pool;
pub mod models;
pub mod path_utils;
pub mod session_store;
mod session_xml;

pub use config::{AppPreferences, ConfigError, ConfigManagerOperations, CoreConfigManager};
pub use default_library::DefaultLibrary;
pub use image_pool::{
    CoreImagePoolProvider, FetchedImage, ImagePool, ImagePoolError, ImagePoolProvider,
};
pub use models::{ImageRef, Session};
pub use session_store::{CoreSessionStore, SessionStoreError, SessionStoreOperations};
