/*
 * The presentation layer: egui shell, the event/command vocabulary it
 * shares with the application logic, and the localized string tables.
 */
pub mod i18n;
pub mod shell;
pub mod types;

pub use shell::CreativeWriterApp;
