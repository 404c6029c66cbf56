pub mod handler;

#[cfg(test)]
mod handler_tests;

pub use handler::SessionLogic;
