// src/lib.rs
pub mod config;
pub mod error;
pub mod ess_client;
pub mod ess_data;
pub mod handlers;
pub mod projects;
pub mod timesheet;
pub mod xlsx;

pub use config::Config;
pub use error::AppError;
pub use ess_client::{EssClient, EssError};
pub use timesheet::{build_sheet, ExportError, ExportParams, RenderedSheet, SheetOptions};

#[cfg(test)]
mod handlers_tests;
