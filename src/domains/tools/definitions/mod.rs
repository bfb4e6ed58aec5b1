//! Tool definitions module.
//!
//! Each tool is defined in its own file. Tools are registered in
//! `registry.rs`.

pub mod calculator;
pub mod common;
pub mod database;
pub mod fetch_page;
pub mod read_file;
pub mod web_search;

pub use calculator::CalculatorTool;
pub use database::DatabaseQueryTool;
pub use fetch_page::FetchPageTool;
pub use read_file::ReadFileTool;
pub use web_search::WebSearchTool;
