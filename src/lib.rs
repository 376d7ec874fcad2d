//! blocky-import - Excel and Word ledger converter for the Blocky app
//!
//! This crate converts expense ledgers kept in spreadsheets (XLSX/XLS) or Word
//! documents (DOCX) into plain-text files that list `description | amount`
//! pairs, ready to be typed into the Blocky mobile app.
//!
//! Three pipelines are provided, one per command line tool:
//!
//! - [`Pipeline::Spreadsheet`] (`excel_to_blocky`): first two columns of the first sheet
//! - [`Pipeline::DocumentItems`] (`word_to_blocky`): document tables, falling back to
//!   `popis: suma` patterns in paragraph text
//! - [`Pipeline::DocumentTable`] (`word_to_blocky_formatter`): the first document table
//!   rendered as an ASCII table with a total and import hints
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use std::fs::File;
//! use blocky_import::{ConverterBuilder, Pipeline};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let converter = ConverterBuilder::new()
//!         .with_source_name("vydavky.xlsx")
//!         .build()?;
//!
//!     let input = File::open("vydavky.xlsx")?;
//!     let output = File::create("vydavky.txt")?;
//!
//!     let summary = converter.convert(Pipeline::Spreadsheet, input, output)?;
//!     println!("{} items, total {:.2}", summary.item_count, summary.total);
//!
//!     Ok(())
//! }
//! ```
//!
//! # Inspecting Before Writing
//!
//! ```rust,no_run
//! use std::io::Cursor;
//! use blocky_import::ConverterBuilder;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let converter = ConverterBuilder::new().build()?;
//! let docx_data: Vec<u8> = vec![]; // Your DOCX file bytes
//!
//! let snapshot = converter.read_table_snapshot(Cursor::new(docx_data))?;
//! println!("total: {:.2} €", snapshot.total());
//!
//! let mut text = Vec::new();
//! converter.write_table_report(&snapshot, &mut text)?;
//! # Ok(())
//! # }
//! ```

mod amount;
mod api;
mod builder;
pub mod cli;
mod error;
mod extract;
mod output;
mod parser;
mod security;
mod table;
mod types;

// 公開API
pub use amount::{extract_amount, find_amount, format_amount};
pub use api::{Pipeline, SheetSelector};
pub use builder::{Converter, ConverterBuilder};
pub use error::BlockyError;
pub use parser::{DocxDocument, DocxTable};
pub use security::SecurityConfig;
pub use table::{RowAmount, SkipReason, TableSnapshot};
pub use types::{
    ConversionSummary, DocumentExtraction, InvalidRow, ItemSource, LineItem, SpreadsheetExtraction,
};
