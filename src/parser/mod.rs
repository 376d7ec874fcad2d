//! Parser Module
//!
//! 入力ドキュメントの解析。スプレッドシートはcalamine、
//! Word文書はzip + quick-xmlで読み込みます。

mod document;
mod workbook;

pub use document::{DocxDocument, DocxTable};
pub(crate) use document::DocxParser;
pub(crate) use workbook::WorkbookParser;
