//! word_to_blocky_formatter
//!
//! Word（.docx）の最初のテーブルをASCIIテーブルとして出力する。
//!
//! 使用方法: `word_to_blocky_formatter <input> <output.txt>`

use blocky_import::{cli, Pipeline};

fn main() {
    env_logger::init();
    cli::run(Pipeline::DocumentTable);
}
