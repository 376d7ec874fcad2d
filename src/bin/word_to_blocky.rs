//! word_to_blocky
//!
//! Word（.docx）のテーブルまたは段落から行リストを抽出する。
//!
//! 使用方法: `word_to_blocky <input> <output.txt>`

use blocky_import::{cli, Pipeline};

fn main() {
    env_logger::init();
    cli::run(Pipeline::DocumentItems);
}
