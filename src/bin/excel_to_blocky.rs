//! excel_to_blocky
//!
//! Excel（.xlsx/.xls）の先頭2列を行リストに変換する。
//!
//! 使用方法: `excel_to_blocky <input> <output.txt>`

use blocky_import::{cli, Pipeline};

fn main() {
    env_logger::init();
    cli::run(Pipeline::Spreadsheet);
}
