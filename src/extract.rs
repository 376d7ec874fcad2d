//! Item Extraction Module
//!
//! 解析済みの入力から行リスト（popis, suma）を取り出すヒューリスティック。
//!
//! - スプレッドシート: 先頭行をヘッダーとし、最初の2列を説明と金額として扱う
//! - Word文書: 各テーブルの2行目以降から取り出し、1件も見つからなければ
//!   段落テキストの「popis: suma」パターンにフォールバックする

use calamine::{Data, Range};

use crate::amount::{extract_amount, paragraph_items};
use crate::error::BlockyError;
use crate::parser::DocxDocument;
use crate::types::{DocumentExtraction, InvalidRow, ItemSource, LineItem, SpreadsheetExtraction};

static EMPTY_CELL: Data = Data::Empty;

/// セルの表示テキスト（前後の空白を除去）
fn cell_text(cell: &Data) -> String {
    match cell {
        Data::String(s) => s.trim().to_string(),
        Data::Empty => String::new(),
        other => other.to_string().trim().to_string(),
    }
}

fn is_blank(cell: &Data) -> bool {
    match cell {
        Data::Empty => true,
        Data::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

/// 金額セルを`f64`に変換する
///
/// 数値・論理値はそのまま、文字列は前後の空白を除いて解析します。
/// 空セル、エラー値、日付、数値として解析できない文字列、非有限値は`None`。
fn coerce_amount(cell: &Data) -> Option<f64> {
    let value = match cell {
        Data::Int(i) => *i as f64,
        Data::Float(f) => *f,
        Data::Bool(b) => {
            if *b {
                1.0
            } else {
                0.0
            }
        }
        Data::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };

    value.is_finite().then_some(value)
}

/// スプレッドシートの使用範囲から行リストを抽出する
///
/// # 戻り値
///
/// * `Ok(SpreadsheetExtraction)` - 有効な行と無効な行
/// * `Err(BlockyError::InsufficientColumns)` - 使用範囲が2列未満の場合
pub(crate) fn extract_spreadsheet_items(
    range: &Range<Data>,
) -> Result<SpreadsheetExtraction, BlockyError> {
    let width = range.width();
    if width < 2 {
        return Err(BlockyError::InsufficientColumns { found: width });
    }

    // 使用範囲の先頭行（0始まり）。行番号の表示に使う
    let first_row = range.start().map(|(row, _)| row as usize).unwrap_or(0);
    let mut rows = range.rows();

    let (description_column, amount_column) = match rows.next() {
        Some(header) => (
            cell_text(header.first().unwrap_or(&EMPTY_CELL)),
            cell_text(header.get(1).unwrap_or(&EMPTY_CELL)),
        ),
        None => (String::new(), String::new()),
    };
    log::debug!(
        "using column '{}' as description and '{}' as amount",
        description_column,
        amount_column
    );

    let mut items = Vec::new();
    let mut invalid_rows = Vec::new();

    for (offset, row) in rows.enumerate() {
        // ヘッダー行が1行目なので、データ行は2行目から
        let line = first_row + offset + 2;
        let description_cell = row.first().unwrap_or(&EMPTY_CELL);
        let amount_cell = row.get(1).unwrap_or(&EMPTY_CELL);

        if is_blank(description_cell) && is_blank(amount_cell) {
            log::debug!("skipping blank row {}", line);
            continue;
        }

        match coerce_amount(amount_cell) {
            Some(amount) => items.push(LineItem::new(cell_text(description_cell), amount)),
            None => {
                let raw_amount = cell_text(amount_cell);
                log::warn!("row {} has an invalid amount: '{}'", line, raw_amount);
                invalid_rows.push(InvalidRow { line, raw_amount });
            }
        }
    }

    Ok(SpreadsheetExtraction {
        description_column,
        amount_column,
        items,
        invalid_rows,
    })
}

/// Word文書から行リストを抽出する
///
/// テーブルから1件でも取り出せた場合、段落は一切参照しません。
pub(crate) fn extract_document_items(document: &DocxDocument) -> DocumentExtraction {
    let table_count = document.tables.len();
    let mut items = Vec::new();

    for (index, table) in document.tables.iter().enumerate() {
        log::debug!("processing table {} of {}", index + 1, table_count);

        // 先頭行はヘッダー
        for row in table.rows.iter().skip(1) {
            if row.len() < 2 {
                continue;
            }
            if let Some(amount) = extract_amount(row[1].trim()) {
                items.push(LineItem::new(row[0].trim(), amount));
            }
        }
    }

    if !items.is_empty() {
        return DocumentExtraction {
            items,
            source: ItemSource::Tables,
            table_count,
        };
    }

    log::debug!("no items found in tables, scanning paragraphs");
    for paragraph in &document.paragraphs {
        let text = paragraph.trim();
        if text.is_empty() {
            continue;
        }
        items.extend(
            paragraph_items(text)
                .into_iter()
                .map(|(description, amount)| LineItem::new(description, amount)),
        );
    }

    DocumentExtraction {
        items,
        source: ItemSource::Paragraphs,
        table_count,
    }
}
