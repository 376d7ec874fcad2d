//! Output Formatters Implementation
//!
//! 各出力形式の実装を提供するモジュール。

use std::io::Write;

use super::ReportHeader;
use crate::amount::format_amount;
use crate::error::BlockyError;
use crate::table::{RowAmount, TableSnapshot, CELL_PADDING};
use crate::types::{ConversionSummary, LineItem};

/// 行リスト形式（`popis | suma`）のフォーマッター
///
/// スプレッドシートパイプラインとドキュメント抽出パイプラインで共通です。
pub(crate) struct ItemListFormatter;

impl ItemListFormatter {
    /// 行リストを書き込む
    ///
    /// # 引数
    ///
    /// * `items` - 有効な行
    /// * `invalid_count` - 無効として除外された行数（0の場合はフッターに記載しない）
    /// * `header` - 作成日時と入力ファイル名
    /// * `writer` - 出力先
    pub fn render<W: Write>(
        &self,
        items: &[LineItem],
        invalid_count: usize,
        header: &ReportHeader,
        writer: &mut W,
    ) -> Result<ConversionSummary, BlockyError> {
        writeln!(writer, "# Položky pre import do aplikácie Blocky")?;
        writeln!(writer, "# Vytvorené: {}", header.timestamp())?;
        writeln!(writer, "# Zdrojový súbor: {}", header.source_name)?;
        writeln!(writer, "#")?;
        writeln!(writer, "# Formát: Popis | Suma")?;
        writeln!(writer, "# Záporné sumy sú označené znamienkom mínus (-)")?;
        writeln!(writer, "#")?;

        for item in items {
            writeln!(writer, "{} | {}", item.description, format_amount(item.amount))?;
        }

        let summary = ConversionSummary::from_items(items, invalid_count);

        writeln!(writer, "#")?;
        writeln!(writer, "# Celková suma: {:.2}", summary.total)?;
        writeln!(writer, "# Počet položiek: {}", summary.item_count)?;
        if summary.invalid_count > 0 {
            writeln!(writer, "# Počet neplatných položiek: {}", summary.invalid_count)?;
        }

        writer.flush()?;
        Ok(summary)
    }
}

/// ASCIIテーブル形式のフォーマッター
pub(crate) struct TableFormatter;

impl TableFormatter {
    /// テーブル、合計、インポート用のヒントを書き込む
    ///
    /// 戻り値の`item_count`はデータ行数、`invalid_count`は金額を取得できなかった行数です。
    pub fn render<W: Write>(
        &self,
        snapshot: &TableSnapshot,
        header: &ReportHeader,
        writer: &mut W,
    ) -> Result<ConversionSummary, BlockyError> {
        writeln!(writer, "# Tabuľka vytvorená z dokumentu: {}", header.source_name)?;
        writeln!(writer, "# Vytvorené: {}", header.timestamp())?;
        writeln!(writer, "#")?;
        writeln!(writer)?;

        if let Some(title) = &snapshot.title {
            writeln!(writer, "{}", title)?;
            writeln!(writer)?;
        }

        let widths = snapshot.display_widths();
        let border = border_line(&widths);

        if snapshot.has_borders {
            writeln!(writer, "{}", border)?;
        }
        writeln!(writer, "{}", row_line(&snapshot.headers, &widths))?;
        if snapshot.has_borders || snapshot.has_header_formatting {
            writeln!(writer, "{}", border)?;
        }
        for row in &snapshot.rows {
            writeln!(writer, "{}", row_line(row, &widths))?;
        }
        if snapshot.has_borders {
            writeln!(writer, "{}", border)?;
        }

        let amounts = snapshot.row_amounts();
        let total = RowAmount::sum(&amounts);
        let skipped = amounts.iter().filter(|row| row.is_skipped()).count();

        writeln!(writer)?;
        writeln!(writer, "Celková suma: {:.2} €", total)?;

        writeln!(writer)?;
        writeln!(writer, "# Informácie pre import do aplikácie Blocky:")?;
        writeln!(
            writer,
            "# Pre každý riadok tabuľky (okrem hlavičky) vytvorte položku v aplikácii:"
        )?;
        for amount in &amounts {
            if let RowAmount::Parsed {
                description,
                amount,
                cell_count,
            } = amount
            {
                // 説明は最初のセル、金額は最後のセル
                if *cell_count >= 2 {
                    writeln!(writer, "# - Popis: {}, Suma: {:.2} €", description, amount)?;
                }
            }
        }

        writer.flush()?;
        Ok(ConversionSummary {
            item_count: snapshot.rows.len(),
            invalid_count: skipped,
            total,
        })
    }
}

/// 罫線（例: `+-------+------+`）
fn border_line(widths: &[usize]) -> String {
    let segments: Vec<String> = widths.iter().map(|width| "-".repeat(*width)).collect();
    format!("+{}+", segments.join("+"))
}

/// 1行分のセル（例: `| Nájom | -600 |`）
///
/// 列数を超えるセルは出力しません。
fn row_line(cells: &[String], widths: &[usize]) -> String {
    let mut line = String::from("|");
    for (cell, width) in cells.iter().zip(widths) {
        let inner = width.saturating_sub(CELL_PADDING);
        line.push(' ');
        line.push_str(cell);
        for _ in cell.chars().count()..inner {
            line.push(' ');
        }
        line.push_str(" |");
    }
    line
}
