//! Table Snapshot Module
//!
//! Word文書の最初のテーブルの内容と見た目（列幅、罫線、ヘッダー行）を保持し、
//! 各データ行の金額を明示的な結果として計算する。

use serde::Serialize;

use crate::amount::find_amount;
use crate::error::BlockyError;
use crate::parser::DocxDocument;

/// 列幅計算時に各列へ加える余白（左右1文字ずつ）
pub(crate) const CELL_PADDING: usize = 2;

/// テーブルの内容と書式のスナップショット
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TableSnapshot {
    /// タイトル（文書内で最初の空でない段落）
    pub title: Option<String>,
    /// ヘッダー行（テーブルの1行目）のセルテキスト
    pub headers: Vec<String>,
    /// データ行（2行目以降）のセルテキスト
    pub rows: Vec<Vec<String>>,
    /// 罫線があるか（スタイル名に`Grid`を含む）
    pub has_borders: bool,
    /// ヘッダー行に書式があるか（ヘッダー行が存在する場合は常にtrue）
    pub has_header_formatting: bool,
    /// 文書上の列幅（twip単位、概算）
    pub column_widths: Vec<Option<u32>>,
}

/// データ行の金額を計算できなかった理由
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SkipReason {
    /// セルが1つもない行
    EmptyRow,
    /// 最後のセルに数値が含まれていない
    NoNumber,
}

/// データ行ごとの金額計算結果
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum RowAmount {
    /// 最後のセルから金額を取得できた
    Parsed {
        /// 最初のセルのテキスト
        description: String,
        /// 最後のセルの金額
        amount: f64,
        /// 行のセル数
        cell_count: usize,
    },
    /// 金額を取得できなかった
    Skipped {
        /// データ行のインデックス（0始まり、ヘッダーを除く）
        row_index: usize,
        /// 理由
        reason: SkipReason,
    },
}

impl TableSnapshot {
    /// 文書からスナップショットを作成する
    ///
    /// 最初のテーブルのみを対象とします。2つ目以降のテーブルは無視されます。
    ///
    /// # 戻り値
    ///
    /// * `Ok(TableSnapshot)` - テーブルが存在する場合
    /// * `Err(BlockyError::NoTable)` - 文書にテーブルがない場合
    pub fn from_document(document: &DocxDocument) -> Result<Self, BlockyError> {
        let table = document.tables.first().ok_or(BlockyError::NoTable)?;
        if document.tables.len() > 1 {
            log::debug!(
                "document contains {} tables, using the first one",
                document.tables.len()
            );
        }

        let title = document
            .paragraphs
            .iter()
            .map(|p| p.trim())
            .find(|p| !p.is_empty())
            .map(str::to_string);

        let has_borders = table
            .style_name
            .as_deref()
            .map(|name| name.contains("Grid"))
            .unwrap_or(false);

        let mut rows = table
            .rows
            .iter()
            .map(|row| row.iter().map(|cell| cell.trim().to_string()).collect::<Vec<_>>());
        let headers = rows.next();
        let has_header_formatting = headers.is_some();

        Ok(Self {
            title,
            headers: headers.unwrap_or_default(),
            rows: rows.collect(),
            has_borders,
            has_header_formatting,
            column_widths: table.column_widths.clone(),
        })
    }

    /// 表示用の列幅（ヘッダーと全データセルの最大文字数 + 余白2）
    ///
    /// 列数はヘッダーのセル数で決まります。
    pub fn display_widths(&self) -> Vec<usize> {
        self.headers
            .iter()
            .enumerate()
            .map(|(col, header)| {
                let widest = self
                    .rows
                    .iter()
                    .filter_map(|row| row.get(col))
                    .map(|cell| cell.chars().count())
                    .fold(header.chars().count(), usize::max);
                widest + CELL_PADDING
            })
            .collect()
    }

    /// 各データ行の金額を計算する
    ///
    /// 最後のセルで最初に現れる数値を金額として扱います。
    pub fn row_amounts(&self) -> Vec<RowAmount> {
        self.rows
            .iter()
            .enumerate()
            .map(|(row_index, row)| {
                let Some(last) = row.last() else {
                    return RowAmount::Skipped {
                        row_index,
                        reason: SkipReason::EmptyRow,
                    };
                };
                match find_amount(last) {
                    Some(amount) => RowAmount::Parsed {
                        description: row[0].clone(),
                        amount,
                        cell_count: row.len(),
                    },
                    None => {
                        log::debug!("row {} has no amount in '{}'", row_index + 1, last);
                        RowAmount::Skipped {
                            row_index,
                            reason: SkipReason::NoNumber,
                        }
                    }
                }
            })
            .collect()
    }

    /// 金額を取得できたすべての行の合計
    pub fn total(&self) -> f64 {
        RowAmount::sum(&self.row_amounts())
    }
}

impl RowAmount {
    /// `Parsed`の金額の合計（該当行がない場合は0.0）
    pub fn sum(amounts: &[RowAmount]) -> f64 {
        amounts.iter().fold(0.0, |total, row| match row {
            RowAmount::Parsed { amount, .. } => total + amount,
            RowAmount::Skipped { .. } => total,
        })
    }

    /// 金額を取得できなかった行か
    pub fn is_skipped(&self) -> bool {
        matches!(self, RowAmount::Skipped { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::DocxTable;

    fn document(style: Option<&str>, rows: &[&[&str]]) -> DocxDocument {
        DocxDocument {
            paragraphs: vec!["".to_string(), "  Výdavky marec ".to_string(), "iné".to_string()],
            tables: vec![DocxTable {
                style_name: style.map(str::to_string),
                column_widths: vec![Some(3000), None],
                rows: rows
                    .iter()
                    .map(|row| row.iter().map(|cell| cell.to_string()).collect())
                    .collect(),
            }],
        }
    }

    #[test]
    fn test_snapshot_from_document() {
        let doc = document(
            Some("Table Grid"),
            &[&["Popis", " Suma "], &["Nájom", "-600 €"], &["Jedlo", "45,50 €"]],
        );
        let snapshot = TableSnapshot::from_document(&doc).unwrap();

        assert_eq!(snapshot.title.as_deref(), Some("Výdavky marec"));
        assert_eq!(snapshot.headers, vec!["Popis", "Suma"]);
        assert_eq!(snapshot.rows.len(), 2);
        assert!(snapshot.has_borders);
        assert!(snapshot.has_header_formatting);
        assert_eq!(snapshot.column_widths, vec![Some(3000), None]);
    }

    #[test]
    fn test_borders_follow_style_name() {
        let plain = TableSnapshot::from_document(&document(Some("Normal Table"), &[&["A"]])).unwrap();
        assert!(!plain.has_borders);

        let unstyled = TableSnapshot::from_document(&document(None, &[&["A"]])).unwrap();
        assert!(!unstyled.has_borders);

        let grid = TableSnapshot::from_document(&document(Some("Light Grid Accent 1"), &[&["A"]])).unwrap();
        assert!(grid.has_borders);
    }

    #[test]
    fn test_empty_table_has_no_header_formatting() {
        let snapshot = TableSnapshot::from_document(&document(None, &[])).unwrap();
        assert!(snapshot.headers.is_empty());
        assert!(!snapshot.has_header_formatting);
        assert!(snapshot.display_widths().is_empty());
    }

    #[test]
    fn test_missing_table_is_an_error() {
        let doc = DocxDocument {
            paragraphs: vec!["Len text".to_string()],
            tables: Vec::new(),
        };
        assert!(matches!(
            TableSnapshot::from_document(&doc),
            Err(BlockyError::NoTable)
        ));
    }

    #[test]
    fn test_display_widths_cover_all_cells() {
        let doc = document(
            None,
            &[&["Popis", "Suma"], &["Dlhý popis položky", "1"], &["X", "-1234,50 €"], &["Extra", "2", "ignorované"]],
        );
        let snapshot = TableSnapshot::from_document(&doc).unwrap();
        let widths = snapshot.display_widths();

        assert_eq!(widths, vec![18 + 2, 10 + 2]);
        for (col, width) in widths.iter().enumerate() {
            for row in &snapshot.rows {
                if let Some(cell) = row.get(col) {
                    assert!(*width >= cell.chars().count() + 2);
                }
            }
        }
    }

    #[test]
    fn test_row_amounts_are_explicit() {
        let doc = document(
            None,
            &[&["Popis", "Suma"], &["Nájom", "-600 €"], &["Poznámka", "bez sumy"], &["Samostatne 12"], &["Jedlo", "45,50 €"]],
        );
        let snapshot = TableSnapshot::from_document(&doc).unwrap();
        let amounts = snapshot.row_amounts();

        assert_eq!(amounts.len(), 4);
        assert_eq!(
            amounts[0],
            RowAmount::Parsed {
                description: "Nájom".to_string(),
                amount: -600.0,
                cell_count: 2
            }
        );
        assert_eq!(
            amounts[1],
            RowAmount::Skipped {
                row_index: 1,
                reason: SkipReason::NoNumber
            }
        );
        assert_eq!(
            amounts[2],
            RowAmount::Parsed {
                description: "Samostatne 12".to_string(),
                amount: 12.0,
                cell_count: 1
            }
        );
        assert!((snapshot.total() - (-600.0 + 12.0 + 45.5)).abs() < 1e-9);
    }

    #[test]
    fn test_empty_row_is_skipped() {
        let snapshot = TableSnapshot {
            headers: vec!["A".to_string()],
            rows: vec![Vec::new()],
            ..TableSnapshot::default()
        };
        assert_eq!(
            snapshot.row_amounts(),
            vec![RowAmount::Skipped {
                row_index: 0,
                reason: SkipReason::EmptyRow
            }]
        );
        assert_eq!(snapshot.total(), 0.0);
        assert!(snapshot.total().is_sign_positive());
    }

    #[test]
    fn test_header_only_total_is_positive_zero() {
        let snapshot = TableSnapshot {
            headers: vec!["Popis".to_string(), "Suma".to_string()],
            ..TableSnapshot::default()
        };
        assert!(snapshot.row_amounts().is_empty());
        assert!(snapshot.total().is_sign_positive());
        assert_eq!(format!("{:.2}", snapshot.total()), "0.00");
    }

    #[test]
    fn test_widths_count_characters() {
        let invisible = "\u{200B}".repeat(12);
        let combining = "e\u{0301}";
        let snapshot = TableSnapshot {
            headers: vec!["A".to_string(), "Suma".to_string()],
            rows: vec![vec![invisible.clone(), combining.to_string()]],
            ..TableSnapshot::default()
        };

        assert_eq!(snapshot.display_widths(), vec![12 + 2, 4 + 2]);
    }
}
