//! Types Module
//!
//! クレート全体で使用する共通データ型を定義するモジュール。

use serde::Serialize;

/// インポート対象の1件の取引（popis, suma）
///
/// 負の金額は支出（借方）を表します。出力内での位置以外に識別子は持ちません。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineItem {
    /// 説明（popis）
    pub description: String,
    /// 金額（suma）
    pub amount: f64,
}

impl LineItem {
    /// 新しい行を生成
    pub fn new(description: impl Into<String>, amount: f64) -> Self {
        Self {
            description: description.into(),
            amount,
        }
    }
}

/// 数値に変換できなかったスプレッドシートの行
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvalidRow {
    /// スプレッドシート上の行番号（1始まり、ヘッダー行 = 1）
    pub line: usize,
    /// 変換に失敗したセルの内容
    pub raw_amount: String,
}

/// スプレッドシートパイプラインの抽出結果
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpreadsheetExtraction {
    /// 説明列のヘッダー名
    pub description_column: String,
    /// 金額列のヘッダー名
    pub amount_column: String,
    /// 有効な行
    pub items: Vec<LineItem>,
    /// 無効な行（合計から除外されるがカウントされる）
    pub invalid_rows: Vec<InvalidRow>,
}

/// 行リストの抽出元
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ItemSource {
    /// ドキュメントのテーブルから抽出
    Tables,
    /// 段落テキストの「popis: suma」パターンから抽出
    Paragraphs,
}

/// ドキュメント抽出パイプラインの結果
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentExtraction {
    /// 抽出された行
    pub items: Vec<LineItem>,
    /// 行の抽出元
    pub source: ItemSource,
    /// ドキュメント内のテーブル数
    pub table_count: usize,
}

/// 変換処理の集計結果（コンソール出力用）
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ConversionSummary {
    /// 出力された行数
    pub item_count: usize,
    /// 無効として除外された行数
    pub invalid_count: usize,
    /// 合計金額
    pub total: f64,
}

impl ConversionSummary {
    /// 行リストから集計を作成
    pub(crate) fn from_items(items: &[LineItem], invalid_count: usize) -> Self {
        Self {
            item_count: items.len(),
            invalid_count,
            // 空の場合も0.0（`sum()`は-0.0を返す）
            total: items.iter().fold(0.0, |total, item| total + item.amount),
        }
    }
}
