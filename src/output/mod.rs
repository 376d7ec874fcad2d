//! Output Format Module
//!
//! 出力ファイルの書き込み。行リスト形式とASCIIテーブル形式の2種類を提供します。

mod formatters;

use chrono::NaiveDateTime;

pub(crate) use formatters::{ItemListFormatter, TableFormatter};

/// 出力ファイル冒頭のコメントに記載するタイムスタンプ形式
pub(crate) const TIMESTAMP_FORMAT: &str = "%d.%m.%Y %H:%M:%S";

/// 出力ファイルのヘッダー情報
#[derive(Debug, Clone)]
pub(crate) struct ReportHeader {
    /// 入力ファイル名（ディレクトリを含まない）
    pub source_name: String,
    /// 作成日時
    pub created_at: NaiveDateTime,
}

impl ReportHeader {
    /// `DD.MM.YYYY HH:MM:SS`形式の作成日時
    pub fn timestamp(&self) -> String {
        self.created_at.format(TIMESTAMP_FORMAT).to_string()
    }
}
