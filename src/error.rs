//! Error Types Module
//!
//! クレート全体で使用する構造化エラー型を定義するモジュール。
//! `thiserror`を使用して、エラーの自動変換とメッセージフォーマットを実現する。

use thiserror::Error;

/// blocky-importクレート全体で使用するエラー型
///
/// 入力ドキュメント（Excel/Word）の読み込み、解析、出力ファイルへの書き込み中に
/// 発生するすべてのエラーを統一的に扱うために使用されます。
///
/// 行単位の値エラー（数値でない金額など）はこの型では表現しません。
/// それらは`InvalidRow`や`RowAmount::Skipped`として記録され、変換は継続します。
///
/// # 使用例
///
/// ```rust,no_run
/// use blocky_import::BlockyError;
/// use std::fs::File;
///
/// fn open_input(path: &str) -> Result<File, BlockyError> {
///     let file = File::open(path)?; // Ioエラーが自動的に変換される
///     Ok(file)
/// }
/// ```
#[derive(Error, Debug)]
pub enum BlockyError {
    /// I/O操作中に発生したエラー
    ///
    /// 入力ファイルの読み込み失敗、出力ファイルの書き込み失敗（権限、ディスク容量）など。
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// スプレッドシートの解析中に発生したエラー（calamine由来）
    #[error("Failed to parse spreadsheet: {0}")]
    Parse(#[from] calamine::Error),

    /// UTF-8文字列の変換エラー
    #[error("UTF-8 conversion error: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    /// ZIPアーカイブの解析エラー
    ///
    /// DOCXファイル（ZIPアーカイブ）が壊れている、またはZIPではない場合に発生します。
    #[error("ZIP archive error: {0}")]
    Zip(String),

    /// XMLの解析エラー
    #[error("XML error: {0}")]
    Xml(String),

    /// 必須のパーツがアーカイブ内に存在しない
    ///
    /// 例: `word/document.xml`が見つからない場合
    #[error("Missing document part: {0}")]
    MissingPart(String),

    /// 設定の検証に失敗したエラー
    ///
    /// `ConverterBuilder::build()`時、またはシート選択の解決時に発生します。
    #[error("Configuration error: {0}")]
    Config(String),

    /// スプレッドシートの列数が不足している
    ///
    /// 少なくとも2列（popis, suma）が必要です。
    #[error("Spreadsheet must contain at least 2 columns (description and amount), found {found}")]
    InsufficientColumns {
        /// 実際に見つかった列数
        found: usize,
    },

    /// ドキュメントにテーブルが存在しない
    #[error("Document does not contain any table")]
    NoTable,

    /// セキュリティ制限に違反したエラー
    ///
    /// ZIP bomb、パストラバーサル、ファイルサイズ制限などに違反した場合に発生します。
    #[error("Security violation: {0}")]
    SecurityViolation(String),
}

impl From<quick_xml::Error> for BlockyError {
    fn from(err: quick_xml::Error) -> Self {
        BlockyError::Xml(err.to_string())
    }
}

impl From<zip::result::ZipError> for BlockyError {
    fn from(err: zip::result::ZipError) -> Self {
        BlockyError::Zip(err.to_string())
    }
}
