//! Builder Module
//!
//! Fluent Builder APIを提供し、`Converter`インスタンスを段階的に構築する。

use chrono::{Local, NaiveDateTime};
use std::io::{Read, Write};

use crate::api::{Pipeline, SheetSelector};
use crate::error::BlockyError;
use crate::extract::{extract_document_items, extract_spreadsheet_items};
use crate::output::{ItemListFormatter, ReportHeader, TableFormatter};
use crate::parser::{DocxDocument, DocxParser, WorkbookParser};
use crate::security::SecurityConfig;
use crate::table::TableSnapshot;
use crate::types::{ConversionSummary, DocumentExtraction, LineItem, SpreadsheetExtraction};

/// 変換処理の設定を保持する内部構造体
#[derive(Debug, Clone, Default)]
pub(crate) struct ConversionConfig {
    /// 読み込むシート（スプレッドシートのみ）
    pub sheet_selector: SheetSelector,

    /// 出力ヘッダーに記載する入力ファイル名
    pub source_name: Option<String>,

    /// 出力ヘッダーに記載する作成日時（Noneの場合は現在時刻）
    pub created_at: Option<NaiveDateTime>,

    /// 入力ファイルの上限設定
    pub security: SecurityConfig,
}

/// Fluent Builder APIを提供する構造体
///
/// すべての設定項目にデフォルト値が設定されており、必要な設定のみをオーバーライドできます。
///
/// # 使用例
///
/// ```rust,no_run
/// use blocky_import::{ConverterBuilder, SheetSelector};
///
/// # fn main() -> Result<(), blocky_import::BlockyError> {
/// let converter = ConverterBuilder::new()
///     .with_sheet_selector(SheetSelector::Name("Marec".to_string()))
///     .with_source_name("vydavky.xlsx")
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct ConverterBuilder {
    config: ConversionConfig,
}

impl ConverterBuilder {
    /// デフォルト設定を持つビルダーインスタンスを生成する
    ///
    /// # デフォルト設定
    ///
    /// - シート選択: 最初のシート
    /// - 入力ファイル名: 空
    /// - 作成日時: 変換時の現在時刻（ローカル時刻）
    /// - セキュリティ上限: `SecurityConfig::default()`
    pub fn new() -> Self {
        Self::default()
    }

    /// 読み込むシートを選択する
    pub fn with_sheet_selector(mut self, selector: SheetSelector) -> Self {
        self.config.sheet_selector = selector;
        self
    }

    /// 出力ヘッダーに記載する入力ファイル名を指定する
    pub fn with_source_name(mut self, name: impl Into<String>) -> Self {
        self.config.source_name = Some(name.into());
        self
    }

    /// 作成日時を固定する
    ///
    /// 出力を再現可能にしたい場合（テストなど）に使用します。
    pub fn with_created_at(mut self, created_at: NaiveDateTime) -> Self {
        self.config.created_at = Some(created_at);
        self
    }

    /// 入力ファイルの上限設定を指定する
    pub fn with_security_config(mut self, security: SecurityConfig) -> Self {
        self.config.security = security;
        self
    }

    /// 設定を検証し、`Converter`インスタンスを生成する
    ///
    /// # 発生し得るエラー
    ///
    /// * `BlockyError::Config` - シート名が空、または上限値が0の場合
    pub fn build(self) -> Result<Converter, BlockyError> {
        if let SheetSelector::Name(name) = &self.config.sheet_selector {
            if name.trim().is_empty() {
                return Err(BlockyError::Config("Sheet name must not be empty".to_string()));
            }
        }

        let security = &self.config.security;
        if security.max_input_file_size == 0
            || security.max_file_count == 0
            || security.max_file_size == 0
            || security.max_decompressed_size == 0
        {
            return Err(BlockyError::Config(
                "Security limits must be greater than zero".to_string(),
            ));
        }

        Ok(Converter {
            config: self.config,
        })
    }
}

/// 変換処理のファサード
///
/// 読み込み（`read_*`）と書き込み（`write_*`）を分けて呼び出せるほか、
/// `convert`で一度に実行することもできます。
///
/// # 使用例
///
/// ```rust,no_run
/// use blocky_import::{ConverterBuilder, Pipeline};
/// use std::fs::File;
///
/// # fn main() -> Result<(), blocky_import::BlockyError> {
/// let converter = ConverterBuilder::new().with_source_name("vydavky.xlsx").build()?;
/// let input = File::open("vydavky.xlsx")?;
/// let output = File::create("vydavky.txt")?;
/// let summary = converter.convert(Pipeline::Spreadsheet, input, output)?;
/// println!("{} položiek", summary.item_count);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Converter {
    config: ConversionConfig,
}

impl Converter {
    /// スプレッドシートから行リストを読み込む
    ///
    /// 先頭行をヘッダーとし、最初の2列を説明と金額として扱います。
    ///
    /// # 戻り値
    ///
    /// * `Ok(SpreadsheetExtraction)` - 有効な行と無効な行
    /// * `Err(BlockyError::InsufficientColumns)` - 2列未満の場合
    /// * `Err(BlockyError::Parse)` - スプレッドシートとして解析できない場合
    pub fn read_spreadsheet<R: Read>(&self, input: R) -> Result<SpreadsheetExtraction, BlockyError> {
        let mut workbook = WorkbookParser::open(input, &self.config.security)?;
        let range = workbook.sheet_range(&self.config.sheet_selector)?;
        extract_spreadsheet_items(&range)
    }

    /// Word文書を解析する
    pub fn read_document<R: Read>(&self, input: R) -> Result<DocxDocument, BlockyError> {
        DocxParser::parse(input, &self.config.security)
    }

    /// Word文書から行リストを読み込む
    ///
    /// テーブルから1件も取り出せない場合は段落テキストにフォールバックします。
    /// 結果が空の場合もエラーにはなりません。
    pub fn read_document_items<R: Read>(&self, input: R) -> Result<DocumentExtraction, BlockyError> {
        let document = self.read_document(input)?;
        Ok(extract_document_items(&document))
    }

    /// Word文書の最初のテーブルを読み込む
    pub fn read_table_snapshot<R: Read>(&self, input: R) -> Result<TableSnapshot, BlockyError> {
        let document = self.read_document(input)?;
        TableSnapshot::from_document(&document)
    }

    /// 行リスト形式で書き込む
    pub fn write_item_report<W: Write>(
        &self,
        items: &[LineItem],
        invalid_count: usize,
        mut output: W,
    ) -> Result<ConversionSummary, BlockyError> {
        ItemListFormatter.render(items, invalid_count, &self.report_header(), &mut output)
    }

    /// ASCIIテーブル形式で書き込む
    pub fn write_table_report<W: Write>(
        &self,
        snapshot: &TableSnapshot,
        mut output: W,
    ) -> Result<ConversionSummary, BlockyError> {
        TableFormatter.render(snapshot, &self.report_header(), &mut output)
    }

    /// 指定したパイプラインで読み込みから書き込みまでを実行する
    ///
    /// 読み込みに失敗した場合、出力には何も書き込まれません。
    pub fn convert<R: Read, W: Write>(
        &self,
        pipeline: Pipeline,
        input: R,
        output: W,
    ) -> Result<ConversionSummary, BlockyError> {
        match pipeline {
            Pipeline::Spreadsheet => {
                let extraction = self.read_spreadsheet(input)?;
                self.write_item_report(&extraction.items, extraction.invalid_rows.len(), output)
            }
            Pipeline::DocumentItems => {
                let extraction = self.read_document_items(input)?;
                self.write_item_report(&extraction.items, 0, output)
            }
            Pipeline::DocumentTable => {
                let snapshot = self.read_table_snapshot(input)?;
                self.write_table_report(&snapshot, output)
            }
        }
    }

    fn report_header(&self) -> ReportHeader {
        ReportHeader {
            source_name: self.config.source_name.clone().unwrap_or_default(),
            created_at: self
                .config
                .created_at
                .unwrap_or_else(|| Local::now().naive_local()),
        }
    }
}
