//! Workbook Parser Module
//!
//! calamineを使用したスプレッドシート（XLSX/XLS）の読み込み。

use calamine::{open_workbook_auto_from_rs, Data, Range, Reader, Sheets};
use std::io::{Cursor, Read};
use zip::ZipArchive;

use crate::api::SheetSelector;
use crate::error::BlockyError;
use crate::security::SecurityConfig;

/// ZIPローカルファイルヘッダーのシグネチャ
const ZIP_SIGNATURE: &[u8] = b"PK\x03\x04";

/// ワークブックパーサー
///
/// calamineのラッパーとして、シートの選択と範囲の取得を提供します。
/// 形式（XLSX/XLS/XLSB/ODS）はファイル内容から自動判定されます。
pub(crate) struct WorkbookParser {
    workbook: Sheets<Cursor<Vec<u8>>>,
}

impl WorkbookParser {
    /// ワークブックを開く
    ///
    /// 入力全体をメモリに読み込み、サイズ上限を検証してからcalamineに渡します。
    ///
    /// # 戻り値
    ///
    /// * `Ok(WorkbookParser)` - 読み込みに成功した場合
    /// * `Err(BlockyError::Parse)` - スプレッドシートとして解析できない場合
    pub fn open<R: Read>(reader: R, security: &SecurityConfig) -> Result<Self, BlockyError> {
        let buffer = security.read_input(reader)?;

        // XLSX/XLSB/ODSはZIPコンテナ。XLSはCFBなので検査対象外
        if buffer.starts_with(ZIP_SIGNATURE) {
            let mut archive = ZipArchive::new(Cursor::new(buffer.as_slice()))?;
            security.check_archive(&mut archive)?;
        }

        let workbook = open_workbook_auto_from_rs(Cursor::new(buffer))?;
        Ok(Self { workbook })
    }

    /// すべてのシート名を取得
    pub fn sheet_names(&self) -> Vec<String> {
        self.workbook.sheet_names().to_vec()
    }

    /// シート選択方式に基づいてシート名を解決
    ///
    /// # 戻り値
    ///
    /// * `Ok(String)` - 選択されたシート名
    /// * `Err(BlockyError::Config)` - シートが見つからない、またはインデックスが範囲外の場合
    pub fn select_sheet(&self, selector: &SheetSelector) -> Result<String, BlockyError> {
        let names = self.sheet_names();

        match selector {
            SheetSelector::Index(index) => names.get(*index).cloned().ok_or_else(|| {
                BlockyError::Config(format!(
                    "Sheet index {} is out of range (total: {})",
                    index,
                    names.len()
                ))
            }),
            SheetSelector::Name(name) => {
                if names.contains(name) {
                    Ok(name.clone())
                } else {
                    Err(BlockyError::Config(format!("Sheet '{}' not found", name)))
                }
            }
        }
    }

    /// 選択されたシートの使用範囲を取得
    pub fn sheet_range(&mut self, selector: &SheetSelector) -> Result<Range<Data>, BlockyError> {
        let sheet_name = self.select_sheet(selector)?;
        log::debug!("reading worksheet '{}'", sheet_name);
        Ok(self.workbook.worksheet_range(&sheet_name)?)
    }
}
