//! Document Parser Module
//!
//! DOCX（ZIPアーカイブ内のWordprocessingML）からテキストとテーブルを抽出する。
//! `quick-xml`によるイベント駆動の解析で、本文レベルの段落とテーブルのみを取り出します。
//!
//! # 抽出ルール
//!
//! - 段落テキスト: `w:r`内の`w:t`を連結。`w:tab`はタブ、`w:br`/`w:cr`は改行
//! - テキストボックス内の段落、削除済みテキスト（`w:delText`）は含めない
//! - セルのテキスト: セル直下の段落を改行で連結
//! - 横方向の結合（`w:gridSpan`）は、結合した列数だけ同じテキストを繰り返す
//! - 縦方向の結合（`w:vMerge`の継続セル）は、上の行の同じ列のテキストを使う
//! - 入れ子のテーブルは読み飛ばす

use std::collections::HashMap;
use std::io::{Cursor, Read, Seek};

use quick_xml::escape::unescape;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use serde::Serialize;
use zip::ZipArchive;

use crate::error::BlockyError;
use crate::security::SecurityConfig;

/// メイン文書パートの既定パス
const DEFAULT_DOCUMENT_PART: &str = "word/document.xml";

/// officeDocumentリレーションシップの種類（末尾一致で判定）
const OFFICE_DOCUMENT_REL: &str = "/officeDocument";

/// 解析済みのWord文書
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DocxDocument {
    /// 本文レベルの段落テキスト（文書順）
    pub paragraphs: Vec<String>,
    /// 本文レベルのテーブル（文書順）
    pub tables: Vec<DocxTable>,
}

/// Word文書内の1つのテーブル
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DocxTable {
    /// テーブルスタイル名（例: `Table Grid`）
    ///
    /// `word/styles.xml`で名前を解決できない場合はスタイルIDそのもの。
    /// スタイル指定がない場合は既定のテーブルスタイル名。
    pub style_name: Option<String>,
    /// 列幅（twip単位、`w:tblGrid`から取得）
    pub column_widths: Vec<Option<u32>>,
    /// 各行のセルテキスト
    pub rows: Vec<Vec<String>>,
}

/// DOCXパーサー
pub(crate) struct DocxParser;

impl DocxParser {
    /// DOCXファイルを読み込み、段落とテーブルを抽出する
    ///
    /// # 引数
    ///
    /// * `reader` - DOCXファイルのリーダー
    /// * `security` - 入力サイズとZIPアーカイブの上限設定
    ///
    /// # 戻り値
    ///
    /// * `Ok(DocxDocument)` - 解析に成功した場合
    /// * `Err(BlockyError)` - ZIP/XMLとして不正、メイン文書が存在しない、または上限違反の場合
    pub fn parse<R: Read>(reader: R, security: &SecurityConfig) -> Result<DocxDocument, BlockyError> {
        let buffer = security.read_input(reader)?;
        let mut archive = ZipArchive::new(Cursor::new(buffer))?;
        security.check_archive(&mut archive)?;

        let document_part = Self::locate_document_part(&mut archive)?;
        log::debug!("main document part: {}", document_part);

        let styles_part = match document_part.rsplit_once('/') {
            Some((dir, _)) => format!("{}/styles.xml", dir),
            None => "styles.xml".to_string(),
        };
        let styles = match read_part(&mut archive, &styles_part)? {
            Some(xml) => StyleSheet::parse(&xml)?,
            None => StyleSheet::default(),
        };

        let document_xml = read_part(&mut archive, &document_part)?
            .ok_or(BlockyError::MissingPart(document_part))?;

        parse_document_xml(&document_xml, &styles)
    }

    /// `_rels/.rels`からメイン文書パートのパスを取得する
    ///
    /// リレーションシップが見つからない場合は`word/document.xml`を使う。
    fn locate_document_part<R: Read + Seek>(
        archive: &mut ZipArchive<R>,
    ) -> Result<String, BlockyError> {
        let rels = match read_part(archive, "_rels/.rels")? {
            Some(rels) => rels,
            None => return Ok(DEFAULT_DOCUMENT_PART.to_string()),
        };

        let mut reader = Reader::from_reader(rels.as_slice());
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"Relationship" => {
                    let is_document = attr_value(&e, b"Type")?
                        .map(|t| t.ends_with(OFFICE_DOCUMENT_REL))
                        .unwrap_or(false);
                    if is_document {
                        if let Some(target) = attr_value(&e, b"Target")? {
                            return Ok(target.trim_start_matches('/').to_string());
                        }
                    }
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        Ok(DEFAULT_DOCUMENT_PART.to_string())
    }
}

/// ZIPアーカイブからパートを読み込む（存在しない場合は`None`）
fn read_part<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    name: &str,
) -> Result<Option<Vec<u8>>, BlockyError> {
    let mut file = match archive.by_name(name) {
        Ok(file) => file,
        Err(zip::result::ZipError::FileNotFound) => return Ok(None),
        Err(e) => return Err(e.into()),
    };

    let mut content = Vec::new();
    file.read_to_end(&mut content)?;
    Ok(Some(content))
}

/// 要素の属性値を取得する（修飾名で比較）
fn attr_value(e: &BytesStart, key: &[u8]) -> Result<Option<String>, BlockyError> {
    for attr in e.attributes() {
        let attr = attr.map_err(|e| BlockyError::Xml(e.to_string()))?;
        if attr.key.as_ref() == key {
            let raw = std::str::from_utf8(&attr.value)?;
            let value = unescape(raw).map_err(|e| BlockyError::Xml(e.to_string()))?;
            return Ok(Some(value.into_owned()));
        }
    }
    Ok(None)
}

/// `word/styles.xml`から取得したスタイル情報
#[derive(Debug, Clone, Default)]
pub(crate) struct StyleSheet {
    /// styleId -> 表示名
    names: HashMap<String, String>,
    /// 既定のテーブルスタイル名（`w:default="1"`）
    default_table: Option<String>,
}

impl StyleSheet {
    pub fn parse(xml: &[u8]) -> Result<Self, BlockyError> {
        let mut reader = Reader::from_reader(xml);
        let mut buf = Vec::new();
        let mut sheet = StyleSheet::default();
        // (styleId, 既定のテーブルスタイルか)
        let mut current: Option<(String, bool)> = None;

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(e) if e.name().as_ref() == b"w:style" => {
                    let is_table = attr_value(&e, b"w:type")?.as_deref() == Some("table");
                    let is_default = matches!(
                        attr_value(&e, b"w:default")?.as_deref(),
                        Some("1") | Some("true") | Some("on")
                    );
                    current = attr_value(&e, b"w:styleId")?.map(|id| (id, is_table && is_default));
                }
                Event::Start(e) | Event::Empty(e) if e.name().as_ref() == b"w:name" => {
                    if let (Some((id, is_default_table)), Some(name)) =
                        (&current, attr_value(&e, b"w:val")?)
                    {
                        if *is_default_table {
                            sheet.default_table = Some(name.clone());
                        }
                        sheet.names.insert(id.clone(), name);
                    }
                }
                Event::End(e) if e.name().as_ref() == b"w:style" => current = None,
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        Ok(sheet)
    }

    /// テーブルのスタイル名を解決する
    fn table_style_name(&self, style_id: Option<&str>) -> Option<String> {
        match style_id {
            Some(id) => Some(self.names.get(id).cloned().unwrap_or_else(|| id.to_string())),
            None => self.default_table.clone(),
        }
    }
}

/// 縦方向の結合状態
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum VerticalMerge {
    #[default]
    None,
    Restart,
    Continue,
}

#[derive(Debug, Default)]
struct CellBuilder {
    paragraphs: Vec<String>,
    grid_span: usize,
    v_merge: VerticalMerge,
}

impl CellBuilder {
    fn text(&self) -> String {
        self.paragraphs.join("\n")
    }
}

#[derive(Debug, Default)]
struct TableBuilder {
    style_id: Option<String>,
    column_widths: Vec<Option<u32>>,
    rows: Vec<Vec<String>>,
    row: Vec<CellBuilder>,
    cell: Option<CellBuilder>,
}

impl TableBuilder {
    fn finish_cell(&mut self) {
        if let Some(cell) = self.cell.take() {
            self.row.push(cell);
        }
    }

    fn finish_row(&mut self) {
        let cells = std::mem::take(&mut self.row);
        let previous = self.rows.last();
        let mut texts: Vec<String> = Vec::with_capacity(cells.len());

        for cell in cells {
            let text = match cell.v_merge {
                VerticalMerge::Continue => previous
                    .and_then(|row| row.get(texts.len()))
                    .cloned()
                    .unwrap_or_else(|| cell.text()),
                VerticalMerge::None | VerticalMerge::Restart => cell.text(),
            };
            for _ in 0..cell.grid_span.max(1) {
                texts.push(text.clone());
            }
        }

        self.rows.push(texts);
    }

    fn finish(self, styles: &StyleSheet) -> DocxTable {
        DocxTable {
            style_name: styles.table_style_name(self.style_id.as_deref()),
            column_widths: self.column_widths,
            rows: self.rows,
        }
    }
}

/// `word/document.xml`の解析状態
struct DocumentBuilder<'a> {
    styles: &'a StyleSheet,
    document: DocxDocument,
    /// 開いているテーブル（末尾が最も内側）
    tables: Vec<TableBuilder>,
    /// `w:p`のネスト深さ（テキストボックス内の段落は2以上）
    paragraph_depth: usize,
    run_depth: usize,
    in_text: bool,
    paragraph: String,
}

impl<'a> DocumentBuilder<'a> {
    fn new(styles: &'a StyleSheet) -> Self {
        Self {
            styles,
            document: DocxDocument::default(),
            tables: Vec::new(),
            paragraph_depth: 0,
            run_depth: 0,
            in_text: false,
            paragraph: String::new(),
        }
    }

    fn in_run(&self) -> bool {
        self.paragraph_depth == 1 && self.run_depth > 0
    }

    fn current_cell(&mut self) -> Option<&mut CellBuilder> {
        self.tables.last_mut().and_then(|table| table.cell.as_mut())
    }

    fn start(&mut self, e: &BytesStart) -> Result<(), BlockyError> {
        match e.name().as_ref() {
            b"w:p" => {
                self.paragraph_depth += 1;
                if self.paragraph_depth == 1 {
                    self.paragraph.clear();
                    self.run_depth = 0;
                }
            }
            b"w:r" if self.paragraph_depth == 1 => self.run_depth += 1,
            b"w:t" if self.in_run() => self.in_text = true,
            b"w:tab" | b"w:ptab" if self.in_run() => self.paragraph.push('\t'),
            b"w:cr" if self.in_run() => self.paragraph.push('\n'),
            b"w:br" if self.in_run() => {
                // ページ区切り・段区切りはテキストに含めない
                if matches!(
                    attr_value(e, b"w:type")?.as_deref(),
                    None | Some("textWrapping")
                ) {
                    self.paragraph.push('\n');
                }
            }
            b"w:noBreakHyphen" if self.in_run() => self.paragraph.push('-'),
            _ if self.paragraph_depth > 0 => {}
            b"w:tbl" => self.tables.push(TableBuilder::default()),
            b"w:tblStyle" => {
                let style_id = attr_value(e, b"w:val")?;
                if let Some(table) = self.tables.last_mut() {
                    table.style_id = style_id;
                }
            }
            b"w:gridCol" => {
                let width = attr_value(e, b"w:w")?.and_then(|w| w.parse::<u32>().ok());
                if let Some(table) = self.tables.last_mut() {
                    table.column_widths.push(width);
                }
            }
            b"w:tr" => {
                if let Some(table) = self.tables.last_mut() {
                    table.row.clear();
                }
            }
            b"w:tc" => {
                if let Some(table) = self.tables.last_mut() {
                    table.cell = Some(CellBuilder::default());
                }
            }
            b"w:gridSpan" => {
                let span = attr_value(e, b"w:val")?.and_then(|v| v.parse::<usize>().ok());
                if let Some(cell) = self.current_cell() {
                    cell.grid_span = span.unwrap_or(1);
                }
            }
            b"w:vMerge" => {
                let merge = match attr_value(e, b"w:val")?.as_deref() {
                    Some("restart") => VerticalMerge::Restart,
                    _ => VerticalMerge::Continue,
                };
                if let Some(cell) = self.current_cell() {
                    cell.v_merge = merge;
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn end(&mut self, name: &[u8]) {
        match name {
            b"w:p" => {
                if self.paragraph_depth == 1 {
                    self.finish_paragraph();
                }
                self.paragraph_depth = self.paragraph_depth.saturating_sub(1);
            }
            b"w:r" if self.paragraph_depth == 1 => {
                self.run_depth = self.run_depth.saturating_sub(1);
            }
            b"w:t" => self.in_text = false,
            _ if self.paragraph_depth > 0 => {}
            b"w:tc" => {
                if let Some(table) = self.tables.last_mut() {
                    table.finish_cell();
                }
            }
            b"w:tr" => {
                if let Some(table) = self.tables.last_mut() {
                    table.finish_row();
                }
            }
            b"w:tbl" => {
                if let Some(table) = self.tables.pop() {
                    if self.tables.is_empty() {
                        self.document.tables.push(table.finish(self.styles));
                    } else {
                        log::debug!("skipping nested table with {} rows", table.rows.len());
                    }
                }
            }
            _ => {}
        }
    }

    fn text(&mut self, text: &str) {
        if self.in_text && self.paragraph_depth == 1 {
            self.paragraph.push_str(text);
        }
    }

    fn finish_paragraph(&mut self) {
        let text = std::mem::take(&mut self.paragraph);
        self.in_text = false;
        if self.tables.is_empty() {
            self.document.paragraphs.push(text);
        } else if let Some(cell) = self.current_cell() {
            cell.paragraphs.push(text);
        }
    }
}

/// `word/document.xml`の内容を解析する
pub(crate) fn parse_document_xml(xml: &[u8], styles: &StyleSheet) -> Result<DocxDocument, BlockyError> {
    let mut reader = Reader::from_reader(xml);
    let mut buf = Vec::new();
    let mut builder = DocumentBuilder::new(styles);

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => builder.start(&e)?,
            Event::Empty(e) => {
                builder.start(&e)?;
                builder.end(e.name().as_ref());
            }
            Event::End(e) => builder.end(e.name().as_ref()),
            Event::Text(t) => builder.text(&t.unescape()?),
            Event::CData(c) => {
                let bytes = c.into_inner();
                builder.text(std::str::from_utf8(&bytes)?);
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    log::debug!(
        "parsed document: {} paragraphs, {} tables",
        builder.document.paragraphs.len(),
        builder.document.tables.len()
    );
    Ok(builder.document)
}
