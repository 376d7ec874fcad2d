//! Public API Types
//!
//! 公開APIで使用する列挙型を定義するモジュール。

/// 変換パイプラインの種類
///
/// 3つのコマンドラインツールそれぞれに対応します。各パイプラインは独立しており、
/// 入力の解析から出力の書き込みまで直線的に処理されます。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pipeline {
    /// Excel（`.xlsx`/`.xls`）の先頭2列を「popis | suma」形式の行リストに変換
    Spreadsheet,

    /// Word（`.docx`）のテーブル、またはテーブルがない場合は段落の
    /// 「popis: suma」パターンから行リストを生成
    DocumentItems,

    /// Word（`.docx`）の最初のテーブルを、見た目を保ったままASCIIテーブルとして出力
    DocumentTable,
}

impl Pipeline {
    /// 実行ファイル名
    pub fn program_name(&self) -> &'static str {
        match self {
            Pipeline::Spreadsheet => "excel_to_blocky",
            Pipeline::DocumentItems => "word_to_blocky",
            Pipeline::DocumentTable => "word_to_blocky_formatter",
        }
    }

    /// 受け付ける入力ファイルの拡張子（小文字、ドット付き）
    pub fn expected_extensions(&self) -> &'static [&'static str] {
        match self {
            Pipeline::Spreadsheet => &[".xlsx", ".xls"],
            Pipeline::DocumentItems | Pipeline::DocumentTable => &[".docx"],
        }
    }

    /// 使用例に表示する入力ファイル名
    pub(crate) fn sample_input(&self) -> &'static str {
        match self {
            Pipeline::Spreadsheet => "input.xlsx",
            Pipeline::DocumentItems | Pipeline::DocumentTable => "input.docx",
        }
    }

    /// 入力ファイルの種類（コンソールメッセージ用）
    pub(crate) fn input_kind(&self) -> &'static str {
        match self {
            Pipeline::Spreadsheet => "Excel súbor",
            Pipeline::DocumentItems | Pipeline::DocumentTable => "Word dokument",
        }
    }

    /// 入力パスの拡張子が期待どおりかを判定（大文字小文字は区別する）
    ///
    /// 判定結果は警告の表示にのみ使用され、処理はブロックされません。
    pub fn accepts_path(&self, path: &str) -> bool {
        self.expected_extensions()
            .iter()
            .any(|ext| path.ends_with(ext))
    }

    /// 使用方法のテキスト
    pub fn usage(&self) -> String {
        let input = self.sample_input();
        format!(
            "Použitie:\n  {program} {input} output.txt\n\nParametre:\n  {input:<11} - Vstupný {kind}\n  {output:<11} - Výstupný textový súbor",
            program = self.program_name(),
            input = input,
            kind = self.input_kind(),
            output = "output.txt",
        )
    }
}

/// シート選択方式
///
/// スプレッドシートパイプラインで読み込むシートを指定します。
/// デフォルトは最初のシートです。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SheetSelector {
    /// インデックスで選択（0始まり）
    Index(usize),

    /// 名前で選択
    Name(String),
}

impl Default for SheetSelector {
    fn default() -> Self {
        SheetSelector::Index(0)
    }
}
