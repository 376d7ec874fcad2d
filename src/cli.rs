//! Command Line Module
//!
//! 3つの実行ファイル（`excel_to_blocky`、`word_to_blocky`、`word_to_blocky_formatter`）で
//! 共通のコマンドライン処理。
//!
//! 引数の誤り、入力ファイルの不在、変換エラーはすべてコンソールへのメッセージとして報告され、
//! プロセスは常に正常終了します。

use clap::Parser;
use std::ffi::OsString;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::api::Pipeline;
use crate::builder::{Converter, ConverterBuilder};
use crate::error::BlockyError;
use crate::table::TableSnapshot;
use crate::types::{ConversionSummary, ItemSource};

/// 位置引数のみを受け付ける
///
/// ヘルプ・バージョンフラグは無効化し、解析エラーはすべて使用方法の表示に置き換えます。
#[derive(Parser, Debug)]
#[command(disable_help_flag = true, disable_version_flag = true)]
struct CliArgs {
    /// 入力ファイル（`-`で始まる名前も可）
    #[arg(allow_hyphen_values = true)]
    input: String,

    /// 出力ファイル
    #[arg(allow_hyphen_values = true)]
    output: String,
}

/// 1回の実行結果
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    /// 引数の数が正しくないため使用方法を表示した
    Usage,

    /// 入力ファイルが存在しない
    MissingInput,

    /// 出力ファイルを書き込んだ
    Converted(ConversionSummary),

    /// 取り込む項目が見つからなかったため、出力ファイルを作成しなかった
    NothingToImport,

    /// 変換中にエラーが発生した
    Failed,
}

/// プロセスの引数で実行する
///
/// メッセージは標準出力に書き込まれます。
pub fn run(pipeline: Pipeline) {
    let stdout = io::stdout();
    let mut console = stdout.lock();
    if let Err(e) = run_with_args(pipeline, std::env::args_os(), &mut console) {
        log::error!("failed to write to console: {}", e);
    }
}

/// 任意の引数とコンソールで実行する
///
/// # 引数
///
/// * `pipeline` - 実行するパイプライン
/// * `args` - プログラム名を先頭に含む引数列
/// * `console` - ユーザー向けメッセージの出力先
///
/// # 戻り値
///
/// * `Ok(RunOutcome)` - 実行結果（変換エラーもここに含まれる）
/// * `Err(io::Error)` - コンソールへの書き込みに失敗した場合のみ
pub fn run_with_args<I, T, W>(pipeline: Pipeline, args: I, console: &mut W) -> io::Result<RunOutcome>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
    W: Write,
{
    let args = match CliArgs::try_parse_from(args) {
        Ok(args) => args,
        Err(e) => {
            log::debug!("argument parsing failed: {}", e);
            writeln!(console, "{}", pipeline.usage())?;
            return Ok(RunOutcome::Usage);
        }
    };

    if !Path::new(&args.input).is_file() {
        writeln!(console, "Chyba: Vstupný súbor '{}' neexistuje", args.input)?;
        return Ok(RunOutcome::MissingInput);
    }

    if !pipeline.accepts_path(&args.input) {
        writeln!(
            console,
            "Upozornenie: Vstupný súbor '{}' nemusí byť {}",
            args.input,
            pipeline.input_kind()
        )?;
    }

    let source_name = Path::new(&args.input)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| args.input.clone());

    let converter = match ConverterBuilder::new().with_source_name(source_name).build() {
        Ok(converter) => converter,
        Err(e) => {
            writeln!(console, "Chyba: {}", e)?;
            return Ok(RunOutcome::Failed);
        }
    };

    let session = Session {
        converter: &converter,
        input: &args.input,
        output: &args.output,
    };

    match pipeline {
        Pipeline::Spreadsheet => session.spreadsheet(console),
        Pipeline::DocumentItems => session.document_items(console),
        Pipeline::DocumentTable => session.document_table(console),
    }
}

/// 1回の変換に必要な情報
struct Session<'a> {
    converter: &'a Converter,
    input: &'a str,
    output: &'a str,
}

impl Session<'_> {
    fn spreadsheet<W: Write>(&self, console: &mut W) -> io::Result<RunOutcome> {
        writeln!(console, "Načítavam Excel súbor: {}", self.input)?;

        let extraction = match File::open(self.input)
            .map_err(BlockyError::from)
            .and_then(|file| self.converter.read_spreadsheet(file))
        {
            Ok(extraction) => extraction,
            Err(BlockyError::InsufficientColumns { found }) => {
                log::debug!("spreadsheet has {} columns", found);
                writeln!(
                    console,
                    "Chyba: Excel súbor musí obsahovať aspoň 2 stĺpce (popis a suma)"
                )?;
                return Ok(RunOutcome::Failed);
            }
            Err(e) => {
                writeln!(console, "Chyba pri konverzii: {}", e)?;
                return Ok(RunOutcome::Failed);
            }
        };

        writeln!(
            console,
            "Používam stĺpce: '{}' pre popis a '{}' pre sumu",
            extraction.description_column, extraction.amount_column
        )?;
        for row in &extraction.invalid_rows {
            writeln!(
                console,
                "Upozornenie: Riadok {} obsahuje neplatnú sumu: {}",
                row.line, row.raw_amount
            )?;
        }

        let result = self.write_output(|writer| {
            self.converter
                .write_item_report(&extraction.items, extraction.invalid_rows.len(), writer)
        });
        match result {
            Ok(summary) => {
                self.print_item_summary(&summary, console)?;
                Ok(RunOutcome::Converted(summary))
            }
            Err(e) => {
                writeln!(console, "Chyba pri konverzii: {}", e)?;
                Ok(RunOutcome::Failed)
            }
        }
    }

    fn document_items<W: Write>(&self, console: &mut W) -> io::Result<RunOutcome> {
        writeln!(console, "Načítavam Word dokument: {}", self.input)?;

        let extraction = match File::open(self.input)
            .map_err(BlockyError::from)
            .and_then(|file| self.converter.read_document_items(file))
        {
            Ok(extraction) => extraction,
            Err(e) => {
                writeln!(console, "Chyba pri extrakcii údajov z Word dokumentu: {}", e)?;
                writeln!(console, "Neboli nájdené žiadne položky na import.")?;
                return Ok(RunOutcome::Failed);
            }
        };

        if extraction.table_count > 0 {
            writeln!(console, "Dokument obsahuje {} tabuliek.", extraction.table_count)?;
        }
        if extraction.source == ItemSource::Paragraphs {
            writeln!(
                console,
                "Neboli nájdené žiadne údaje v tabuľkách, pokúšam sa extrahovať údaje z textu..."
            )?;
        }
        writeln!(console, "Celkovo nájdených položiek: {}", extraction.items.len())?;

        if extraction.items.is_empty() {
            writeln!(console, "Neboli nájdené žiadne položky na import.")?;
            return Ok(RunOutcome::NothingToImport);
        }

        let result = self.write_output(|writer| {
            self.converter.write_item_report(&extraction.items, 0, writer)
        });
        match result {
            Ok(summary) => {
                self.print_item_summary(&summary, console)?;
                Ok(RunOutcome::Converted(summary))
            }
            Err(e) => {
                writeln!(console, "Chyba pri ukladaní do textového súboru: {}", e)?;
                Ok(RunOutcome::Failed)
            }
        }
    }

    fn document_table<W: Write>(&self, console: &mut W) -> io::Result<RunOutcome> {
        writeln!(console, "Načítavam Word dokument: {}", self.input)?;

        let document = match File::open(self.input)
            .map_err(BlockyError::from)
            .and_then(|file| self.converter.read_document(file))
        {
            Ok(document) => document,
            Err(e) => {
                writeln!(console, "Chyba pri extrakcii údajov z Word dokumentu: {}", e)?;
                writeln!(console, "Neboli nájdené žiadne údaje v tabuľke.")?;
                return Ok(RunOutcome::Failed);
            }
        };

        if !document.tables.is_empty() {
            writeln!(console, "Dokument obsahuje {} tabuliek.", document.tables.len())?;
            writeln!(console, "Spracovávam tabuľku...")?;
        }

        let snapshot = match TableSnapshot::from_document(&document) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                writeln!(console, "Chyba pri extrakcii údajov z Word dokumentu: {}", e)?;
                writeln!(console, "Neboli nájdené žiadne údaje v tabuľke.")?;
                return Ok(RunOutcome::NothingToImport);
            }
        };
        writeln!(
            console,
            "Extrakcia dokončená. Nájdených {} riadkov.",
            snapshot.rows.len()
        )?;

        match self.write_output(|writer| self.converter.write_table_report(&snapshot, writer)) {
            Ok(summary) => {
                writeln!(
                    console,
                    "Tabuľka bola úspešne vytvorená. Výstupný súbor: {}",
                    self.output
                )?;
                Ok(RunOutcome::Converted(summary))
            }
            Err(e) => {
                writeln!(console, "Chyba pri vytváraní tabuľky: {}", e)?;
                Ok(RunOutcome::Failed)
            }
        }
    }

    /// 出力ファイルを作成（上書き）して書き込む
    fn write_output<F>(&self, write: F) -> Result<ConversionSummary, BlockyError>
    where
        F: FnOnce(&mut BufWriter<File>) -> Result<ConversionSummary, BlockyError>,
    {
        let mut writer = BufWriter::new(File::create(self.output)?);
        let summary = write(&mut writer)?;
        writer.flush()?;
        Ok(summary)
    }

    fn print_item_summary<W: Write>(&self, summary: &ConversionSummary, console: &mut W) -> io::Result<()> {
        writeln!(console, "Konverzia dokončená. Výstupný súbor: {}", self.output)?;
        writeln!(console, "Celkový počet položiek: {}", summary.item_count)?;
        writeln!(console, "Celková suma: {:.2}", summary.total)?;
        if summary.invalid_count > 0 {
            writeln!(console, "Počet neplatných položiek: {}", summary.invalid_count)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_capture(pipeline: Pipeline, args: &[&str]) -> (RunOutcome, String) {
        let mut console = Vec::new();
        let outcome = run_with_args(pipeline, args.iter().copied(), &mut console).unwrap();
        (outcome, String::from_utf8(console).unwrap())
    }

    #[test]
    fn test_wrong_argument_count_prints_usage() {
        let (outcome, text) = run_capture(Pipeline::Spreadsheet, &["excel_to_blocky", "only.xlsx"]);
        assert_eq!(outcome, RunOutcome::Usage);
        assert!(text.starts_with("Použitie:"));
        assert!(text.contains("excel_to_blocky input.xlsx output.txt"));

        let (outcome, _) = run_capture(Pipeline::Spreadsheet, &["excel_to_blocky", "a", "b", "c"]);
        assert_eq!(outcome, RunOutcome::Usage);
    }

    #[test]
    fn test_help_flag_prints_usage() {
        let (outcome, text) = run_capture(Pipeline::DocumentItems, &["word_to_blocky", "--help"]);
        assert_eq!(outcome, RunOutcome::Usage);
        assert!(text.contains("word_to_blocky input.docx output.txt"));
    }

    #[test]
    fn test_missing_input_is_reported() {
        let (outcome, text) = run_capture(
            Pipeline::DocumentTable,
            &["word_to_blocky_formatter", "/nonexistent/dir/tabulka.docx", "out.txt"],
        );
        assert_eq!(outcome, RunOutcome::MissingInput);
        assert_eq!(
            text,
            "Chyba: Vstupný súbor '/nonexistent/dir/tabulka.docx' neexistuje\n"
        );
    }

    #[test]
    fn test_paths_starting_with_hyphen_are_positionals() {
        let (outcome, text) = run_capture(
            Pipeline::Spreadsheet,
            &["excel_to_blocky", "-vydavky-neexistuje.xlsx", "-out.txt"],
        );
        assert_eq!(outcome, RunOutcome::MissingInput);
        assert_eq!(text, "Chyba: Vstupný súbor '-vydavky-neexistuje.xlsx' neexistuje\n");
    }
}
