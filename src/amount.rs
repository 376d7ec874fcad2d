//! Amount Module
//!
//! 金額テキストの抽出と、出力用の数値フォーマットを提供するモジュール。
//!
//! 2種類の抽出ルールがあります。
//!
//! - [`extract_amount`]: 数字・`-`・`.`・`,`以外の文字をすべて除去してから解析する
//!   （Wordのテーブル/段落から行リストを作る場合）
//! - [`find_amount`]: セル内で最初に現れる数値部分だけを解析する
//!   （ASCIIテーブルの合計を計算する場合）

use std::sync::OnceLock;

use regex::Regex;

/// 段落テキストから「popis: suma」を探すパターン
const PARAGRAPH_ITEM_PATTERN: &str = r"([^:]+):\s*(-?\d+[.,]?\d*)\s*€?";

/// セル内の最初の数値を探すパターン
const LEADING_NUMBER_PATTERN: &str = r"(-?\d+[.,]?\d*)";

fn paragraph_item_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(PARAGRAPH_ITEM_PATTERN).expect("valid paragraph pattern"))
}

fn leading_number_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(LEADING_NUMBER_PATTERN).expect("valid number pattern"))
}

/// テキストから金額を抽出する
///
/// 数字、マイナス記号、ピリオド、カンマ以外の文字をすべて除去し、
/// カンマをピリオドに置き換えてから`f64`として解析します。
///
/// # 戻り値
///
/// * `Some(f64)` - 解析に成功した場合
/// * `None` - 数値として解析できない場合（空文字列、`1.2.3`など）
///
/// # 使用例
///
/// ```rust
/// use blocky_import::extract_amount;
///
/// assert_eq!(extract_amount("123,45"), Some(123.45));
/// assert_eq!(extract_amount("-12.3€"), Some(-12.3));
/// assert_eq!(extract_amount("abc"), None);
/// ```
pub fn extract_amount(text: &str) -> Option<f64> {
    let cleaned: String = text
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, '-' | '.' | ','))
        .map(|c| if c == ',' { '.' } else { c })
        .collect();

    cleaned.parse::<f64>().ok()
}

/// セル内で最初に現れる数値を金額として解析する
///
/// `1 234,50`のような桁区切りは考慮せず、最初の数値部分（`1`）だけを使います。
pub fn find_amount(text: &str) -> Option<f64> {
    let found = leading_number_regex().find(text)?;
    found.as_str().replace(',', ".").parse::<f64>().ok()
}

/// 段落テキストから「popis: suma」形式の組をすべて抽出する
///
/// 重ならない一致をすべて返します。金額部分が解析できない一致は除外されます。
pub(crate) fn paragraph_items(text: &str) -> Vec<(String, f64)> {
    paragraph_item_regex()
        .captures_iter(text)
        .filter_map(|caps| {
            let description = caps.get(1)?.as_str().trim().to_string();
            let amount = extract_amount(caps.get(2)?.as_str())?;
            Some((description, amount))
        })
        .collect()
}

/// 行リスト用の金額表記（小数2桁、小数点はカンマ）
///
/// 例: `1234.5` → `1234,50`
pub fn format_amount(amount: f64) -> String {
    format!("{:.2}", amount).replace('.', ",")
}
