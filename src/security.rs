//! Security Module
//!
//! 入力ドキュメント（ZIPコンテナ）に対するセキュリティ対策を実装するモジュール。
//! ZIP bomb攻撃、パストラバーサル攻撃、巨大ファイルへの対策を提供します。

use std::io::{Read, Seek};
use zip::ZipArchive;

use crate::error::BlockyError;

/// セキュリティ設定
///
/// 入力ファイル処理時の上限値を定義します。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecurityConfig {
    /// 展開後の合計最大サイズ（バイト）
    /// デフォルト: 1GB
    pub max_decompressed_size: u64,
    /// ZIPアーカイブ内の最大エントリ数
    /// デフォルト: 10000
    pub max_file_count: usize,
    /// 単一エントリの最大サイズ（バイト）
    /// デフォルト: 100MB
    pub max_file_size: u64,
    /// 入力ファイルの最大サイズ（バイト）
    /// デフォルト: 2GB
    pub max_input_file_size: u64,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            max_decompressed_size: 1_073_741_824, // 1GB
            max_file_count: 10_000,
            max_file_size: 104_857_600,         // 100MB
            max_input_file_size: 2_147_483_648, // 2GB
        }
    }
}

impl SecurityConfig {
    /// 入力全体をメモリに読み込み、サイズ上限を検証する
    pub(crate) fn read_input<R: Read>(&self, mut reader: R) -> Result<Vec<u8>, BlockyError> {
        let mut buffer = Vec::new();
        // 上限+1バイトまでしか読まない
        let limit = self.max_input_file_size.saturating_add(1);
        let bytes_read = reader.by_ref().take(limit).read_to_end(&mut buffer)?;

        if bytes_read as u64 > self.max_input_file_size {
            return Err(BlockyError::SecurityViolation(format!(
                "Input file size exceeds maximum: more than {} bytes",
                self.max_input_file_size
            )));
        }

        Ok(buffer)
    }

    /// ZIPアーカイブのエントリ数・サイズ・パスを検証する
    ///
    /// # 戻り値
    ///
    /// * `Ok(())` - すべての制限を満たす場合
    /// * `Err(BlockyError::SecurityViolation)` - いずれかの制限に違反した場合
    pub(crate) fn check_archive<R: Read + Seek>(
        &self,
        archive: &mut ZipArchive<R>,
    ) -> Result<(), BlockyError> {
        if archive.len() > self.max_file_count {
            return Err(BlockyError::SecurityViolation(format!(
                "ZIP archive contains too many files: {} (max: {})",
                archive.len(),
                self.max_file_count
            )));
        }

        let mut total_decompressed_size = 0u64;
        for i in 0..archive.len() {
            let file = archive.by_index(i)?;
            let file_name = file.name();

            validate_zip_path(file_name)
                .map_err(|e| BlockyError::SecurityViolation(format!("Invalid ZIP path: {}", e)))?;

            let file_size = file.size();
            if file_size > self.max_file_size {
                return Err(BlockyError::SecurityViolation(format!(
                    "File '{}' exceeds maximum size: {} bytes (max: {} bytes)",
                    file_name, file_size, self.max_file_size
                )));
            }

            total_decompressed_size = total_decompressed_size
                .checked_add(file_size)
                .ok_or_else(|| {
                    BlockyError::SecurityViolation(
                        "Total decompressed size calculation overflow".to_string(),
                    )
                })?;

            if total_decompressed_size > self.max_decompressed_size {
                return Err(BlockyError::SecurityViolation(format!(
                    "Total decompressed size exceeds maximum: {} bytes (max: {} bytes)",
                    total_decompressed_size, self.max_decompressed_size
                )));
            }
        }

        Ok(())
    }
}

/// ZIPエントリ名の検証
///
/// 空のパス、絶対パス、`..`、バックスラッシュを含むパスを拒否します。
pub(crate) fn validate_zip_path(path: &str) -> Result<(), String> {
    if path.is_empty() {
        return Err("Empty path is not allowed".to_string());
    }

    let bytes = path.as_bytes();
    let has_drive = bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':';
    if path.starts_with('/') || has_drive {
        return Err(format!("Absolute path is not allowed: {}", path));
    }

    if path.split('/').any(|segment| segment == "..") {
        return Err(format!("Path traversal detected: {}", path));
    }

    if path.contains('\\') {
        return Err(format!("Backslash in path is not allowed: {}", path));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};
    use zip::write::{FileOptions, ZipWriter};

    fn archive_with(entries: &[(&str, &[u8])]) -> ZipArchive<Cursor<Vec<u8>>> {
        let mut data = Vec::new();
        {
            let mut zip = ZipWriter::new(Cursor::new(&mut data));
            for (name, content) in entries {
                zip.start_file(*name, FileOptions::default()).unwrap();
                zip.write_all(content).unwrap();
            }
            zip.finish().unwrap();
        }
        ZipArchive::new(Cursor::new(data)).unwrap()
    }

    #[test]
    fn test_validate_zip_path_valid() {
        assert!(validate_zip_path("word/document.xml").is_ok());
        assert!(validate_zip_path("word/styles.xml").is_ok());
        assert!(validate_zip_path("[Content_Types].xml").is_ok());
        assert!(validate_zip_path("word/..hidden.xml").is_ok());
    }

    #[test]
    fn test_validate_zip_path_rejects_unsafe() {
        assert!(validate_zip_path("").is_err());
        assert!(validate_zip_path("/etc/passwd").is_err());
        assert!(validate_zip_path("C:\\Windows\\system32").is_err());
        assert!(validate_zip_path("d:/word/document.xml").is_err());
        assert!(validate_zip_path("word/../../etc/passwd").is_err());
        assert!(validate_zip_path("..").is_err());
        assert!(validate_zip_path("word\\document.xml").is_err());
    }

    #[test]
    fn test_check_archive_accepts_small_document() {
        let mut archive = archive_with(&[("word/document.xml", b"<w:document/>")]);
        assert!(SecurityConfig::default().check_archive(&mut archive).is_ok());
    }

    #[test]
    fn test_check_archive_too_many_files() {
        let config = SecurityConfig {
            max_file_count: 2,
            ..SecurityConfig::default()
        };
        let mut archive = archive_with(&[("a.xml", b"a"), ("b.xml", b"b"), ("c.xml", b"c")]);

        match config.check_archive(&mut archive) {
            Err(BlockyError::SecurityViolation(msg)) => assert!(msg.contains("too many files")),
            other => panic!("Expected SecurityViolation, got {:?}", other),
        }
    }

    #[test]
    fn test_check_archive_entry_too_large() {
        let config = SecurityConfig {
            max_file_size: 4,
            ..SecurityConfig::default()
        };
        let mut archive = archive_with(&[("word/document.xml", b"0123456789")]);

        match config.check_archive(&mut archive) {
            Err(BlockyError::SecurityViolation(msg)) => assert!(msg.contains("exceeds maximum size")),
            other => panic!("Expected SecurityViolation, got {:?}", other),
        }
    }

    #[test]
    fn test_check_archive_total_size() {
        let config = SecurityConfig {
            max_decompressed_size: 15,
            ..SecurityConfig::default()
        };
        let mut archive = archive_with(&[("a.xml", b"0123456789"), ("b.xml", b"0123456789")]);

        match config.check_archive(&mut archive) {
            Err(BlockyError::SecurityViolation(msg)) => assert!(msg.contains("decompressed size")),
            other => panic!("Expected SecurityViolation, got {:?}", other),
        }
    }

    #[test]
    fn test_read_input_limit() {
        let config = SecurityConfig {
            max_input_file_size: 8,
            ..SecurityConfig::default()
        };
        assert_eq!(config.read_input(Cursor::new(b"12345678".to_vec())).unwrap().len(), 8);
        assert!(matches!(
            config.read_input(Cursor::new(b"123456789".to_vec())),
            Err(BlockyError::SecurityViolation(_))
        ));
    }
}
