//! FsTaskSource - ローカルファイルシステム上のタスクフォルダ

use std::ffi::OsString;
use std::io;
use std::path::Path;

use async_trait::async_trait;

use crate::ports::TaskSource;

/// 列挙は `std::fs::read_dir`（同期・一回きり）、読み込みは `tokio::fs`。
#[derive(Debug, Clone, Copy, Default)]
pub struct FsTaskSource;

#[async_trait]
impl TaskSource for FsTaskSource {
    /// 通常ファイルの名前だけを名前順で返す（サブディレクトリは対象外）
    fn list_entries(&self, folder: &Path) -> io::Result<Vec<OsString>> {
        let mut names = Vec::new();
        for entry in std::fs::read_dir(folder)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            names.push(entry.file_name());
        }
        names.sort();
        Ok(names)
    }

    async fn read_file(&self, path: &Path) -> io::Result<String> {
        tokio::fs::read_to_string(path).await
    }
}
