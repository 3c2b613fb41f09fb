//! TaskSource port - タスクファイルの置き場所

use std::ffi::OsString;
use std::io;
use std::path::Path;

use async_trait::async_trait;

/// TaskSource はタスクファイルの列挙と読み込みを提供
///
/// - `list_entries` は同期・一回きり。列挙後に追加されたファイルは見えない
///   名前は OS のままの形で返す（UTF-8 でない名前もそのまま `read_file` に使える）
/// - `read_file` は非同期。ファイルごとに独立して呼ばれる
#[async_trait]
pub trait TaskSource: Send + Sync {
    fn list_entries(&self, folder: &Path) -> io::Result<Vec<OsString>>;

    async fn read_file(&self, path: &Path) -> io::Result<String>;
}
