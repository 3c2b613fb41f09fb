//! ボード設定ファイル（YAML）の読み込みと検証
//!
//! ```yaml
//! name: Sprint
//! columns:
//!   - Todo
//!   - Doing
//!   - Done
//! folder: ./tasks
//! ```
//!
//! 読み込み時に BoardSpec へ検証してしまい、未定義の値が API 呼び出しまで
//! 流れ込まないようにします。

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::domain::{BoardSpec, ConfigError};

/// 検証前の形。キーの欠落は検証で扱うので全部 Option。
#[derive(Debug, Deserialize)]
struct RawBoardConfig {
    name: Option<String>,
    columns: Option<Vec<String>>,
    folder: Option<PathBuf>,
}

/// 設定ファイルを読み込んで BoardSpec にする
pub fn load_board_spec(path: &Path) -> Result<BoardSpec, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let spec = parse_board_spec(&text)?;
    tracing::debug!(config = %path.display(), ?spec, "loaded board config");
    Ok(spec)
}

pub fn parse_board_spec(text: &str) -> Result<BoardSpec, ConfigError> {
    let raw: RawBoardConfig = serde_yaml_ng::from_str(text)?;

    let name = raw
        .name
        .filter(|n| !n.trim().is_empty())
        .ok_or_else(|| ConfigError::Invalid("`name` is required".to_string()))?;

    let folder = raw
        .folder
        .filter(|f| !f.as_os_str().is_empty())
        .ok_or_else(|| ConfigError::Invalid("`folder` is required".to_string()))?;

    // columns が無い場合はゼロ回のループになるだけ
    let columns = match raw.columns {
        Some(columns) => columns,
        None => {
            tracing::warn!(board = %name, "board config has no `columns`; no columns or issues will be created");
            Vec::new()
        }
    };

    if let Some(index) = columns.iter().position(|c| c.trim().is_empty()) {
        return Err(ConfigError::Invalid(format!(
            "column at index {index} has an empty name"
        )));
    }

    Ok(BoardSpec {
        name,
        columns,
        folder,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::io::Write;

    #[test]
    fn parses_full_config() {
        let spec = parse_board_spec(
            "name: Sprint\ncolumns:\n  - Todo\n  - Doing\n  - Done\nfolder: ./tasks\n",
        )
        .unwrap();

        assert_eq!(spec, BoardSpec::new("Sprint", ["Todo", "Doing", "Done"], "./tasks"));
    }

    #[test]
    fn missing_columns_yields_zero_columns() {
        let spec = parse_board_spec("name: Sprint\nfolder: ./tasks\n").unwrap();
        assert!(spec.columns.is_empty());
    }

    #[rstest]
    #[case::missing_name("columns: [Todo]\nfolder: ./tasks\n")]
    #[case::blank_name("name: ' '\ncolumns: [Todo]\nfolder: ./tasks\n")]
    #[case::missing_folder("name: Sprint\ncolumns: [Todo]\n")]
    #[case::blank_column("name: Sprint\ncolumns: [Todo, '']\nfolder: ./tasks\n")]
    fn rejects_incomplete_config(#[case] text: &str) {
        assert!(matches!(
            parse_board_spec(text),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn rejects_malformed_yaml() {
        assert!(matches!(
            parse_board_spec("name: [Sprint\n"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "name: Sprint\ncolumns: [Todo]\nfolder: tasks").unwrap();

        let spec = load_board_spec(file.path()).unwrap();
        assert_eq!(spec.name, "Sprint");
        assert_eq!(spec.columns, vec!["Todo".to_string()]);
        assert_eq!(spec.folder, PathBuf::from("tasks"));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_board_spec(&dir.path().join("nope.yml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
