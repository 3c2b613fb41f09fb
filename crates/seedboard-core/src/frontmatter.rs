//! YAML front-matter の分解
//!
//! タスクファイルは先頭の `---` で囲まれた YAML 属性と、その後ろの本文からなります。
//!
//! ```markdown
//! ---
//! title: Fix bug
//! labels: bug,p1
//! ---
//! Steps...
//! ```
//!
//! 開きの `---` は 1 行目（BOM の直後）にある場合だけ認識します。閉じは `---` か `...`。
//! 区切りが無いファイルは「属性なし・全体が本文」として扱います。
//! YAML が壊れている、または mapping でない場合はエラーです。

use crate::domain::{TaskAttributes, TaskFileError};

/// 分解結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontMatter {
    pub attributes: TaskAttributes,
    pub body: String,
}

const DELIMITER: &str = "---";
/// YAML の document end marker。閉じ区切りとしても使える。
const DOCUMENT_END: &str = "...";

pub fn parse(raw: &str) -> Result<FrontMatter, TaskFileError> {
    let content = raw.strip_prefix('\u{feff}').unwrap_or(raw);

    let Some((yaml, body)) = split(content) else {
        return Ok(FrontMatter {
            attributes: TaskAttributes::default(),
            body: content.to_string(),
        });
    };

    let attributes = if yaml.trim().is_empty() {
        TaskAttributes::default()
    } else {
        serde_yaml_ng::from_str::<Option<TaskAttributes>>(yaml)
            .map_err(|e| TaskFileError::FrontMatter(e.to_string()))?
            .unwrap_or_default()
    };

    Ok(FrontMatter {
        attributes,
        body: body.to_string(),
    })
}

/// `(yaml, body)` に分ける。開き・閉じの区切り行が揃っていなければ `None`。
fn split(content: &str) -> Option<(&str, &str)> {
    let mut lines = content.split_inclusive('\n');

    let opening = lines.next()?;
    if opening.trim_end() != DELIMITER {
        return None;
    }

    let yaml_start = opening.len();
    let mut offset = yaml_start;
    for line in lines {
        let marker = line.trim_end();
        if marker == DELIMITER || marker == DOCUMENT_END {
            let yaml = &content[yaml_start..offset];
            let body = &content[offset + line.len()..];
            return Some((yaml, body));
        }
        offset += line.len();
    }

    None
}
