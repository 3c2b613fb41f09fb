//! Task file → IssueRequest → Issue → Card.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, de};
use serde_yaml_ng::Value;

use super::errors::TaskFileError;
use super::ids::{CardId, ColumnId, IssueId};

/// カンマ区切り文字列、または YAML のシーケンスで書ける属性。
///
/// `labels: 42` のようなスカラーは文字列として扱います（`title: 123` と同じ）。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListAttribute {
    Joined(String),
    Items(Vec<String>),
}

const LIST_EXPECTED: &str = "expected a comma-separated string or a list of strings";

impl<'de> Deserialize<'de> for ListAttribute {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match Value::deserialize(deserializer)? {
            Value::Sequence(items) => items
                .into_iter()
                .map(scalar_text)
                .collect::<Option<Vec<_>>>()
                .map(ListAttribute::Items)
                .ok_or_else(|| de::Error::custom(LIST_EXPECTED)),
            other => scalar_text(other)
                .map(ListAttribute::Joined)
                .ok_or_else(|| de::Error::custom(LIST_EXPECTED)),
        }
    }
}

fn scalar_text(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

impl ListAttribute {
    /// カンマで分割して trim した一覧。重複は落とし、順序は最初に出た順。
    ///
    /// 文字列が空（シーケンスなら要素なし）のときだけ `None`（空の一覧ではなく「指定なし」）。
    /// 空でなければ分割結果をそのまま使うので、`"a,,b"` は空の要素を含みます。
    pub fn to_set(&self) -> Option<Vec<String>> {
        let raw: Vec<&str> = match self {
            ListAttribute::Joined(s) if s.is_empty() => return None,
            ListAttribute::Joined(s) => s.split(',').collect(),
            ListAttribute::Items(items) if items.is_empty() => return None,
            ListAttribute::Items(items) => items.iter().map(String::as_str).collect(),
        };

        let mut out: Vec<String> = Vec::new();
        for item in raw.into_iter().map(str::trim) {
            if !out.iter().any(|seen| seen == item) {
                out.push(item.to_string());
            }
        }
        Some(out)
    }
}

/// front-matter の属性。知らないキーは無視します。
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TaskAttributes {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub assignees: Option<ListAttribute>,
    #[serde(default)]
    pub labels: Option<ListAttribute>,
}

/// 分解済みのタスクファイル 1 件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskFile {
    /// folder 内のファイル名（失敗報告のタグに使う）
    pub name: String,
    pub attributes: TaskAttributes,
    pub body: String,
}

/// issue 作成リクエスト。TaskFile と 1:1 に対応します。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IssueRequest {
    pub title: String,
    pub body: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignees: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<Vec<String>>,
}

impl TryFrom<&TaskFile> for IssueRequest {
    type Error = TaskFileError;

    fn try_from(file: &TaskFile) -> Result<Self, Self::Error> {
        let title = file
            .attributes
            .title
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .ok_or(TaskFileError::MissingTitle)?;

        Ok(Self {
            title: title.to_string(),
            body: file.body.clone(),
            assignees: file.attributes.assignees.as_ref().and_then(ListAttribute::to_set),
            labels: file.attributes.labels.as_ref().and_then(ListAttribute::to_set),
        })
    }
}

/// 作成に成功した issue
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    pub id: IssueId,
    /// リポジトリ内の番号（`#12`）
    pub number: u64,
    pub title: String,
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} {:?}", self.number, self.title)
    }
}

/// card が参照するコンテンツの種類。今は Issue のみ。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContentType {
    Issue,
}

impl ContentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Issue => "Issue",
        }
    }
}

/// column 上の card。参照先 issue の作成が成功したときだけ作られます。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub id: CardId,
    pub column_id: ColumnId,
    pub content_id: IssueId,
    pub content_type: ContentType,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn task(attributes: TaskAttributes) -> TaskFile {
        TaskFile {
            name: "task.md".to_string(),
            attributes,
            body: "Steps...".to_string(),
        }
    }

    #[test]
    fn request_copies_title_and_body() {
        let file = task(TaskAttributes {
            title: Some("Fix bug".to_string()),
            ..Default::default()
        });

        let req = IssueRequest::try_from(&file).unwrap();
        assert_eq!(req.title, "Fix bug");
        assert_eq!(req.body, "Steps...");
        assert_eq!(req.assignees, None);
        assert_eq!(req.labels, None);
    }

    #[rstest]
    #[case::simple("bug,p1", Some(vec!["bug", "p1"]))]
    #[case::spaced(" bug ,  p1 ", Some(vec!["bug", "p1"]))]
    #[case::single("bug", Some(vec!["bug"]))]
    #[case::empty("", None)]
    #[case::blank(" ", Some(vec![""]))]
    #[case::empty_item("a,,b", Some(vec!["a", "", "b"]))]
    #[case::duplicates("bug,bug,p1", Some(vec!["bug", "p1"]))]
    fn joined_list_is_trimmed_comma_split(
        #[case] raw: &str,
        #[case] expected: Option<Vec<&str>>,
    ) {
        let attr = ListAttribute::Joined(raw.to_string());
        let expected = expected.map(|v| v.into_iter().map(String::from).collect::<Vec<_>>());
        assert_eq!(attr.to_set(), expected);
    }

    #[test]
    fn sequence_list_is_accepted() {
        let attr = ListAttribute::Items(vec!["alice".into(), " bob ".into()]);
        assert_eq!(
            attr.to_set(),
            Some(vec!["alice".to_string(), "bob".to_string()])
        );
    }

    #[test]
    fn empty_sequence_is_absent() {
        assert_eq!(ListAttribute::Items(vec![]).to_set(), None);
    }

    #[rstest]
    #[case::number("labels: 42", ListAttribute::Joined("42".into()))]
    #[case::boolean("labels: true", ListAttribute::Joined("true".into()))]
    #[case::string("labels: bug,p1", ListAttribute::Joined("bug,p1".into()))]
    #[case::mixed_sequence("labels: [bug, 7]", ListAttribute::Items(vec!["bug".into(), "7".into()]))]
    fn scalar_list_values_are_read_as_text(#[case] yaml: &str, #[case] expected: ListAttribute) {
        let attrs: TaskAttributes = serde_yaml_ng::from_str(yaml).unwrap();
        assert_eq!(attrs.labels, Some(expected));
    }

    #[test]
    fn mapping_list_value_is_rejected_with_a_readable_message() {
        let err = serde_yaml_ng::from_str::<TaskAttributes>("labels: {a: 1}").unwrap_err();
        assert!(err.to_string().contains(LIST_EXPECTED), "{err}");
    }

    #[test]
    fn request_carries_assignees_and_labels() {
        let file = task(TaskAttributes {
            title: Some("Fix bug".to_string()),
            assignees: Some(ListAttribute::Joined("alice, bob".to_string())),
            labels: Some(ListAttribute::Joined("bug,p1".to_string())),
        });

        let req = IssueRequest::try_from(&file).unwrap();
        assert_eq!(req.assignees, Some(vec!["alice".into(), "bob".into()]));
        assert_eq!(req.labels, Some(vec!["bug".into(), "p1".into()]));
    }

    #[rstest]
    #[case::absent(None)]
    #[case::blank(Some("   "))]
    fn request_without_title_is_rejected(#[case] title: Option<&str>) {
        let file = task(TaskAttributes {
            title: title.map(String::from),
            ..Default::default()
        });
        assert!(matches!(
            IssueRequest::try_from(&file),
            Err(TaskFileError::MissingTitle)
        ));
    }

    #[test]
    fn absent_lists_are_not_serialized() {
        let req = IssueRequest {
            title: "t".into(),
            body: "b".into(),
            assignees: None,
            labels: Some(vec!["bug".into()]),
        };
        let json = serde_json::to_value(&req).unwrap();
        assert!(json.get("assignees").is_none());
        assert_eq!(json["labels"], serde_json::json!(["bug"]));
    }
}
