//! 文档字段回退解析
//!
//! 公园文档的字段来源并不统一（`image`/`cover`/`icon`、`tags`/`sceneTags` 等），
//! 每个视图字段用一条 [`FieldChain`] 描述候选字段的优先级和默认值，
//! 各个视图共享同一套解析规则。

use serde_json::Value;

/// 单个视图字段的候选来源
#[derive(Debug, Clone, Copy)]
pub struct FieldChain {
    candidates: &'static [&'static str],
}

impl FieldChain {
    pub const fn new(candidates: &'static [&'static str]) -> Self {
        Self { candidates }
    }

    /// 按优先级返回第一个有效值
    ///
    /// 空字符串、0、`false`、`null` 和空数组都视为无效。
    pub fn first<'a>(&self, doc: &'a Value) -> Option<&'a Value> {
        self.candidates
            .iter()
            .filter_map(|name| doc.get(*name))
            .find(|value| is_truthy(value))
    }

    /// 返回第一个存在且不为 `null` 的值，不做真值判断
    pub fn present<'a>(&self, doc: &'a Value) -> Option<&'a Value> {
        self.candidates
            .iter()
            .filter_map(|name| doc.get(*name))
            .find(|value| !value.is_null())
    }

    /// 解析为字符串，数字会被格式化为字符串
    pub fn string(&self, doc: &Value) -> Option<String> {
        self.first(doc).and_then(|value| match value {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
    }

    pub fn string_or(&self, doc: &Value, default: &str) -> String {
        self.string(doc).unwrap_or_else(|| default.to_string())
    }

    /// 解析为数字，数字字符串也会被接受
    pub fn number(&self, doc: &Value) -> Option<f64> {
        self.first(doc).and_then(|value| match value {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        })
    }

    /// 解析为数字，0 也是有效值，只有缺失或 `null` 才继续尝试下一个候选
    pub fn present_number(&self, doc: &Value) -> Option<f64> {
        self.present(doc).and_then(|value| match value {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        })
    }

    /// 返回第一个数组类型的候选，空数组也算，字符串不会被拆分
    pub fn array(&self, doc: &Value) -> Option<Vec<String>> {
        self.candidates
            .iter()
            .filter_map(|name| doc.get(*name).and_then(Value::as_array))
            .next()
            .map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
    }

    /// 解析为字符串列表
    ///
    /// 数组取其中的非空字符串；字符串按逗号拆分并去掉空白。
    pub fn string_list(&self, doc: &Value) -> Option<Vec<String>> {
        self.first(doc).and_then(|value| match value {
            Value::Array(items) => Some(
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect(),
            ),
            Value::String(s) => Some(
                s.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect(),
            ),
            _ => None,
        })
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0 && !n.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const IMAGE: FieldChain = FieldChain::new(&["image", "cover", "icon"]);

    #[test]
    fn test_first_truthy_candidate_wins() {
        let doc = json!({ "image": "", "cover": null, "icon": "icons/park.png" });
        assert_eq!(IMAGE.string(&doc).as_deref(), Some("icons/park.png"));

        let doc = json!({ "image": "a.jpg", "icon": "b.png" });
        assert_eq!(IMAGE.string(&doc).as_deref(), Some("a.jpg"));
    }

    #[test]
    fn test_default_when_nothing_matches() {
        let doc = json!({ "name": "x" });
        assert_eq!(IMAGE.string(&doc), None);
        assert_eq!(IMAGE.string_or(&doc, "default.png"), "default.png");
    }

    #[test]
    fn test_number_accepts_strings_and_skips_zero() {
        let rating = FieldChain::new(&["rating", "score"]);
        assert_eq!(rating.number(&json!({ "rating": 0, "score": "4.5" })), Some(4.5));
        assert_eq!(rating.number(&json!({ "rating": 3 })), Some(3.0));
        assert_eq!(rating.number(&json!({ "rating": "abc" })), None);
    }

    #[test]
    fn test_string_list_from_array_or_csv() {
        let tags = FieldChain::new(&["tags", "sceneTags"]);
        assert_eq!(
            tags.string_list(&json!({ "tags": [], "sceneTags": ["亲子", ""] })),
            Some(vec!["亲子".to_string()])
        );
        assert_eq!(
            tags.string_list(&json!({ "tags": "帐篷区, 滨海休闲,," })),
            Some(vec!["帐篷区".to_string(), "滨海休闲".to_string()])
        );
        assert_eq!(tags.string_list(&json!({ "tags": 1 })), None);
    }

    #[test]
    fn test_array_takes_first_array_even_if_empty() {
        let tags = FieldChain::new(&["tags", "sceneTags"]);
        assert_eq!(
            tags.array(&json!({ "tags": [], "sceneTags": ["亲子"] })),
            Some(Vec::new())
        );
        assert_eq!(
            tags.array(&json!({ "tags": "亲子,观景", "sceneTags": ["观景"] })),
            Some(vec!["观景".to_string()])
        );
        assert_eq!(tags.array(&json!({ "tags": "亲子,观景" })), None);
    }

    #[test]
    fn test_present_number_keeps_zero() {
        let latitude = FieldChain::new(&["latitude"]);
        assert_eq!(latitude.present_number(&json!({ "latitude": 0 })), Some(0.0));
        assert_eq!(latitude.present_number(&json!({ "latitude": null })), None);
        assert_eq!(latitude.present_number(&json!({})), None);
        assert_eq!(latitude.number(&json!({ "latitude": 0 })), None);
    }
}
