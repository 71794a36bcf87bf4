//! 助手回复解析：从自由文本中拆出展示文本与食材清单
//!
//! 与上游约定的分隔协议：正文之后可跟 `+++INGREDIENTS:`，再跟逗号分隔的食材，
//! 可选以 `+++` 收尾。协议没有转义，食材名中不能含逗号。解析永不失败，格式不对时尽量恢复。

/// 食材清单起始标记
pub const INGREDIENTS_OPEN: &str = "+++INGREDIENTS:";
/// 食材清单结束标记（可选）
pub const INGREDIENTS_CLOSE: &str = "+++";

/// 解析结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedReply {
    pub display_text: String,
    /// `None`：回复中没有起始标记；`Some(vec![])`：有标记但清单为空
    pub ingredients: Option<Vec<String>>,
}

/// 解析原始回复文本
pub fn parse_reply(raw: &str) -> ParsedReply {
    let Some((before, after)) = raw.split_once(INGREDIENTS_OPEN) else {
        return ParsedReply {
            display_text: raw.to_string(),
            ingredients: None,
        };
    };

    // 没有结束标记时，起始标记之后的全部内容都算清单
    let segment = after
        .split_once(INGREDIENTS_CLOSE)
        .map_or(after, |(list, _)| list);

    let ingredients = segment
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(String::from)
        .collect();

    ParsedReply {
        display_text: before.trim().to_string(),
        ingredients: Some(ingredients),
    }
}
