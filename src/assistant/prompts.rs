//! 会话核心自己合成的提示词

/// 空会话时给用户的起手建议
pub const SUGGESTIONS: [&str; 4] = [
    "What can I cook with my pantry?",
    "Give me a high-protein breakfast idea.",
    "I have too many tomatoes. Recipe ideas?",
    "Explain the health benefits of turmeric.",
];

/// 从菜谱页「开始做这道菜」进入时的首条提示词
pub fn start_cooking_prompt(dish: &str) -> String {
    format!(
        "I want to cook {}. Guide me and list the ingredients.",
        dish.trim()
    )
}

/// 入库成功后的续接提示词
pub fn continuation_prompt(count: usize) -> String {
    format!(
        "I have added {} items to my pantry. Please start the step-by-step cooking guide now.",
        count
    )
}
