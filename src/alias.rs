//! 中文关键词联想
//! 中文查询时给出一个英文/罗马音别名，用于补一次检索提高命中率

use crate::locale::ZH_ALIAS;
use once_cell::sync::Lazy;
use regex::Regex;

/// CJK 统一表意文字 (含扩展 A)
static CJK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\x{3400}-\x{9fff}]").expect("Invalid CJK pattern"));

/// 文本中是否含有中文字符
pub fn is_chinese_text(s: &str) -> bool {
    CJK_RE.is_match(s)
}

/// 根据内置别名表推导检索别名
pub fn derive_alias(query: &str) -> Option<&'static str> {
    derive_alias_in(ZH_ALIAS, query)
}

/// 在任意别名表上推导别名
///
/// 非中文查询不联想；先整词精确匹配，再按表内声明顺序取第一个
/// 被查询包含的键。重叠的键按顺序决胜，不做最长匹配。
pub fn derive_alias_in(
    table: &'static [(&'static str, &'static str)],
    query: &str,
) -> Option<&'static str> {
    if !is_chinese_text(query) {
        return None;
    }
    if let Some((_, alias)) = table.iter().find(|(k, _)| *k == query) {
        return Some(*alias);
    }
    table
        .iter()
        .find(|(k, _)| query.contains(k))
        .map(|(_, alias)| *alias)
}
