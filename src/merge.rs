//! 结果合并去重

use crate::types::AnimeRecord;
use std::collections::HashSet;

/// 合并两组结果，按 `mal_id` 保留首次出现的条目
///
/// 没有有效 id (缺失或为 0) 的条目无法去重，直接丢弃。
pub fn merge(primary: Vec<AnimeRecord>, secondary: Vec<AnimeRecord>) -> Vec<AnimeRecord> {
    let mut seen = HashSet::with_capacity(primary.len() + secondary.len());
    primary
        .into_iter()
        .chain(secondary)
        .filter(|record| match record.mal_id {
            Some(id) if id != 0 => seen.insert(id),
            _ => false,
        })
        .collect()
}
