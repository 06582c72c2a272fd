//! 展示格式化
//! 把 Jikan 条目转换为中文优先的展示卡片

use crate::alias::is_chinese_text;
use crate::locale::{lookup, STREAM_NAME_ZH, TITLE_ZH, TYPE_ZH};
use crate::types::{AnimeRecord, DisplayCard, StreamLink};
use once_cell::sync::Lazy;
use regex::Regex;

/// 简介最大字符数
pub const SYNOPSIS_MAX_CHARS: usize = 120;

/// 每张卡片最多展示的外链数
pub const MAX_STREAM_LINKS: usize = 4;

/// YouTube 嵌入地址模板
pub const YOUTUBE_EMBED_BASE: &str = "https://www.youtube.com/embed/";

const ELLIPSIS: char = '…';
const UNKNOWN_TITLE: &str = "未知动漫";
const UNKNOWN_TYPE: &str = "未知类型";
const STREAM_FALLBACK: &str = "播放源";
const NO_CHINESE_SYNOPSIS: &str = "暂无中文简介，可点「MAL 条目」查看详情。";
const NO_SYNOPSIS: &str = "暂无简介。";

static WHITESPACE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("Invalid whitespace pattern"));

/// 折叠连续空白并去掉首尾空白
pub fn safe_text(s: &str) -> String {
    WHITESPACE_RE.replace_all(s, " ").trim().to_string()
}

/// 按字符截断，超出时追加省略号
pub fn truncate(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((end, _)) => {
            let mut out = s[..end].to_string();
            out.push(ELLIPSIS);
            out
        }
        None => s.to_string(),
    }
}

fn non_empty(s: &Option<String>) -> Option<&str> {
    s.as_deref().filter(|s| !s.trim().is_empty())
}

/// 本地化作品类型
pub fn localize_type(kind: &str) -> String {
    if let Some(zh) = lookup(TYPE_ZH, kind) {
        return zh.to_string();
    }
    if kind.is_empty() {
        UNKNOWN_TYPE.to_string()
    } else {
        kind.to_string()
    }
}

/// 从词表反查中文标题
fn zh_title_from_dict(record: &AnimeRecord) -> Option<&'static str> {
    let candidates = [&record.title, &record.title_english, &record.title_japanese];
    for candidate in candidates.into_iter().filter_map(non_empty) {
        let key = safe_text(candidate).to_lowercase();
        if let Some((_, zh)) = TITLE_ZH
            .iter()
            .find(|(en, _)| key.contains(&en.to_lowercase()))
        {
            return Some(*zh);
        }
    }
    None
}

/// 展示标题：中文标题 > 词表反查 > 英文标题 > 默认标题
pub fn display_title(record: &AnimeRecord) -> String {
    let title = non_empty(&record.title_chinese)
        .or_else(|| zh_title_from_dict(record))
        .or_else(|| non_empty(&record.title_english))
        .or_else(|| non_empty(&record.title))
        .unwrap_or(UNKNOWN_TITLE);
    safe_text(title)
}

/// 放送年份，缺失时取开播日期中的年份
pub fn release_year(record: &AnimeRecord) -> Option<i32> {
    record.year.filter(|y| *y != 0).or_else(|| {
        record
            .aired
            .as_ref()
            .and_then(|a| a.prop.as_ref())
            .and_then(|p| p.from.as_ref())
            .and_then(|d| d.year)
            .filter(|y| *y != 0)
    })
}

/// 元信息行：`类型 · 年份 · ⭐ 评分`
pub fn anime_meta(record: &AnimeRecord) -> String {
    let kind = localize_type(record.kind.as_deref().unwrap_or(""));
    let year = release_year(record)
        .map(|y| y.to_string())
        .unwrap_or_else(|| "?".to_string());
    let score = record
        .score
        .map(|s| s.to_string())
        .unwrap_or_else(|| "-".to_string());
    format!("{kind} · {year} · ⭐ {score}")
}

/// 简介摘要
///
/// `chinese_only` 为真时，非中文简介替换为提示语。
pub fn synopsis_excerpt(record: &AnimeRecord, chinese_only: bool) -> String {
    let synopsis = safe_text(record.synopsis.as_deref().unwrap_or(""));
    if chinese_only {
        if !synopsis.is_empty() && is_chinese_text(&synopsis) {
            return truncate(&synopsis, SYNOPSIS_MAX_CHARS);
        }
        return NO_CHINESE_SYNOPSIS.to_string();
    }
    if synopsis.is_empty() {
        NO_SYNOPSIS.to_string()
    } else {
        truncate(&synopsis, SYNOPSIS_MAX_CHARS)
    }
}

/// 预告片嵌入地址
pub fn trailer_embed_url(record: &AnimeRecord) -> Option<String> {
    let id = record.trailer.as_ref().and_then(|t| non_empty(&t.youtube_id))?;
    Some(format!("{}{}", YOUTUBE_EMBED_BASE, urlencoding::encode(id.trim())))
}

/// 本地化播放平台名
pub fn localize_stream_name(name: &str) -> String {
    let name = safe_text(name);
    let lower = name.to_lowercase();
    if let Some((_, zh)) = STREAM_NAME_ZH
        .iter()
        .find(|(key, _)| lower.contains(&key.to_lowercase()))
    {
        return zh.to_string();
    }
    if name.is_empty() {
        STREAM_FALLBACK.to_string()
    } else {
        name
    }
}

/// 外链列表，最多 [`MAX_STREAM_LINKS`] 个
pub fn stream_links(record: &AnimeRecord) -> Vec<StreamLink> {
    record
        .streaming
        .iter()
        .flatten()
        .filter_map(|entry| {
            let url = non_empty(&entry.url)?;
            Some(StreamLink {
                label: localize_stream_name(entry.name.as_deref().unwrap_or(STREAM_FALLBACK)),
                url: url.to_string(),
            })
        })
        .take(MAX_STREAM_LINKS)
        .collect()
}

/// 封面图，优先 webp 大图
pub fn cover_url(record: &AnimeRecord) -> String {
    let images = record.images.as_ref();
    images
        .and_then(|i| i.webp.as_ref())
        .and_then(|set| non_empty(&set.large_image_url))
        .or_else(|| {
            images
                .and_then(|i| i.jpg.as_ref())
                .and_then(|set| non_empty(&set.large_image_url))
        })
        .unwrap_or_default()
        .to_string()
}

/// 卡片格式化器
#[derive(Debug, Clone, Copy)]
pub struct Formatter {
    pub chinese_synopsis_only: bool,
}

impl Default for Formatter {
    fn default() -> Self {
        Self {
            chinese_synopsis_only: true,
        }
    }
}

impl Formatter {
    pub fn card(&self, record: &AnimeRecord) -> DisplayCard {
        DisplayCard {
            title: display_title(record),
            meta: anime_meta(record),
            description: synopsis_excerpt(record, self.chinese_synopsis_only),
            cover_url: cover_url(record),
            detail_url: non_empty(&record.url).map(str::to_string),
            trailer_embed_url: trailer_embed_url(record),
            streams: stream_links(record),
        }
    }

    pub fn cards(&self, records: &[AnimeRecord]) -> Vec<DisplayCard> {
        records.iter().map(|r| self.card(r)).collect()
    }
}
