//! 数据类型定义
//! Jikan v4 动漫条目 (只保留页面用得到的字段) 与展示卡片

use serde::{Deserialize, Serialize};

/// Jikan 返回的单个动漫条目
///
/// 线上数据字段经常缺失或为 null，所有字段均可选。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnimeRecord {
    pub mal_id: Option<u64>,
    pub url: Option<String>,
    pub title: Option<String>,
    pub title_english: Option<String>,
    pub title_japanese: Option<String>,
    /// 本地化中文标题 (Jikan 本身不提供，兼容带中文标题的镜像源)
    pub title_chinese: Option<String>,
    pub score: Option<f64>,
    pub year: Option<i32>,
    pub aired: Option<Aired>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub synopsis: Option<String>,
    pub images: Option<Images>,
    pub trailer: Option<Trailer>,
    pub streaming: Option<Vec<StreamingEntry>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Aired {
    pub prop: Option<AiredProp>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AiredProp {
    pub from: Option<DateParts>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DateParts {
    pub year: Option<i32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Images {
    pub jpg: Option<ImageSet>,
    pub webp: Option<ImageSet>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImageSet {
    pub image_url: Option<String>,
    pub large_image_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Trailer {
    pub youtube_id: Option<String>,
}

/// 外链播放源
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StreamingEntry {
    pub name: Option<String>,
    pub url: Option<String>,
}

/// 展示卡片 (每次渲染重新计算)
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayCard {
    pub title: String,
    pub meta: String,
    pub description: String,
    pub cover_url: String,
    pub detail_url: Option<String>,
    pub trailer_embed_url: Option<String>,
    pub streams: Vec<StreamLink>,
}

/// 卡片上的外链
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StreamLink {
    pub label: String,
    pub url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_jikan_record() {
        let json = r#"{
            "mal_id": 20,
            "url": "https://myanimelist.net/anime/20/Naruto",
            "images": {
                "jpg": {"image_url": "a.jpg", "large_image_url": "al.jpg"},
                "webp": {"image_url": "a.webp", "large_image_url": null}
            },
            "trailer": {"youtube_id": "j2hiC9BmJlQ", "url": null},
            "title": "Naruto",
            "title_english": "Naruto",
            "title_japanese": "ナルト",
            "type": "TV",
            "score": 8.0,
            "synopsis": "Moments prior to Naruto Uzumaki's birth...",
            "aired": {"from": "2002-10-03T00:00:00+00:00", "prop": {"from": {"day": 3, "month": 10, "year": 2002}}},
            "year": 2002,
            "streaming": [{"name": "Crunchyroll", "url": "http://www.crunchyroll.com/series-269795"}]
        }"#;

        let record: AnimeRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.mal_id, Some(20));
        assert_eq!(record.kind.as_deref(), Some("TV"));
        assert_eq!(record.year, Some(2002));
        assert_eq!(
            record.aired.and_then(|a| a.prop).and_then(|p| p.from).and_then(|d| d.year),
            Some(2002)
        );
        assert_eq!(record.streaming.map(|s| s.len()), Some(1));
        assert_eq!(record.title_chinese, None);
    }

    #[test]
    fn test_deserialize_sparse_record() {
        let record: AnimeRecord =
            serde_json::from_str(r#"{"mal_id": 1, "score": null, "year": null, "streaming": null}"#)
                .unwrap();
        assert_eq!(record.mal_id, Some(1));
        assert_eq!(record.score, None);
        assert_eq!(record.streaming, None);
    }
}
