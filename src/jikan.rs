//! Jikan v4 数据源
//! 关键词搜索与热门榜单，解析 `{"data": [...]}` 外层结构

use crate::http_client::{build_client, get_text, HttpClientError};
use crate::types::AnimeRecord;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

/// Jikan API 地址
pub const DEFAULT_API_BASE: &str = "https://api.jikan.moe/v4";

/// 每次请求的条目数
pub const PAGE_LIMIT: u32 = 24;

/// 响应体解析问题
///
/// 不向上传播：出现时结果降级为空列表，并记录在 [`ResultPage::degraded`] 中。
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("响应不是合法 JSON: {0}")]
    InvalidJson(String),
    #[error("响应缺少 data 字段")]
    MissingData,
    #[error("data 字段不是数组: {0}")]
    InvalidData(String),
}

/// 一次请求的结果
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultPage {
    pub records: Vec<AnimeRecord>,
    pub degraded: Option<ParseError>,
}

impl ResultPage {
    pub fn with_records(records: Vec<AnimeRecord>) -> Self {
        Self {
            records,
            degraded: None,
        }
    }

    pub fn degraded(error: ParseError) -> Self {
        Self {
            records: Vec::new(),
            degraded: Some(error),
        }
    }
}

#[derive(Deserialize)]
struct Envelope {
    data: Option<serde_json::Value>,
}

/// 解析响应体
///
/// 单个条目字段类型不符时只跳过该条目，其余条目照常返回。
pub fn parse_envelope(body: &str) -> ResultPage {
    let envelope: Envelope = match serde_json::from_str(body) {
        Ok(envelope) => envelope,
        Err(e) => return ResultPage::degraded(ParseError::InvalidJson(e.to_string())),
    };

    let items = match envelope.data {
        None | Some(serde_json::Value::Null) => {
            return ResultPage::degraded(ParseError::MissingData)
        }
        Some(serde_json::Value::Array(items)) => items,
        Some(other) => {
            return ResultPage::degraded(ParseError::InvalidData(format!(
                "期望数组，实际为 {}",
                json_kind(&other)
            )))
        }
    };

    let records = items
        .into_iter()
        .enumerate()
        .filter_map(|(i, item)| match serde_json::from_value::<AnimeRecord>(item) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!("跳过第 {} 个条目: {}", i, e);
                None
            }
        })
        .collect();
    ResultPage::with_records(records)
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "布尔值",
        serde_json::Value::Number(_) => "数字",
        serde_json::Value::String(_) => "字符串",
        serde_json::Value::Array(_) => "数组",
        serde_json::Value::Object(_) => "对象",
    }
}

/// 搜索 URL
pub fn search_url(base: &str, query: &str, sfw: bool, limit: u32) -> String {
    format!(
        "{}/anime?q={}&limit={}&order_by=score&sort=desc{}",
        base.trim_end_matches('/'),
        urlencoding::encode(query),
        limit,
        if sfw { "&sfw=true" } else { "" }
    )
}

/// 热门榜单 URL
pub fn top_url(base: &str, sfw: bool, limit: u32) -> String {
    format!(
        "{}/top/anime?limit={}{}",
        base.trim_end_matches('/'),
        limit,
        if sfw { "&sfw=true" } else { "" }
    )
}

/// 动漫数据源
#[async_trait]
pub trait AnimeSource: Send + Sync {
    /// 关键词搜索，按评分降序
    async fn search(&self, query: &str, sfw: bool, limit: u32)
        -> Result<ResultPage, HttpClientError>;

    /// 热门榜单
    async fn top(&self, sfw: bool, limit: u32) -> Result<ResultPage, HttpClientError>;
}

/// Jikan HTTP 客户端
pub struct JikanClient {
    http: Client,
    base: String,
}

impl JikanClient {
    pub fn new(base: impl Into<String>, timeout: Option<Duration>) -> Result<Self, HttpClientError> {
        Ok(Self {
            http: build_client(timeout)?,
            base: base.into(),
        })
    }

    async fn fetch(&self, url: &str) -> Result<ResultPage, HttpClientError> {
        debug!("请求 URL: {}", url);
        let body = get_text(&self.http, url).await?;
        let page = parse_envelope(&body);
        if let Some(e) = &page.degraded {
            warn!("响应解析降级为空结果 {}: {}", url, e);
        } else {
            debug!("获得 {} 个条目", page.records.len());
        }
        Ok(page)
    }
}

#[async_trait]
impl AnimeSource for JikanClient {
    async fn search(
        &self,
        query: &str,
        sfw: bool,
        limit: u32,
    ) -> Result<ResultPage, HttpClientError> {
        self.fetch(&search_url(&self.base, query, sfw, limit)).await
    }

    async fn top(&self, sfw: bool, limit: u32) -> Result<ResultPage, HttpClientError> {
        self.fetch(&top_url(&self.base, sfw, limit)).await
    }
}

/// 测试用数据源：按关键词返回预设结果并记录调用
#[cfg(test)]
pub mod stub {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Debug, Clone, PartialEq)]
    pub enum Call {
        Search { query: String, sfw: bool, limit: u32 },
        Top { sfw: bool, limit: u32 },
    }

    #[derive(Default)]
    pub struct StubSource {
        pub searches: HashMap<String, Result<ResultPage, u16>>,
        pub top: Option<Result<ResultPage, u16>>,
        pub calls: Mutex<Vec<Call>>,
    }

    impl StubSource {
        pub fn with_search(mut self, query: &str, records: Vec<AnimeRecord>) -> Self {
            self.searches
                .insert(query.to_string(), Ok(ResultPage::with_records(records)));
            self
        }

        pub fn with_search_status(mut self, query: &str, status: u16) -> Self {
            self.searches.insert(query.to_string(), Err(status));
            self
        }

        pub fn with_top(mut self, records: Vec<AnimeRecord>) -> Self {
            self.top = Some(Ok(ResultPage::with_records(records)));
            self
        }

        pub fn with_top_page(mut self, page: ResultPage) -> Self {
            self.top = Some(Ok(page));
            self
        }

        pub fn with_top_status(mut self, status: u16) -> Self {
            self.top = Some(Err(status));
            self
        }

        pub fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }
    }

    fn answer(entry: Option<&Result<ResultPage, u16>>) -> Result<ResultPage, HttpClientError> {
        match entry {
            Some(Ok(page)) => Ok(page.clone()),
            Some(Err(status)) => Err(HttpClientError::BadStatus(*status)),
            None => Ok(ResultPage::default()),
        }
    }

    #[async_trait]
    impl AnimeSource for StubSource {
        async fn search(
            &self,
            query: &str,
            sfw: bool,
            limit: u32,
        ) -> Result<ResultPage, HttpClientError> {
            self.calls.lock().unwrap().push(Call::Search {
                query: query.to_string(),
                sfw,
                limit,
            });
            answer(self.searches.get(query))
        }

        async fn top(&self, sfw: bool, limit: u32) -> Result<ResultPage, HttpClientError> {
            self.calls.lock().unwrap().push(Call::Top { sfw, limit });
            answer(self.top.as_ref())
        }
    }

    /// 只有 id 和标题的条目
    pub fn record(id: u64, title: &str) -> AnimeRecord {
        AnimeRecord {
            mal_id: Some(id),
            title: Some(title.to_string()),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::{Query, State};
    use axum::http::StatusCode;
    use axum::response::{IntoResponse, Response};
    use axum::routing::get;
    use axum::{Json, Router};
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_search_url() {
        assert_eq!(
            search_url(DEFAULT_API_BASE, "火影", true, PAGE_LIMIT),
            "https://api.jikan.moe/v4/anime?q=%E7%81%AB%E5%BD%B1&limit=24&order_by=score&sort=desc&sfw=true"
        );
        assert_eq!(
            search_url("http://localhost:8080/v4/", "one piece", false, 24),
            "http://localhost:8080/v4/anime?q=one%20piece&limit=24&order_by=score&sort=desc"
        );
    }

    #[test]
    fn test_top_url() {
        assert_eq!(
            top_url(DEFAULT_API_BASE, true, PAGE_LIMIT),
            "https://api.jikan.moe/v4/top/anime?limit=24&sfw=true"
        );
        assert_eq!(
            top_url(DEFAULT_API_BASE, false, PAGE_LIMIT),
            "https://api.jikan.moe/v4/top/anime?limit=24"
        );
    }

    #[test]
    fn test_parse_envelope_ok() {
        let page = parse_envelope(
            r#"{"pagination": {"has_next_page": true}, "data": [{"mal_id": 1, "title": "A"}, {"mal_id": 2}]}"#,
        );
        assert_eq!(page.degraded, None);
        assert_eq!(page.records.len(), 2);
        assert_eq!(page.records[0].title.as_deref(), Some("A"));
    }

    #[test]
    fn test_parse_envelope_empty_data_is_not_degraded() {
        let page = parse_envelope(r#"{"data": []}"#);
        assert!(page.records.is_empty());
        assert_eq!(page.degraded, None);
    }

    #[test]
    fn test_parse_envelope_missing_data_degrades() {
        assert_eq!(
            parse_envelope(r#"{"status": 500}"#).degraded,
            Some(ParseError::MissingData)
        );
        assert_eq!(
            parse_envelope(r#"{"data": null}"#).degraded,
            Some(ParseError::MissingData)
        );
    }

    #[test]
    fn test_parse_envelope_bad_body_degrades() {
        let page = parse_envelope("<html>502 Bad Gateway</html>");
        assert!(page.records.is_empty());
        assert!(matches!(page.degraded, Some(ParseError::InvalidJson(_))));

        let page = parse_envelope(r#"{"data": {"mal_id": 1}}"#);
        assert!(page.records.is_empty());
        assert_eq!(
            page.degraded,
            Some(ParseError::InvalidData("期望数组，实际为 对象".to_string()))
        );
    }

    #[test]
    fn test_parse_envelope_skips_only_bad_items() {
        let page = parse_envelope(
            r#"{"data": [{"mal_id": 20, "title": "Naruto"}, {"mal_id": 21, "year": "1999"}, "oops", {"mal_id": 1735}]}"#,
        );
        assert_eq!(page.degraded, None);
        let ids: Vec<_> = page.records.iter().map(|r| r.mal_id).collect();
        assert_eq!(ids, vec![Some(20), Some(1735)]);
        assert_eq!(page.records[0].title.as_deref(), Some("Naruto"));
    }

    /// 本地起一个假的 Jikan 服务，记录收到的查询参数
    async fn serve_fake_jikan() -> (String, Arc<Mutex<Vec<HashMap<String, String>>>>) {
        let seen: Arc<Mutex<Vec<HashMap<String, String>>>> = Arc::default();

        async fn anime(
            State(seen): State<Arc<Mutex<Vec<HashMap<String, String>>>>>,
            Query(params): Query<HashMap<String, String>>,
        ) -> Response {
            let broken = params.get("q").map(String::as_str) == Some("broken");
            seen.lock().unwrap().push(params);
            if broken {
                return (StatusCode::SERVICE_UNAVAILABLE, "maintenance").into_response();
            }
            Json(json!({
                "pagination": {"has_next_page": false},
                "data": [{"mal_id": 20, "title": "Naruto"}, {"mal_id": 21, "year": "bad"}]
            }))
            .into_response()
        }

        async fn top(
            State(seen): State<Arc<Mutex<Vec<HashMap<String, String>>>>>,
            Query(params): Query<HashMap<String, String>>,
        ) -> Response {
            seen.lock().unwrap().push(params);
            "<html>502 Bad Gateway</html>".into_response()
        }

        let app = Router::new()
            .route("/v4/anime", get(anime))
            .route("/v4/top/anime", get(top))
            .with_state(seen.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (format!("http://{}/v4", addr), seen)
    }

    fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[tokio::test]
    async fn test_client_over_http() {
        let (base, seen) = serve_fake_jikan().await;
        let client = JikanClient::new(base, Some(Duration::from_secs(5))).unwrap();

        let page = client.search("火影 忍者", true, PAGE_LIMIT).await.unwrap();
        assert_eq!(page.degraded, None);
        assert_eq!(page.records.len(), 1);
        assert_eq!(page.records[0].title.as_deref(), Some("Naruto"));

        let err = client.search("broken", false, 10).await.unwrap_err();
        assert!(matches!(err, HttpClientError::BadStatus(503)));
        assert_eq!(err.to_string(), "请求失败 503");

        let page = client.top(true, PAGE_LIMIT).await.unwrap();
        assert!(page.records.is_empty());
        assert!(matches!(page.degraded, Some(ParseError::InvalidJson(_))));

        assert_eq!(
            *seen.lock().unwrap(),
            vec![
                params(&[
                    ("q", "火影 忍者"),
                    ("limit", "24"),
                    ("order_by", "score"),
                    ("sort", "desc"),
                    ("sfw", "true"),
                ]),
                params(&[
                    ("q", "broken"),
                    ("limit", "10"),
                    ("order_by", "score"),
                    ("sort", "desc"),
                ]),
                params(&[("limit", "24"), ("sfw", "true")]),
            ]
        );
    }
}
