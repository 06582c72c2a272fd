use reqwest::{Client, Response};
use std::time::Duration;
use thiserror::Error;

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/138.0.0.0 Safari/537.36 (AnimeZhSearch)";

#[derive(Debug, Error)]
pub enum HttpClientError {
    #[error("请求超时")]
    Timeout,
    #[error("请求失败: {0}")]
    RequestFailed(String),
    #[error("请求失败 {0}")]
    BadStatus(u16),
}

impl HttpClientError {
    fn from_reqwest(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            HttpClientError::Timeout
        } else {
            HttpClientError::RequestFailed(e.to_string())
        }
    }
}

/// 构建 HTTP 客户端
///
/// `timeout` 为 `None` 时不设超时，请求一直等到对端响应或断开。
pub fn build_client(timeout: Option<Duration>) -> Result<Client, HttpClientError> {
    let mut builder = Client::builder()
        .user_agent(USER_AGENT)
        .gzip(true)
        .brotli(true);

    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }

    builder
        .build()
        .map_err(|e| HttpClientError::RequestFailed(e.to_string()))
}

/// GET 请求
pub async fn get(client: &Client, url: &str) -> Result<Response, HttpClientError> {
    let response = client
        .get(url)
        .header("Accept", "application/json")
        .header("Accept-Language", "zh-CN,zh;q=0.9,en;q=0.8")
        .send()
        .await
        .map_err(HttpClientError::from_reqwest)?;

    if !response.status().is_success() {
        return Err(HttpClientError::BadStatus(response.status().as_u16()));
    }

    Ok(response)
}

/// GET 请求并返回文本
pub async fn get_text(client: &Client, url: &str) -> Result<String, HttpClientError> {
    let response = get(client, url).await?;
    response.text().await.map_err(HttpClientError::from_reqwest)
}
