//! 运行配置
//! 从环境变量 (可选 .env 文件) 读取

use crate::jikan::DEFAULT_API_BASE;
use anyhow::{bail, Context};
use std::env;
use std::time::Duration;

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_MAX_SESSIONS: usize = 1024;

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// 监听端口
    pub port: u16,
    /// Jikan API 地址
    pub api_base: String,
    /// 默认是否开启安全模式
    pub safe_mode: bool,
    /// 只展示中文简介
    pub chinese_synopsis_only: bool,
    /// 请求超时，未设置时不限制
    pub request_timeout: Option<Duration>,
    /// 同时保留的浏览器会话上限
    pub max_sessions: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            api_base: DEFAULT_API_BASE.to_string(),
            safe_mode: true,
            chinese_synopsis_only: true,
            request_timeout: None,
            max_sessions: DEFAULT_MAX_SESSIONS,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let port = match get("PORT") {
            Some(v) => v
                .parse::<u16>()
                .with_context(|| format!("PORT 不是有效端口: {}", v))?,
            None => defaults.port,
        };

        let api_base = match get("JIKAN_API_BASE") {
            Some(v) => {
                let url = url::Url::parse(&v)
                    .with_context(|| format!("JIKAN_API_BASE 无效: {}", v))?;
                if !matches!(url.scheme(), "http" | "https") {
                    bail!("JIKAN_API_BASE 必须是 http(s) 地址: {}", v);
                }
                v.trim_end_matches('/').to_string()
            }
            None => defaults.api_base,
        };

        let safe_mode = match get("SAFE_MODE") {
            Some(v) => parse_flag("SAFE_MODE", &v)?,
            None => defaults.safe_mode,
        };

        let chinese_synopsis_only = match get("CHINESE_SYNOPSIS_ONLY") {
            Some(v) => parse_flag("CHINESE_SYNOPSIS_ONLY", &v)?,
            None => defaults.chinese_synopsis_only,
        };

        let request_timeout = match get("REQUEST_TIMEOUT_SECS") {
            Some(v) => {
                let secs: u64 = v
                    .parse()
                    .with_context(|| format!("REQUEST_TIMEOUT_SECS 不是有效秒数: {}", v))?;
                (secs > 0).then(|| Duration::from_secs(secs))
            }
            None => defaults.request_timeout,
        };

        let max_sessions = match get("MAX_SESSIONS") {
            Some(v) => match v.parse::<usize>() {
                Ok(n) if n > 0 => n,
                _ => bail!("MAX_SESSIONS 应为正整数: {}", v),
            },
            None => defaults.max_sessions,
        };

        Ok(Self {
            port,
            api_base,
            safe_mode,
            chinese_synopsis_only,
            request_timeout,
            max_sessions,
        })
    }
}

fn parse_flag(key: &str, value: &str) -> anyhow::Result<bool> {
    match value.to_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => Ok(true),
        "0" | "false" | "off" | "no" => Ok(false),
        _ => bail!("{} 应为开关值 (1/0/true/false): {}", key, value),
    }
}
