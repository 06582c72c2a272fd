//! 浏览器会话
//! 每个客户端通过 cookie 中的会话 id 持有独立的页面控制器

use crate::controller::{ControllerOptions, PageController};
use crate::jikan::AnimeSource;
use axum::http::{header, HeaderMap, HeaderValue};
use axum::response::{IntoResponse, Response};
use cookie::{Cookie, SameSite};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info};
use uuid::Uuid;

/// 会话 cookie 名
pub const SESSION_COOKIE: &str = "anime_zh_sid";

struct Entry<S> {
    controller: Arc<PageController<S>>,
    last_seen: u64,
}

/// 会话表与访问计数 (计数用于淘汰最久未访问的会话)
struct Sessions<S> {
    entries: HashMap<String, Entry<S>>,
    clock: u64,
}

/// 会话表，所有会话共用同一个数据源
pub struct SessionStore<S> {
    source: Arc<S>,
    options: ControllerOptions,
    max_sessions: usize,
    sessions: Mutex<Sessions<S>>,
}

/// 本次请求对应的会话
pub struct Session<S> {
    pub id: String,
    pub controller: Arc<PageController<S>>,
    pub is_new: bool,
}

impl<S: AnimeSource> SessionStore<S> {
    pub fn new(source: S, options: ControllerOptions, max_sessions: usize) -> Self {
        Self {
            source: Arc::new(source),
            options,
            max_sessions: max_sessions.max(1),
            sessions: Mutex::new(Sessions {
                entries: HashMap::new(),
                clock: 0,
            }),
        }
    }

    /// 取出已有会话，id 缺失或未知时新建
    pub async fn open(&self, id: Option<&str>) -> Session<S> {
        let mut guard = self.sessions.lock().await;
        let sessions = &mut *guard;
        sessions.clock += 1;
        let now = sessions.clock;

        if let Some(id) = id {
            if let Some(entry) = sessions.entries.get_mut(id) {
                entry.last_seen = now;
                return Session {
                    id: id.to_string(),
                    controller: entry.controller.clone(),
                    is_new: false,
                };
            }
        }

        if sessions.entries.len() >= self.max_sessions {
            let oldest = sessions
                .entries
                .iter()
                .min_by_key(|(_, entry)| entry.last_seen)
                .map(|(id, _)| id.clone());
            if let Some(oldest) = oldest {
                sessions.entries.remove(&oldest);
                debug!("会话已满，淘汰最久未访问的会话 {}", oldest);
            }
        }

        let id = Uuid::new_v4().to_string();
        let controller = Arc::new(PageController::new(self.source.clone(), self.options));
        sessions.entries.insert(
            id.clone(),
            Entry {
                controller: controller.clone(),
                last_seen: now,
            },
        );
        info!("🆕 新会话 {} (当前 {} 个)", id, sessions.entries.len());

        Session {
            id,
            controller,
            is_new: true,
        }
    }

    #[cfg(test)]
    pub(crate) fn source(&self) -> &S {
        &self.source
    }

    #[cfg(test)]
    pub(crate) async fn len(&self) -> usize {
        self.sessions.lock().await.entries.len()
    }
}

impl<S> Session<S> {
    /// 新会话在响应上附带 Set-Cookie
    pub fn respond(&self, body: impl IntoResponse) -> Response {
        let mut response = body.into_response();
        if self.is_new {
            if let Ok(value) = HeaderValue::from_str(&session_cookie(&self.id)) {
                response.headers_mut().append(header::SET_COOKIE, value);
            }
        }
        response
    }
}

/// 从请求头读取会话 id
pub fn session_id(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| Cookie::split_parse(value))
        .filter_map(Result::ok)
        .find(|cookie| cookie.name() == SESSION_COOKIE)
        .map(|cookie| cookie.value().to_string())
}

fn session_cookie(id: &str) -> String {
    Cookie::build((SESSION_COOKIE, id))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
        .to_string()
}
