mod alias;
mod config;
mod controller;
mod format;
mod http_client;
mod jikan;
mod locale;
mod merge;
mod render;
mod session;
mod types;

use anyhow::Context;
use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, Method, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::{get, post, put},
    Form, Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::AppConfig;
use crate::controller::ControllerOptions;
use crate::format::Formatter;
use crate::jikan::{AnimeSource, JikanClient, PAGE_LIMIT};
use crate::session::{session_id, Session, SessionStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 初始化日志
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();

    let config = AppConfig::from_env().context("读取配置失败")?;
    let source = JikanClient::new(config.api_base.clone(), config.request_timeout)
        .context("创建 HTTP 客户端失败")?;

    let store = Arc::new(SessionStore::new(
        source,
        ControllerOptions {
            safe_mode: config.safe_mode,
            formatter: Formatter {
                chinese_synopsis_only: config.chinese_synopsis_only,
            },
            limit: PAGE_LIMIT,
        },
        config.max_sessions,
    ));

    let app = router(store);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("🚀 中文动漫检索启动在 http://{}", addr);
    info!("📡 数据源: {} (安全模式: {})", config.api_base, config.safe_mode);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("监听 {} 失败", addr))?;
    axum::serve(listener, app).await.context("服务异常退出")?;
    Ok(())
}

type SharedStore<S> = Arc<SessionStore<S>>;

/// 路由
fn router<S: AnimeSource + 'static>(store: SharedStore<S>) -> Router {
    // CORS 配置
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/", get(index_handler))
        .route("/api", get(api_info_handler))
        .route("/health", get(health_handler))
        .route("/api/view", get(view_handler::<S>))
        .route("/api/search", post(search_handler::<S>))
        .route("/api/top", post(top_handler::<S>))
        .route("/api/safe-mode", put(safe_mode_handler::<S>))
        .route("/api/cards/{index}/trailer", post(trailer_handler::<S>))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(store)
}

/// GET / - 检索页面
async fn index_handler() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// GET /api - API 信息
async fn api_info_handler() -> impl IntoResponse {
    Json(json!({
        "name": "AnimeZhSearch",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Jikan 动漫检索 (中文联想 + 中文优先展示)",
        "endpoints": {
            "GET /": "检索页面",
            "GET /api/view": "当前页面状态 (首次打开时加载热门)",
            "POST /api/search": "搜索动漫 (Form: keyword=关键词，留空加载热门)",
            "POST /api/top": "加载今日热门",
            "PUT /api/safe-mode": "切换安全模式 (JSON: {\"enabled\": true})",
            "POST /api/cards/{index}/trailer": "展开/收起第 index 张卡片的预告片",
            "GET /health": "健康检查"
        }
    }))
}

/// 健康检查
async fn health_handler() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

async fn open_session<S: AnimeSource + 'static>(
    store: &SessionStore<S>,
    headers: &HeaderMap,
) -> Session<S> {
    store.open(session_id(headers).as_deref()).await
}

/// GET /api/view - 当前页面状态
async fn view_handler<S: AnimeSource + 'static>(
    State(store): State<SharedStore<S>>,
    headers: HeaderMap,
) -> Response {
    let session = open_session(&store, &headers).await;
    session.respond(Json(session.controller.open().await))
}

#[derive(Debug, Deserialize)]
struct SearchForm {
    #[serde(default)]
    keyword: String,
}

/// POST /api/search - 搜索
async fn search_handler<S: AnimeSource + 'static>(
    State(store): State<SharedStore<S>>,
    headers: HeaderMap,
    Form(form): Form<SearchForm>,
) -> Response {
    let session = open_session(&store, &headers).await;
    session.respond(Json(session.controller.submit_search(&form.keyword).await))
}

/// POST /api/top - 今日热门
async fn top_handler<S: AnimeSource + 'static>(
    State(store): State<SharedStore<S>>,
    headers: HeaderMap,
) -> Response {
    let session = open_session(&store, &headers).await;
    session.respond(Json(session.controller.load_top().await))
}

#[derive(Debug, Deserialize)]
struct SafeModeRequest {
    enabled: bool,
}

/// PUT /api/safe-mode - 安全模式开关
async fn safe_mode_handler<S: AnimeSource + 'static>(
    State(store): State<SharedStore<S>>,
    headers: HeaderMap,
    Json(req): Json<SafeModeRequest>,
) -> Response {
    let session = open_session(&store, &headers).await;
    session.respond(Json(session.controller.set_safe_mode(req.enabled).await))
}

/// POST /api/cards/{index}/trailer - 预告片展开/收起
async fn trailer_handler<S: AnimeSource + 'static>(
    State(store): State<SharedStore<S>>,
    headers: HeaderMap,
    Path(index): Path<usize>,
) -> Response {
    let session = open_session(&store, &headers).await;
    match session.controller.toggle_trailer(index).await {
        Some(card) => session.respond(Json(card)),
        None => session.respond((
            StatusCode::NOT_FOUND,
            Json(json!({"error": "卡片不在当前列表中"})),
        )),
    }
}

/// 检索页面 HTML
const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="zh-CN">
<head>
  <meta charset="UTF-8">
  <meta name="viewport" content="width=device-width, initial-scale=1.0">
  <title>动漫检索</title>
  <style>
    * { box-sizing: border-box; }
    body { margin: 0; font-family: system-ui, -apple-system, "PingFang SC", "Microsoft YaHei", sans-serif; background: #0f1115; color: #e6e6e6; }
    header { padding: 20px; max-width: 1100px; margin: 0 auto; }
    h1 { margin: 0 0 12px; font-size: 22px; }
    form { display: flex; gap: 8px; flex-wrap: wrap; align-items: center; }
    input[type=text] { flex: 1; min-width: 220px; padding: 10px 12px; border-radius: 8px; border: 1px solid #333; background: #1a1d24; color: inherit; }
    button { padding: 10px 14px; border-radius: 8px; border: none; background: #4f7cff; color: #fff; cursor: pointer; }
    button:disabled { background: #444; cursor: not-allowed; }
    .status { margin-top: 10px; color: #9aa3b2; font-size: 14px; }
    #list { max-width: 1100px; margin: 0 auto; padding: 0 20px 40px; display: grid; grid-template-columns: repeat(auto-fill, minmax(320px, 1fr)); gap: 14px; }
    .card { background: #1a1d24; border-radius: 12px; overflow: hidden; display: flex; flex-direction: column; }
    .card.empty { padding: 14px; grid-column: 1 / -1; }
    .row { display: flex; gap: 12px; padding: 12px; }
    .cover { width: 96px; height: 136px; object-fit: cover; border-radius: 8px; background: #222; flex-shrink: 0; }
    .title { font-weight: 600; margin: 0 0 6px; }
    .meta { color: #9aa3b2; font-size: 13px; margin-bottom: 6px; }
    .desc { font-size: 13px; line-height: 1.5; color: #c8ccd4; }
    .actions { display: flex; gap: 8px; padding: 0 12px 12px; flex-wrap: wrap; }
    .actions a { color: #8fb0ff; font-size: 13px; align-self: center; }
    .streams { padding: 0 12px 12px; font-size: 13px; color: #9aa3b2; }
    .stream-link { margin-right: 8px; color: #8fb0ff; }
    .player-wrap { padding: 0 12px 12px; }
    .player-wrap.hidden { display: none; }
    .player { width: 100%; aspect-ratio: 16 / 9; border: 0; border-radius: 8px; }
  </style>
</head>
<body>
  <header>
    <h1>🎬 动漫检索（中文优先）</h1>
    <form id="searchForm">
      <input type="text" id="keyword" placeholder="输入动漫名，如：火影、海贼王、进击的巨人">
      <button type="submit">搜索</button>
      <button type="button" id="loadTopBtn">今日热门</button>
      <label><input type="checkbox" id="sfw"> 安全模式</label>
    </form>
    <div class="status" id="status"></div>
  </header>
  <main id="list"></main>

  <script>
    const $ = (id) => document.getElementById(id);
    const listEl = $('list');
    const statusEl = $('status');

    function el(tag, className, text) {
      const node = document.createElement(tag);
      if (className) node.className = className;
      if (text !== undefined) node.textContent = text;
      return node;
    }

    function renderCard(card, index) {
      const node = el('div', 'card');
      const row = el('div', 'row');
      const img = el('img', 'cover');
      img.src = card.cover_url;
      img.alt = card.cover_alt;
      row.appendChild(img);

      const content = el('div', 'content');
      content.appendChild(el('div', 'title', card.title));
      content.appendChild(el('div', 'meta', card.meta));
      content.appendChild(el('div', 'desc', card.description));
      row.appendChild(content);
      node.appendChild(row);

      const streams = el('div', 'streams');
      streams.appendChild(el('span', card.streams.length ? 'streams-title' : 'streams-empty', card.streams_caption));
      for (const link of card.streams) {
        const a = el('a', 'stream-link', link.label);
        a.href = link.url;
        a.target = '_blank';
        a.rel = 'noreferrer';
        streams.appendChild(a);
      }
      node.appendChild(streams);

      const actions = el('div', 'actions');
      const playBtn = el('button', 'playBtn', card.trailer.label);
      playBtn.disabled = !card.trailer.enabled;
      playBtn.addEventListener('click', async () => {
        const res = await fetch(`/api/cards/${index}/trailer`, { method: 'POST' });
        if (res.ok) node.replaceWith(renderCard(await res.json(), index));
      });
      actions.appendChild(playBtn);
      if (card.detail_url) {
        const detail = el('a', 'btn', card.detail_label);
        detail.href = card.detail_url;
        detail.target = '_blank';
        detail.rel = 'noreferrer';
        actions.appendChild(detail);
      }
      node.appendChild(actions);

      const playerWrap = el('div', card.trailer.expanded ? 'player-wrap' : 'player-wrap hidden');
      const iframe = el('iframe', 'player');
      iframe.allowFullscreen = true;
      if (card.trailer.player_src) iframe.src = card.trailer.player_src;
      playerWrap.appendChild(iframe);
      node.appendChild(playerWrap);
      return node;
    }

    function renderView(view) {
      statusEl.textContent = view.status;
      $('sfw').checked = view.safe_mode;
      if (view.phase === 'loading') return false;
      listEl.replaceChildren();
      if (view.list.kind === 'placeholder') {
        listEl.appendChild(el('div', 'card empty', view.list.message));
      } else {
        view.list.cards.forEach((card, i) => listEl.appendChild(renderCard(card, i)));
      }
      return true;
    }

    async function call(url, options) {
      try {
        const res = await fetch(url, options);
        renderView(await res.json());
      } catch (e) {
        console.error(e);
        statusEl.textContent = '请求失败：' + e.message;
      }
    }

    $('searchForm').addEventListener('submit', (e) => {
      e.preventDefault();
      const keyword = $('keyword').value.trim();
      statusEl.textContent = keyword ? '搜索中：' + keyword : '正在加载今日热门...';
      call('/api/search', { method: 'POST', body: new URLSearchParams({ keyword }) });
    });

    $('loadTopBtn').addEventListener('click', () => {
      statusEl.textContent = '正在加载今日热门...';
      call('/api/top', { method: 'POST' });
    });

    $('sfw').addEventListener('change', (e) => {
      call('/api/safe-mode', {
        method: 'PUT',
        headers: { 'Content-Type': 'application/json' },
        body: JSON.stringify({ enabled: e.target.checked }),
      });
    });

    // 首次打开时服务端加载热门；同一会话已有请求在途时稍后再取
    async function loadInitial() {
      statusEl.textContent = '正在加载今日热门...';
      try {
        const res = await fetch('/api/view');
        const view = await res.json();
        if (!renderView(view) || view.phase === 'idle') setTimeout(loadInitial, 500);
      } catch (e) {
        console.error(e);
        statusEl.textContent = '请求失败：' + e.message;
      }
    }
    loadInitial();
  </script>
</body>
</html>"#;
