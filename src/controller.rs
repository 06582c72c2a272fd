//! 页面控制器
//! 持有状态行与当前列表，串联联想、请求、合并、格式化与渲染

use crate::alias::derive_alias;
use crate::format::Formatter;
use crate::http_client::HttpClientError;
use crate::jikan::{AnimeSource, ResultPage, PAGE_LIMIT};
use crate::merge::merge;
use crate::render::{render, CardView, ListView, RenderedList};
use crate::types::AnimeRecord;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{error, info, warn};

/// 页面阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Idle,
    Loading,
    Success,
    Failed,
}

/// 页面快照
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageView {
    pub phase: Phase,
    pub status: String,
    pub safe_mode: bool,
    pub list: ListView,
}

#[derive(Debug)]
struct PageState {
    phase: Phase,
    status: String,
    safe_mode: bool,
    list: RenderedList,
}

impl PageState {
    fn snapshot(&self) -> PageView {
        PageView {
            phase: self.phase,
            status: self.status.clone(),
            safe_mode: self.safe_mode,
            list: self.list.view(),
        }
    }
}

/// 控制器选项
#[derive(Debug, Clone, Copy)]
pub struct ControllerOptions {
    pub safe_mode: bool,
    pub formatter: Formatter,
    pub limit: u32,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self {
            safe_mode: true,
            formatter: Formatter::default(),
            limit: PAGE_LIMIT,
        }
    }
}

/// 一次成功动作的产出
struct Outcome {
    records: Vec<AnimeRecord>,
    status: String,
}

/// 单个客户端的页面状态
pub struct PageController<S> {
    source: Arc<S>,
    formatter: Formatter,
    limit: u32,
    state: RwLock<PageState>,
}

impl<S: AnimeSource> PageController<S> {
    pub fn new(source: Arc<S>, options: ControllerOptions) -> Self {
        Self {
            source,
            formatter: options.formatter,
            limit: options.limit,
            state: RwLock::new(PageState {
                phase: Phase::Idle,
                status: String::new(),
                safe_mode: options.safe_mode,
                list: RenderedList::default(),
            }),
        }
    }

    /// 当前页面快照
    pub async fn view(&self) -> PageView {
        self.state.read().await.snapshot()
    }

    /// 打开页面：首次打开时加载热门，之后直接返回当前快照
    pub async fn open(&self) -> PageView {
        let view = self.view().await;
        if view.phase != Phase::Idle {
            return view;
        }
        self.initial_load().await
    }

    pub async fn set_safe_mode(&self, enabled: bool) -> PageView {
        let mut state = self.state.write().await;
        state.safe_mode = enabled;
        info!("安全模式: {}", if enabled { "开启" } else { "关闭" });
        state.snapshot()
    }

    /// 页面打开时加载热门
    pub async fn initial_load(&self) -> PageView {
        self.load_top_labelled("初始化失败").await
    }

    /// 加载今日热门
    pub async fn load_top(&self) -> PageView {
        self.load_top_labelled("加载失败").await
    }

    /// 提交搜索，空关键词等同加载热门
    pub async fn submit_search(&self, keyword: &str) -> PageView {
        let query = keyword.trim();
        if query.is_empty() {
            return self.load_top().await;
        }

        let sfw = self.begin(format!("搜索中：{}", query)).await;
        info!("🔍 搜索: {} (安全模式: {})", query, sfw);
        let result = self.run_search(query, sfw).await;
        self.finish(result, "搜索失败").await
    }

    /// 切换某张卡片的预告片，卡片不在当前列表时返回 None
    pub async fn toggle_trailer(&self, index: usize) -> Option<CardView> {
        let mut state = self.state.write().await;
        let card = state.list.card_mut(index)?;
        card.trailer.toggle();
        Some(card.view())
    }

    async fn load_top_labelled(&self, failure_label: &str) -> PageView {
        let sfw = self.begin("正在加载今日热门...".to_string()).await;
        info!("📈 加载热门 (安全模式: {})", sfw);
        let result = self.run_top(sfw).await;
        self.finish(result, failure_label).await
    }

    async fn run_top(&self, sfw: bool) -> Result<Outcome, HttpClientError> {
        let page = self.source.top(sfw, self.limit).await?;
        let records = accept(page, "热门榜单");
        let status = format!("已加载 {} 条（中文优先显示）", records.len());
        Ok(Outcome { records, status })
    }

    async fn run_search(&self, query: &str, sfw: bool) -> Result<Outcome, HttpClientError> {
        let primary = accept(self.source.search(query, sfw, self.limit).await?, query);

        match derive_alias(query) {
            Some(alias) if alias.to_lowercase() != query.to_lowercase() => {
                info!("🈶 中文联想: {} -> {}", query, alias);
                let secondary = accept(self.source.search(alias, sfw, self.limit).await?, alias);
                let records = merge(primary, secondary);
                let status = format!("搜索完成：{} 条（已启用中文联想）", records.len());
                Ok(Outcome { records, status })
            }
            _ => {
                let status = format!("搜索完成：{} 条", primary.len());
                Ok(Outcome {
                    records: primary,
                    status,
                })
            }
        }
    }

    /// 进入加载状态，返回本次动作使用的安全模式
    async fn begin(&self, status: String) -> bool {
        let mut state = self.state.write().await;
        state.phase = Phase::Loading;
        state.status = status;
        state.safe_mode
    }

    /// 写回结果；失败时只更新状态行，列表保持不变
    async fn finish(
        &self,
        result: Result<Outcome, HttpClientError>,
        failure_label: &str,
    ) -> PageView {
        let rendered = result.map(|outcome| {
            let cards = self.formatter.cards(&outcome.records);
            (render(cards), outcome.status)
        });

        let mut state = self.state.write().await;
        match rendered {
            Ok((list, status)) => {
                info!("{} (展示 {} 个元素)", status, list.element_count());
                state.phase = Phase::Success;
                state.status = status;
                state.list = list;
            }
            Err(e) => {
                error!("{}: {}", failure_label, e);
                state.phase = Phase::Failed;
                state.status = format!("{}：{}", failure_label, e);
            }
        }
        state.snapshot()
    }
}

/// 取出结果，解析降级时记录日志并按空结果处理
fn accept(page: ResultPage, what: &str) -> Vec<AnimeRecord> {
    if let Some(e) = &page.degraded {
        warn!("{} 的响应按空结果处理: {}", what, e);
    }
    page.records
}
