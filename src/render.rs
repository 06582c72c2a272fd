//! 卡片渲染
//! 生成页面消费的列表视图，每张卡片持有自己的预告片展开状态

use crate::locale::EXAMPLE_QUERIES;
use crate::types::{DisplayCard, StreamLink};
use serde::Serialize;

const LABEL_PLAY: &str = "在线播放预告";
const LABEL_COLLAPSE: &str = "收起预告";
const LABEL_UNAVAILABLE: &str = "暂无可嵌入预告";
const DETAIL_LABEL: &str = "MAL 条目";
const STREAMS_CAPTION: &str = "可用外链：";
const STREAMS_EMPTY: &str = "未返回外链播放源";

/// 预告片开关
///
/// 折叠时不设置播放地址，展开时才加载视频，折叠即清空地址停止播放。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrailerToggle {
    Unavailable,
    Collapsed { embed_url: String },
    Expanded { embed_url: String },
}

impl TrailerToggle {
    pub fn for_card(card: &DisplayCard) -> Self {
        match &card.trailer_embed_url {
            Some(url) => TrailerToggle::Collapsed {
                embed_url: url.clone(),
            },
            None => TrailerToggle::Unavailable,
        }
    }

    /// 切换展开状态，不可用时返回 false
    pub fn toggle(&mut self) -> bool {
        let next = match std::mem::replace(self, TrailerToggle::Unavailable) {
            TrailerToggle::Unavailable => return false,
            TrailerToggle::Collapsed { embed_url } => TrailerToggle::Expanded { embed_url },
            TrailerToggle::Expanded { embed_url } => TrailerToggle::Collapsed { embed_url },
        };
        *self = next;
        true
    }

    pub fn is_expanded(&self) -> bool {
        matches!(self, TrailerToggle::Expanded { .. })
    }

    /// 播放器当前地址，仅展开时非空
    pub fn player_src(&self) -> &str {
        match self {
            TrailerToggle::Expanded { embed_url } => embed_url.as_str(),
            _ => "",
        }
    }

    pub fn button_label(&self) -> &'static str {
        match self {
            TrailerToggle::Unavailable => LABEL_UNAVAILABLE,
            TrailerToggle::Collapsed { .. } => LABEL_PLAY,
            TrailerToggle::Expanded { .. } => LABEL_COLLAPSE,
        }
    }

    pub fn view(&self) -> TrailerView {
        TrailerView {
            enabled: !matches!(self, TrailerToggle::Unavailable),
            expanded: self.is_expanded(),
            label: self.button_label(),
            player_src: self.player_src().to_string(),
        }
    }
}

/// 已渲染的卡片
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedCard {
    pub card: DisplayCard,
    pub trailer: TrailerToggle,
}

impl RenderedCard {
    pub fn new(card: DisplayCard) -> Self {
        let trailer = TrailerToggle::for_card(&card);
        Self { card, trailer }
    }

    pub fn view(&self) -> CardView {
        CardView {
            title: self.card.title.clone(),
            meta: self.card.meta.clone(),
            description: self.card.description.clone(),
            cover_url: self.card.cover_url.clone(),
            cover_alt: self.card.title.clone(),
            detail_url: self.card.detail_url.clone(),
            detail_label: DETAIL_LABEL,
            streams_caption: if self.card.streams.is_empty() {
                STREAMS_EMPTY
            } else {
                STREAMS_CAPTION
            },
            streams: self.card.streams.clone(),
            trailer: self.trailer.view(),
        }
    }
}

/// 当前展示的列表
#[derive(Debug, Clone, PartialEq)]
pub enum RenderedList {
    Placeholder { message: String },
    Cards(Vec<RenderedCard>),
}

impl Default for RenderedList {
    fn default() -> Self {
        RenderedList::Cards(Vec::new())
    }
}

impl RenderedList {
    /// 展示的元素数量 (占位提示计为一个)
    pub fn element_count(&self) -> usize {
        match self {
            RenderedList::Placeholder { .. } => 1,
            RenderedList::Cards(cards) => cards.len(),
        }
    }

    pub fn card_mut(&mut self, index: usize) -> Option<&mut RenderedCard> {
        match self {
            RenderedList::Cards(cards) => cards.get_mut(index),
            RenderedList::Placeholder { .. } => None,
        }
    }

    pub fn view(&self) -> ListView {
        match self {
            RenderedList::Placeholder { message } => ListView::Placeholder {
                message: message.clone(),
            },
            RenderedList::Cards(cards) => ListView::Cards {
                cards: cards.iter().map(RenderedCard::view).collect(),
            },
        }
    }
}

/// 空结果提示语
pub fn empty_message() -> String {
    format!("没找到结果。可试试：{}。", EXAMPLE_QUERIES.join("、"))
}

/// 整体替换列表
pub fn render(cards: Vec<DisplayCard>) -> RenderedList {
    if cards.is_empty() {
        return RenderedList::Placeholder {
            message: empty_message(),
        };
    }
    RenderedList::Cards(cards.into_iter().map(RenderedCard::new).collect())
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrailerView {
    pub enabled: bool,
    pub expanded: bool,
    pub label: &'static str,
    pub player_src: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CardView {
    pub title: String,
    pub meta: String,
    pub description: String,
    pub cover_url: String,
    pub cover_alt: String,
    pub detail_url: Option<String>,
    pub detail_label: &'static str,
    pub streams_caption: &'static str,
    pub streams: Vec<StreamLink>,
    pub trailer: TrailerView,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ListView {
    Placeholder { message: String },
    Cards { cards: Vec<CardView> },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card(title: &str, trailer: Option<&str>) -> DisplayCard {
        DisplayCard {
            title: title.to_string(),
            meta: "TV · 2002 · ⭐ 8".to_string(),
            description: "简介".to_string(),
            cover_url: String::new(),
            detail_url: None,
            trailer_embed_url: trailer.map(str::to_string),
            streams: Vec::new(),
        }
    }

    #[test]
    fn test_empty_renders_single_placeholder() {
        let list = render(Vec::new());
        assert_eq!(list.element_count(), 1);
        assert_eq!(
            list,
            RenderedList::Placeholder {
                message: "没找到结果。可试试：火影、海贼王、进击的巨人、鬼灭之刃。".to_string()
            }
        );
    }

    #[test]
    fn test_render_keeps_order() {
        let list = render(vec![card("a", None), card("b", None)]);
        match list.view() {
            ListView::Cards { cards } => {
                let titles: Vec<_> = cards.iter().map(|c| c.title.as_str()).collect();
                assert_eq!(titles, vec!["a", "b"]);
                assert_eq!(cards[0].streams_caption, "未返回外链播放源");
            }
            other => panic!("unexpected view: {:?}", other),
        }
    }

    #[test]
    fn test_toggle_lazily_sets_and_clears_src() {
        let url = "https://www.youtube.com/embed/abc";
        let mut toggle = TrailerToggle::for_card(&card("a", Some(url)));
        assert_eq!(toggle.player_src(), "");
        assert_eq!(toggle.button_label(), "在线播放预告");

        assert!(toggle.toggle());
        assert!(toggle.is_expanded());
        assert_eq!(toggle.player_src(), url);
        assert_eq!(toggle.button_label(), "收起预告");

        assert!(toggle.toggle());
        assert!(!toggle.is_expanded());
        assert_eq!(toggle.player_src(), "");
    }

    #[test]
    fn test_toggle_unavailable() {
        let mut toggle = TrailerToggle::for_card(&card("a", None));
        assert!(!toggle.toggle());
        let view = toggle.view();
        assert!(!view.enabled);
        assert_eq!(view.label, "暂无可嵌入预告");
    }

    #[test]
    fn test_card_mut_on_placeholder() {
        let mut list = render(Vec::new());
        assert!(list.card_mut(0).is_none());
    }

    #[test]
    fn test_list_view_json_shape() {
        let json = serde_json::to_value(render(Vec::new()).view()).unwrap();
        assert_eq!(json["kind"], "placeholder");

        let json = serde_json::to_value(render(vec![card("a", None)]).view()).unwrap();
        assert_eq!(json["kind"], "cards");
        assert_eq!(json["cards"][0]["trailer"]["enabled"], false);
        assert_eq!(json["cards"][0]["detail_label"], "MAL 条目");
    }
}
