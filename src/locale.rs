//! 静态本地化词表
//! 顺序即匹配优先级，新增条目时注意放置位置

/// 中文检索别名（常见动漫）
pub const ZH_ALIAS: &[(&str, &str)] = &[
    ("鬼灭", "Kimetsu no Yaiba"),
    ("鬼灭之刃", "Kimetsu no Yaiba"),
    ("咒术回战", "Jujutsu Kaisen"),
    ("进击的巨人", "Shingeki no Kyojin"),
    ("巨人", "Attack on Titan"),
    ("火影", "Naruto"),
    ("火影忍者", "Naruto"),
    ("海贼王", "One Piece"),
    ("航海王", "One Piece"),
    ("死神", "Bleach"),
    ("龙珠", "Dragon Ball"),
    ("名侦探柯南", "Detective Conan"),
    ("柯南", "Detective Conan"),
    ("链锯人", "Chainsaw Man"),
    ("间谍过家家", "Spy x Family"),
    ("孤独摇滚", "Bocchi the Rock"),
    ("芙莉莲", "Sousou no Frieren"),
    ("葬送的芙莉莲", "Sousou no Frieren"),
    ("药屋少女", "Kusuriya no Hitorigoto"),
    ("我推的孩子", "Oshi no Ko"),
    ("eva", "Neon Genesis Evangelion"),
    ("新世纪福音战士", "Neon Genesis Evangelion"),
];

/// 常见英文/罗马音标题的中文显示
pub const TITLE_ZH: &[(&str, &str)] = &[
    ("Naruto", "火影忍者"),
    ("One Piece", "海贼王"),
    ("Bleach", "死神"),
    ("Attack on Titan", "进击的巨人"),
    ("Shingeki no Kyojin", "进击的巨人"),
    ("Kimetsu no Yaiba", "鬼灭之刃"),
    ("Jujutsu Kaisen", "咒术回战"),
    ("Spy x Family", "间谍过家家"),
    ("Chainsaw Man", "链锯人"),
    ("Dragon Ball", "龙珠"),
    ("Detective Conan", "名侦探柯南"),
    ("Neon Genesis Evangelion", "新世纪福音战士"),
    ("Bocchi the Rock", "孤独摇滚"),
    ("Sousou no Frieren", "葬送的芙莉莲"),
    ("Kusuriya no Hitorigoto", "药屋少女的呢喃"),
    ("Oshi no Ko", "【我推的孩子】"),
];

/// 作品类型
pub const TYPE_ZH: &[(&str, &str)] = &[
    ("TV", "TV"),
    ("Movie", "剧场版"),
    ("OVA", "OVA"),
    ("ONA", "ONA"),
    ("Special", "特别篇"),
    ("Music", "音乐"),
    ("CM", "广告"),
    ("PV", "宣传片"),
    ("TVSpecial", "电视特别篇"),
    ("TV Special", "电视特别篇"),
];

/// 播放平台显示名
pub const STREAM_NAME_ZH: &[(&str, &str)] = &[
    ("Crunchyroll", "Crunchyroll"),
    ("Netflix", "Netflix"),
    ("Hulu", "Hulu"),
    ("bilibili", "哔哩哔哩"),
    ("Bahamut", "巴哈姆特动画疯"),
];

/// 空结果时推荐的示例关键词
pub const EXAMPLE_QUERIES: &[&str] = &["火影", "海贼王", "进击的巨人", "鬼灭之刃"];

/// 在有序词表中做精确查找
pub fn lookup(table: &'static [(&'static str, &'static str)], key: &str) -> Option<&'static str> {
    table.iter().find(|(k, _)| *k == key).map(|(_, v)| *v)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_exact_only() {
        assert_eq!(lookup(TYPE_ZH, "Movie"), Some("剧场版"));
        assert_eq!(lookup(TYPE_ZH, "movie"), None);
        assert_eq!(lookup(ZH_ALIAS, "火影"), Some("Naruto"));
    }

    #[test]
    fn test_alias_keys_are_unique() {
        let mut keys: Vec<_> = ZH_ALIAS.iter().map(|(k, _)| *k).collect();
        keys.sort_unstable();
        keys.dedup();
        assert_eq!(keys.len(), ZH_ALIAS.len());
    }
}
