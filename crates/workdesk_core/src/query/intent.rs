//! Heuristic intent extraction from free text.
//!
//! # Responsibility
//! - Detect at most one time-range, item-type and status tag in a request.
//! - Derive a residual keyword after stripping all known vocabulary.
//!
//! # Invariants
//! - Tables are scanned in declaration order and the first matching tag
//!   wins; declaration order is part of the contract.
//! - Tags are always members of their closed vocabularies. Unknown text
//!   never yields a tag and only survives as keyword text.
//! - Parsing is total and pure: any input yields a `ParsedIntent`.

use crate::model::work_item::{ItemStatus, ItemType, TimeRange};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Ordered `(tag, synonyms)` table.
pub type Vocabulary<T> = &'static [(T, &'static [&'static str])];

pub const TIME_VOCABULARY: Vocabulary<TimeRange> = &[
    (
        TimeRange::Recent,
        &[
            "最近", "近期", "这段时间", "这些天", "这阵子", "最近的", "近期的", "这段时间的",
        ],
    ),
    (TimeRange::Today, &["今天", "今日", "当天", "本日"]),
    (TimeRange::Tomorrow, &["明天", "明日", "次日"]),
    (
        TimeRange::ThisWeek,
        &["本周", "这周", "这个星期", "这个礼拜", "本星期", "本礼拜"],
    ),
    (
        TimeRange::NextWeek,
        &["下周", "下个星期", "下个礼拜", "下星期", "下礼拜"],
    ),
    (TimeRange::ThisMonth, &["本月", "这个月", "当月"]),
    (
        TimeRange::PastWeek,
        &[
            "上周", "上个星期", "上个礼拜", "上星期", "上礼拜", "过去一周", "过去的一周", "前一周",
        ],
    ),
    (
        TimeRange::PastMonth,
        &["上个月", "上月", "过去一个月", "过去的一个月", "前一个月"],
    ),
];

pub const TYPE_VOCABULARY: Vocabulary<ItemType> = &[
    (
        ItemType::Task,
        &["任务", "工作", "事项", "待办", "要做", "需要做"],
    ),
    (ItemType::Meeting, &["会议", "开会", "会面", "讨论", "沟通"]),
    (ItemType::Issue, &["问题", "bug", "故障", "错误", "异常"]),
    (ItemType::Idea, &["想法", "点子", "创意", "建议", "方案"]),
    (ItemType::Note, &["笔记", "记录", "备忘", "提醒"]),
];

pub const STATUS_VOCABULARY: Vocabulary<ItemStatus> = &[
    (ItemStatus::Todo, &["待办", "未开始", "计划", "准备"]),
    (
        ItemStatus::InProgress,
        &["进行中", "正在做", "在做", "处理中", "开发中"],
    ),
    (
        ItemStatus::Completed,
        &["完成", "已完成", "做完", "结束", "已结束"],
    ),
    (ItemStatus::Cancelled, &["取消", "已取消", "废弃", "不做"]),
];

/// Interrogative and request markers. Only set `is_query_intent`.
pub const QUERY_INTENT_MARKERS: &[&str] = &[
    "有什么", "有哪些", "什么", "哪些", "查看", "看看", "显示", "列出", "告诉我", "给我", "帮我找",
];

static DEFAULT_PARSER: Lazy<IntentParser> = Lazy::new(IntentParser::new);

// Full-width punctuation only; ASCII `.` and `:` belong to versions, file
// names and URLs that must survive into the keyword.
static SEPARATOR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\s，。！？、；：]+").expect("valid separator regex"));

/// Structured hints extracted from one request text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedIntent {
    pub time_range: Option<TimeRange>,
    pub item_type: Option<ItemType>,
    pub status: Option<ItemStatus>,
    /// Residual text after vocabulary removal; absent when 1 char or less.
    pub keyword: Option<String>,
    /// Informational only; never gates behavior.
    pub is_query_intent: bool,
}

/// Ordered-table intent parser. Immutable once built; safe to share.
#[derive(Debug)]
pub struct IntentParser {
    vocabulary_re: Regex,
}

impl IntentParser {
    pub fn new() -> Self {
        Self {
            vocabulary_re: build_vocabulary_regex(),
        }
    }

    /// Returns the process-wide parser instance.
    pub fn shared() -> &'static IntentParser {
        &DEFAULT_PARSER
    }

    pub fn parse(&self, text: &str) -> ParsedIntent {
        let normalized = text.trim().to_lowercase();

        ParsedIntent {
            time_range: first_match(TIME_VOCABULARY, &normalized),
            item_type: first_match(TYPE_VOCABULARY, &normalized),
            status: first_match(STATUS_VOCABULARY, &normalized),
            keyword: self.extract_keyword(&normalized),
            is_query_intent: QUERY_INTENT_MARKERS
                .iter()
                .any(|marker| normalized.contains(marker)),
        }
    }

    fn extract_keyword(&self, normalized: &str) -> Option<String> {
        let stripped = self.vocabulary_re.replace_all(normalized, "");
        let collapsed = SEPARATOR_RE.replace_all(&stripped, " ");
        let keyword = collapsed.trim();

        if keyword.chars().count() <= 1 {
            return None;
        }
        Some(keyword.to_string())
    }
}

impl Default for IntentParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Parses text with the shared parser.
pub fn parse_intent(text: &str) -> ParsedIntent {
    IntentParser::shared().parse(text)
}

fn first_match<T: Copy>(vocabulary: Vocabulary<T>, text: &str) -> Option<T> {
    vocabulary
        .iter()
        .find(|(_, synonyms)| synonyms.iter().any(|synonym| text.contains(synonym)))
        .map(|(tag, _)| *tag)
}

// Longer synonyms come first so that e.g. `已完成` is removed whole rather
// than leaving `已` behind after `完成` is stripped.
fn build_vocabulary_regex() -> Regex {
    let mut terms: Vec<&str> = QUERY_INTENT_MARKERS
        .iter()
        .copied()
        .chain(all_synonyms(TIME_VOCABULARY))
        .chain(all_synonyms(TYPE_VOCABULARY))
        .chain(all_synonyms(STATUS_VOCABULARY))
        .collect();
    terms.sort_by(|left, right| {
        right
            .chars()
            .count()
            .cmp(&left.chars().count())
            .then_with(|| left.cmp(right))
    });
    terms.dedup();

    let pattern = terms
        .iter()
        .map(|term| regex::escape(term))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&pattern).expect("valid vocabulary regex")
}

fn all_synonyms<T>(vocabulary: Vocabulary<T>) -> impl Iterator<Item = &'static str> {
    vocabulary
        .iter()
        .flat_map(|(_, synonyms)| synonyms.iter().copied())
}

#[cfg(test)]
mod tests {
    use super::{first_match, parse_intent, TIME_VOCABULARY};
    use crate::model::work_item::TimeRange;

    #[test]
    fn first_match_respects_declaration_order() {
        assert_eq!(
            first_match(TIME_VOCABULARY, "明天还是今天"),
            Some(TimeRange::Today)
        );
    }

    #[test]
    fn longer_synonyms_are_stripped_whole() {
        let parsed = parse_intent("有哪些已完成的工作");
        assert_eq!(parsed.keyword, None);
    }

    #[test]
    fn ascii_text_is_lowercased_before_matching() {
        let parsed = parse_intent("BUG in login");
        assert_eq!(parsed.item_type, Some(crate::ItemType::Issue));
        assert_eq!(parsed.keyword.as_deref(), Some("in login"));
    }

    #[test]
    fn empty_input_is_total() {
        let parsed = parse_intent("");
        assert_eq!(parsed, super::ParsedIntent::default());
    }
}
