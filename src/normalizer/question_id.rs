//! 题号规范化与排序
//!
//! 同一道题在不同片段里可能写成 `第1题`、`Q1`、`1.`，规范化后都得到 `1`。

use phf::phf_set;
use regex::Regex;
use std::cmp::Ordering;
use std::sync::LazyLock;

/// 无法识别的题号统一归入该分组
pub const UNKNOWN_KEY: &str = "unknown";

/// 题号末尾需要去掉的标点（全角/半角句号、逗号、顿号）
static TRAILING_PUNCTUATION: phf::Set<char> = phf_set! {
    '。', '．', '.', ',', '，', '、',
};

static LEADING_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:第|(?i:q)\s*)").expect("题号前缀正则无效"));

static TRAILING_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*题$").expect("题号后缀正则无效"));

fn canonicalize_once(raw: &str) -> String {
    let trimmed = raw.trim();
    let without_prefix = LEADING_PREFIX.replace(trimmed, "");
    let without_suffix = TRAILING_SUFFIX.replace(&without_prefix, "");
    // 空白全部删除而不是合并为一个空格，`1 2` 与 `12` 视为同一题
    let compact: String = without_suffix.chars().filter(|c| !c.is_whitespace()).collect();
    compact
        .trim_end_matches(|c: char| TRAILING_PUNCTUATION.contains(&c))
        .to_string()
}

/// 计算用于分组的规范题号
///
/// 反复应用去前缀/后缀/空白/标点直到结果不再变化，
/// 因此对规范题号再次规范化得到的是它本身。空结果返回 [`UNKNOWN_KEY`]。
pub fn canonical_key(raw: &str) -> String {
    let mut current = canonicalize_once(raw);
    loop {
        // 每一步只删除字符，不会无限循环
        let next = canonicalize_once(&current);
        if next == current {
            break;
        }
        current = next;
    }

    if current.is_empty() {
        UNKNOWN_KEY.to_string()
    } else {
        current
    }
}

/// 输出时显示的题号
///
/// 规范题号为 `unknown` 时保留原始题号，原始题号也为空才显示 `unknown`
pub fn display_id(raw: &str, key: &str) -> String {
    if key != UNKNOWN_KEY {
        return key.to_string();
    }
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        UNKNOWN_KEY.to_string()
    } else {
        trimmed.to_string()
    }
}

/// 数字部分：没有数字的题号排在有数字的之后，`unknown` 排在最后
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum NumberPart {
    Finite(u128),
    Missing,
    Unknown,
}

/// 题号的自然排序键：先比数字，再比去掉数字后的后缀，最后比完整题号
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderKey {
    number: NumberPart,
    suffix: String,
    key: String,
}

impl OrderKey {
    /// 从规范题号解析排序键
    pub fn parse(key: &str) -> Self {
        if key == UNKNOWN_KEY {
            return Self {
                number: NumberPart::Unknown,
                suffix: String::new(),
                key: key.to_string(),
            };
        }

        let Some(start) = key.find(|c: char| c.is_ascii_digit()) else {
            return Self {
                number: NumberPart::Missing,
                suffix: key.to_string(),
                key: key.to_string(),
            };
        };

        let digits_len = key[start..]
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(key.len() - start);
        let end = start + digits_len;

        // 超长数字按最大值处理
        let number = key[start..end].parse::<u128>().unwrap_or(u128::MAX);
        let suffix = format!("{}{}", &key[..start], &key[end..]);

        Self {
            number: NumberPart::Finite(number),
            suffix,
            key: key.to_string(),
        }
    }

    /// 题号中的数字部分
    pub fn number(&self) -> Option<u128> {
        match self.number {
            NumberPart::Finite(n) => Some(n),
            NumberPart::Missing | NumberPart::Unknown => None,
        }
    }
}

impl Ord for OrderKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.number
            .cmp(&other.number)
            .then_with(|| self.suffix.cmp(&other.suffix))
            .then_with(|| self.key.cmp(&other.key))
    }
}

impl PartialOrd for OrderKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_key_strips_decorations() {
        assert_eq!(canonical_key("第1题"), "1");
        assert_eq!(canonical_key("Q1"), "1");
        assert_eq!(canonical_key("q 12"), "12");
        assert_eq!(canonical_key("  3 题 "), "3");
        assert_eq!(canonical_key("4."), "4");
        assert_eq!(canonical_key("5，"), "5");
        assert_eq!(canonical_key("6、"), "6");
        assert_eq!(canonical_key("2 (1)"), "2(1)");
        assert_eq!(canonical_key("1 2"), "12");
        assert_eq!(canonical_key("1\u{3000}2"), "12");
        assert_eq!(canonical_key("第 7 题。"), "7");
    }

    #[test]
    fn test_canonical_key_unknown() {
        assert_eq!(canonical_key(""), UNKNOWN_KEY);
        assert_eq!(canonical_key("   "), UNKNOWN_KEY);
        assert_eq!(canonical_key("第题"), UNKNOWN_KEY);
        assert_eq!(canonical_key("。"), UNKNOWN_KEY);
    }

    #[test]
    fn test_canonical_key_is_idempotent() {
        for raw in ["第1题", "Q 2a", "第3题。", "题", "第第4", "10、", "abc"] {
            let once = canonical_key(raw);
            assert_eq!(canonical_key(&once), once, "raw = {raw}");
        }
    }

    #[test]
    fn test_display_id_keeps_raw_for_unknown() {
        assert_eq!(display_id("第1题", "1"), "1");
        assert_eq!(display_id(" 题 ", UNKNOWN_KEY), "题");
        assert_eq!(display_id("", UNKNOWN_KEY), UNKNOWN_KEY);
    }

    #[test]
    fn test_natural_ordering() {
        let mut keys = vec!["10", UNKNOWN_KEY, "zz", "2", "1", "2a", "2b", "3"];
        keys.sort_by_key(|k| OrderKey::parse(k));
        assert_eq!(keys, vec!["1", "2", "2a", "2b", "3", "10", "zz", UNKNOWN_KEY]);
    }

    #[test]
    fn test_order_key_parts() {
        let key = OrderKey::parse("a12b");
        assert_eq!(key.number(), Some(12));
        assert_eq!(key.suffix, "ab");
        assert_eq!(OrderKey::parse(UNKNOWN_KEY).number(), None);
        assert_eq!(
            OrderKey::parse("99999999999999999999999999999999999999999").number(),
            Some(u128::MAX)
        );
    }
}
