//! 句子切分
//!
//! 按 `.!?` 边界切分，切分结果首尾相接即为原文（末尾无标点的残句也保留）。

use once_cell::sync::Lazy;
use regex::Regex;

static SENTENCE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^.!?]+[.!?]*|[.!?]+").unwrap());

/// 切分句子，返回原文切片
pub fn split_sentences(text: &str) -> Vec<&str> {
    SENTENCE_RE.find_iter(text).map(|m| m.as_str()).collect()
}

/// 以空白分隔的词数
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}
