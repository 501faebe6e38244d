//! 文本启发式标注引擎
//!
//! 与远端检测服务无关的纯计算部分：词表、句子切分与可疑句子打分。

pub mod highlight;
pub mod lexicon;
pub mod sentence;

pub use highlight::{
    highlight, score_sentence, threshold_for, HighlightedText, Segment, HIGHLIGHT_CLASS,
    MIN_HIGHLIGHT_PROBABILITY,
};
pub use lexicon::HeuristicProfile;
pub use sentence::{split_sentences, word_count};
