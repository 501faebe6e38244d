//! 可疑句子标注
//!
//! 按句累加启发式得分，得分达到与 AI 概率挂钩的阈值即标记为可疑。纯函数，无副作用。

use serde::Serialize;
use tracing::debug;

use crate::lexicon::{HeuristicProfile, FORMAL_OPENER_RE, THAT_RE, WHICH_RE};
use crate::sentence::{split_sentences, word_count};

/// 低于该概率不做任何标注
pub const MIN_HIGHLIGHT_PROBABILITY: f64 = 0.3;

/// 标注时包裹可疑句子的 CSS 类
pub const HIGHLIGHT_CLASS: &str = "ai-sentence-highlight";

const KEYWORD_WEIGHT: f64 = 1.0;
const PASSIVE_WEIGHT: f64 = 0.5;
const OPENER_WEIGHT: f64 = 1.5;
const LONG_SENTENCE_WORDS: usize = 20;
const LONG_SENTENCE_WEIGHT: f64 = 0.5;
const VERY_LONG_SENTENCE_WORDS: usize = 30;
const VERY_LONG_SENTENCE_WEIGHT: f64 = 1.0;
const COMMA_MIN: usize = 2;
const COMMA_WEIGHT: f64 = 0.5;
const COMMA_HEAVY: usize = 4;
const COMMA_HEAVY_WEIGHT: f64 = 1.0;
const CLAUSE_WEIGHT: f64 = 0.3;

/// 单个句子片段
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Segment {
    pub text: String,
    pub score: f64,
    pub suspect: bool,
}

/// 标注结果
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HighlightedText {
    pub ai_probability: f64,
    pub profile: HeuristicProfile,
    /// 未启用标注时为 None
    pub threshold: Option<f64>,
    pub segments: Vec<Segment>,
}

impl HighlightedText {
    fn unchanged(text: &str, ai_probability: f64, profile: HeuristicProfile) -> Self {
        let segments = if text.is_empty() {
            Vec::new()
        } else {
            vec![Segment {
                text: text.to_string(),
                score: 0.0,
                suspect: false,
            }]
        };
        Self {
            ai_probability,
            profile,
            threshold: None,
            segments,
        }
    }

    pub fn is_active(&self) -> bool {
        self.threshold.is_some()
    }

    /// 还原后的全文
    pub fn text(&self) -> String {
        self.segments.iter().map(|s| s.text.as_str()).collect()
    }

    pub fn suspects(&self) -> impl Iterator<Item = &Segment> {
        self.segments.iter().filter(|s| s.suspect)
    }

    pub fn suspect_count(&self) -> usize {
        self.suspects().count()
    }

    /// 渲染为 HTML，可疑句子包裹在 span 中，文本做转义
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            let escaped = escape_html(&segment.text);
            if segment.suspect {
                out.push_str(&format!(
                    "<span class=\"{}\">{}</span>",
                    HIGHLIGHT_CLASS, escaped
                ));
            } else {
                out.push_str(&escaped);
            }
        }
        out
    }
}

/// 概率对应的判定阈值；概率越高阈值越低
pub fn threshold_for(ai_probability: f64) -> f64 {
    if ai_probability > 0.8 {
        0.3
    } else if ai_probability > 0.6 {
        0.5
    } else if ai_probability > 0.45 {
        1.0
    } else {
        1.5
    }
}

/// 计算单句得分
pub fn score_sentence(sentence: &str, profile: HeuristicProfile) -> f64 {
    let lower = sentence.to_lowercase();
    let mut score = 0.0;

    for category in profile.categories() {
        for keyword in category.iter() {
            if lower.contains(keyword) {
                score += KEYWORD_WEIGHT;
            }
        }
    }

    for pattern in profile.passive_patterns() {
        score += pattern.find_iter(sentence).count() as f64 * PASSIVE_WEIGHT;
    }

    if FORMAL_OPENER_RE.is_match(sentence.trim()) {
        score += OPENER_WEIGHT;
    }

    let words = word_count(sentence);
    if words > LONG_SENTENCE_WORDS {
        score += LONG_SENTENCE_WEIGHT;
    }
    if words > VERY_LONG_SENTENCE_WORDS {
        score += VERY_LONG_SENTENCE_WEIGHT;
    }

    if profile.counts_clauses() {
        let commas = sentence.matches(',').count();
        if commas >= COMMA_MIN {
            score += COMMA_WEIGHT;
        }
        if commas >= COMMA_HEAVY {
            score += COMMA_HEAVY_WEIGHT;
        }
        score += THAT_RE.find_iter(&lower).count() as f64 * CLAUSE_WEIGHT;
        score += WHICH_RE.find_iter(&lower).count() as f64 * CLAUSE_WEIGHT;
    }

    score
}

/// 对文本做可疑句子标注
pub fn highlight(text: &str, ai_probability: f64, profile: HeuristicProfile) -> HighlightedText {
    // NaN 也视为不标注
    if text.is_empty() || !(ai_probability >= MIN_HIGHLIGHT_PROBABILITY) {
        return HighlightedText::unchanged(text, ai_probability, profile);
    }

    let threshold = threshold_for(ai_probability);
    let segments: Vec<Segment> = split_sentences(text)
        .into_iter()
        .map(|sentence| {
            let score = score_sentence(sentence, profile);
            Segment {
                text: sentence.to_string(),
                score,
                suspect: score >= threshold,
            }
        })
        .collect();

    let result = HighlightedText {
        ai_probability,
        profile,
        threshold: Some(threshold),
        segments,
    };

    debug!(
        event = "highlight.complete",
        profile = %profile,
        threshold = threshold,
        sentences = result.segments.len(),
        suspects = result.suspect_count()
    );

    result
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;

    // 得分 0：无关键词、无被动、短句
    const SCORE_ZERO: &str = "The cat sat on the mat.";
    // 得分 0.5：一处被动
    const SCORE_HALF: &str = "The ball was kicked by Tom.";
    // 得分 1.0：两处被动
    const SCORE_ONE: &str = "The ball was kicked and the door was opened.";
    // 得分 1.5：三处被动
    const SCORE_ONE_HALF: &str = "The ball was kicked, the door was opened and the car was washed.";

    fn suspect(sentence: &str, probability: f64) -> bool {
        let result = highlight(sentence, probability, HeuristicProfile::Standard);
        result.suspect_count() == 1
    }

    #[test]
    fn test_fixture_scores() {
        let p = HeuristicProfile::Standard;
        assert_eq!(score_sentence(SCORE_ZERO, p), 0.0);
        assert_eq!(score_sentence(SCORE_HALF, p), 0.5);
        assert_eq!(score_sentence(SCORE_ONE, p), 1.0);
        assert_eq!(score_sentence(SCORE_ONE_HALF, p), 1.5);
    }

    #[test]
    fn test_low_probability_returns_text_unchanged() {
        let text = "Furthermore, it is important to note the comprehensive paradigm. Short one";
        for p in [0.0, 0.1, 0.29, 0.2999] {
            let result = highlight(text, p, HeuristicProfile::Standard);
            assert!(!result.is_active());
            assert_eq!(result.text(), text);
            assert_eq!(result.suspect_count(), 0);
            assert_eq!(result.to_html(), escape_html(text));
        }
    }

    #[test]
    fn test_nan_probability_is_inactive() {
        let result = highlight(SCORE_ONE_HALF, f64::NAN, HeuristicProfile::Standard);
        assert!(!result.is_active());
    }

    #[test]
    fn test_threshold_brackets() {
        assert_eq!(threshold_for(0.3), 1.5);
        assert_eq!(threshold_for(0.45), 1.5);
        assert_eq!(threshold_for(0.46), 1.0);
        assert_eq!(threshold_for(0.6), 1.0);
        assert_eq!(threshold_for(0.61), 0.5);
        assert_eq!(threshold_for(0.8), 0.5);
        assert_eq!(threshold_for(0.81), 0.3);
    }

    #[test]
    fn test_boundary_at_point_three() {
        // 0.3 启用标注，阈值 1.5
        assert!(suspect(SCORE_ONE_HALF, 0.3));
        assert!(!suspect(SCORE_ONE, 0.3));
        assert!(highlight(SCORE_ZERO, 0.3, HeuristicProfile::Standard).is_active());
    }

    #[test]
    fn test_boundary_at_point_four_five() {
        assert!(suspect(SCORE_ONE_HALF, 0.45));
        assert!(!suspect(SCORE_ONE, 0.45));
        assert!(suspect(SCORE_ONE, 0.451));
    }

    #[test]
    fn test_boundary_at_point_six() {
        assert!(suspect(SCORE_ONE, 0.6));
        assert!(!suspect(SCORE_HALF, 0.6));
        assert!(suspect(SCORE_HALF, 0.601));
    }

    #[test]
    fn test_boundary_at_point_eight() {
        assert!(suspect(SCORE_HALF, 0.8));
        assert!(!suspect(SCORE_ZERO, 0.8));
        assert!(!suspect(SCORE_ZERO, 0.95));
    }

    #[test]
    fn test_keyword_and_opener_scoring() {
        // furthermore(+1) + 开头连接词(+1.5) + comprehensive(+1)
        let sentence = "Furthermore we wrote a comprehensive plan.";
        assert_eq!(score_sentence(sentence, HeuristicProfile::Standard), 3.5);
        // However 只计开头分
        let sentence = "However the dog barked.";
        assert_eq!(score_sentence(sentence, HeuristicProfile::Standard), 1.5);
    }

    #[test]
    fn test_keywords_count_once_per_sentence() {
        let sentence = "robust robust robust.";
        assert_eq!(score_sentence(sentence, HeuristicProfile::Standard), 1.0);
    }

    #[test]
    fn test_length_bonus() {
        let twenty_one = vec!["word"; 21].join(" ");
        let thirty_one = vec!["word"; 31].join(" ");
        let p = HeuristicProfile::Standard;
        assert_eq!(score_sentence(&vec!["word"; 20].join(" "), p), 0.0);
        assert_eq!(score_sentence(&twenty_one, p), 0.5);
        assert_eq!(score_sentence(&thirty_one, p), 1.5);
    }

    #[test]
    fn test_aggressive_profile_counts_clauses() {
        let sentence = "We know that the plan, which is old, works, mostly.";
        let standard = score_sentence(sentence, HeuristicProfile::Standard);
        let aggressive = score_sentence(sentence, HeuristicProfile::Aggressive);
        // 三个逗号 +0.5，that/which 各 +0.3
        assert!((aggressive - standard - 1.1).abs() < 1e-9);
    }

    #[test]
    fn test_aggressive_perfect_passive() {
        let sentence = "The report has been finished.";
        // "been finished" 两档都命中，"has been finished" 仅 Aggressive 命中
        assert_eq!(score_sentence(sentence, HeuristicProfile::Standard), 0.5);
        assert_eq!(score_sentence(sentence, HeuristicProfile::Aggressive), 1.0);
    }

    #[test]
    fn test_mixed_text_partition() {
        let text = format!("{} {} trailing words", SCORE_ONE_HALF, SCORE_ZERO);
        let result = highlight(&text, 0.7, HeuristicProfile::Standard);
        assert_eq!(result.threshold, Some(0.5));
        assert_eq!(result.segments.len(), 3);
        assert!(result.segments[0].suspect);
        assert!(!result.segments[1].suspect);
        assert!(!result.segments[2].suspect);
        assert_eq!(result.text(), text);
    }

    #[test]
    fn test_html_rendering_escapes() {
        let text = "The <b> tag was removed. Fine.";
        let result = highlight(text, 0.9, HeuristicProfile::Standard);
        let html = result.to_html();
        assert!(html.starts_with("<span class=\"ai-sentence-highlight\">The &lt;b&gt; tag was removed.</span>"));
        assert!(html.ends_with(" Fine."));
    }

    #[test]
    fn test_serializes_to_json() {
        let result = highlight(SCORE_HALF, 0.9, HeuristicProfile::Standard);
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["profile"], "standard");
        assert_eq!(json["segments"][0]["suspect"], true);
    }
}
