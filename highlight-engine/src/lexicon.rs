//! 启发式词表与评分参数
//!
//! 两套参数：`Standard` 为默认口径；`Aggressive` 额外统计正式用词、逗号密度以及
//! that/which 从句，阈值保持一致。

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// 正式过渡词
pub const FORMAL_TRANSITIONS: &[&str] = &[
    "furthermore",
    "moreover",
    "additionally",
    "consequently",
    "therefore",
    "thus",
    "hence",
    "nevertheless",
    "nonetheless",
    "subsequently",
    "accordingly",
    "henceforth",
    "likewise",
    "similarly",
    "conversely",
    "alternatively",
    "meanwhile",
];

/// 学术化用语
pub const ACADEMIC_LANGUAGE: &[&str] = &[
    "comprehensive",
    "multifaceted",
    "paramount",
    "crucial",
    "essential",
    "significant",
    "substantial",
    "considerable",
    "notable",
    "remarkable",
    "intricate",
    "nuanced",
    "pivotal",
    "fundamental",
    "integral",
    "imperative",
    "vital",
    "critical",
];

/// 生成文本偏好的动词
pub const AI_VERBS: &[&str] = &[
    "delve",
    "embark",
    "leverage",
    "utilize",
    "utilise",
    "facilitate",
    "implement",
    "optimize",
    "optimise",
    "enhance",
    "revolutionize",
    "transform",
    "streamline",
    "harness",
    "employ",
    "encompass",
    "demonstrate",
    "illustrate",
    "exemplify",
    "underscore",
];

pub const BUZZWORDS: &[&str] = &[
    "innovative",
    "cutting-edge",
    "state-of-the-art",
    "groundbreaking",
    "pioneering",
    "revolutionary",
    "transformative",
    "unprecedented",
    "dynamic",
    "robust",
    "seamless",
    "holistic",
    "synergistic",
    "paradigm",
];

/// 套话
pub const STOCK_PHRASES: &[&str] = &[
    "it is important to note",
    "it should be noted",
    "it is worth mentioning",
    "it is crucial to understand",
    "in conclusion",
    "in summary",
    "to summarize",
    "overall",
    "ultimately",
    "in essence",
    "fundamentally",
    "it is evident",
    "it is clear",
    "as such",
    "in other words",
];

/// 仅 Aggressive 使用
pub const FORMAL_WORDS: &[&str] = &[
    "various",
    "numerous",
    "multiple",
    "diverse",
    "myriad",
    "plethora",
    "array",
    "range",
    "spectrum",
    "variety",
    "aspect",
    "factor",
    "element",
    "component",
    "dimension",
];

static PASSIVE_BE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(is|are|was|were|been|being)\s+\w+ed\b").unwrap());

static PASSIVE_MODAL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(can|could|should|would|may|might|must)\s+be\s+\w+ed\b").unwrap()
});

static PASSIVE_PERFECT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(has|have|had)\s+been\s+\w+ed\b").unwrap());

pub(crate) static FORMAL_OPENER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^(Furthermore|Moreover|Additionally|However|Nevertheless|Consequently|Therefore|Thus)",
    )
    .unwrap()
});

pub(crate) static THAT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bthat\b").unwrap());
pub(crate) static WHICH_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bwhich\b").unwrap());

/// 启发式参数档位
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeuristicProfile {
    #[default]
    Standard,
    Aggressive,
}

impl HeuristicProfile {
    pub fn as_str(&self) -> &'static str {
        match self {
            HeuristicProfile::Standard => "standard",
            HeuristicProfile::Aggressive => "aggressive",
        }
    }

    /// 参与计分的关键词类别
    pub fn categories(&self) -> &'static [&'static [&'static str]] {
        const STANDARD: &[&[&str]] = &[
            FORMAL_TRANSITIONS,
            ACADEMIC_LANGUAGE,
            AI_VERBS,
            BUZZWORDS,
            STOCK_PHRASES,
        ];
        const AGGRESSIVE: &[&[&str]] = &[
            FORMAL_TRANSITIONS,
            ACADEMIC_LANGUAGE,
            AI_VERBS,
            BUZZWORDS,
            STOCK_PHRASES,
            FORMAL_WORDS,
        ];
        match self {
            HeuristicProfile::Standard => STANDARD,
            HeuristicProfile::Aggressive => AGGRESSIVE,
        }
    }

    pub(crate) fn passive_patterns(&self) -> Vec<&'static Regex> {
        let mut patterns = vec![&*PASSIVE_BE_RE, &*PASSIVE_MODAL_RE];
        if matches!(self, HeuristicProfile::Aggressive) {
            patterns.push(&*PASSIVE_PERFECT_RE);
        }
        patterns
    }

    /// 是否统计逗号与 that/which 从句
    pub fn counts_clauses(&self) -> bool {
        matches!(self, HeuristicProfile::Aggressive)
    }
}

impl std::str::FromStr for HeuristicProfile {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "standard" | "basic" => Ok(HeuristicProfile::Standard),
            "aggressive" | "enhanced" => Ok(HeuristicProfile::Aggressive),
            other => Err(format!("unknown heuristic profile: {other}")),
        }
    }
}

impl std::fmt::Display for HeuristicProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_has_five_categories() {
        assert_eq!(HeuristicProfile::Standard.categories().len(), 5);
        assert_eq!(HeuristicProfile::Aggressive.categories().len(), 6);
    }

    #[test]
    fn test_profile_parse() {
        assert_eq!(
            "Enhanced".parse::<HeuristicProfile>().unwrap(),
            HeuristicProfile::Aggressive
        );
        assert_eq!(
            "standard".parse::<HeuristicProfile>().unwrap(),
            HeuristicProfile::Standard
        );
        assert!("loud".parse::<HeuristicProfile>().is_err());
    }

    #[test]
    fn test_keywords_are_lowercase() {
        for category in HeuristicProfile::Aggressive.categories() {
            for word in category.iter() {
                assert_eq!(*word, word.to_lowercase());
            }
        }
    }
}
