//! 分析会话
//!
//! 保存一次交互的视图状态（输入方式、检测模式、文本、所选文件、结果、错误、标注），
//! 并串联远端检测、启发式标注、历史记录与报告导出。所有远端调用按顺序 await。

use anyhow::Context;
use highlight_engine::{highlight, word_count, HeuristicProfile, HighlightedText};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::api::Detector;
use crate::error::DetectorError;
use crate::model::{
    AnalysisResult, DetectionMode, FileUpload, InputKind, NewAnalysis, UserPreferences,
};
use crate::util::config::{Config, ReportConfig, UploadConfig};
use crate::util::history::HistoryManager;
use crate::util::logging::events;
use crate::util::report::{AnalysisReport, HtmlReportGenerator, PdfGenerator};
use crate::util::validation::validate_upload;

pub const TEXT_FAILURE_MESSAGE: &str = "Failed to analyze text. Please try again.";
pub const FILE_FAILURE_MESSAGE: &str = "Failed to analyze file. Please try again.";

/// 词数不足时的提示
pub fn more_words_message(missing: usize) -> String {
    format!(
        "Please add at least {} more word{} for accurate analysis.",
        missing,
        if missing == 1 { "" } else { "s" }
    )
}

pub struct AnalyzerSession {
    detector: Arc<dyn Detector>,
    history: HistoryManager,
    preferences: UserPreferences,
    profile: HeuristicProfile,
    min_words: usize,
    upload: UploadConfig,
    report: ReportConfig,

    input_kind: InputKind,
    mode: DetectionMode,
    text: String,
    selected_file: Option<FileUpload>,
    loading: bool,
    result: Option<AnalysisResult>,
    error: Option<String>,
    highlighted: Option<HighlightedText>,
}

impl AnalyzerSession {
    pub fn new(
        detector: Arc<dyn Detector>,
        history: HistoryManager,
        preferences: UserPreferences,
        config: &Config,
    ) -> Self {
        Self {
            detector,
            history,
            input_kind: preferences.default_mode,
            preferences,
            profile: config.detection.heuristic_profile,
            min_words: config.detection.min_words,
            upload: config.upload.clone(),
            report: config.report.clone(),
            mode: config.detection.default_mode,
            text: String::new(),
            selected_file: None,
            loading: false,
            result: None,
            error: None,
            highlighted: None,
        }
    }

    pub fn input_kind(&self) -> InputKind {
        self.input_kind
    }

    pub fn mode(&self) -> DetectionMode {
        self.mode
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn selected_file(&self) -> Option<&FileUpload> {
        self.selected_file.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn result(&self) -> Option<&AnalysisResult> {
        self.result.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn highlighted(&self) -> Option<&HighlightedText> {
        self.highlighted.as_ref()
    }

    pub fn profile(&self) -> HeuristicProfile {
        self.profile
    }

    pub fn set_profile(&mut self, profile: HeuristicProfile) {
        self.profile = profile;
    }

    pub fn set_mode(&mut self, mode: DetectionMode) {
        self.mode = mode;
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    /// 切换输入方式：切到文本清空文件状态，切到文件清空文本与结果
    pub fn set_input_kind(&mut self, kind: InputKind) {
        match kind {
            InputKind::Text => self.clear_file(),
            InputKind::File => {
                self.text.clear();
                self.result = None;
                self.highlighted = None;
            }
        }
        self.input_kind = kind;
    }

    pub fn word_count(&self) -> usize {
        word_count(&self.text)
    }

    /// 距离最少词数还差多少
    pub fn words_needed(&self) -> usize {
        self.min_words.saturating_sub(self.word_count())
    }

    fn reset_outcome(&mut self) {
        self.error = None;
        self.result = None;
        self.highlighted = None;
    }

    /// 提交文本检测；纯空白输入直接忽略，词数不足时只给出提示
    pub async fn handle_predict(&mut self) {
        if self.text.trim().is_empty() {
            return;
        }

        self.reset_outcome();
        let missing = self.words_needed();
        if missing > 0 {
            debug!(
                event = events::TEXT_TOO_SHORT,
                words = self.word_count(),
                min_words = self.min_words
            );
            self.error = Some(more_words_message(missing));
            return;
        }

        self.loading = true;

        match self.detector.predict_text(&self.text, self.mode).await {
            Ok(result) => {
                self.highlighted = self.highlight_for(&self.text, result.ai_probability);
                self.record_history(InputKind::Text, None, &result).await;
                self.result = Some(result);
            }
            Err(err) => self.error = Some(err.user_message(TEXT_FAILURE_MESSAGE)),
        }

        self.loading = false;
    }

    /// 选择文件并同步校验类型与大小
    pub fn select_file(&mut self, file: FileUpload) -> bool {
        match validate_upload(&file, &self.upload) {
            Ok(()) => {
                self.selected_file = Some(file);
                self.error = None;
                true
            }
            Err(err) => {
                self.error = Some(err.to_string());
                false
            }
        }
    }

    /// 上传已选择的文件做检测
    pub async fn handle_file_upload(&mut self) {
        let Some(file) = self.selected_file.clone() else {
            return;
        };

        self.loading = true;
        self.reset_outcome();

        match self.detector.predict_file(&file, self.mode).await {
            Ok(result) => {
                self.highlighted = result
                    .extracted_text
                    .as_deref()
                    .and_then(|text| self.highlight_for(text, result.ai_probability));
                self.record_history(InputKind::File, Some(&file.file_name), &result)
                    .await;
                self.result = Some(result);
            }
            Err(err) => self.error = Some(err.user_message(FILE_FAILURE_MESSAGE)),
        }

        self.loading = false;
    }

    pub fn clear_file(&mut self) {
        self.selected_file = None;
        self.reset_outcome();
    }

    fn highlight_for(&self, text: &str, ai_probability: f64) -> Option<HighlightedText> {
        if !self.preferences.show_highlighting {
            return None;
        }
        let highlighted = highlight(text, ai_probability, self.profile);
        debug!(
            event = events::HIGHLIGHT_APPLIED,
            profile = ?self.profile,
            active = highlighted.is_active(),
            suspects = highlighted.suspect_count()
        );
        Some(highlighted)
    }

    /// 历史写入失败只记录日志，不影响本次结果
    async fn record_history(
        &self,
        kind: InputKind,
        file_name: Option<&str>,
        result: &AnalysisResult,
    ) {
        if !self.preferences.auto_save_history {
            return;
        }
        let entry = NewAnalysis {
            kind,
            file_name,
            text: Some(&self.text),
            result,
        };
        if let Err(err) = self.history.save(entry).await {
            warn!(event = events::HISTORY_SAVE, error = %err, "保存历史记录失败");
        }
    }

    fn current_report(&self) -> Result<AnalysisReport<'_>, DetectorError> {
        let result = self
            .result
            .as_ref()
            .ok_or_else(|| DetectorError::validation("No analysis result to export"))?;
        Ok(AnalysisReport::new(result, self.input_kind, &self.text)
            .with_highlight(self.highlighted.as_ref())
            .with_text_limit(self.report.text_limit))
    }

    pub fn render_html(&self) -> anyhow::Result<String> {
        Ok(HtmlReportGenerator::generate(&self.current_report()?))
    }

    /// 写出 HTML 报告，返回文件路径
    pub async fn export_html(&self, output_dir: &Path) -> anyhow::Result<PathBuf> {
        let report = self.current_report()?;
        tokio::fs::create_dir_all(output_dir)
            .await
            .with_context(|| format!("创建报告目录失败: {}", output_dir.display()))?;
        let path = output_dir.join(report.html_file_name());
        tokio::fs::write(&path, HtmlReportGenerator::generate(&report))
            .await
            .with_context(|| format!("写入HTML报告失败: {}", path.display()))?;
        Ok(path)
    }

    pub async fn export_pdf(&self, output_dir: &Path) -> anyhow::Result<PathBuf> {
        let report = self.current_report()?;
        let generator = PdfGenerator::from_config(&self.report);
        generator.check_pdf_tools()?;
        generator.render(&report, output_dir).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::stub::StubDetector;
    use crate::storage::{MemoryStorage, Storage};
    use crate::util::config::HistoryConfig;
    use highlight_engine::threshold_for;

    const ESSAY: &str = "Furthermore, it is important to note that artificial intelligence \
        has fundamentally transformed the landscape of modern education. Moreover, educators \
        must leverage innovative strategies to facilitate comprehensive learning outcomes. \
        The data was collected and analyzed over several months. I walked my dog in the park \
        yesterday and it rained. Additionally, a holistic approach can be implemented to \
        optimize student engagement and foster critical thinking skills across diverse \
        contexts. However, the implications of these developments should be considered \
        carefully by stakeholders. We had pizza for dinner. In conclusion, it is evident \
        that the integration of technology plays a crucial role in shaping the future of \
        learning, and institutions should be prepared to navigate this paradigm shift.";

    fn session_with(detector: Arc<StubDetector>, prefs: UserPreferences) -> (AnalyzerSession, HistoryManager) {
        let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
        let history = HistoryManager::new(storage.clone(), &HistoryConfig::default());
        let session = AnalyzerSession::new(
            detector,
            HistoryManager::new(storage, &HistoryConfig::default()),
            prefs,
            &Config::default(),
        );
        (session, history)
    }

    #[tokio::test]
    async fn test_predict_long_text_fills_result_and_highlight() {
        assert!(word_count(ESSAY) > 100);
        let detector = Arc::new(StubDetector::new(0.85));
        let (mut session, history) = session_with(detector.clone(), UserPreferences::default());

        session.set_text(ESSAY);
        session.set_mode(DetectionMode::Hybrid);
        session.handle_predict().await;

        assert!(!session.is_loading());
        assert!(session.error().is_none());
        let result = session.result().unwrap();
        assert_eq!(result.ai_probability, 0.85);
        assert!((result.human_probability - 0.15).abs() < 1e-9);

        let highlighted = session.highlighted().unwrap();
        assert!(highlighted.is_active());
        assert_eq!(highlighted.text(), ESSAY);
        assert_eq!(highlighted.threshold, Some(threshold_for(0.85)));
        assert!(highlighted.suspect_count() > 0);
        // 逐句：可疑当且仅当得分达到阈值
        for segment in &highlighted.segments {
            assert_eq!(segment.suspect, segment.score >= 0.3);
        }
        assert!(highlighted
            .suspects()
            .any(|s| s.text.trim_start().starts_with("Furthermore")));
        assert!(!highlighted
            .suspects()
            .any(|s| s.text.contains("We had pizza")));

        assert_eq!(detector.calls(), vec!["text:hybrid"]);

        let items = history.list().await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].kind, InputKind::Text);
        assert_eq!(items[0].text.as_deref().map(|t| t.chars().count()), Some(500));
    }

    #[tokio::test]
    async fn test_low_probability_leaves_text_unhighlighted() {
        let (mut session, _) = session_with(Arc::new(StubDetector::new(0.1)), UserPreferences::default());
        session.set_text(ESSAY);
        session.handle_predict().await;

        let highlighted = session.highlighted().unwrap();
        assert!(!highlighted.is_active());
        assert!(!highlighted.to_html().contains("<span"));
    }

    #[tokio::test]
    async fn test_whitespace_text_is_ignored() {
        let detector = Arc::new(StubDetector::new(0.9));
        let (mut session, _) = session_with(detector.clone(), UserPreferences::default());
        session.set_text("   \n\t ");
        session.handle_predict().await;

        assert!(session.result().is_none());
        assert!(detector.calls().is_empty());
    }

    #[tokio::test]
    async fn test_short_text_asks_for_more_words() {
        let detector = Arc::new(StubDetector::new(0.9));
        let (mut session, history) = session_with(detector.clone(), UserPreferences::default());
        session.set_text("only five words here now");
        assert_eq!(session.words_needed(), 95);
        session.handle_predict().await;

        assert!(detector.calls().is_empty());
        assert!(session.result().is_none());
        assert!(!session.is_loading());
        assert_eq!(
            session.error(),
            Some("Please add at least 95 more words for accurate analysis.")
        );
        assert!(history.list().await.unwrap().is_empty());

        // 补足后提示消失
        session.set_text(ESSAY);
        assert_eq!(session.words_needed(), 0);
        session.handle_predict().await;
        assert!(session.error().is_none());
        assert_eq!(detector.calls(), vec!["text:default"]);
    }

    #[test]
    fn test_more_words_message_singular() {
        assert_eq!(
            more_words_message(1),
            "Please add at least 1 more word for accurate analysis."
        );
    }

    #[tokio::test]
    async fn test_min_words_zero_disables_check() {
        let mut config = Config::default();
        config.detection.min_words = 0;
        let detector = Arc::new(StubDetector::new(0.4));
        let session_detector: Arc<dyn Detector> = detector.clone();
        let mut session = AnalyzerSession::new(
            session_detector,
            HistoryManager::new(Arc::new(MemoryStorage::new()), &HistoryConfig::default()),
            UserPreferences::default(),
            &config,
        );
        session.set_text("short run");
        session.handle_predict().await;

        assert!(session.error().is_none());
        assert!(session.result().is_some());
        assert_eq!(detector.calls(), vec!["text:default"]);
    }

    #[tokio::test]
    async fn test_server_error_is_shown() {
        let failing = Arc::new(StubDetector {
            text_error: Some("Text too short".to_string()),
            ..Default::default()
        });
        let (mut session, history) = session_with(failing, UserPreferences::default());
        session.set_text(ESSAY);
        session.handle_predict().await;

        assert!(session.result().is_none());
        assert!(session.highlighted().is_none());
        assert_eq!(session.error(), Some("Text too short"));
        assert!(history.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_preferences_disable_history_and_highlighting() {
        let prefs = UserPreferences {
            auto_save_history: false,
            show_highlighting: false,
            ..Default::default()
        };
        let (mut session, history) = session_with(Arc::new(StubDetector::new(0.95)), prefs);
        session.set_text(ESSAY);
        session.handle_predict().await;

        assert!(session.result().is_some());
        assert!(session.highlighted().is_none());
        assert!(history.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_select_file_validation() {
        let (mut session, _) = session_with(Arc::new(StubDetector::new(0.5)), UserPreferences::default());

        assert!(!session.select_file(FileUpload::new("photo.png", 10)));
        assert_eq!(
            session.error(),
            Some("Please upload a PDF or Word document (.pdf, .docx, .doc)")
        );

        assert!(!session.select_file(FileUpload::new("huge.pdf", 11 * 1024 * 1024)));
        assert_eq!(session.error(), Some("File size must be less than 10MB"));

        assert!(session.select_file(FileUpload::new("paper.pdf", 1024)));
        assert!(session.error().is_none());
        assert_eq!(session.selected_file().unwrap().file_name, "paper.pdf");
    }

    #[tokio::test]
    async fn test_file_upload_highlights_extracted_text() {
        let detector = Arc::new(StubDetector {
            ai_probability: 0.9,
            extracted_text: Some(ESSAY.to_string()),
            ..Default::default()
        });
        let (mut session, history) = session_with(detector.clone(), UserPreferences::default());

        // 未选择文件时不发请求
        session.handle_file_upload().await;
        assert!(detector.calls().is_empty());

        session.set_input_kind(InputKind::File);
        session.set_mode(DetectionMode::Ml);
        assert!(session.select_file(FileUpload::new("essay.docx", 4096)));
        session.handle_file_upload().await;

        assert_eq!(detector.calls(), vec!["file:ml:essay.docx"]);
        assert!(session.highlighted().unwrap().is_active());

        let items = history.list().await.unwrap();
        assert_eq!(items[0].kind, InputKind::File);
        assert_eq!(items[0].file_name.as_deref(), Some("essay.docx"));
        assert!(items[0].text.is_none());

        session.clear_file();
        assert!(session.selected_file().is_none());
        assert!(session.result().is_none());
    }

    #[tokio::test]
    async fn test_file_failure_uses_server_message() {
        let detector = Arc::new(StubDetector {
            fail_files: vec!["empty".to_string()],
            ..Default::default()
        });
        let (mut session, _) = session_with(detector, UserPreferences::default());
        assert!(session.select_file(FileUpload::new("empty.pdf", 10)));
        session.handle_file_upload().await;
        assert_eq!(session.error(), Some("No text found in file"));
    }

    #[tokio::test]
    async fn test_export_html_requires_result() {
        let dir = tempfile::tempdir().unwrap();
        let (mut session, _) = session_with(Arc::new(StubDetector::new(0.75)), UserPreferences::default());
        assert!(session.export_html(dir.path()).await.is_err());

        session.set_text(ESSAY);
        session.handle_predict().await;
        let path = session.export_html(dir.path()).await.unwrap();
        let name = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("ai_analysis_") && name.ends_with(".html"));

        let html = std::fs::read_to_string(path).unwrap();
        assert!(html.contains("Confidence Level: High"));
        assert!(html.contains("ai-sentence-highlight"));
    }

    #[test]
    fn test_word_count_and_input_switch() {
        let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
        let mut session = AnalyzerSession::new(
            Arc::new(StubDetector::new(0.5)),
            HistoryManager::new(storage, &HistoryConfig::default()),
            UserPreferences::default(),
            &Config::default(),
        );
        session.set_text("  one two\tthree\nfour  ");
        assert_eq!(session.word_count(), 4);

        session.set_input_kind(InputKind::File);
        assert_eq!(session.text(), "");
        assert_eq!(session.input_kind(), InputKind::File);
    }
}
