//! Centralised logging metadata (event names, shared keys, etc.).

/// Canonical event names used across the client.
pub mod events {
    /// Remote classification calls.
    pub const ANALYSIS_REQUEST: &str = "analysis.request";
    pub const ANALYSIS_COMPLETE: &str = "analysis.complete";
    pub const ANALYSIS_ERROR: &str = "analysis.error";
    pub const SERVICE_HEALTH: &str = "service.health";

    /// Local validation.
    pub const UPLOAD_REJECTED: &str = "upload.rejected";
    pub const TEXT_TOO_SHORT: &str = "text.too_short";

    /// Batch runs.
    pub const BATCH_START: &str = "batch.start";
    pub const BATCH_ITEM: &str = "batch.item";
    pub const BATCH_ITEM_ERROR: &str = "batch.item_error";
    pub const BATCH_COMPLETE: &str = "batch.complete";

    /// 历史与偏好持久化。
    pub const HISTORY_SAVE: &str = "history.save";
    pub const HISTORY_CORRUPT: &str = "history.corrupt";
    pub const HISTORY_IMPORT: &str = "history.import";
    pub const HISTORY_EXPORT: &str = "history.export";
    pub const PREFERENCES_CORRUPT: &str = "preferences.corrupt";
    pub const PREFERENCES_SAVE: &str = "preferences.save";
    pub const STORAGE_HEALTH: &str = "storage.health";

    /// Highlighting and report export.
    pub const HIGHLIGHT_APPLIED: &str = "highlight.applied";
    pub const REPORT_HTML: &str = "report.html";
    pub const REPORT_PDF: &str = "report.pdf";
    pub const REPORT_CSV: &str = "report.csv";
    pub const REPORT_ERROR: &str = "report.error";
}
