pub mod analysis;
pub mod batch;
pub mod history;
pub mod preferences;
pub mod upload;

pub use analysis::{format_percent, AnalysisResult, ConfidenceTier, DetectionMode, InputKind};
pub use batch::{
    BatchFileError, BatchFileResult, BatchProgress, BatchRunResult, BatchStatus, BatchValidation,
    InvalidFile,
};
pub use history::{
    Classification, HistoryFilter, HistoryItem, HistoryResult, HistoryStats, ImportOutcome,
    NewAnalysis,
};
pub use preferences::{ExportFormat, Theme, UserPreferences};
pub use upload::FileUpload;
