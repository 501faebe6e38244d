//! 批量文档检测
//!
//! 严格串行：同一时刻只有一个请求在途，相邻请求之间固定等待。
//! 单个文件失败只记录错误，不会中断整批。

use chrono::Utc;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, warn};

use crate::api::Detector;
use crate::model::{
    BatchFileError, BatchFileResult, BatchProgress, BatchRunResult, BatchStatus, DetectionMode,
    FileUpload,
};
use crate::util::config::BatchConfig;
use crate::util::logging::events;

pub struct BatchRunner {
    detector: Arc<dyn Detector>,
    mode: DetectionMode,
    delay: Duration,
}

impl BatchRunner {
    pub fn new(detector: Arc<dyn Detector>, mode: DetectionMode, delay: Duration) -> Self {
        Self {
            detector,
            mode,
            delay,
        }
    }

    pub fn from_config(detector: Arc<dyn Detector>, mode: DetectionMode, config: &BatchConfig) -> Self {
        Self::new(detector, mode, Duration::from_millis(config.delay_ms))
    }

    /// 依次处理已通过校验的文件，每个文件请求前后各回调一次进度
    pub async fn run<F>(&self, files: &[FileUpload], mut on_progress: F) -> BatchRunResult
    where
        F: FnMut(&BatchProgress),
    {
        let started_at = Utc::now();
        let started = Instant::now();
        let total = files.len();

        info!(event = events::BATCH_START, total, mode = self.mode.as_str());

        let mut results = Vec::new();
        let mut errors = Vec::new();

        for (index, file) in files.iter().enumerate() {
            on_progress(&BatchProgress {
                current: index + 1,
                total,
                file_name: file.file_name.clone(),
                status: BatchStatus::Processing,
                processed: results.len(),
                errors: errors.len(),
            });

            let status = match self.detector.predict_file(file, self.mode).await {
                Ok(result) => {
                    info!(
                        event = events::BATCH_ITEM,
                        file = %file.file_name,
                        index = index + 1,
                        total,
                        is_ai = result.is_ai
                    );
                    results.push(BatchFileResult {
                        file: file.file_name.clone(),
                        size: file.size,
                        result,
                        timestamp: Utc::now(),
                    });
                    BatchStatus::Completed
                }
                Err(err) => {
                    warn!(
                        event = events::BATCH_ITEM_ERROR,
                        file = %file.file_name,
                        index = index + 1,
                        total,
                        error = %err
                    );
                    errors.push(BatchFileError {
                        file: file.file_name.clone(),
                        error: err.user_message(&err.to_string()),
                        timestamp: Utc::now(),
                    });
                    BatchStatus::Error
                }
            };

            on_progress(&BatchProgress {
                current: index + 1,
                total,
                file_name: file.file_name.clone(),
                status,
                processed: results.len(),
                errors: errors.len(),
            });

            // 最后一个文件之后不再等待
            if index + 1 < total && !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
        }

        let summary = BatchRunResult {
            total,
            successful: results.len(),
            failed: errors.len(),
            results,
            errors,
            started_at,
            finished_at: Utc::now(),
        };

        info!(
            event = events::BATCH_COMPLETE,
            total,
            successful = summary.successful,
            failed = summary.failed,
            duration_ms = started.elapsed().as_millis() as u64
        );

        summary
    }
}
