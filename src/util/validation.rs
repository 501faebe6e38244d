//! 上传文件的本地校验
//!
//! 全部在发起请求之前完成，被拒绝的文件不会产生任何网络调用。

use tracing::debug;

use crate::error::{DetectorError, DetectorResult};
use crate::model::{BatchValidation, FileUpload, InvalidFile};
use crate::util::config::{BatchConfig, UploadConfig};
use crate::util::logging::events;

/// 扩展名或 MIME 类型任一命中即视为支持的文档类型
pub fn is_supported_type(file: &FileUpload, upload: &UploadConfig) -> bool {
    let extension = file.extension();
    let extension = extension.trim_start_matches('.');
    let by_extension = upload
        .allowed_extensions
        .iter()
        .any(|allowed| allowed.trim_start_matches('.').eq_ignore_ascii_case(extension));

    let by_mime = file.content_type.as_deref().is_some_and(|mime| {
        upload
            .allowed_mime_types
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(mime))
    });

    by_extension || by_mime
}

pub fn is_within_size_limit(file: &FileUpload, upload: &UploadConfig) -> bool {
    file.size <= upload.max_file_size_bytes()
}

/// 单文件校验（交互式选择文件时使用）
pub fn validate_upload(file: &FileUpload, upload: &UploadConfig) -> DetectorResult<()> {
    if !is_supported_type(file, upload) {
        let extensions = upload
            .allowed_extensions
            .iter()
            .map(|e| format!(".{}", e.trim_start_matches('.')))
            .collect::<Vec<_>>()
            .join(", ");
        debug!(event = events::UPLOAD_REJECTED, file = %file.file_name, reason = "type");
        return Err(DetectorError::validation(format!(
            "Please upload a PDF or Word document ({extensions})"
        )));
    }

    if !is_within_size_limit(file, upload) {
        debug!(event = events::UPLOAD_REJECTED, file = %file.file_name, reason = "size");
        return Err(DetectorError::validation(format!(
            "File size must be less than {}MB",
            upload.max_file_size_mb
        )));
    }

    Ok(())
}

/// 批量校验
///
/// 超过文件数上限时整体拒绝；否则逐个文件给出接受或拒绝的原因。
pub fn validate_batch(
    files: Vec<FileUpload>,
    upload: &UploadConfig,
    batch: &BatchConfig,
) -> DetectorResult<BatchValidation> {
    if files.len() > batch.max_files {
        return Err(DetectorError::validation(format!(
            "Maximum {} files allowed. You selected {} files.",
            batch.max_files,
            files.len()
        )));
    }

    let mut validation = BatchValidation::default();
    for file in files {
        let reason = if !is_supported_type(&file, upload) {
            Some("Invalid file type".to_string())
        } else if !is_within_size_limit(&file, upload) {
            Some(format!("File too large (max {}MB)", upload.max_file_size_mb))
        } else {
            None
        };

        match reason {
            Some(reason) => {
                debug!(event = events::UPLOAD_REJECTED, file = %file.file_name, reason = %reason);
                validation.invalid_files.push(InvalidFile {
                    file: file.file_name,
                    reason,
                });
            }
            None => validation.valid_files.push(file),
        }
    }

    Ok(validation)
}
