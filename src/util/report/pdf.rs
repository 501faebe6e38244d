//! PDF报告生成
//! 先写出临时HTML，再调用外部 wkhtmltopdf 转换

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};
use tokio::task;
use tracing::{debug, error, info, warn};

use super::{AnalysisReport, HtmlReportGenerator};
use crate::util::config::ReportConfig;
use crate::util::logging::events;

/// PDF生成器
#[derive(Debug, Clone)]
pub struct PdfGenerator {
    tool: String,
    timeout: Duration,
}

impl PdfGenerator {
    pub fn new(tool: impl Into<String>, timeout: Duration) -> Self {
        Self {
            tool: tool.into(),
            timeout,
        }
    }

    pub fn from_config(config: &ReportConfig) -> Self {
        Self::new(
            config.wkhtmltopdf_path.clone(),
            Duration::from_secs(config.timeout_secs),
        )
    }

    /// 生成分析报告PDF，返回输出路径
    pub async fn render(&self, report: &AnalysisReport<'_>, output_dir: &Path) -> Result<PathBuf> {
        tokio::fs::create_dir_all(output_dir)
            .await
            .with_context(|| format!("创建报告目录失败: {}", output_dir.display()))?;

        let html = HtmlReportGenerator::generate(report);
        let output_path = output_dir.join(report.pdf_file_name());
        self.html_to_pdf(&html, &output_path).await?;
        Ok(output_path)
    }

    /// 将HTML转换为PDF
    pub async fn html_to_pdf(&self, html_content: &str, output_path: &Path) -> Result<()> {
        debug!(
            target: "report.pdf",
            event = events::REPORT_PDF,
            stage = "html_to_pdf",
            path = %output_path.display()
        );

        let temp_html_path = output_path.with_extension("temp.html");
        tokio::fs::write(&temp_html_path, html_content.as_bytes())
            .await
            .with_context(|| format!("无法写入临时HTML文件: {}", temp_html_path.display()))?;

        let tool = self.tool.clone();
        let timeout = self.timeout;
        let html = temp_html_path.clone();
        let pdf = output_path.to_path_buf();
        let result = task::spawn_blocking(move || run_wkhtmltopdf_blocking(&tool, &html, &pdf, timeout))
            .await
            .map_err(|e| anyhow::anyhow!("wkhtmltopdf join error: {}", e))
            .and_then(|r| r);

        if let Err(e) = tokio::fs::remove_file(&temp_html_path).await {
            warn!("清理临时文件失败: {} - {}", temp_html_path.display(), e);
        }

        match &result {
            Ok(()) => info!(
                target: "report.pdf",
                event = events::REPORT_PDF,
                stage = "complete",
                path = %output_path.display()
            ),
            Err(e) => warn!(
                target: "report.pdf",
                event = events::REPORT_ERROR,
                path = %output_path.display(),
                error = %e
            ),
        }
        result
    }

    /// 检查PDF转换工具是否可用
    pub fn check_pdf_tools(&self) -> Result<()> {
        let status = Command::new(&self.tool)
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status();

        match status {
            Ok(status) if status.success() => {
                debug!("[ok] {} 可用", self.tool);
                Ok(())
            }
            Ok(_) => Err(anyhow::anyhow!("{} 执行失败", self.tool)),
            Err(e) => Err(anyhow::anyhow!("{} 未安装: {}", self.tool, e)),
        }
    }
}

fn run_wkhtmltopdf_blocking(
    tool: &str,
    html_path: &Path,
    output_path: &Path,
    timeout: Duration,
) -> Result<()> {
    let mut command = Command::new(tool);
    command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    command.args([
        "--page-size",
        "A4",
        "--margin-top",
        "20mm",
        "--margin-bottom",
        "20mm",
        "--margin-left",
        "20mm",
        "--margin-right",
        "20mm",
        "--encoding",
        "UTF-8",
        "--print-media-type",
        "--enable-local-file-access",
        "--quiet",
    ]);
    command.arg(html_path);
    command.arg(output_path);

    let start = Instant::now();
    let mut child = command
        .spawn()
        .with_context(|| format!("执行{}失败", tool))?;

    loop {
        if child.try_wait().context("等待wkhtmltopdf失败")?.is_some() {
            let output = child
                .wait_with_output()
                .context("获取wkhtmltopdf输出失败")?;
            if !output.status.success() {
                error!("wkhtmltopdf转换失败，退出码: {:?}", output.status.code());
                if !output.stderr.is_empty() {
                    error!(
                        "wkhtmltopdf stderr: {}",
                        String::from_utf8_lossy(&output.stderr)
                    );
                }
                return Err(anyhow::anyhow!("PDF转换失败"));
            }
            return Ok(());
        }

        if start.elapsed() > timeout {
            let _ = child.kill();
            let _ = child.wait();
            return Err(anyhow::anyhow!("wkhtmltopdf 超时({:?})，已终止", timeout));
        }

        std::thread::sleep(Duration::from_millis(200));
    }
}
