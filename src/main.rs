use std::io::Write;
use std::process::ExitCode;

use ai_detector::app;
use ai_detector::cli::Cli;
use clap::Parser;

#[tokio::main]
async fn main() -> ExitCode {
    std::panic::set_hook(Box::new(|panic_info| {
        let payload = panic_info.payload();
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            s
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s
        } else {
            "Unknown panic payload"
        };

        let location = panic_info
            .location()
            .map(|l| format!("{}:{}:{}", l.file(), l.line(), l.column()))
            .unwrap_or_else(|| "Unknown location".to_string());

        eprintln!("[PANIC] 程序异常退出");
        eprintln!("位置: {}", location);
        eprintln!("原因: {}", message);
        eprintln!(
            "时间: {}",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
        );

        tracing::error!(event = "panic.raised", location = %location, reason = %message);
        std::io::stderr().flush().ok();
    }));

    let cli = Cli::parse();
    match app::run(cli).await {
        Ok(code) => code,
        Err(err) => {
            tracing::error!(event = "command.failed", error = %format!("{err:#}"));
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
