//! 命令分发
//!
//! 加载配置、初始化日志、组装 [`AppState`]，再把子命令交给对应的处理函数。
//! 命令结果写到 stdout，日志与错误写到 stderr。

pub mod config;
pub mod render;

use anyhow::{bail, Context, Result};
use highlight_engine::highlight;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{info, warn};

use crate::cli::{AnalyzeArgs, Cli, Commands, ConfigCommand, FilterArgs, HistoryCommand, PrefsCommand};
use crate::model::{DetectionMode, FileUpload, HistoryFilter, InputKind};
use crate::util::batch::BatchRunner;
use crate::util::config::{ConfigValidator, ConfigWriter};
use crate::util::log::log_init_with_config;
use crate::util::report::write_batch_csv;
use crate::util::validation::validate_batch;
use crate::AppState;
use config::{ConfigManager, CONFIG_FILE_NAME};

const LOG_FILE_PREFIX: &str = "ai-detector";

pub async fn run(cli: Cli) -> Result<ExitCode> {
    match &cli.command {
        Commands::Version => {
            println!("{}", crate::build_info::summary());
            return Ok(ExitCode::SUCCESS);
        }
        Commands::Config {
            command: ConfigCommand::Init { force },
        } => return init_config(cli.config.as_deref(), *force),
        _ => {}
    }

    let loaded = ConfigManager::load(cli.config.as_deref())?;
    let _log_guard = log_init_with_config(LOG_FILE_PREFIX, &loaded.config.logging, cli.verbose)?;

    if loaded.template_written {
        warn!(
            event = "config.template_written",
            path = %loaded.path.display(),
            "配置文件不存在，已生成模板"
        );
    }
    info!(event = "config.load.success", path = %loaded.path.display());

    let report = ConfigValidator::validate_all(&loaded.config);
    if let Commands::Config {
        command: ConfigCommand::Check,
    } = &cli.command
    {
        println!("Config file: {}", loaded.path.display());
        print!("{}", render::validation_report(&report));
        return Ok(exit_code(report.is_valid()));
    }
    if report.has_errors() {
        let issues: Vec<String> = report.errors.iter().map(|e| e.to_string()).collect();
        bail!("配置校验失败 ({}): {}", loaded.path.display(), issues.join("; "));
    }
    report.log_warnings();

    let state = AppState::from_config(loaded.config)?;
    dispatch(&state, cli.command).await
}

async fn dispatch(state: &AppState, command: Commands) -> Result<ExitCode> {
    match command {
        Commands::Analyze(args) => analyze(state, args).await,
        Commands::Highlight {
            probability,
            profile,
            html,
            file,
        } => {
            let text = read_input(file.as_deref())?;
            let profile = profile.unwrap_or(state.config.detection.heuristic_profile);
            let highlighted = highlight(&text, probability, profile);
            if html {
                println!("{}", highlighted.to_html());
            } else {
                print!("{}", render::highlight_listing(&highlighted));
            }
            Ok(ExitCode::SUCCESS)
        }
        Commands::Batch {
            files,
            mode,
            csv,
            output_dir,
        } => batch(state, files, mode, csv, output_dir).await,
        Commands::History { command } => history(state, command).await,
        Commands::Prefs { command } => {
            let manager = state.preferences();
            let prefs = match command {
                PrefsCommand::Show => manager.load().await?,
                PrefsCommand::Set { key, value } => manager.set(&key, &value).await?,
            };
            println!("{}", serde_json::to_string_pretty(&prefs)?);
            Ok(ExitCode::SUCCESS)
        }
        Commands::Theme { toggle } => {
            let manager = state.preferences();
            let theme = if toggle {
                manager.toggle_theme().await?
            } else {
                manager.theme().await?
            };
            println!("{}", theme);
            Ok(ExitCode::SUCCESS)
        }
        Commands::Health => health(state).await,
        Commands::Info => {
            let info = state.detector.info().await?;
            println!("{}", serde_json::to_string_pretty(&info)?);
            Ok(ExitCode::SUCCESS)
        }
        // 已在加载配置前处理
        Commands::Version | Commands::Config { .. } => Ok(ExitCode::SUCCESS),
    }
}

async fn analyze(state: &AppState, args: AnalyzeArgs) -> Result<ExitCode> {
    let mut session = state.session().await?;
    if let Some(mode) = args.mode {
        session.set_mode(mode);
    }
    if let Some(profile) = args.profile {
        session.set_profile(profile);
    }

    match &args.file {
        Some(path) => {
            session.set_input_kind(InputKind::File);
            let upload = FileUpload::from_path(path)?;
            if session.select_file(upload) {
                session.handle_file_upload().await;
            }
        }
        None => {
            let text = match args.text {
                Some(text) => text,
                None => read_input(None)?,
            };
            session.set_input_kind(InputKind::Text);
            session.set_text(text);
            if session.text().trim().is_empty() {
                bail!("Please enter some text to analyze");
            }
            session.handle_predict().await;
        }
    }

    if let Some(message) = session.error() {
        eprintln!("{}", message);
        return Ok(ExitCode::FAILURE);
    }
    let Some(result) = session.result() else {
        return Ok(ExitCode::FAILURE);
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(result)?);
    } else {
        print!("{}", render::analysis_result(result));
        if session.input_kind() == InputKind::Text {
            println!("Input words:      {}", session.word_count());
        }
        if let Some(highlighted) = session.highlighted() {
            println!();
            print!("{}", render::highlight_listing(highlighted));
        }
    }

    let output_dir = report_dir(state, args.output_dir);
    if args.html {
        let path = session.export_html(&output_dir).await?;
        eprintln!("HTML report written to {}", path.display());
    }
    if args.pdf {
        let path = session.export_pdf(&output_dir).await?;
        eprintln!("PDF report written to {}", path.display());
    }

    Ok(ExitCode::SUCCESS)
}

/// 远端服务与本地存储一起检查，任一不健康即返回失败
async fn health(state: &AppState) -> Result<ExitCode> {
    let storage_ok = state.storage.health_check().await?;
    let health = state.detector.health().await?;
    print!("{}", render::service_health(&health, storage_ok));
    Ok(exit_code(health.is_healthy() && storage_ok))
}

async fn batch(
    state: &AppState,
    files: Vec<PathBuf>,
    mode: Option<DetectionMode>,
    csv: bool,
    output_dir: Option<PathBuf>,
) -> Result<ExitCode> {
    let uploads = files
        .iter()
        .map(FileUpload::from_path)
        .collect::<Result<Vec<_>, _>>()?;

    let validation = validate_batch(uploads, &state.config.upload, &state.config.batch)?;
    eprint!("{}", render::batch_validation(&validation));
    if !validation.is_valid() {
        bail!("No valid files to process");
    }

    let mode = mode.unwrap_or(state.config.detection.default_mode);
    let runner = BatchRunner::from_config(state.detector.clone(), mode, &state.config.batch);
    let summary = runner
        .run(&validation.valid_files, |progress| {
            eprintln!("{}", render::batch_progress(progress))
        })
        .await;

    print!("{}", render::batch_summary(&summary));

    if csv && !summary.results.is_empty() {
        let path = write_batch_csv(&summary.results, &report_dir(state, output_dir)).await?;
        eprintln!("CSV written to {}", path.display());
    }

    Ok(exit_code(summary.failed == 0))
}

async fn history(state: &AppState, command: HistoryCommand) -> Result<ExitCode> {
    let manager = state.history();
    match command {
        HistoryCommand::List { limit } => {
            let mut items = manager.list().await?;
            if let Some(limit) = limit {
                items.truncate(limit);
            }
            print!("{}", render::history_table(&items));
        }
        HistoryCommand::Show { id } => match manager.get(&id).await? {
            Some(item) => print!("{}", render::history_item(&item)),
            None => {
                eprintln!("No history item with id {}", id);
                return Ok(ExitCode::FAILURE);
            }
        },
        HistoryCommand::Search { query } => {
            print!("{}", render::history_table(&manager.search(&query).await?));
        }
        HistoryCommand::Filter(args) => {
            let filter = history_filter(args);
            print!("{}", render::history_table(&manager.filter(&filter).await?));
        }
        HistoryCommand::Delete { id } => {
            if !manager.delete(&id).await? {
                eprintln!("No history item with id {}", id);
                return Ok(ExitCode::FAILURE);
            }
            println!("Deleted {}", id);
        }
        HistoryCommand::Clear { yes } => {
            if !yes {
                bail!("Refusing to clear all history without --yes");
            }
            manager.clear().await?;
            println!("History cleared");
        }
        HistoryCommand::Stats => print!("{}", render::history_stats(&manager.stats().await?)),
        HistoryCommand::Export { output_dir } => {
            let path = manager.export_to(&report_dir(state, output_dir)).await?;
            println!("{}", path.display());
        }
        HistoryCommand::Import { path } => {
            let outcome = manager
                .import_from(&path)
                .await
                .with_context(|| format!("导入失败: {}", path.display()))?;
            println!(
                "Imported {} item(s); history now holds {}",
                outcome.imported, outcome.total_after_merge
            );
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn history_filter(args: FilterArgs) -> HistoryFilter {
    HistoryFilter {
        kind: args.kind,
        classification: args.classification,
        date_from: args.from,
        date_to: args.to,
        min_probability: args.min_probability,
    }
}

fn init_config(explicit: Option<&Path>, force: bool) -> Result<ExitCode> {
    let path = explicit
        .map(Path::to_path_buf)
        .unwrap_or_else(|| ConfigManager::find_config_file_path(CONFIG_FILE_NAME));
    if path.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", path.display());
    }
    ConfigWriter::generate_example_config(&path)?;
    println!("{}", path.display());
    Ok(ExitCode::SUCCESS)
}

fn report_dir(state: &AppState, explicit: Option<PathBuf>) -> PathBuf {
    explicit.unwrap_or_else(|| state.config.report.output_dir.clone())
}

/// 读取文件内容，未给路径时读取 stdin
fn read_input(file: Option<&Path>) -> Result<String> {
    match file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("读取文件失败: {}", path.display())),
        None => {
            let mut input = String::new();
            std::io::stdin()
                .read_to_string(&mut input)
                .context("读取标准输入失败")?;
            Ok(input)
        }
    }
}

fn exit_code(success: bool) -> ExitCode {
    if success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::stub::StubDetector;
    use crate::storage::{LocalStorage, MemoryStorage};
    use crate::util::config::Config;
    use std::sync::Arc;

    fn state(detector: StubDetector) -> AppState {
        AppState::with_parts(
            Config::default(),
            Arc::new(MemoryStorage::new()),
            Arc::new(detector),
        )
    }

    #[tokio::test]
    async fn test_batch_command_writes_csv() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.pdf");
        let b = dir.path().join("b.docx");
        std::fs::write(&a, b"%PDF").unwrap();
        std::fs::write(&b, b"PK").unwrap();

        let mut config = Config::default();
        config.batch.delay_ms = 0;
        let state = AppState::with_parts(
            config,
            Arc::new(MemoryStorage::new()),
            Arc::new(StubDetector::new(0.8)),
        );

        let out = dir.path().join("out");
        let code = batch(&state, vec![a, b], None, true, Some(out.clone()))
            .await
            .unwrap();
        assert_eq!(code, ExitCode::SUCCESS);

        let csv: Vec<_> = std::fs::read_dir(&out).unwrap().collect();
        assert_eq!(csv.len(), 1);
    }

    #[tokio::test]
    async fn test_batch_command_rejects_when_nothing_valid() {
        let dir = tempfile::tempdir().unwrap();
        let png = dir.path().join("image.png");
        std::fs::write(&png, b"png").unwrap();

        let state = state(StubDetector::new(0.5));
        assert!(batch(&state, vec![png], None, false, None).await.is_err());
    }

    fn text_args(text: String) -> AnalyzeArgs {
        AnalyzeArgs {
            text: Some(text),
            file: None,
            mode: Some(DetectionMode::Ml),
            profile: None,
            pdf: false,
            html: false,
            json: true,
            output_dir: None,
        }
    }

    #[tokio::test]
    async fn test_analyze_text_saves_history() {
        let state = state(StubDetector::new(0.65));
        let text = "Moreover, the findings were validated. ".repeat(25);
        let code = analyze(&state, text_args(text)).await.unwrap();
        assert_eq!(code, ExitCode::SUCCESS);
        assert_eq!(state.history().list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_analyze_short_text_fails_without_request() {
        let detector = Arc::new(StubDetector::new(0.65));
        let state = AppState::with_parts(
            Config::default(),
            Arc::new(MemoryStorage::new()),
            detector.clone(),
        );
        let code = analyze(&state, text_args("too few words".to_string()))
            .await
            .unwrap();
        assert_eq!(code, ExitCode::FAILURE);
        assert!(detector.calls().is_empty());
        assert!(state.history().list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_health_checks_service_and_storage() {
        let dir = tempfile::tempdir().unwrap();
        let data_dir = dir.path().join("data");
        let state = AppState::with_parts(
            Config::default(),
            Arc::new(LocalStorage::new(&data_dir).unwrap()),
            Arc::new(StubDetector::new(0.5)),
        );
        assert_eq!(health(&state).await.unwrap(), ExitCode::SUCCESS);

        std::fs::remove_dir_all(&data_dir).unwrap();
        assert_eq!(health(&state).await.unwrap(), ExitCode::FAILURE);
    }

    #[tokio::test]
    async fn test_history_delete_unknown_id_fails() {
        let state = state(StubDetector::new(0.5));
        let code = history(
            &state,
            HistoryCommand::Delete {
                id: "missing".to_string(),
            },
        )
        .await
        .unwrap();
        assert_eq!(code, ExitCode::FAILURE);
    }

    #[test]
    fn test_init_config_refuses_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        init_config(Some(&path), false).unwrap();
        assert!(init_config(Some(&path), false).is_err());
        assert!(init_config(Some(&path), true).is_ok());
    }
}
