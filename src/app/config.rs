//! 配置文件定位与加载

use anyhow::Result;
use std::path::{Path, PathBuf};

use crate::util::config::{Config, ConfigLoader, ConfigWriter};

pub const CONFIG_FILE_NAME: &str = "config.yaml";

/// 配置加载结果
#[derive(Debug)]
pub struct LoadedConfig {
    pub config: Config,
    pub path: PathBuf,
    /// 本次启动时生成了配置模板
    pub template_written: bool,
}

pub struct ConfigManager;

impl ConfigManager {
    /// 查找配置文件路径，适应开发目录和安装目录两种布局
    pub fn find_config_file_path(filename: &str) -> PathBuf {
        let current_dir = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        let exe_path = std::env::current_exe().ok();
        Self::find_in(&current_dir, exe_path.as_deref(), filename)
    }

    fn find_in(current_dir: &Path, exe_path: Option<&Path>, filename: &str) -> PathBuf {
        // 当前目录下的 config/
        let config_in_current = current_dir.join("config").join(filename);
        if config_in_current.exists() {
            return config_in_current;
        }

        // 在 bin/ 下运行时的上级 config/
        if let Some(parent) = current_dir.parent() {
            let config_in_parent = parent.join("config").join(filename);
            if config_in_parent.exists() {
                return config_in_parent;
            }
        }

        // 可执行文件位于 bin/ 时，项目根目录的 config/
        if let Some(exe_dir) = exe_path.and_then(Path::parent) {
            if exe_dir.file_name() == Some(std::ffi::OsStr::new("bin")) {
                if let Some(project_root) = exe_dir.parent() {
                    let config_in_root = project_root.join("config").join(filename);
                    if config_in_root.exists() {
                        return config_in_root;
                    }
                }
            }
        }

        current_dir.join(filename)
    }

    /// 读取配置并应用环境变量；文件不存在时写出模板并使用默认值
    pub fn load(explicit: Option<&Path>) -> Result<LoadedConfig> {
        let path = explicit
            .map(Path::to_path_buf)
            .unwrap_or_else(|| Self::find_config_file_path(CONFIG_FILE_NAME));

        if path.exists() {
            let config = ConfigLoader::load_with_env_overrides(&path)?;
            return Ok(LoadedConfig {
                config,
                path,
                template_written: false,
            });
        }

        let template = ConfigLoader::generate_template();
        // 模板写入失败不影响以默认值运行
        let template_written = ConfigWriter::write_yaml_with_dir(&template, &path).is_ok();
        Ok(LoadedConfig {
            config: ConfigLoader::apply_env_overrides(template),
            path,
            template_written,
        })
    }
}
