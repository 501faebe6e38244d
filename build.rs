use chrono::Utc;
use std::{
    fs, io,
    path::{Path, PathBuf},
    process::Command,
    sync::LazyLock,
};

static OUT_DIR: LazyLock<PathBuf> = LazyLock::new(|| {
    let out_dir = std::env::var("OUT_DIR").unwrap();
    Path::new(&out_dir)
        .parent()
        .unwrap()
        .parent()
        .unwrap()
        .parent()
        .unwrap()
        .to_path_buf()
});

fn main() -> io::Result<()> {
    println!("cargo:rerun-if-changed=VERSION");
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/refs/heads");
    println!("cargo:rerun-if-changed=config.example.yaml");

    set_build_metadata();

    // 示例配置随二进制一起分发
    if Path::new("config.example.yaml").exists() {
        fs::copy("config.example.yaml", OUT_DIR.join("config.example.yaml"))?;
        println!("cargo:info=已复制示例配置文件");
    }

    Ok(())
}

fn set_build_metadata() {
    let git_commit = Command::new("git")
        .args(["rev-parse", "--short", "HEAD"])
        .output()
        .ok()
        .filter(|output| output.status.success())
        .map(|output| String::from_utf8_lossy(&output.stdout).trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "unknown".to_string());

    let build_version = fs::read_to_string("VERSION")
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| git_commit.clone());

    let build_timestamp = Utc::now().to_rfc3339();

    println!("cargo:rustc-env=APP_BUILD_VERSION={}", build_version);
    println!("cargo:rustc-env=APP_BUILD_COMMIT={}", git_commit);
    println!("cargo:rustc-env=APP_BUILD_TIMESTAMP={}", build_timestamp);
}
