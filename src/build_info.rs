/// Build-time metadata exposed at runtime.
pub const BUILD_VERSION: &str = env!("APP_BUILD_VERSION");
pub const BUILD_COMMIT: &str = env!("APP_BUILD_COMMIT");
pub const BUILD_TIMESTAMP: &str = env!("APP_BUILD_TIMESTAMP");

/// Version line printed by `ai-detector version`.
pub fn summary() -> String {
    format!(
        "ai-detector {} (build {}, commit {}, built at {})",
        env!("CARGO_PKG_VERSION"),
        BUILD_VERSION,
        BUILD_COMMIT,
        BUILD_TIMESTAMP
    )
}

/// Default User-Agent sent to the detection service.
pub fn user_agent() -> String {
    format!("AI-Detector-Client/{}", env!("CARGO_PKG_VERSION"))
}
