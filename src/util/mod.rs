pub mod batch;
pub mod config;
pub mod history;
pub mod http_client; // HTTP客户端模块（由 api 配置段构建）
pub mod log;
pub mod logging;
pub mod preferences;
pub mod report;
pub mod validation;
