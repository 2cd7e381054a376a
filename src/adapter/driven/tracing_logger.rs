use crate::domain::port::{LogLevel, Logger};
use std::collections::HashMap;
use uuid::Uuid;

/// tracingロガー実装
/// Loggerポートの出力をtracingのイベントとして構造化フィールド付きで出力する
/// 出力先・フィルタはtracing-subscriber側の設定に従う
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl TracingLogger {
    pub fn new() -> Self {
        Self
    }
}

/// 追加コンテキストを `key=value` 形式で連結する
/// 出力を安定させるためキーの昇順で並べる
fn format_context(context: Option<HashMap<String, String>>) -> String {
    let Some(context) = context else {
        return String::new();
    };
    let mut pairs: Vec<(String, String)> = context.into_iter().collect();
    pairs.sort();
    pairs
        .into_iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join(", ")
}

impl Logger for TracingLogger {
    fn log(
        &self,
        level: LogLevel,
        component: &str,
        message: &str,
        correlation_id: Option<Uuid>,
        context: Option<HashMap<String, String>>,
    ) {
        let correlation_id = correlation_id.map(|id| id.to_string()).unwrap_or_default();
        let context = format_context(context);

        match level {
            LogLevel::Debug => tracing::debug!(%component, %correlation_id, %context, "{}", message),
            LogLevel::Info => tracing::info!(%component, %correlation_id, %context, "{}", message),
            LogLevel::Warning => tracing::warn!(%component, %correlation_id, %context, "{}", message),
            LogLevel::Error => tracing::error!(%component, %correlation_id, %context, "{}", message),
        }
    }
}
