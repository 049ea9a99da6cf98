//! Logging setup for the roomcast binaries.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Build the default filter directive for a crate.
///
/// Crate names are normalized to their tracing target form (`-` becomes `_`).
/// `tower_http` is included so request traces show up at the same level.
pub fn default_directive(crate_name: &str, default_log_level: &str) -> String {
    format!(
        "{}={},tower_http={}",
        crate_name.replace('-', "_"),
        default_log_level,
        default_log_level
    )
}

/// Initialize the tracing subscriber with the specified default log level.
///
/// The level can be overridden using the `RUST_LOG` environment variable.
///
/// # Arguments
///
/// * `crate_name` - The package emitting the logs (e.g., `env!("CARGO_PKG_NAME")`)
/// * `default_log_level` - The default log level (e.g., "debug", "info", "warn", "error")
///
/// # Examples
///
/// ```no_run
/// use roomcast_shared::logger::setup_logger;
///
/// setup_logger("roomcast-server", "debug");
/// ```
pub fn setup_logger(crate_name: &str, default_log_level: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_directive(crate_name, default_log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directive_normalizes_crate_name() {
        // テスト項目: クレート名のハイフンがアンダースコアに変換される
        // given (前提条件):
        let crate_name = "roomcast-server";

        // when (操作):
        let directive = default_directive(crate_name, "info");

        // then (期待する結果):
        assert_eq!(directive, "roomcast_server=info,tower_http=info");
    }
}
