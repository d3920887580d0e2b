//! Logging setup for the GameHall binaries.

use std::path::Path;

use tracing_appender::rolling::{InitError, RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Build the default `EnvFilter` directive for a binary.
///
/// Library crates of the workspace and the binary itself log at `default_log_level`.
/// `RUST_LOG` takes precedence when it is set.
pub fn default_filter(binary_name: &str, default_log_level: &str) -> String {
    format!(
        "gamehall_server={level},gamehall_client={level},gamehall_shared={level},{bin}={level},tower_http={level}",
        level = default_log_level,
        bin = binary_name.replace('-', "_"),
    )
}

/// Daily-rotated log file `{log_dir}/{binary_name}.YYYY-MM-DD.log`.
///
/// Creates `log_dir` when it does not exist.
pub fn file_appender(
    log_dir: &Path,
    binary_name: &str,
) -> Result<RollingFileAppender, InitError> {
    RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(binary_name)
        .filename_suffix("log")
        .build(log_dir)
}

/// Initialize the tracing subscriber with the specified default log level.
///
/// # Arguments
///
/// * `binary_name` - The name of the binary (e.g., "gamehall-server")
/// * `default_log_level` - The default log level (e.g., "debug", "info", "warn", "error")
/// * `json` - Emit one JSON object per event instead of human-readable lines
/// * `log_dir` - Also write every event to a daily log file in this directory
///
/// # Errors
///
/// Returns an error if the log directory cannot be created or opened.
///
/// # Examples
///
/// ```no_run
/// use gamehall_shared::logger::setup_logger;
///
/// setup_logger("gamehall-server", "debug", false, None).unwrap();
/// ```
pub fn setup_logger(
    binary_name: &str,
    default_log_level: &str,
    json: bool,
    log_dir: Option<&Path>,
) -> Result<(), InitError> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter(binary_name, default_log_level).into());
    let file = log_dir
        .map(|dir| file_appender(dir, binary_name))
        .transpose()?;

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(fmt::layer().json())
            .with(file.map(|writer| fmt::layer().json().with_ansi(false).with_writer(writer)))
            .init();
    } else {
        registry
            .with(fmt::layer())
            .with(file.map(|writer| fmt::layer().with_ansi(false).with_writer(writer)))
            .init();
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_covers_workspace_crates_and_binary() {
        // テスト項目: デフォルトのフィルタにワークスペースのクレートとバイナリが含まれる
        // given (前提条件):
        let binary_name = "gamehall-server";

        // when (操作):
        let filter = default_filter(binary_name, "debug");

        // then (期待する結果):
        assert!(filter.contains("gamehall_server=debug"));
        assert!(filter.contains("gamehall_shared=debug"));
        // バイナリ名のハイフンはアンダースコアに置換される
        assert!(filter.contains("gamehall_server=debug,"));
        assert!(!filter.contains("gamehall-server"));
    }

    #[test]
    fn test_default_filter_is_a_valid_env_filter() {
        // テスト項目: 生成したディレクティブが EnvFilter としてパースできる
        // given (前提条件):
        let directive = default_filter("gamehall-client", "info");

        // when (操作):
        let result = tracing_subscriber::EnvFilter::try_new(directive);

        // then (期待する結果):
        assert!(result.is_ok());
    }

    #[test]
    fn test_file_appender_creates_log_file_in_directory() {
        // テスト項目: ログディレクトリが無ければ作成され、ファイルにログが書き込まれる
        // given (前提条件):
        let dir = std::env::temp_dir().join(format!(
            "gamehall-logger-{}-{}",
            std::process::id(),
            chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default()
        ));
        assert!(!dir.exists());

        // when (操作):
        let mut appender = file_appender(&dir, "gamehall-server").unwrap();
        std::io::Write::write_all(&mut appender, b"hello\n").unwrap();
        std::io::Write::flush(&mut appender).unwrap();

        // then (期待する結果):
        let files: Vec<_> = std::fs::read_dir(&dir)
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(files.len(), 1);
        assert!(files[0].starts_with("gamehall-server."));
        assert!(files[0].ends_with(".log"));
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
