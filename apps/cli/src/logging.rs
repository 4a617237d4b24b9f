use std::io;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Installs the stderr subscriber. `RUST_LOG` wins over `verbosity`.
/// 安裝輸出至 stderr 的記錄器；`RUST_LOG` 優先於 `-v`。
pub fn init(verbosity: u8) {
    let level = match verbosity {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "workviews={level},workviews_settings={level},workviews_cli={level}"
        ))
    });

    let subscriber = tracing_subscriber::registry().with(env_filter).with(
        tracing_subscriber::fmt::layer()
            .with_writer(io::stderr)
            .with_ansi(false)
            .with_target(true),
    );

    if subscriber.try_init().is_err() {
        return;
    }
    tracing::debug!(verbosity, "tracing initialized");
}
