use env_logger::Builder;
use log::{Level, LevelFilter};
use std::io::Write;

use crate::config::RuntimeEnv;

/// Install the global logger. Safe to call more than once; later calls are no-ops.
pub fn init(env: RuntimeEnv) {
    let _ = builder_for(env).try_init();
}

/// `local` and `prod` write plain lines, `dev` writes one JSON object per line.
/// `RUST_LOG` directives are applied on top of the defaults.
pub fn builder_for(env: RuntimeEnv) -> Builder {
    let mut builder = Builder::new();

    builder
        .filter_level(default_level(env))
        .filter_module("sqlx", LevelFilter::Warn) // Suppress sqlx Debug logs
        .filter_module("hyper", LevelFilter::Info);

    if let Ok(directives) = std::env::var("RUST_LOG") {
        builder.parse_filters(&directives);
    }

    if env == RuntimeEnv::Dev {
        builder.format(|buf, record| {
            let line = json_line(
                record.level(),
                record.target(),
                &record.args().to_string(),
            );
            writeln!(buf, "{}", line)
        });
    }

    builder
}

fn default_level(env: RuntimeEnv) -> LevelFilter {
    match env {
        RuntimeEnv::Local | RuntimeEnv::Dev => LevelFilter::Debug,
        RuntimeEnv::Prod => LevelFilter::Info,
    }
}

fn json_line(level: Level, target: &str, msg: &str) -> serde_json::Value {
    serde_json::json!({
        "ts": chrono::Utc::now().to_rfc3339(),
        "level": level.as_str(),
        "target": target,
        "msg": msg,
    })
}
