use std::path::PathBuf;

use once_cell::sync::OnceCell;
use tracing::level_filters::LevelFilter;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::filter::Targets;
use tracing_subscriber::{
    fmt,
    layer::{Layer, SubscriberExt},
    util::SubscriberInitExt,
    EnvFilter, Registry,
};

static FILE_GUARD: OnceCell<tracing_appender::non_blocking::WorkerGuard> = OnceCell::new();

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Console tracing on stdout, `RUST_LOG` or `info`.
pub fn init() {
    install(console_layer(Console::Stdout, "info"));
}

/// Console tracing on stderr, for binaries whose stdout carries output.
pub fn init_stderr(default_directive: &str) {
    install(console_layer(Console::Stderr, default_directive));
}

enum Console {
    Stdout,
    Stderr,
}

fn console_layer(console: Console, default_directive: &str) -> BoxedLayer {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));
    match console {
        Console::Stdout => fmt::layer().with_filter(filter).boxed(),
        Console::Stderr => fmt::layer()
            .with_writer(std::io::stderr)
            .with_filter(filter)
            .boxed(),
    }
}

fn install(console: BoxedLayer) {
    let mut layers = vec![console];
    if let Some(file) = FileLog::from_lookup(|key| std::env::var(key).ok()) {
        match file.layer() {
            Ok(layer) => layers.push(layer),
            Err(err) => eprintln!("rolodex: file logging disabled: {err}"),
        }
    }
    let _ = tracing_subscriber::registry().with(layers).try_init();
}

/// Rolling file output, enabled by `ROLODEX_LOG_ROLL=1`.
#[derive(Debug, Clone, PartialEq)]
struct FileLog {
    dir: PathBuf,
    prefix: String,
    rotation: Rotation,
    level: LevelFilter,
}

impl FileLog {
    fn from_lookup(env: impl Fn(&str) -> Option<String>) -> Option<Self> {
        if env("ROLODEX_LOG_ROLL").as_deref() != Some("1") {
            return None;
        }
        let rotation = match env("ROLODEX_LOG_ROTATION")
            .map(|r| r.trim().to_ascii_lowercase())
            .as_deref()
        {
            Some("hourly") => Rotation::HOURLY,
            Some("minutely") => Rotation::MINUTELY,
            Some("never") => Rotation::NEVER,
            _ => Rotation::DAILY,
        };
        let level = env("ROLODEX_LOG_FILE_LEVEL")
            .and_then(|raw| raw.trim().parse::<LevelFilter>().ok())
            .unwrap_or(LevelFilter::INFO);
        Some(Self {
            dir: env("ROLODEX_LOGS_DIR")
                .filter(|d| !d.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("logs")),
            prefix: env("ROLODEX_LOG_PREFIX")
                .filter(|p| !p.trim().is_empty())
                .unwrap_or_else(|| "rolodex".to_string()),
            rotation,
            level,
        })
    }

    fn layer(self) -> Result<BoxedLayer, tracing_appender::rolling::InitError> {
        let appender = RollingFileAppender::builder()
            .rotation(self.rotation)
            .filename_prefix(self.prefix)
            .build(&self.dir)?;
        let (writer, guard) = tracing_appender::non_blocking(appender);
        let _ = FILE_GUARD.set(guard);
        Ok(fmt::layer()
            .with_ansi(false)
            .with_writer(writer)
            .with_filter(Targets::new().with_default(self.level))
            .boxed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn file_log_is_off_unless_enabled() {
        assert_eq!(FileLog::from_lookup(env_from(&[])), None);
        assert_eq!(
            FileLog::from_lookup(env_from(&[("ROLODEX_LOG_ROLL", "true")])),
            None
        );
    }

    #[test]
    fn file_log_defaults() {
        let file = FileLog::from_lookup(env_from(&[("ROLODEX_LOG_ROLL", "1")])).expect("enabled");
        assert_eq!(file.dir, PathBuf::from("logs"));
        assert_eq!(file.prefix, "rolodex");
        assert_eq!(file.rotation, Rotation::DAILY);
        assert_eq!(file.level, LevelFilter::INFO);
    }

    #[test]
    fn file_log_reads_overrides() {
        let file = FileLog::from_lookup(env_from(&[
            ("ROLODEX_LOG_ROLL", "1"),
            ("ROLODEX_LOGS_DIR", "/var/log/rolodex"),
            ("ROLODEX_LOG_PREFIX", "contacts"),
            ("ROLODEX_LOG_ROTATION", " Hourly "),
            ("ROLODEX_LOG_FILE_LEVEL", "debug"),
        ]))
        .expect("enabled");
        assert_eq!(file.dir, PathBuf::from("/var/log/rolodex"));
        assert_eq!(file.prefix, "contacts");
        assert_eq!(file.rotation, Rotation::HOURLY);
        assert_eq!(file.level, LevelFilter::DEBUG);
    }

    #[test]
    fn unknown_rotation_and_level_fall_back() {
        let file = FileLog::from_lookup(env_from(&[
            ("ROLODEX_LOG_ROLL", "1"),
            ("ROLODEX_LOG_ROTATION", "weekly"),
            ("ROLODEX_LOG_FILE_LEVEL", "loud"),
        ]))
        .expect("enabled");
        assert_eq!(file.rotation, Rotation::DAILY);
        assert_eq!(file.level, LevelFilter::INFO);
    }

    #[test]
    fn file_layer_creates_missing_directory() {
        let dir = tempfile::tempdir().expect("tempdir");
        let nested = dir.path().join("a").join("b");
        let file = FileLog {
            dir: nested.clone(),
            prefix: "rolodex".into(),
            rotation: Rotation::NEVER,
            level: LevelFilter::INFO,
        };
        assert!(file.layer().is_ok());
        assert!(nested.is_dir());
    }
}
