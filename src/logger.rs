//! Process-wide logging on top of `log4rs`.
//!
//! Query outcomes are logged on the `powermesh::query` target and routed to
//! their own `query.log`; everything else lands in `app.log`. Configuring
//! again replaces the active configuration.
use log::LevelFilter;
use log4rs::Handle;
use log4rs::append::rolling_file::RollingFileAppender;
use log4rs::append::rolling_file::policy::compound::{
    CompoundPolicy, roll::fixed_window::FixedWindowRoller, trigger::size::SizeTrigger,
};
use log4rs::config::{Appender, Config, Logger, Root};
use log4rs::encode::pattern::PatternEncoder;
use parking_lot::Mutex;
use std::error::Error;
use std::path::{Path, PathBuf};

pub const QUERY_TARGET: &str = "powermesh::query";

const PATTERN: &str = "{d(%Y-%m-%d %H:%M:%S%.3f)} [{l}] {t} - {m}{n}";
const ROLL_SIZE: u64 = 10 * 1024 * 1024;
const DEFAULT_RETENTION: u32 = 7;

static HANDLE: Mutex<Option<Handle>> = parking_lot::const_mutex(None);

/// Initializes logging from `log4rs.yaml` in the working directory.
pub fn init() -> Result<(), Box<dyn Error>> {
    init_path(Path::new("log4rs.yaml"))
}

/// Initializes logging from a specific config file.
pub fn init_path(path: &Path) -> Result<(), Box<dyn Error>> {
    log4rs::init_file(path, log4rs::config::Deserializers::default())?;
    Ok(())
}

/// Parses a level name; anything unrecognized is `Info`.
#[must_use]
pub fn parse_level(level: Option<&str>) -> LevelFilter {
    match level.unwrap_or("info").trim().to_ascii_lowercase().as_str() {
        "off" => LevelFilter::Off,
        "error" => LevelFilter::Error,
        "warn" => LevelFilter::Warn,
        "debug" => LevelFilter::Debug,
        "trace" => LevelFilter::Trace,
        _ => LevelFilter::Info,
    }
}

fn rolling(base: &Path, stem: &str, keep: u32) -> Result<RollingFileAppender, Box<dyn Error>> {
    let roller = FixedWindowRoller::builder()
        .build(&format!("{}", base.join(format!("{stem}.{{}}.log")).display()), keep)?;
    let policy = CompoundPolicy::new(Box::new(SizeTrigger::new(ROLL_SIZE)), Box::new(roller));
    let appender = RollingFileAppender::builder()
        .encoder(Box::new(PatternEncoder::new(PATTERN)))
        .build(base.join(format!("{stem}.log")), Box::new(policy))?;
    Ok(appender)
}

/// Configures logging for the process.
///
/// - `dir`: base directory for the log files, created if missing; the
///   current directory when `None`.
/// - `level`: error|warn|info|debug|trace.
/// - `retention`: number of rolled files to keep per log (default 7).
///
/// # Errors
/// Returns an error if the directory cannot be created, an appender cannot
/// be built, or another logger already owns the process.
pub fn configure_logging(
    dir: Option<&Path>,
    level: Option<&str>,
    retention: Option<usize>,
) -> Result<(), Box<dyn Error>> {
    let base = match dir {
        Some(d) => d.to_path_buf(),
        None => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
    };
    std::fs::create_dir_all(&base)?;
    let keep = retention.map_or(DEFAULT_RETENTION, |r| u32::try_from(r).unwrap_or(u32::MAX));
    let lvl = parse_level(level);

    let config = Config::builder()
        .appender(Appender::builder().build("app", Box::new(rolling(&base, "app", keep)?)))
        .appender(Appender::builder().build("query", Box::new(rolling(&base, "query", keep)?)))
        .logger(Logger::builder().appender("query").additive(false).build(QUERY_TARGET, lvl))
        .build(Root::builder().appender("app").build(lvl))?;

    let mut handle = HANDLE.lock();
    match handle.as_ref() {
        Some(h) => h.set_config(config),
        None => *handle = Some(log4rs::init_config(config)?),
    }
    Ok(())
}

/// Configures logging from environment variables when present:
/// - POWERMESH_LOG_DIR
/// - POWERMESH_LOG_LEVEL
/// - POWERMESH_LOG_RETENTION
pub fn configure_from_env() -> Result<(), Box<dyn Error>> {
    let dir = std::env::var("POWERMESH_LOG_DIR").ok().map(PathBuf::from);
    let level = std::env::var("POWERMESH_LOG_LEVEL").ok();
    let retention =
        std::env::var("POWERMESH_LOG_RETENTION").ok().and_then(|s| s.parse::<usize>().ok());
    configure_logging(dir.as_deref(), level.as_deref(), retention)
}
