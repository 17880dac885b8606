pub const LOG_FILE_BASENAME: &str = "todo-store";
pub const LOG_FILE_SUFFIX: &str = "log";
pub const LOG_ROTATE_SIZE_BYTES: u64 = 10 * 1024 * 1024;
pub const LOG_ROTATE_KEEP_FILES: usize = 10;
pub const LOG_ENV_VAR: &str = "TODO_STORE_LOG";

/// Picks the logger spec: the crate's own variable, then `RUST_LOG`, then a
/// build-dependent default. Blank values count as unset.
pub fn resolve_log_spec(own: Option<String>, rust_log: Option<String>) -> String {
    let default_spec = if cfg!(debug_assertions) {
        "warn,todo_store=debug"
    } else {
        "warn,todo_store=info"
    };
    own.filter(|value| !value.trim().is_empty())
        .or_else(|| rust_log.filter(|value| !value.trim().is_empty()))
        .unwrap_or_else(|| default_spec.to_string())
}

/// Starts a size-rotated file logger in `log_dir` and installs a panic hook
/// that records panics before the default hook runs.
///
/// Hold on to the returned handle until shutdown so buffered lines get flushed.
#[cfg(feature = "file-log")]
pub fn init_logging(
    log_dir: &std::path::Path,
) -> Result<flexi_logger::LoggerHandle, flexi_logger::FlexiLoggerError> {
    std::fs::create_dir_all(log_dir)?;
    let spec = resolve_log_spec(
        std::env::var(LOG_ENV_VAR).ok(),
        std::env::var("RUST_LOG").ok(),
    );
    let handle = file_logger(&spec, log_dir)?.start()?;
    install_panic_hook();
    log::info!(
        "logging to dir={} spec={spec} rotate_size_bytes={LOG_ROTATE_SIZE_BYTES}",
        log_dir.display()
    );
    Ok(handle)
}

#[cfg(feature = "file-log")]
fn file_logger(
    spec: &str,
    log_dir: &std::path::Path,
) -> Result<flexi_logger::Logger, flexi_logger::FlexiLoggerError> {
    use flexi_logger::{
        detailed_format, Cleanup, Criterion, Duplicate, FileSpec, Logger, Naming, WriteMode,
    };

    let echo = if cfg!(debug_assertions) {
        Duplicate::Info
    } else {
        Duplicate::None
    };
    Ok(Logger::try_with_str(spec)?
        .log_to_file(
            FileSpec::default()
                .directory(log_dir)
                .basename(LOG_FILE_BASENAME)
                .suffix(LOG_FILE_SUFFIX),
        )
        .write_mode(WriteMode::BufferAndFlush)
        .format_for_files(detailed_format)
        .rotate(
            Criterion::Size(LOG_ROTATE_SIZE_BYTES),
            Naming::Numbers,
            Cleanup::KeepLogFiles(LOG_ROTATE_KEEP_FILES),
        )
        .duplicate_to_stderr(echo))
}

#[cfg(feature = "file-log")]
fn install_panic_hook() {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info: &std::panic::PanicHookInfo<'_>| {
        let location = info
            .location()
            .map(ToString::to_string)
            .unwrap_or_else(|| "<unknown>".to_string());
        log::error!(
            "panic: payload={} location={location}",
            panic_message(info.payload())
        );
        default_hook(info);
    }));
}

#[cfg(any(feature = "file-log", test))]
fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("<non-string panic payload>")
}
