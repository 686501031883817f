use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

// Re-export tracing macros for convenience
pub use tracing::{debug, error, info, instrument, span, trace, warn, Level, Span};

/// Initialize the tracing system
///
/// Reads the filter from `RUST_LOG`, falling back to `info`, and writes a
/// compact format to stderr so stdout stays free for reports. ANSI colours
/// are only used when stderr is a terminal.
pub fn init() -> Result<(), Box<dyn std::error::Error + Send + Sync + 'static>> {
    init_with_default("info")
}

/// Initialize the tracing system with a fallback directive
pub fn init_with_default(
    default_directive: &str,
) -> Result<(), Box<dyn std::error::Error + Send + Sync + 'static>> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(default_directive))?;

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(is_tty())
        .compact()
        .with_target(false)
        .with_thread_ids(false)
        .with_level(true);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}

/// Check if stderr is attached to a terminal
fn is_tty() -> bool {
    std::io::IsTerminal::is_terminal(&std::io::stderr())
}

/// Create a span covering one scoring run
pub fn scoring_span(files: usize) -> Span {
    span!(Level::INFO, "scoring", files = %files)
}

/// Emit a structured event when a scoring run starts
pub fn scoring_started(files: usize, excluded: usize) {
    info!(files = %files, excluded = %excluded, "scoring_started");
}

/// Emit a structured event when a scoring run completes
pub fn scoring_completed(score: u8, violations: u32, files_analyzed: usize) {
    info!(
        score = %score,
        violations = %violations,
        files_analyzed = %files_analyzed,
        "scoring_completed"
    );
}

/// Emit a structured event for a capsule verdict
pub fn capsule_verified(file_hash: &str, coherence: f64, valid: bool) {
    if valid {
        debug!(file_hash = %file_hash, coherence = %coherence, "capsule_verified");
    } else {
        warn!(file_hash = %file_hash, coherence = %coherence, "capsule_rejected");
    }
}

/// Emit a structured event when a batch chunk has fully resolved
pub fn batch_chunk_completed(chunk: usize, succeeded: usize, failed: usize) {
    info!(
        chunk = %chunk,
        succeeded = %succeeded,
        failed = %failed,
        "batch_chunk_completed"
    );
}
