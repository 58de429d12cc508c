use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// `RUST_LOG` wins; otherwise the crate logs at info (debug when verbose)
/// and dependencies only at warn.
fn default_directives(verbose: bool) -> &'static str {
    if verbose {
        "hardness_predictor=debug,warn"
    } else {
        "hardness_predictor=info,warn"
    }
}

fn env_or_default(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directives(verbose)))
}

pub fn init_cli_logger(verbose: bool) {
    tracing_subscriber::registry()
        .with(env_or_default(verbose))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_file(false)
                .with_line_number(false)
                .with_writer(std::io::stderr)
                .compact(),
        )
        .init();
}

/// JSON lines，方便由外層服務收集。事件欄位攤平到最上層，
/// 不帶 span 資訊（核心只發 event）。
pub fn init_json_logger(verbose: bool) {
    tracing_subscriber::registry()
        .with(env_or_default(verbose))
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .flatten_event(true)
                .with_current_span(false)
                .with_span_list(false)
                .with_target(true)
                .with_writer(std::io::stderr),
        )
        .init();
}
