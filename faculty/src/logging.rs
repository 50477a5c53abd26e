use std::sync::OnceLock;

use opentelemetry::trace::TracerProvider as _;
use opentelemetry_sdk::{
    propagation::TraceContextPropagator, trace::TracerProvider,
};
use tracing::Subscriber;
use tracing_appender::non_blocking::{
    NonBlocking, NonBlockingBuilder, WorkerGuard,
};
use tracing_subscriber::{
    EnvFilter, Layer, fmt, layer::SubscriberExt, registry::LookupSpan,
    util::SubscriberInitExt,
};

use crate::config::{LoggingConfig, LoggingFileConfig, LoggingFormat};

type BoxedLayer<S> = Box<dyn Layer<S> + Send + Sync>;

/// Writer guards live here so buffered lines are flushed at exit.
static GUARDS: OnceLock<Vec<WorkerGuard>> = OnceLock::new();

fn writer<W>(config: &LoggingConfig, sink: W) -> (NonBlocking, WorkerGuard)
where
    W: std::io::Write + Send + 'static,
{
    NonBlockingBuilder::default()
        .buffered_lines_limit(config.buffer_limit)
        .lossy(config.lossy)
        .finish(sink)
}

fn fmt_layer<S>(format: LoggingFormat, writer: NonBlocking) -> BoxedLayer<S>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    let layer = fmt::layer().with_writer(writer);
    match format {
        LoggingFormat::Full => layer.boxed(),
        LoggingFormat::Compact => layer.compact().boxed(),
        LoggingFormat::Pretty => layer.pretty().boxed(),
        LoggingFormat::Json => layer.json().boxed(),
    }
}

/// Daily-rotated log file next to the console output.
fn file_layer<S>(
    config: &LoggingConfig,
    file: &LoggingFileConfig,
    guards: &mut Vec<WorkerGuard>,
) -> BoxedLayer<S>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    let rolling = tracing_appender::rolling::daily(
        file.directory.as_str(),
        file.filename.as_str(),
    );
    let (file_writer, guard) = writer(config, rolling);
    guards.push(guard);
    fmt_layer(file.format, file_writer)
}

/// W3C propagation plus a tracer that mints ids without exporting spans.
fn tracer_provider() -> TracerProvider {
    opentelemetry::global::set_text_map_propagator(
        TraceContextPropagator::new(),
    );
    let provider = TracerProvider::builder()
        .with_span_processor(crate::observability::NoopProcessor)
        .build();
    opentelemetry::global::set_tracer_provider(provider.clone());
    provider
}

/// Installs the global subscriber. Only the first call in a process has
/// any effect; later calls return `Ok(())`.
pub fn init_tracing(config: &LoggingConfig) -> crate::Result<()> {
    let mut result = Ok(());
    GUARDS.get_or_init(|| {
        let (console, console_guard) = writer(config, std::io::stdout());
        let mut guards = vec![console_guard];
        let file = config
            .file
            .as_ref()
            .map(|file| file_layer(config, file, &mut guards));

        let tracer = tracer_provider().tracer(config.service_name.clone());
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(config.filter.as_str()));

        let installed = tracing_subscriber::registry()
            .with(filter)
            .with(tracing_opentelemetry::layer().with_tracer(tracer))
            .with(fmt_layer(config.format, console))
            .with(file)
            .try_init();
        if let Err(e) = installed {
            result = Err(anyhow::Error::new(e)
                .context("failed to init tracing")
                .into());
        }
        tracing::debug!(service = %config.service_name, "tracing ready");
        guards
    });
    result
}

#[cfg(test)]
pub(crate) fn test_config() -> LoggingConfig {
    LoggingConfig {
        service_name: "faculty-test".into(),
        filter: "debug".into(),
        format: LoggingFormat::Compact,
        file: None,
        buffer_limit: 256_000,
        lossy: true,
    }
}
