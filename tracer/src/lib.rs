use opentelemetry::trace::TraceError;
use opentelemetry::{global, KeyValue};
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::{
    trace::{self, Sampler, Tracer},
    Resource,
};
use tracing::subscriber::set_global_default;
use tracing_subscriber::{layer::SubscriberExt, EnvFilter, Registry};

pub type TracingError = Box<dyn std::error::Error + Send + Sync + 'static>;

fn otel_tracer(service_name: &'static str, otel_endpoint: &str) -> Result<Tracer, TraceError> {
    opentelemetry_otlp::new_pipeline()
        .tracing()
        .with_exporter(
            opentelemetry_otlp::new_exporter()
                .tonic()
                .with_endpoint(otel_endpoint),
        )
        .with_trace_config(
            trace::config()
                .with_sampler(Sampler::AlwaysOn)
                .with_resource(Resource::new(vec![KeyValue::new(
                    "service.name",
                    service_name,
                )])),
        )
        .install_batch(opentelemetry_sdk::runtime::Tokio)
}

/// Install the global subscriber: logs go to stderr, spans are also exported over OTLP when an
/// endpoint is given.
///
/// `log_level` takes `EnvFilter` directives and falls back to `RUST_LOG`, then `info`
pub fn init_tracing(
    service_name: &'static str,
    log_level: Option<&str>,
    otel_endpoint: Option<&str>,
) -> Result<(), TracingError> {
    let env_filter = match log_level {
        Some(level) => EnvFilter::try_new(level)?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };

    let otel_layer = match otel_endpoint {
        Some(endpoint) => Some(
            tracing_opentelemetry::layer().with_tracer(otel_tracer(service_name, endpoint)?),
        ),
        None => None,
    };

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_level(true);

    let subscriber = Registry::default()
        .with(env_filter)
        .with(stderr_layer)
        .with(otel_layer);

    set_global_default(subscriber)?;
    Ok(())
}

/// Export spans still buffered by the OTLP pipeline
pub fn shutdown_tracing() {
    global::shutdown_tracer_provider();
}
