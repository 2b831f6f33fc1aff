//! Tracing subscriber wiring for the tangle binaries.
//!
//! One registry, three layers: an `EnvFilter` seeded from `RUST_LOG` (falling
//! back to the caller's default directive), a structured `fmt` layer, and an
//! optional OpenTelemetry bridge exporting spans to stdout.
//!
//! ```no_run
//! tangle_observe::tracing_setup::init_tracing("tangle", "info", false).unwrap();
//! ```

use std::sync::OnceLock;

use opentelemetry::trace::TracerProvider as _;
use opentelemetry_sdk::trace::SdkTracerProvider;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Kept so the exporter can be flushed on shutdown.
static TRACER_PROVIDER: OnceLock<SdkTracerProvider> = OnceLock::new();

/// Install the global tracing subscriber for `service`.
///
/// `default_filter` is the directive used when `RUST_LOG` is unset, e.g.
/// `"info"` or `"info,tangle=debug"`. When `enable_otel` is true, tracing
/// spans are additionally bridged to OpenTelemetry through a stdout exporter
/// (suitable for local development; swap in OTLP when pointing at a real
/// collector).
///
/// # Errors
///
/// Fails if a global subscriber is already installed.
pub fn init_tracing(
    service: &'static str,
    default_filter: &str,
    enable_otel: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let otel_layer = enable_otel.then(|| {
        let provider = SdkTracerProvider::builder()
            .with_simple_exporter(opentelemetry_stdout::SpanExporter::default())
            .build();
        let tracer = provider.tracer(service);
        let _ = TRACER_PROVIDER.set(provider.clone());
        opentelemetry::global::set_tracer_provider(provider);
        tracing_opentelemetry::layer().with_tracer(tracer)
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_span_events(FmtSpan::CLOSE),
        )
        .with(otel_layer)
        .try_init()?;

    Ok(())
}

/// Flush pending traces and shut down the OpenTelemetry tracer provider.
///
/// Safe to call when OTel was never enabled (no-op in that case).
pub fn shutdown_tracing() {
    if let Some(provider) = TRACER_PROVIDER.get() {
        if let Err(e) = provider.shutdown() {
            eprintln!("Warning: OTel tracer provider shutdown error: {e}");
        }
    }
}
