//! Optional query metrics and tracing spans
//!
//! With the `metrics` feature every catalog query is counted and timed through
//! OpenTelemetry. The Prometheus exporter is the global meter provider's reader
//! and writes into `CatalogMetrics::registry`, which `render` encodes as
//! exposition text. With the `tracing` feature every query and connection
//! attempt runs inside a span.

#[cfg(feature = "metrics")]
pub use self::otel::{CatalogMetrics, METRICS};

#[cfg(feature = "metrics")]
mod otel {
    use once_cell::sync::Lazy;
    use opentelemetry::{
        global,
        metrics::{Counter, Histogram, MeterProvider},
    };
    use opentelemetry_sdk::metrics::SdkMeterProvider;
    use prometheus::{Registry, TextEncoder};
    use std::time::Duration;

    pub static METRICS: Lazy<CatalogMetrics> = Lazy::new(CatalogMetrics::init);

    pub struct CatalogMetrics {
        pub registry: Registry,
        pub queries_total: Counter<u64>,
        pub query_errors_total: Counter<u64>,
        pub query_duration: Histogram<f64>,
    }

    impl CatalogMetrics {
        /// Register the Prometheus exporter as the global meter provider
        pub fn init() -> Self {
            let registry = Registry::new();
            let builder = SdkMeterProvider::builder();
            let builder = match opentelemetry_prometheus::exporter()
                .with_registry(registry.clone())
                .build()
            {
                Ok(exporter) => builder.with_reader(exporter),
                Err(e) => {
                    log::warn!(
                        "prometheus exporter unavailable, metrics will not be exported: {e}"
                    );
                    builder
                }
            };
            let provider = builder.build();
            global::set_meter_provider(provider.clone());
            let meter = provider.meter("catalog_extract");

            let queries_total = meter
                .u64_counter("catalog_queries_total")
                .with_description("Total catalog queries executed")
                .build();

            let query_errors_total = meter
                .u64_counter("catalog_query_errors_total")
                .with_description("Catalog queries that failed")
                .build();

            let query_duration = meter
                .f64_histogram("catalog_query_duration_seconds")
                .with_description("Duration of catalog queries")
                .build();

            Self {
                registry,
                queries_total,
                query_errors_total,
                query_duration,
            }
        }

        pub fn record_query(&self, elapsed: Duration) {
            self.queries_total.add(1, &[]);
            self.query_duration.record(elapsed.as_secs_f64(), &[]);
        }

        pub fn record_query_error(&self) {
            self.query_errors_total.add(1, &[]);
        }

        /// Current values in the Prometheus text exposition format
        ///
        /// # Errors
        ///
        /// Returns the encoder's error if a gathered family cannot be encoded.
        pub fn render(&self) -> Result<String, prometheus::Error> {
            TextEncoder::new().encode_to_string(&self.registry.gather())
        }
    }

}

#[cfg(feature = "tracing")]
pub mod tracing_helpers {
    use tracing::Span;

    /// Span around a single catalog query
    pub fn execute_query_span(query: &str) -> Span {
        tracing::info_span!("catalog.query", sql = %query.trim())
    }

    /// Span around establishing the catalog connection
    pub fn connect_span() -> Span {
        tracing::info_span!("catalog.connect")
    }

}
