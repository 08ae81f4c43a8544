/// Socket address the HTTP server binds to, such as `0.0.0.0:8080`
pub const LISTEN_ADDR: &str = "LISTEN_ADDR";
/// Secret used to sign and verify HS256 session tokens
pub const JWT_SECRET: &str = "JWT_SECRET";
/// Log level configuration for the application. For formatting info, see [EnvFilter's documentation](https://docs.rs/tracing-subscriber/latest/tracing_subscriber/filter/struct.EnvFilter.html)
pub const LOG_LEVEL: &str = "LOG_LEVEL";

/// OpenTelemetry span export URL. Should be http://localhost:4317 by default, as the service should
/// have an OpenTelemetry collector sidecar which directs metrics to the correct place
pub const OTEL_SPAN_EXPORT_URL: &str = "OTEL_SPAN_EXPORT_URL";
/// OpenTelemetry metrics export URL. Should be http://localhost:4317 by default, as the service should
/// have an OpenTelemetry collector sidecar which directs metrics to the correct place
pub const OTEL_METRIC_EXPORT_URL: &str = "OTEL_METRIC_EXPORT_URL";

/// When "true", a demo account (johndoe / john@example.com / password123) is created at startup
pub const SEED_DEMO_USER: &str = "SEED_DEMO_USER";
