use crate::app_env;
use anyhow::{Context, bail};
use std::env;
use std::net::SocketAddr;

const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8080";
const DEVELOPMENT_JWT_SECRET: &str = "taskmaster-development-secret";

/// Where OpenTelemetry data gets shipped
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OtelEndpoints {
    pub spans: String,
    pub metrics: String,
}

/// Settings read from the environment at startup
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub listen_addr: SocketAddr,
    pub jwt_secret: String,
    pub otel: Option<OtelEndpoints>,
    pub seed_demo_user: bool,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the config from an arbitrary variable source. Unset and empty variables are
    /// treated the same.
    pub fn from_lookup(read_var: impl Fn(&str) -> Option<String>) -> Result<Self, anyhow::Error> {
        let lookup = |name: &str| read_var(name).filter(|value| !value.trim().is_empty());

        let listen_addr = lookup(app_env::LISTEN_ADDR)
            .unwrap_or_else(|| DEFAULT_LISTEN_ADDR.to_owned())
            .parse::<SocketAddr>()
            .with_context(|| format!("{} must be a socket address", app_env::LISTEN_ADDR))?;

        let jwt_secret =
            lookup(app_env::JWT_SECRET).unwrap_or_else(|| DEVELOPMENT_JWT_SECRET.to_owned());

        let otel = match (
            lookup(app_env::OTEL_SPAN_EXPORT_URL),
            lookup(app_env::OTEL_METRIC_EXPORT_URL),
        ) {
            (Some(spans), Some(metrics)) => Some(OtelEndpoints { spans, metrics }),
            _ => None,
        };

        let seed_demo_user = match lookup(app_env::SEED_DEMO_USER).as_deref() {
            None => false,
            Some(flag) => parse_flag(flag)
                .with_context(|| format!("reading {}", app_env::SEED_DEMO_USER))?,
        };

        Ok(AppConfig {
            listen_addr,
            jwt_secret,
            otel,
            seed_demo_user,
        })
    }

    /// True when no [app_env::JWT_SECRET] was provided. Tokens signed with the fallback
    /// secret can be forged by anyone who has read this source.
    pub fn uses_development_secret(&self) -> bool {
        self.jwt_secret == DEVELOPMENT_JWT_SECRET
    }
}

fn parse_flag(flag: &str) -> Result<bool, anyhow::Error> {
    match flag.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Ok(true),
        "0" | "false" | "no" => Ok(false),
        other => bail!("expected a boolean, got \"{other}\""),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use speculoos::prelude::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Result<AppConfig, anyhow::Error> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect();

        AppConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let config = config_from(&[]).expect("defaults should be valid");

        assert_that!(config.listen_addr.port()).is_equal_to(8080u16);
        assert_that!(config.uses_development_secret()).is_true();
        assert_that!(config.otel).is_none();
        assert_that!(config.seed_demo_user).is_false();
    }

    #[test]
    fn reads_every_variable() {
        let config = config_from(&[
            (app_env::LISTEN_ADDR, "127.0.0.1:3000"),
            (app_env::JWT_SECRET, "s3cret"),
            (app_env::OTEL_SPAN_EXPORT_URL, "http://localhost:4317"),
            (app_env::OTEL_METRIC_EXPORT_URL, "http://localhost:4318"),
            (app_env::SEED_DEMO_USER, "TRUE"),
        ])
        .expect("config should be valid");

        assert_that!(config.listen_addr.to_string()).is_equal_to("127.0.0.1:3000".to_owned());
        assert_that!(config.jwt_secret.as_str()).is_equal_to("s3cret");
        assert_that!(config.uses_development_secret()).is_false();
        assert_that!(config.otel).is_equal_to(Some(OtelEndpoints {
            spans: "http://localhost:4317".to_owned(),
            metrics: "http://localhost:4318".to_owned(),
        }));
        assert_that!(config.seed_demo_user).is_true();
    }

    #[test]
    fn otel_needs_both_endpoints() {
        let config = config_from(&[(app_env::OTEL_SPAN_EXPORT_URL, "http://localhost:4317")])
            .expect("config should be valid");

        assert_that!(config.otel).is_none();
    }

    #[test]
    fn rejects_bad_values() {
        assert_that!(config_from(&[(app_env::LISTEN_ADDR, "not an address")])).is_err();
        assert_that!(config_from(&[(app_env::SEED_DEMO_USER, "sometimes")])).is_err();
    }
}
