//! Configuration management for the Lector server

use std::env;

use serde::Deserialize;

use crate::pipeline::PipelineOptions;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub pipeline: PipelineConfig,
    pub stream: StreamConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Tracing switches for the extraction pipeline. These replace ad-hoc global
/// debug flags: the pipeline only ever sees what it is constructed with.
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    pub debug: bool,
    pub annotation_trace: bool,
    pub stream_trace: bool,
}

impl PipelineConfig {
    pub fn options(&self) -> PipelineOptions {
        PipelineOptions {
            debug: self.debug,
            annotation_trace: self.annotation_trace,
            stream_trace: self.stream_trace,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StreamConfig {
    pub payload_ttl_ms: u64,
    pub heartbeat_ms: u64,
    pub idle_timeout_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 4000,
            },
            pipeline: PipelineConfig {
                debug: false,
                annotation_trace: false,
                stream_trace: false,
            },
            stream: StreamConfig {
                payload_ttl_ms: 120_000,
                heartbeat_ms: 15_000,
                idle_timeout_ms: 60_000,
            },
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let defaults = Config::default();

        Config {
            server: ServerConfig {
                host: env::var("SERVER_HOST").unwrap_or(defaults.server.host),
                port: env_parse("SERVER_PORT", defaults.server.port),
            },
            pipeline: PipelineConfig {
                debug: env_flag("PIPELINE_DEBUG"),
                annotation_trace: env_flag("PIPELINE_ANNOTATION_TRACE"),
                stream_trace: env_flag("PIPELINE_STREAM_TRACE"),
            },
            stream: StreamConfig {
                payload_ttl_ms: env_parse("STREAM_PAYLOAD_TTL_MS", defaults.stream.payload_ttl_ms),
                heartbeat_ms: env_parse("STREAM_HEARTBEAT_MS", defaults.stream.heartbeat_ms),
                idle_timeout_ms: env_parse(
                    "STREAM_IDLE_TIMEOUT_MS",
                    defaults.stream.idle_timeout_ms,
                ),
            },
        }
    }
}

fn env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(default)
}

fn env_flag(name: &str) -> bool {
    matches!(
        env::var(name).unwrap_or_default().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes"
    )
}
