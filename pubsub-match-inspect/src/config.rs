/********************************************************************************
 * Copyright (c) 2024 Contributors to the Eclipse Foundation
 *
 * See the NOTICE file(s) distributed with this work for additional
 * information regarding copyright ownership.
 *
 * This program and the accompanying materials are made available under the
 * terms of the Apache License Version 2.0 which is available at
 * https://www.apache.org/licenses/LICENSE-2.0
 *
 * SPDX-License-Identifier: Apache-2.0
 ********************************************************************************/

use pubsub_matching::{Properties, ScoreConfig};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub(crate) admin: AdminConfig,
    #[serde(default)]
    pub(crate) services: Vec<ServiceConfig>,
    #[serde(default)]
    pub(crate) topics: Vec<TopicConfig>,
    #[serde(default)]
    pub(crate) endpoints: Vec<EndpointConfig>,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct AdminConfig {
    pub(crate) admin_type: String,
    pub(crate) sample_score: f64,
    pub(crate) control_score: f64,
    pub(crate) default_score: f64,
    #[serde(default)]
    pub(crate) match_protocol: bool,
}

impl AdminConfig {
    pub(crate) fn score_config(&self) -> ScoreConfig {
        ScoreConfig::new(self.sample_score, self.control_score, self.default_score)
    }
}

/// A backend service to register before matching.
#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct ServiceConfig {
    pub(crate) name: String,
    #[serde(default)]
    pub(crate) ranking: i64,
    #[serde(default)]
    pub(crate) properties: Properties,
}

/// Topic properties a component declares. `publisher` selects the publisher
/// side; otherwise the topic is matched as a subscription.
#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct TopicConfig {
    pub(crate) component: u64,
    #[serde(default)]
    pub(crate) scope: Option<String>,
    pub(crate) topic: String,
    #[serde(default)]
    pub(crate) publisher: bool,
    #[serde(default)]
    pub(crate) properties: Properties,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct EndpointConfig {
    pub(crate) name: String,
    #[serde(default)]
    pub(crate) properties: Properties,
}

#[derive(Debug)]
pub enum ConfigError {
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse {
        path: PathBuf,
        source: json5::Error,
    },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Read { path, source } => {
                write!(f, "unable to read config file {}: {source}", path.display())
            }
            Self::Parse { path, source } => {
                write!(f, "unable to parse config file {}: {source}", path.display())
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Read { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source),
        }
    }
}

impl Config {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        json5::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{Config, ConfigError};
    use std::path::Path;

    const SAMPLE: &str = r#"{
        // comments and trailing commas are json5
        admin: {
            admin_type: "tcp",
            sample_score: 30,
            control_score: 70,
            default_score: 10,
        },
        services: [
            { name: "pubsub_message_serialization_service", ranking: 2,
              properties: { "serialization.type": "json" } },
        ],
        topics: [
            { component: 1, topic: "ping", properties: { qos: "sample" } },
            { component: 2, scope: "outer", topic: "pong", publisher: true,
              properties: { "pubsub.config": "zmq" } },
        ],
    }"#;

    #[test]
    fn parses_json5_with_defaults() {
        let config: Config = json5::from_str(SAMPLE).expect("sample config");

        assert_eq!(config.admin.admin_type, "tcp");
        assert!(!config.admin.match_protocol);
        assert_eq!(config.admin.score_config().control_score, 70.0);
        assert_eq!(config.services[0].ranking, 2);
        assert_eq!(
            config.services[0].properties.get_string("serialization.type"),
            Some("json")
        );
        assert!(!config.topics[0].publisher);
        assert_eq!(config.topics[1].scope.as_deref(), Some("outer"));
        assert!(config.endpoints.is_empty());
    }

    #[test]
    fn rejects_unknown_fields() {
        let bad = r#"{ admin: { admin_type: "tcp", sample_score: 1, control_score: 1,
            default_score: 1, ranking: 3 } }"#;
        assert!(json5::from_str::<Config>(bad).is_err());
    }

    #[test]
    fn missing_file_reports_read_error() {
        let err = Config::from_file(Path::new("/nonexistent/inspect.json5"))
            .expect_err("missing file");
        assert!(matches!(err, ConfigError::Read { .. }));
        assert!(std::error::Error::source(&err).is_some());
    }
}
