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

use pubsub_matching::{
    InMemoryServiceDirectory, Properties, ScoreConfig, ServiceId, ENDPOINT_ADMIN_TYPE,
    ENDPOINT_PROTOCOL, ENDPOINT_SERIALIZER, PROTOCOL_SERVICE_NAME, PROTOCOL_TYPE_PROPERTY,
    QOS_ATTRIBUTE_KEY, SERIALIZATION_SERVICE_NAME, SERIALIZATION_TYPE_PROPERTY, SUBSCRIBER_SCOPE,
    SUBSCRIBER_TOPIC,
};

pub fn register_serializer(
    directory: &InMemoryServiceDirectory,
    serialization_type: &str,
    ranking: i64,
) -> ServiceId {
    directory.register(
        SERIALIZATION_SERVICE_NAME,
        ranking,
        Properties::new().with(SERIALIZATION_TYPE_PROPERTY, serialization_type),
    )
}

pub fn register_protocol(
    directory: &InMemoryServiceDirectory,
    protocol_type: &str,
    ranking: i64,
) -> ServiceId {
    directory.register(
        PROTOCOL_SERVICE_NAME,
        ranking,
        Properties::new().with(PROTOCOL_TYPE_PROPERTY, protocol_type),
    )
}

/// Scores used throughout the integration tests: sample 0.5, control 0.8, default 0.1.
pub fn score_config() -> ScoreConfig {
    ScoreConfig::new(0.5, 0.8, 0.1)
}

/// Topic properties with only the given requirements set.
pub fn topic_properties(
    admin: Option<&str>,
    qos: Option<&str>,
    serializer: Option<&str>,
    protocol: Option<&str>,
) -> Properties {
    let mut properties = Properties::new();
    let requirements = [
        (ENDPOINT_ADMIN_TYPE, admin),
        (QOS_ATTRIBUTE_KEY, qos),
        (ENDPOINT_SERIALIZER, serializer),
        (ENDPOINT_PROTOCOL, protocol),
    ];
    for (key, value) in requirements {
        if let Some(value) = value {
            properties.set(key, value);
        }
    }
    properties
}

pub fn subscriber_registration(scope: Option<&str>, topic: &str) -> Properties {
    let properties = Properties::new().with(SUBSCRIBER_TOPIC, topic);
    match scope {
        Some(scope) => properties.with(SUBSCRIBER_SCOPE, scope),
        None => properties,
    }
}
