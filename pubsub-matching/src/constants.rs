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

//! Well-known property keys, service names and sentinel scores.

/// Score reported when a topic explicitly requests this admin.
pub const FULL_MATCH_SCORE: f64 = 100.0;
/// Score reported when this admin must never be selected for a topic.
pub const NO_MATCH_SCORE: f64 = -1.0;

// Topic / endpoint property keys.
pub const ENDPOINT_ADMIN_TYPE: &str = "pubsub.config";
pub const ENDPOINT_SERIALIZER: &str = "pubsub.serializer";
pub const ENDPOINT_PROTOCOL: &str = "pubsub.protocol";
pub const QOS_ATTRIBUTE_KEY: &str = "qos";
pub const QOS_TYPE_SAMPLE: &str = "sample";
pub const QOS_TYPE_CONTROL: &str = "control";

// Subscriber registration and publisher tracker filter keys.
pub const SUBSCRIBER_SCOPE: &str = "scope";
pub const SUBSCRIBER_TOPIC: &str = "topic";
pub const PUBLISHER_SCOPE: &str = "scope";
pub const PUBLISHER_TOPIC: &str = "topic";

// Backend services.
pub const SERIALIZATION_SERVICE_NAME: &str = "pubsub_message_serialization_service";
pub const SERIALIZATION_TYPE_PROPERTY: &str = "serialization.type";
pub const PROTOCOL_SERVICE_NAME: &str = "pubsub_protocol";
pub const PROTOCOL_TYPE_PROPERTY: &str = "protocol.type";

// Registry-maintained keys.
pub const SERVICE_ID: &str = "service.id";
pub const SERVICE_RANKING: &str = "service.ranking";
