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

//! Canonical structured event names used across `pubsub-matching`.

// Scoring events.
pub const ADMIN_SCORE_COMPUTED: &str = "admin_score_computed";

// Backend resolution events.
pub const BACKEND_CANDIDATE_MISSING_TYPE: &str = "backend_candidate_missing_type";
pub const BACKEND_RESOLVED: &str = "backend_resolved";
pub const BACKEND_UNRESOLVED: &str = "backend_unresolved";

// Topic property lookup events.
pub const TRACKER_FILTER_INVALID: &str = "tracker_filter_invalid";

// Orchestrator events.
pub const TOPIC_PROPERTIES_ABSENT: &str = "topic_properties_absent";
pub const PUBLISHER_MATCH_DONE: &str = "publisher_match_done";
pub const SUBSCRIBER_MATCH_DONE: &str = "subscriber_match_done";
pub const ENDPOINT_MATCH_DONE: &str = "endpoint_match_done";
pub const ENDPOINT_SERIALIZER_UNRESOLVED: &str = "endpoint_serializer_unresolved";
pub const ENDPOINT_PROTOCOL_UNRESOLVED: &str = "endpoint_protocol_unresolved";

// Directory events.
pub const DIRECTORY_SERVICE_REGISTERED: &str = "directory_service_registered";
pub const DIRECTORY_SERVICE_UNREGISTERED: &str = "directory_service_unregistered";
pub const DIRECTORY_RANKING_CHANGED: &str = "directory_ranking_changed";
