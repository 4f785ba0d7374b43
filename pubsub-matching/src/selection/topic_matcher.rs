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

//! Publisher, subscriber and endpoint match orchestration.

use tracing::{debug, error};

use crate::constants::{
    ENDPOINT_ADMIN_TYPE, ENDPOINT_PROTOCOL, ENDPOINT_SERIALIZER, QOS_ATTRIBUTE_KEY,
    SUBSCRIBER_SCOPE, SUBSCRIBER_TOPIC,
};
use crate::directory::{ServiceDirectory, ServiceId};
use crate::observability::{events, fields};
use crate::properties::Properties;
use crate::selection::backend_resolver::{resolve_backend, BackendKind};
use crate::selection::scoring::{admin_type_matches, score_admin, AdminScore, NoMatchReason, ScoreConfig};
use crate::topic_properties::{
    ComponentId, PublisherEndpointProvider, TopicPropertiesProvider, TopicRole,
};

const COMPONENT: &str = "topic_matcher";

/// Per-call switches for publisher and subscriber matching.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct MatchOptions {
    /// Also resolve a protocol service; an unresolved protocol rejects the match.
    pub match_protocol: bool,
    /// Hand the looked-up topic properties back in [`MatchResult::topic_properties`].
    /// When `false` they are dropped before the call returns.
    pub keep_topic_properties: bool,
}

impl MatchOptions {
    pub fn with_protocol(mut self) -> Self {
        self.match_protocol = true;
        self
    }

    pub fn keeping_topic_properties(mut self) -> Self {
        self.keep_topic_properties = true;
        self
    }
}

/// Outcome of matching one admin against a publisher or subscriber topic.
#[derive(Clone, Debug, PartialEq)]
pub struct MatchResult {
    pub score: AdminScore,
    pub serializer_service_id: Option<ServiceId>,
    /// Only resolved when protocol matching was requested.
    pub protocol_service_id: Option<ServiceId>,
    /// Owned by the caller; only present when requested and found.
    pub topic_properties: Option<Properties>,
}

impl MatchResult {
    /// Legacy numeric score, see [`AdminScore::value`].
    pub fn score_value(&self) -> f64 {
        self.score.value()
    }

    pub fn is_match(&self) -> bool {
        self.score.is_match()
    }
}

/// Outcome of matching one admin against an already-described endpoint.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct EndpointMatch {
    pub matched: bool,
    pub serializer_service_id: Option<ServiceId>,
    /// Only resolved when protocol matching was requested.
    pub protocol_service_id: Option<ServiceId>,
}

/// Requirements a topic places on the admin serving it.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
struct TopicRequirements<'a> {
    admin: Option<&'a str>,
    qos: Option<&'a str>,
    serializer: Option<&'a str>,
    protocol: Option<&'a str>,
}

impl<'a> TopicRequirements<'a> {
    fn from_properties(properties: Option<&'a Properties>, match_protocol: bool) -> Self {
        let Some(properties) = properties else {
            return Self::default();
        };
        Self {
            admin: properties.get_string(ENDPOINT_ADMIN_TYPE),
            qos: properties.get_string(QOS_ATTRIBUTE_KEY),
            serializer: properties.get_string(ENDPOINT_SERIALIZER),
            protocol: if match_protocol {
                properties.get_string(ENDPOINT_PROTOCOL)
            } else {
                None
            },
        }
    }
}

/// Decides whether one admin implementation should serve a topic, and with
/// which serializer and protocol.
///
/// The matcher holds no state of its own: every call reads a fresh view of the
/// directory, so one matcher may be shared across threads.
///
/// ```
/// use pubsub_matching::{
///     InMemoryServiceDirectory, Properties, ScoreConfig, TopicMatcher,
///     ENDPOINT_ADMIN_TYPE, ENDPOINT_SERIALIZER, SERIALIZATION_SERVICE_NAME,
///     SERIALIZATION_TYPE_PROPERTY,
/// };
///
/// let directory = InMemoryServiceDirectory::new();
/// let json = directory.register(
///     SERIALIZATION_SERVICE_NAME,
///     1,
///     Properties::new().with(SERIALIZATION_TYPE_PROPERTY, "json"),
/// );
///
/// let matcher = TopicMatcher::new(&directory, "tcp", ScoreConfig::new(0.5, 0.8, 0.1));
/// let endpoint = Properties::new()
///     .with(ENDPOINT_ADMIN_TYPE, "tcp")
///     .with(ENDPOINT_SERIALIZER, "json");
///
/// let outcome = matcher.match_endpoint(&endpoint, false);
/// assert!(outcome.matched);
/// assert_eq!(outcome.serializer_service_id, Some(json));
/// ```
pub struct TopicMatcher<'a> {
    directory: &'a dyn ServiceDirectory,
    admin_type: &'a str,
    scores: ScoreConfig,
}

impl<'a> TopicMatcher<'a> {
    pub fn new(directory: &'a dyn ServiceDirectory, admin_type: &'a str, scores: ScoreConfig) -> Self {
        Self {
            directory,
            admin_type,
            scores,
        }
    }

    pub fn admin_type(&self) -> &str {
        self.admin_type
    }

    pub fn scores(&self) -> &ScoreConfig {
        &self.scores
    }

    /// Matches the topic a publishing component tracks with `tracker_filter`.
    pub fn match_publisher(
        &self,
        publishers: &dyn PublisherEndpointProvider,
        component: ComponentId,
        tracker_filter: &str,
        options: MatchOptions,
    ) -> MatchResult {
        let topic_properties = publishers.endpoint_from_tracker(component, tracker_filter);
        if topic_properties.is_none() {
            debug!(
                event = events::TOPIC_PROPERTIES_ABSENT,
                component = COMPONENT,
                admin_type = self.admin_type,
                component_id = %component,
                tracker_filter,
                "no publisher topic properties, matching on defaults"
            );
        }

        let result = self.select(topic_properties, options);
        debug!(
            event = events::PUBLISHER_MATCH_DONE,
            component = COMPONENT,
            admin_type = self.admin_type,
            component_id = %component,
            score = result.score_value(),
            serializer_service_id = fields::format_service_id(result.serializer_service_id),
            protocol_service_id = fields::format_service_id(result.protocol_service_id),
            "publisher matched"
        );
        result
    }

    /// Matches the topic named by a subscriber registration's `scope`/`topic`.
    pub fn match_subscriber(
        &self,
        topics: &dyn TopicPropertiesProvider,
        component: ComponentId,
        subscriber_properties: &Properties,
        options: MatchOptions,
    ) -> MatchResult {
        let scope = subscriber_properties.get_string(SUBSCRIBER_SCOPE);
        let topic = subscriber_properties.get_string(SUBSCRIBER_TOPIC);

        let topic_properties = topic.and_then(|topic| {
            topics.topic_properties(component, scope, topic, TopicRole::Subscriber)
        });
        if topic_properties.is_none() {
            debug!(
                event = events::TOPIC_PROPERTIES_ABSENT,
                component = COMPONENT,
                admin_type = self.admin_type,
                component_id = %component,
                scope = fields::format_requested(scope),
                topic = fields::format_requested(topic),
                "no subscriber topic properties, matching on defaults"
            );
        }

        let result = self.select(topic_properties, options);
        debug!(
            event = events::SUBSCRIBER_MATCH_DONE,
            component = COMPONENT,
            admin_type = self.admin_type,
            component_id = %component,
            topic = fields::format_requested(topic),
            score = result.score_value(),
            serializer_service_id = fields::format_service_id(result.serializer_service_id),
            protocol_service_id = fields::format_service_id(result.protocol_service_id),
            "subscriber matched"
        );
        result
    }

    /// Matches an endpoint that was already described, e.g. one found through
    /// discovery. Only an exact admin match is accepted, no scores apply.
    pub fn match_endpoint(
        &self,
        endpoint_properties: &Properties,
        match_protocol: bool,
    ) -> EndpointMatch {
        let configured_admin = endpoint_properties.get_string(ENDPOINT_ADMIN_TYPE);
        let admin_match =
            configured_admin.is_some_and(|configured| admin_type_matches(configured, self.admin_type));

        let mut outcome = EndpointMatch::default();
        if admin_match {
            let configured_serializer = endpoint_properties.get_string(ENDPOINT_SERIALIZER);
            outcome.serializer_service_id =
                resolve_backend(self.directory, BackendKind::Serializer, configured_serializer);
            if outcome.serializer_service_id.is_none() {
                error!(
                    event = events::ENDPOINT_SERIALIZER_UNRESOLVED,
                    component = COMPONENT,
                    admin_type = fields::format_requested(configured_admin),
                    requested_type = fields::format_requested(configured_serializer),
                    "matching endpoint for technology {} but couldn't get serializer {}",
                    fields::format_requested(configured_admin),
                    fields::format_requested(configured_serializer),
                );
            }
        }
        let mut matched = admin_match && outcome.serializer_service_id.is_some();

        if match_protocol {
            if admin_match {
                let configured_protocol = endpoint_properties.get_string(ENDPOINT_PROTOCOL);
                outcome.protocol_service_id =
                    resolve_backend(self.directory, BackendKind::Protocol, configured_protocol);
                if outcome.protocol_service_id.is_none() {
                    error!(
                        event = events::ENDPOINT_PROTOCOL_UNRESOLVED,
                        component = COMPONENT,
                        admin_type = fields::format_requested(configured_admin),
                        requested_type = fields::format_requested(configured_protocol),
                        "matching endpoint for technology {} but couldn't get protocol {}",
                        fields::format_requested(configured_admin),
                        fields::format_requested(configured_protocol),
                    );
                }
            }
            matched = matched && outcome.protocol_service_id.is_some();
        }
        outcome.matched = matched;

        debug!(
            event = events::ENDPOINT_MATCH_DONE,
            component = COMPONENT,
            admin_type = self.admin_type,
            configured_admin = fields::format_requested(configured_admin),
            matched,
            serializer_service_id = fields::format_service_id(outcome.serializer_service_id),
            protocol_service_id = fields::format_service_id(outcome.protocol_service_id),
            "endpoint matched"
        );
        outcome
    }

    /// Shared pipeline: score, resolve backends, downgrade on failure, hand off.
    fn select(&self, topic_properties: Option<Properties>, options: MatchOptions) -> MatchResult {
        let requirements =
            TopicRequirements::from_properties(topic_properties.as_ref(), options.match_protocol);

        let mut score =
            score_admin(requirements.admin, requirements.qos, self.admin_type, &self.scores);
        debug!(
            event = events::ADMIN_SCORE_COMPUTED,
            component = COMPONENT,
            admin_type = self.admin_type,
            requested_admin = fields::format_requested(requirements.admin),
            requested_qos = fields::format_requested(requirements.qos),
            score = score.value(),
            "admin scored"
        );

        let serializer_service_id =
            resolve_backend(self.directory, BackendKind::Serializer, requirements.serializer);
        if serializer_service_id.is_none() {
            score = score.reject(NoMatchReason::SerializerUnresolved {
                requested: requirements.serializer.map(str::to_string),
            });
        }

        let mut protocol_service_id = None;
        if options.match_protocol {
            protocol_service_id =
                resolve_backend(self.directory, BackendKind::Protocol, requirements.protocol);
            if protocol_service_id.is_none() {
                score = score.reject(NoMatchReason::ProtocolUnresolved {
                    requested: requirements.protocol.map(str::to_string),
                });
            }
        }

        MatchResult {
            score,
            serializer_service_id,
            protocol_service_id,
            topic_properties: topic_properties.filter(|_| options.keep_topic_properties),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{MatchOptions, TopicMatcher, TopicRequirements};
    use crate::constants::{
        ENDPOINT_ADMIN_TYPE, ENDPOINT_PROTOCOL, ENDPOINT_SERIALIZER, PROTOCOL_SERVICE_NAME,
        PROTOCOL_TYPE_PROPERTY, QOS_ATTRIBUTE_KEY, SERIALIZATION_SERVICE_NAME,
        SERIALIZATION_TYPE_PROPERTY,
    };
    use crate::directory::in_memory::InMemoryServiceDirectory;
    use crate::properties::Properties;
    use crate::selection::scoring::{AdminScore, NoMatchReason, ScoreConfig};

    const SCORES: ScoreConfig = ScoreConfig {
        sample_score: 0.5,
        control_score: 0.8,
        default_score: 0.1,
    };

    fn directory_with(serializers: &[&str], protocols: &[&str]) -> InMemoryServiceDirectory {
        let directory = InMemoryServiceDirectory::new();
        for kind in serializers {
            directory.register(
                SERIALIZATION_SERVICE_NAME,
                1,
                Properties::new().with(SERIALIZATION_TYPE_PROPERTY, *kind),
            );
        }
        for kind in protocols {
            directory.register(
                PROTOCOL_SERVICE_NAME,
                1,
                Properties::new().with(PROTOCOL_TYPE_PROPERTY, *kind),
            );
        }
        directory
    }

    #[test]
    fn requirements_ignore_protocol_unless_requested() {
        let props = Properties::new()
            .with(ENDPOINT_ADMIN_TYPE, "tcp")
            .with(QOS_ATTRIBUTE_KEY, "sample")
            .with(ENDPOINT_SERIALIZER, "json")
            .with(ENDPOINT_PROTOCOL, "wire_v2");

        let without = TopicRequirements::from_properties(Some(&props), false);
        let with = TopicRequirements::from_properties(Some(&props), true);

        assert_eq!(without.admin, Some("tcp"));
        assert_eq!(without.qos, Some("sample"));
        assert_eq!(without.serializer, Some("json"));
        assert_eq!(without.protocol, None);
        assert_eq!(with.protocol, Some("wire_v2"));
        assert_eq!(
            TopicRequirements::from_properties(None, true),
            TopicRequirements::default()
        );
    }

    #[test]
    fn select_with_absent_properties_uses_default_score() {
        let directory = directory_with(&["json"], &[]);
        let matcher = TopicMatcher::new(&directory, "tcp", SCORES);

        let result = matcher.select(None, MatchOptions::default());

        assert_eq!(result.score, AdminScore::Graded(0.1));
        assert!(result.serializer_service_id.is_some());
        assert!(result.protocol_service_id.is_none());
        assert!(result.topic_properties.is_none());
    }

    #[test]
    fn select_downgrades_when_protocol_is_missing() {
        let directory = directory_with(&["json"], &["wire_v1"]);
        let matcher = TopicMatcher::new(&directory, "tcp", SCORES);
        let props = Properties::new()
            .with(ENDPOINT_ADMIN_TYPE, "tcp")
            .with(ENDPOINT_PROTOCOL, "wire_v2");

        let result = matcher.select(Some(props), MatchOptions::default().with_protocol());

        assert_eq!(
            result.score,
            AdminScore::NoMatch(NoMatchReason::ProtocolUnresolved {
                requested: Some("wire_v2".to_string())
            })
        );
        assert!(result.serializer_service_id.is_some());
        assert!(result.protocol_service_id.is_none());
    }

    #[test]
    fn select_hands_back_properties_only_when_kept() {
        let directory = directory_with(&["json"], &[]);
        let matcher = TopicMatcher::new(&directory, "tcp", SCORES);
        let props = Properties::new().with(QOS_ATTRIBUTE_KEY, "control");

        let dropped = matcher.select(Some(props.clone()), MatchOptions::default());
        let kept = matcher.select(
            Some(props.clone()),
            MatchOptions::default().keeping_topic_properties(),
        );

        assert!(dropped.topic_properties.is_none());
        assert_eq!(kept.topic_properties, Some(props));
        assert_eq!(kept.score_value(), 0.8);
    }

    #[test]
    fn endpoint_requires_admin_match_before_resolving() {
        let directory = directory_with(&["json"], &["wire_v2"]);
        let matcher = TopicMatcher::new(&directory, "zmq", SCORES);
        let endpoint = Properties::new()
            .with(ENDPOINT_ADMIN_TYPE, "tcp")
            .with(ENDPOINT_SERIALIZER, "json")
            .with(ENDPOINT_PROTOCOL, "wire_v2");

        let outcome = matcher.match_endpoint(&endpoint, true);

        assert!(!outcome.matched);
        assert!(outcome.serializer_service_id.is_none());
        assert!(outcome.protocol_service_id.is_none());
    }

    #[test]
    fn endpoint_without_admin_type_never_matches() {
        let directory = directory_with(&["json"], &[]);
        let matcher = TopicMatcher::new(&directory, "tcp", SCORES);

        let outcome = matcher.match_endpoint(&Properties::new(), false);
        assert!(!outcome.matched);
    }

    #[test]
    fn endpoint_protocol_is_left_unset_when_not_requested() {
        let directory = directory_with(&["json"], &["wire_v2"]);
        let matcher = TopicMatcher::new(&directory, "tcp", SCORES);
        let endpoint = Properties::new()
            .with(ENDPOINT_ADMIN_TYPE, "tcp")
            .with(ENDPOINT_PROTOCOL, "wire_v2");

        let outcome = matcher.match_endpoint(&endpoint, false);

        assert!(outcome.matched);
        assert!(outcome.serializer_service_id.is_some());
        assert!(outcome.protocol_service_id.is_none());
    }
}
