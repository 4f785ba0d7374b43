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

//! Replays a configured registry and topic set through the match orchestrators.

use crate::config::{Config, TopicConfig};
use pubsub_matching::{
    AdminScore, ComponentId, EndpointMatch, InMemoryServiceDirectory, MatchOptions, MatchResult,
    Properties, ServiceFilter, ServiceId, StaticTopicProperties, TopicMatcher, TopicRole,
    TrackerFilterEndpoints, PUBLISHER_SCOPE, PUBLISHER_TOPIC, SUBSCRIBER_SCOPE, SUBSCRIBER_TOPIC,
};
use tracing::info;

const COMPONENT: &str = "inspect";
const PUBLISHER_OBJECT_CLASS: &str = "pubsub.publisher";

#[derive(Debug)]
pub(crate) struct TopicDecision {
    pub(crate) role: TopicRole,
    pub(crate) result: MatchResult,
}

#[derive(Debug, Default)]
pub(crate) struct Report {
    pub(crate) topics: Vec<TopicDecision>,
    pub(crate) endpoints: Vec<EndpointMatch>,
}

fn load_directory(config: &Config) -> InMemoryServiceDirectory {
    let directory = InMemoryServiceDirectory::new();
    for service in &config.services {
        directory.register(&service.name, service.ranking, service.properties.clone());
    }
    directory
}

fn load_topics(config: &Config) -> StaticTopicProperties {
    let mut topics = StaticTopicProperties::new();
    for topic in &config.topics {
        topics.declare(
            ComponentId::new(topic.component),
            topic.scope.as_deref(),
            &topic.topic,
            role_of(topic),
            topic.properties.clone(),
        );
    }
    topics
}

fn role_of(topic: &TopicConfig) -> TopicRole {
    if topic.publisher {
        TopicRole::Publisher
    } else {
        TopicRole::Subscriber
    }
}

/// The filter a publishing component would track its topic with.
pub(crate) fn tracker_filter(topic: &TopicConfig) -> String {
    let mut operands = vec![
        ServiceFilter::equals("objectClass", PUBLISHER_OBJECT_CLASS),
        ServiceFilter::equals(PUBLISHER_TOPIC, topic.topic.as_str()),
    ];
    if let Some(scope) = &topic.scope {
        operands.push(ServiceFilter::equals(PUBLISHER_SCOPE, scope.as_str()));
    }
    ServiceFilter::And(operands).to_string()
}

fn subscriber_registration(topic: &TopicConfig) -> Properties {
    let registration = Properties::new().with(SUBSCRIBER_TOPIC, topic.topic.as_str());
    match &topic.scope {
        Some(scope) => registration.with(SUBSCRIBER_SCOPE, scope.as_str()),
        None => registration,
    }
}

pub(crate) fn run(config: &Config) -> Report {
    let directory = load_directory(config);
    let topics = load_topics(config);
    let publishers = TrackerFilterEndpoints::new(topics.clone());
    let matcher = TopicMatcher::new(
        &directory,
        &config.admin.admin_type,
        config.admin.score_config(),
    );
    let mut options = MatchOptions::default();
    if config.admin.match_protocol {
        options = options.with_protocol();
    }

    let mut report = Report::default();
    for topic in &config.topics {
        let component = ComponentId::new(topic.component);
        let role = role_of(topic);
        let result = match role {
            TopicRole::Publisher => {
                matcher.match_publisher(&publishers, component, &tracker_filter(topic), options)
            }
            TopicRole::Subscriber => matcher.match_subscriber(
                &topics,
                component,
                &subscriber_registration(topic),
                options,
            ),
        };
        info!(
            component = COMPONENT,
            admin_type = %config.admin.admin_type,
            component_id = %component,
            topic = %topic.topic,
            publisher = topic.publisher,
            score = result.score_value(),
            "{}",
            describe(&result)
        );
        report.topics.push(TopicDecision { role, result });
    }

    for endpoint in &config.endpoints {
        let outcome = matcher.match_endpoint(&endpoint.properties, config.admin.match_protocol);
        info!(
            component = COMPONENT,
            admin_type = %config.admin.admin_type,
            endpoint = %endpoint.name,
            matched = outcome.matched,
            "endpoint {} {}",
            endpoint.name,
            if outcome.matched { "accepted" } else { "rejected" }
        );
        report.endpoints.push(outcome);
    }
    report
}

fn describe(result: &MatchResult) -> String {
    let ids = |id: Option<ServiceId>| {
        id.map_or_else(|| "none".to_string(), |id| id.to_string())
    };
    match &result.score {
        AdminScore::NoMatch(reason) => format!("not matched: {reason}"),
        score => format!(
            "matched with score {} (serializer {}, protocol {})",
            score.value(),
            ids(result.serializer_service_id),
            ids(result.protocol_service_id)
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::{run, tracker_filter};
    use crate::config::Config;
    use pubsub_matching::{ServiceFilter, ServiceId, TopicRole, FULL_MATCH_SCORE, NO_MATCH_SCORE};

    const CONFIG: &str = r#"{
        admin: { admin_type: "tcp", sample_score: 30, control_score: 70,
                 default_score: 10, match_protocol: true },
        services: [
            { name: "pubsub_message_serialization_service", ranking: 1,
              properties: { "serialization.type": "json" } },
            { name: "pubsub_message_serialization_service", ranking: 5,
              properties: { "serialization.type": "json" } },
            { name: "pubsub_protocol", properties: { "protocol.type": "wire_v2" } },
        ],
        topics: [
            { component: 1, topic: "ping", properties: { qos: "control" } },
            { component: 2, scope: "outer", topic: "ping", publisher: true,
              properties: { "pubsub.config": "tcp", "pubsub.serializer": "json" } },
            { component: 3, topic: "pong", properties: { "pubsub.config": "zmq" } },
        ],
        endpoints: [
            { name: "remote-tcp", properties: { "pubsub.config": "tcp",
              "pubsub.serializer": "json", "pubsub.protocol": "wire_v2" } },
            { name: "remote-tcp-v1", properties: { "pubsub.config": "tcp",
              "pubsub.protocol": "wire_v1" } },
        ],
    }"#;

    #[test]
    fn replays_topics_and_endpoints() {
        let config: Config = json5::from_str(CONFIG).expect("config");
        let report = run(&config);

        assert_eq!(report.topics.len(), 3);
        let subscriber = &report.topics[0];
        assert_eq!(subscriber.role, TopicRole::Subscriber);
        assert_eq!(subscriber.result.score_value(), 70.0);
        assert_eq!(subscriber.result.serializer_service_id, Some(ServiceId::new(2)));
        assert_eq!(subscriber.result.protocol_service_id, Some(ServiceId::new(3)));

        let publisher = &report.topics[1];
        assert_eq!(publisher.role, TopicRole::Publisher);
        assert_eq!(publisher.result.score_value(), FULL_MATCH_SCORE);

        assert_eq!(report.topics[2].result.score_value(), NO_MATCH_SCORE);

        assert!(report.endpoints[0].matched);
        assert!(!report.endpoints[1].matched);
    }

    #[test]
    fn tracker_filter_carries_topic_and_scope() {
        let config: Config = json5::from_str(CONFIG).expect("config");
        let filter: ServiceFilter = tracker_filter(&config.topics[1]).parse().expect("filter");

        assert_eq!(filter.equality_value("topic"), Some("ping"));
        assert_eq!(filter.equality_value("scope"), Some("outer"));
    }
}
