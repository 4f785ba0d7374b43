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

//! Providers of the topic property bags that carry a topic's requirements.

use std::collections::HashMap;
use std::fmt::{Display, Formatter};
use tracing::{debug, warn};

use crate::constants::{PUBLISHER_SCOPE, PUBLISHER_TOPIC};
use crate::filter::ServiceFilter;
use crate::observability::events;
use crate::properties::Properties;

const COMPONENT: &str = "topic_properties";

/// Identifier of the component (bundle) that publishes or subscribes.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct ComponentId(u64);

impl ComponentId {
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    pub const fn value(self) -> u64 {
        self.0
    }
}

impl Display for ComponentId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Side of a topic a component declares properties for.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum TopicRole {
    Publisher,
    Subscriber,
}

/// Looks up the topic properties a component declares for `(scope, topic)`.
///
/// The returned bag is owned by the caller.
pub trait TopicPropertiesProvider: Send + Sync {
    fn topic_properties(
        &self,
        component: ComponentId,
        scope: Option<&str>,
        topic: &str,
        role: TopicRole,
    ) -> Option<Properties>;
}

/// Builds endpoint properties from a publishing component and its tracker filter.
///
/// The returned bag is owned by the caller.
pub trait PublisherEndpointProvider: Send + Sync {
    fn endpoint_from_tracker(
        &self,
        component: ComponentId,
        tracker_filter: &str,
    ) -> Option<Properties>;
}

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
struct TopicKey {
    component: ComponentId,
    scope: Option<String>,
    topic: String,
    role: TopicRole,
}

/// In-memory table of topic properties declared per component.
#[derive(Clone, Debug, Default)]
pub struct StaticTopicProperties {
    declarations: HashMap<TopicKey, Properties>,
}

impl StaticTopicProperties {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares the properties `component` uses for `(scope, topic)` in `role`,
    /// replacing any earlier declaration.
    pub fn declare(
        &mut self,
        component: ComponentId,
        scope: Option<&str>,
        topic: &str,
        role: TopicRole,
        properties: Properties,
    ) -> Option<Properties> {
        self.declarations.insert(
            TopicKey {
                component,
                scope: scope.map(str::to_string),
                topic: topic.to_string(),
                role,
            },
            properties,
        )
    }

    pub fn len(&self) -> usize {
        self.declarations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }
}

impl TopicPropertiesProvider for StaticTopicProperties {
    fn topic_properties(
        &self,
        component: ComponentId,
        scope: Option<&str>,
        topic: &str,
        role: TopicRole,
    ) -> Option<Properties> {
        let key = TopicKey {
            component,
            scope: scope.map(str::to_string),
            topic: topic.to_string(),
            role,
        };
        self.declarations.get(&key).cloned()
    }
}

/// Resolves publisher endpoints by reading `topic` and `scope` out of the
/// publisher tracker filter and asking a [`TopicPropertiesProvider`].
#[derive(Clone, Debug)]
pub struct TrackerFilterEndpoints<P> {
    topics: P,
}

impl<P: TopicPropertiesProvider> TrackerFilterEndpoints<P> {
    pub fn new(topics: P) -> Self {
        Self { topics }
    }

    pub fn topics(&self) -> &P {
        &self.topics
    }
}

impl<P: TopicPropertiesProvider> PublisherEndpointProvider for TrackerFilterEndpoints<P> {
    fn endpoint_from_tracker(
        &self,
        component: ComponentId,
        tracker_filter: &str,
    ) -> Option<Properties> {
        let filter: ServiceFilter = match tracker_filter.parse() {
            Ok(filter) => filter,
            Err(err) => {
                warn!(
                    event = events::TRACKER_FILTER_INVALID,
                    component = COMPONENT,
                    component_id = %component,
                    tracker_filter,
                    "unable to parse publisher tracker filter: {err}"
                );
                return None;
            }
        };

        let Some(topic) = filter.equality_value(PUBLISHER_TOPIC) else {
            debug!(
                event = events::TRACKER_FILTER_INVALID,
                component = COMPONENT,
                component_id = %component,
                tracker_filter,
                "publisher tracker filter names no topic"
            );
            return None;
        };
        let scope = filter.equality_value(PUBLISHER_SCOPE);

        self.topics
            .topic_properties(component, scope, topic, TopicRole::Publisher)
    }
}
