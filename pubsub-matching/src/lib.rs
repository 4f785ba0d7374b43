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

//! # pubsub-matching
//!
//! `pubsub-matching` decides which pub/sub admin, wire serializer and wire
//! protocol serve a topic. Admin implementations call it when a publisher,
//! subscriber or discovered endpoint appears, and activate on the topic only
//! when the returned decision says so.
//!
//! Typical usage is centered on [`TopicMatcher`], built over a
//! [`ServiceDirectory`] view of the service registry.
//!
//! ## Publisher matching
//!
//! ```
//! use pubsub_matching::{
//!     ComponentId, InMemoryServiceDirectory, MatchOptions, Properties, ScoreConfig,
//!     StaticTopicProperties, TopicMatcher, TopicRole, TrackerFilterEndpoints,
//!     ENDPOINT_ADMIN_TYPE, ENDPOINT_SERIALIZER, FULL_MATCH_SCORE,
//!     SERIALIZATION_SERVICE_NAME, SERIALIZATION_TYPE_PROPERTY,
//! };
//!
//! let directory = InMemoryServiceDirectory::new();
//! let json = directory.register(
//!     SERIALIZATION_SERVICE_NAME,
//!     1,
//!     Properties::new().with(SERIALIZATION_TYPE_PROPERTY, "json"),
//! );
//!
//! let publisher = ComponentId::new(11);
//! let mut topics = StaticTopicProperties::new();
//! topics.declare(
//!     publisher,
//!     None,
//!     "ping",
//!     TopicRole::Publisher,
//!     Properties::new()
//!         .with(ENDPOINT_ADMIN_TYPE, "tcp")
//!         .with(ENDPOINT_SERIALIZER, "json"),
//! );
//! let publishers = TrackerFilterEndpoints::new(topics);
//!
//! let matcher = TopicMatcher::new(&directory, "tcp", ScoreConfig::new(30.0, 70.0, 50.0));
//! let result = matcher.match_publisher(
//!     &publishers,
//!     publisher,
//!     "(&(objectClass=pubsub.publisher)(topic=ping))",
//!     MatchOptions::default().keeping_topic_properties(),
//! );
//!
//! assert_eq!(result.score_value(), FULL_MATCH_SCORE);
//! assert_eq!(result.serializer_service_id, Some(json));
//! assert!(result.topic_properties.is_some());
//! ```
//!
//! ## Decision policy
//!
//! - An explicit admin request either fully matches this admin or excludes it.
//! - Otherwise the topic's QoS class picks one of the admin's configured scores.
//! - A serializer (and a protocol, when requested) must resolve; if one does not,
//!   the score is forced to [`NO_MATCH_SCORE`] whatever the scoring said.
//! - Serializers of one type are chosen by highest ranking, protocols of one
//!   type by last registration.
//!
//! ## Internal architecture map
//!
//! - Properties: property bag and defaulted typed accessors
//! - Directory: registry lookup contract and snapshot directory
//! - Selection: scoring policy, backend resolver, topic matcher
//! - Topic properties: per-component topic declarations and tracker filters
//!
//! ## Observability model
//!
//! The crate uses `tracing` for logs/events.
//! Library code emits events and does not initialize a global subscriber.
//! Binaries and tests are responsible for `tracing_subscriber` initialization.

mod constants;
pub use constants::*;

mod directory;
pub use directory::in_memory::InMemoryServiceDirectory;
pub use directory::{ServiceDirectory, ServiceId};

mod filter;
pub use filter::{FilterParseError, ServiceFilter, MAX_FILTER_DEPTH};

#[doc(hidden)]
pub mod observability;

mod properties;
pub use properties::{Properties, PropertyValue};

mod selection;
pub use selection::backend_resolver::{resolve_backend, BackendKind, SelectionPolicy};
pub use selection::scoring::{score_admin, AdminScore, NoMatchReason, QosClass, ScoreConfig};
pub use selection::topic_matcher::{EndpointMatch, MatchOptions, MatchResult, TopicMatcher};

mod topic_properties;
pub use topic_properties::{
    ComponentId, PublisherEndpointProvider, StaticTopicProperties, TopicPropertiesProvider,
    TopicRole, TrackerFilterEndpoints,
};
