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

//! Selection layer.
//!
//! Turns a topic's requirements into a decision for one admin: the scoring
//! policy grades the admin, the backend resolver binds a serializer and
//! optionally a protocol, and the topic matcher runs that pipeline for
//! publishers, subscribers and discovered endpoints.
//!
//! ```
//! use pubsub_matching::{
//!     ComponentId, InMemoryServiceDirectory, MatchOptions, Properties, ScoreConfig,
//!     StaticTopicProperties, TopicMatcher, TopicRole, QOS_ATTRIBUTE_KEY,
//!     SERIALIZATION_SERVICE_NAME, SERIALIZATION_TYPE_PROPERTY,
//! };
//!
//! let directory = InMemoryServiceDirectory::new();
//! directory.register(
//!     SERIALIZATION_SERVICE_NAME,
//!     0,
//!     Properties::new().with(SERIALIZATION_TYPE_PROPERTY, "json"),
//! );
//!
//! let subscriber = ComponentId::new(3);
//! let mut topics = StaticTopicProperties::new();
//! topics.declare(
//!     subscriber,
//!     None,
//!     "ping",
//!     TopicRole::Subscriber,
//!     Properties::new().with(QOS_ATTRIBUTE_KEY, "sample"),
//! );
//!
//! let matcher = TopicMatcher::new(&directory, "zmq", ScoreConfig::new(30.0, 70.0, 50.0));
//! let registration = Properties::new().with("topic", "ping");
//! let result = matcher.match_subscriber(&topics, subscriber, &registration, MatchOptions::default());
//!
//! // Sample traffic, no explicit admin: the admin's sample score applies.
//! assert_eq!(result.score_value(), 30.0);
//! ```

pub(crate) mod backend_resolver;
pub(crate) mod scoring;
pub(crate) mod topic_matcher;
