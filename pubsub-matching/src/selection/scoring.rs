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

//! Admin affinity scoring from requested admin type and QoS class.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

use crate::constants::{FULL_MATCH_SCORE, NO_MATCH_SCORE, QOS_TYPE_CONTROL, QOS_TYPE_SAMPLE};

/// Scores an admin declares for sample-rate, control-rate and unclassified topics.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScoreConfig {
    pub sample_score: f64,
    pub control_score: f64,
    pub default_score: f64,
}

impl ScoreConfig {
    pub fn new(sample_score: f64, control_score: f64, default_score: f64) -> Self {
        Self {
            sample_score,
            control_score,
            default_score,
        }
    }
}

/// Coarse traffic class requested by a topic.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum QosClass {
    Sample,
    Control,
    Other,
}

impl QosClass {
    /// Classifies a requested QoS token by prefix, so `"sample-v2"` is `Sample`.
    pub fn from_requested(requested_qos: &str) -> Self {
        if requested_qos.starts_with(QOS_TYPE_SAMPLE) {
            QosClass::Sample
        } else if requested_qos.starts_with(QOS_TYPE_CONTROL) {
            QosClass::Control
        } else {
            QosClass::Other
        }
    }
}

/// Requirement that excluded an admin for a topic.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum NoMatchReason {
    AdminMismatch { requested: String },
    SerializerUnresolved { requested: Option<String> },
    ProtocolUnresolved { requested: Option<String> },
}

impl Display for NoMatchReason {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            NoMatchReason::AdminMismatch { requested } => {
                write!(f, "topic requests admin '{requested}'")
            }
            NoMatchReason::SerializerUnresolved { requested: Some(requested) } => {
                write!(f, "no serializer of type '{requested}'")
            }
            NoMatchReason::SerializerUnresolved { requested: None } => {
                write!(f, "no serializer registered")
            }
            NoMatchReason::ProtocolUnresolved { requested: Some(requested) } => {
                write!(f, "no protocol of type '{requested}'")
            }
            NoMatchReason::ProtocolUnresolved { requested: None } => {
                write!(f, "no protocol registered")
            }
        }
    }
}

/// Outcome of scoring one admin for one topic.
///
/// [`AdminScore::value`] folds the outcome back into the numeric score admins
/// compare against each other, using [`FULL_MATCH_SCORE`] and [`NO_MATCH_SCORE`].
#[derive(Clone, Debug, PartialEq)]
pub enum AdminScore {
    FullMatch,
    Graded(f64),
    NoMatch(NoMatchReason),
}

impl AdminScore {
    pub fn value(&self) -> f64 {
        match self {
            AdminScore::FullMatch => FULL_MATCH_SCORE,
            AdminScore::Graded(score) => *score,
            AdminScore::NoMatch(_) => NO_MATCH_SCORE,
        }
    }

    pub fn is_match(&self) -> bool {
        !matches!(self, AdminScore::NoMatch(_))
    }

    /// Downgrades to `NoMatch`, keeping an earlier rejection reason if there is one.
    pub(crate) fn reject(self, reason: NoMatchReason) -> Self {
        match self {
            AdminScore::NoMatch(earlier) => AdminScore::NoMatch(earlier),
            _ => AdminScore::NoMatch(reason),
        }
    }
}

/// Prefix comparison bounded by the admin's own type length.
pub(crate) fn admin_type_matches(requested_admin: &str, admin_type: &str) -> bool {
    requested_admin.starts_with(admin_type)
}

/// Scores `admin_type` for a topic's requested admin and QoS class.
///
/// An explicit admin request is absolute: it either selects this admin outright
/// or excludes it. Without one, the QoS class picks the configured score.
///
/// ```
/// use pubsub_matching::{score_admin, AdminScore, ScoreConfig};
///
/// let scores = ScoreConfig::new(0.5, 0.8, 0.1);
///
/// assert_eq!(score_admin(Some("tcp"), None, "tcp", &scores), AdminScore::FullMatch);
/// assert!(!score_admin(Some("zmq"), None, "tcp", &scores).is_match());
/// assert_eq!(score_admin(None, Some("control"), "tcp", &scores).value(), 0.8);
/// ```
pub fn score_admin(
    requested_admin: Option<&str>,
    requested_qos: Option<&str>,
    admin_type: &str,
    scores: &ScoreConfig,
) -> AdminScore {
    match (requested_admin, requested_qos) {
        (Some(requested), _) if admin_type_matches(requested, admin_type) => AdminScore::FullMatch,
        (Some(requested), _) => AdminScore::NoMatch(NoMatchReason::AdminMismatch {
            requested: requested.to_string(),
        }),
        (None, Some(qos)) => match QosClass::from_requested(qos) {
            QosClass::Sample => AdminScore::Graded(scores.sample_score),
            QosClass::Control => AdminScore::Graded(scores.control_score),
            QosClass::Other => AdminScore::Graded(scores.default_score),
        },
        (None, None) => AdminScore::Graded(scores.default_score),
    }
}

#[cfg(test)]
mod tests {
    use super::{score_admin, AdminScore, NoMatchReason, QosClass, ScoreConfig};
    use crate::constants::{FULL_MATCH_SCORE, NO_MATCH_SCORE};

    const SCORES: ScoreConfig = ScoreConfig {
        sample_score: 30.0,
        control_score: 70.0,
        default_score: 50.0,
    };

    #[test]
    fn explicit_admin_request_is_full_match_regardless_of_qos() {
        for qos in [None, Some("sample"), Some("control"), Some("bogus")] {
            let score = score_admin(Some("zmq"), qos, "zmq", &SCORES);
            assert_eq!(score, AdminScore::FullMatch);
            assert_eq!(score.value(), FULL_MATCH_SCORE);
        }
    }

    #[test]
    fn requested_admin_may_carry_suffix() {
        assert_eq!(
            score_admin(Some("tcp.v2"), None, "tcp", &SCORES),
            AdminScore::FullMatch
        );
    }

    #[test]
    fn other_admin_request_is_no_match() {
        let score = score_admin(Some("udpmc"), Some("sample"), "zmq", &SCORES);

        assert_eq!(
            score,
            AdminScore::NoMatch(NoMatchReason::AdminMismatch {
                requested: "udpmc".to_string()
            })
        );
        assert_eq!(score.value(), NO_MATCH_SCORE);
        // Shorter than the admin type: not a prefix match.
        assert!(!score_admin(Some("tc"), None, "tcp", &SCORES).is_match());
    }

    #[test]
    fn qos_class_selects_configured_score() {
        assert_eq!(score_admin(None, Some("sample"), "zmq", &SCORES).value(), 30.0);
        assert_eq!(score_admin(None, Some("control"), "zmq", &SCORES).value(), 70.0);
        assert_eq!(score_admin(None, Some("unknown-qos"), "zmq", &SCORES).value(), 50.0);
        assert_eq!(score_admin(None, None, "zmq", &SCORES).value(), 50.0);
    }

    #[test]
    fn qos_tokens_match_by_prefix() {
        assert_eq!(QosClass::from_requested("sample"), QosClass::Sample);
        assert_eq!(QosClass::from_requested("sampled"), QosClass::Sample);
        assert_eq!(QosClass::from_requested("control-plane"), QosClass::Control);
        assert_eq!(QosClass::from_requested("samp"), QosClass::Other);
        assert_eq!(QosClass::from_requested(""), QosClass::Other);
    }

    #[test]
    fn reject_keeps_first_reason() {
        let first = NoMatchReason::SerializerUnresolved {
            requested: Some("json".to_string()),
        };
        let rejected = AdminScore::Graded(1.0)
            .reject(first.clone())
            .reject(NoMatchReason::ProtocolUnresolved { requested: None });

        assert_eq!(rejected, AdminScore::NoMatch(first));
        assert!(!rejected.is_match());
    }

    #[test]
    fn scores_deserialize_from_config() {
        let scores: ScoreConfig = serde_json::from_str(
            r#"{"sample_score": 30.0, "control_score": 70.0, "default_score": 50.0}"#,
        )
        .expect("score config should deserialize");

        assert_eq!(scores, SCORES);
    }
}
