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

//! Serializer and protocol service selection.

use tracing::{debug, warn};

use crate::constants::{
    PROTOCOL_SERVICE_NAME, PROTOCOL_TYPE_PROPERTY, SERIALIZATION_SERVICE_NAME,
    SERIALIZATION_TYPE_PROPERTY,
};
use crate::directory::{ServiceDirectory, ServiceId};
use crate::observability::{events, fields};

const COMPONENT: &str = "backend_resolver";

// Type names are compared over at most this many bytes.
const TYPE_COMPARE_LIMIT: usize = 1024 * 1024;

// NOTE: ranked selection only accepts candidates ranked strictly above this
// floor, so a serializer with a negative ranking is never selected by type.
// Deployments rely on negative rankings to park a serializer; keep the floor.
const RANKING_FLOOR: i64 = -1;

/// How one candidate is chosen among several advertising the requested type.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SelectionPolicy {
    /// Highest non-negative ranking wins; the first one seen wins a tie.
    HighestRanking,
    /// The last candidate in registry order wins, rankings are ignored.
    LastMatch,
}

/// Family of backend services a topic can request by type name.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BackendKind {
    Serializer,
    Protocol,
}

impl BackendKind {
    pub fn service_name(self) -> &'static str {
        match self {
            BackendKind::Serializer => SERIALIZATION_SERVICE_NAME,
            BackendKind::Protocol => PROTOCOL_SERVICE_NAME,
        }
    }

    pub fn type_property(self) -> &'static str {
        match self {
            BackendKind::Serializer => SERIALIZATION_TYPE_PROPERTY,
            BackendKind::Protocol => PROTOCOL_TYPE_PROPERTY,
        }
    }

    // NOTE: protocols deliberately keep last-match selection. Existing
    // deployments with several protocols of one type depend on it; do not align
    // it with serializer ranking without a migration.
    pub fn selection_policy(self) -> SelectionPolicy {
        match self {
            BackendKind::Serializer => SelectionPolicy::HighestRanking,
            BackendKind::Protocol => SelectionPolicy::LastMatch,
        }
    }

    fn label(self) -> &'static str {
        match self {
            BackendKind::Serializer => "serializer",
            BackendKind::Protocol => "protocol",
        }
    }
}

fn type_matches(requested_type: &str, advertised_type: &str) -> bool {
    let requested = requested_type.as_bytes();
    let advertised = advertised_type.as_bytes();
    requested[..requested.len().min(TYPE_COMPARE_LIMIT)]
        == advertised[..advertised.len().min(TYPE_COMPARE_LIMIT)]
}

/// Resolves a requested backend type to a registered service id.
///
/// Without a requested type the directory's own ranking picks the service.
/// With one, every registered service of `kind` is scanned and the candidates
/// advertising that type are selected per [`BackendKind::selection_policy`].
/// Candidates without a type property are skipped with a warning.
pub fn resolve_backend(
    directory: &dyn ServiceDirectory,
    kind: BackendKind,
    requested_type: Option<&str>,
) -> Option<ServiceId> {
    let resolved = match requested_type {
        None => directory.find_highest_ranked(kind.service_name(), None),
        Some(requested) => scan_for_type(directory, kind, requested),
    };

    match resolved {
        Some(service_id) => debug!(
            event = events::BACKEND_RESOLVED,
            component = COMPONENT,
            backend = kind.label(),
            requested_type = fields::format_requested(requested_type),
            service_id = %service_id,
            "backend resolved"
        ),
        None => debug!(
            event = events::BACKEND_UNRESOLVED,
            component = COMPONENT,
            backend = kind.label(),
            requested_type = fields::format_requested(requested_type),
            "no backend candidate found"
        ),
    }
    resolved
}

fn scan_for_type(
    directory: &dyn ServiceDirectory,
    kind: BackendKind,
    requested_type: &str,
) -> Option<ServiceId> {
    let type_property = kind.type_property();
    let policy = kind.selection_policy();
    let mut best: Option<(i64, ServiceId)> = None;

    // Runs under the directory's read view: no directory calls in here.
    directory.for_each_with_properties(kind.service_name(), None, &mut |props, ranking, service_id| {
        let Some(advertised) = props.get_string(type_property) else {
            warn!(
                event = events::BACKEND_CANDIDATE_MISSING_TYPE,
                component = COMPONENT,
                backend = kind.label(),
                service_id = %service_id,
                type_property,
                "found {} without mandatory type key",
                kind.label()
            );
            return;
        };
        if !type_matches(requested_type, advertised) {
            return;
        }
        let replaces_best = match policy {
            SelectionPolicy::HighestRanking => {
                ranking > best.map_or(RANKING_FLOOR, |(best_ranking, _)| best_ranking)
            }
            SelectionPolicy::LastMatch => true,
        };
        if replaces_best {
            best = Some((ranking, service_id));
        }
    });

    best.map(|(_, service_id)| service_id)
}

#[cfg(test)]
mod tests {
    use super::{resolve_backend, type_matches, BackendKind, SelectionPolicy};
    use crate::constants::{
        PROTOCOL_SERVICE_NAME, PROTOCOL_TYPE_PROPERTY, SERIALIZATION_SERVICE_NAME,
        SERIALIZATION_TYPE_PROPERTY,
    };
    use crate::directory::in_memory::InMemoryServiceDirectory;
    use crate::properties::Properties;

    fn serializer(directory: &InMemoryServiceDirectory, kind: &str, ranking: i64) -> u64 {
        directory
            .register(
                SERIALIZATION_SERVICE_NAME,
                ranking,
                Properties::new().with(SERIALIZATION_TYPE_PROPERTY, kind),
            )
            .value()
    }

    fn protocol(directory: &InMemoryServiceDirectory, kind: &str, ranking: i64) -> u64 {
        directory
            .register(
                PROTOCOL_SERVICE_NAME,
                ranking,
                Properties::new().with(PROTOCOL_TYPE_PROPERTY, kind),
            )
            .value()
    }

    #[test]
    fn kinds_map_to_registry_names_and_policies() {
        assert_eq!(BackendKind::Serializer.service_name(), SERIALIZATION_SERVICE_NAME);
        assert_eq!(BackendKind::Protocol.type_property(), PROTOCOL_TYPE_PROPERTY);
        assert_eq!(
            BackendKind::Serializer.selection_policy(),
            SelectionPolicy::HighestRanking
        );
        assert_eq!(BackendKind::Protocol.selection_policy(), SelectionPolicy::LastMatch);
    }

    #[test]
    fn type_comparison_is_exact_for_regular_names() {
        assert!(type_matches("json", "json"));
        assert!(!type_matches("json", "json.v2"));
        assert!(!type_matches("json.v2", "json"));
        assert!(!type_matches("", "json"));
    }

    #[test]
    fn unrequested_type_uses_directory_ranking() {
        let directory = InMemoryServiceDirectory::new();
        serializer(&directory, "avrobin", 2);
        let top = serializer(&directory, "json", 8);

        let resolved = resolve_backend(&directory, BackendKind::Serializer, None);
        assert_eq!(resolved.map(|id| id.value()), Some(top));
    }

    #[test]
    fn serializer_picks_highest_ranking_of_requested_type() {
        let directory = InMemoryServiceDirectory::new();
        serializer(&directory, "json", 1);
        let best = serializer(&directory, "json", 5);
        serializer(&directory, "json", 3);
        serializer(&directory, "avrobin", 50);

        let resolved = resolve_backend(&directory, BackendKind::Serializer, Some("json"));
        assert_eq!(resolved.map(|id| id.value()), Some(best));
    }

    #[test]
    fn serializer_tie_keeps_first_seen_candidate() {
        let directory = InMemoryServiceDirectory::new();
        let first = serializer(&directory, "json", 4);
        serializer(&directory, "json", 4);

        let resolved = resolve_backend(&directory, BackendKind::Serializer, Some("json"));
        assert_eq!(resolved.map(|id| id.value()), Some(first));
    }

    #[test]
    fn serializer_with_negative_ranking_is_not_selected_by_type() {
        let directory = InMemoryServiceDirectory::new();
        serializer(&directory, "json", -5);

        assert_eq!(resolve_backend(&directory, BackendKind::Serializer, Some("json")), None);

        let zero = serializer(&directory, "json", 0);
        let resolved = resolve_backend(&directory, BackendKind::Serializer, Some("json"));
        assert_eq!(resolved.map(|id| id.value()), Some(zero));
    }

    #[test]
    fn protocol_last_match_ignores_negative_ranking() {
        let directory = InMemoryServiceDirectory::new();
        let parked = protocol(&directory, "wire_v2", -5);

        let resolved = resolve_backend(&directory, BackendKind::Protocol, Some("wire_v2"));
        assert_eq!(resolved.map(|id| id.value()), Some(parked));
    }

    #[test]
    fn protocol_picks_last_match_ignoring_ranking() {
        let directory = InMemoryServiceDirectory::new();
        protocol(&directory, "wire_v2", 100);
        let last = protocol(&directory, "wire_v2", 0);
        protocol(&directory, "wire_v1", 200);

        let resolved = resolve_backend(&directory, BackendKind::Protocol, Some("wire_v2"));
        assert_eq!(resolved.map(|id| id.value()), Some(last));
    }

    #[test]
    fn candidates_without_type_are_skipped() {
        let directory = InMemoryServiceDirectory::new();
        directory.register(SERIALIZATION_SERVICE_NAME, 99, Properties::new());
        let typed = serializer(&directory, "json", 1);

        let resolved = resolve_backend(&directory, BackendKind::Serializer, Some("json"));
        assert_eq!(resolved.map(|id| id.value()), Some(typed));
    }

    #[test]
    fn unknown_type_resolves_to_none() {
        let directory = InMemoryServiceDirectory::new();
        serializer(&directory, "json", 1);

        assert!(resolve_backend(&directory, BackendKind::Serializer, Some("avrobin")).is_none());
        assert!(resolve_backend(&directory, BackendKind::Protocol, None).is_none());
    }
}
