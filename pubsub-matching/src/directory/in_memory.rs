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

//! Snapshot-swapping in-memory service directory.

use arc_swap::ArcSwap;
use std::cmp::Reverse;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::debug;

use crate::constants::{SERVICE_ID, SERVICE_RANKING};
use crate::directory::{ServiceDirectory, ServiceId};
use crate::filter::ServiceFilter;
use crate::observability::events;
use crate::properties::Properties;

const COMPONENT: &str = "service_directory";

#[derive(Debug)]
struct RegisteredService {
    id: ServiceId,
    name: String,
    ranking: i64,
    properties: Properties,
}

impl RegisteredService {
    fn new(id: ServiceId, name: &str, ranking: i64, mut properties: Properties) -> Self {
        properties.set(SERVICE_ID, id.value() as i64);
        properties.set(SERVICE_RANKING, ranking);
        Self {
            id,
            name: name.to_string(),
            ranking,
            properties,
        }
    }

    fn selected_by(&self, service_name: &str, filter: Option<&ServiceFilter>) -> bool {
        self.name == service_name && filter.map_or(true, |f| f.matches(&self.properties))
    }
}

#[derive(Clone, Default)]
struct DirectorySnapshot {
    version: u64,
    // Ordered by ascending service id, i.e. registration order.
    services: Vec<Arc<RegisteredService>>,
}

impl DirectorySnapshot {
    fn contains(&self, id: ServiceId) -> bool {
        self.services.iter().any(|service| service.id == id)
    }

    fn ranking_of(&self, id: ServiceId) -> Option<i64> {
        self.services
            .iter()
            .find(|service| service.id == id)
            .map(|service| service.ranking)
    }
}

/// Service directory holding an immutable snapshot behind an atomic pointer.
///
/// Writers publish a fresh snapshot per mutation; readers load one snapshot per
/// lookup, so visitors never run under a lock and a lookup always sees a
/// consistent view even while other threads register or unregister services.
///
/// `find_highest_ranked` breaks ranking ties in favour of the lowest service id.
/// Iteration follows registration order.
pub struct InMemoryServiceDirectory {
    snapshot: ArcSwap<DirectorySnapshot>,
    next_service_id: AtomicU64,
}

impl Default for InMemoryServiceDirectory {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryServiceDirectory {
    pub fn new() -> Self {
        Self {
            snapshot: ArcSwap::from_pointee(DirectorySnapshot::default()),
            next_service_id: AtomicU64::new(1),
        }
    }

    /// Registers a service and returns its newly assigned id.
    ///
    /// `service.id` and `service.ranking` are written into the stored properties.
    pub fn register(&self, service_name: &str, ranking: i64, properties: Properties) -> ServiceId {
        let id = ServiceId::new(self.next_service_id.fetch_add(1, Ordering::Relaxed));
        let service = Arc::new(RegisteredService::new(id, service_name, ranking, properties));

        self.snapshot.rcu(|current| {
            let mut next = DirectorySnapshot::clone(current);
            next.version += 1;
            let position = next.services.partition_point(|existing| existing.id < id);
            next.services.insert(position, service.clone());
            next
        });

        debug!(
            event = events::DIRECTORY_SERVICE_REGISTERED,
            component = COMPONENT,
            service_name,
            service_id = %id,
            ranking,
            "service registered"
        );
        id
    }

    /// Removes a service. Returns `true` only when the service was registered.
    pub fn unregister(&self, id: ServiceId) -> bool {
        let previous = self.snapshot.rcu(|current| {
            let mut next = DirectorySnapshot::clone(current);
            if next.contains(id) {
                next.version += 1;
                next.services.retain(|service| service.id != id);
            }
            next
        });

        let removed = previous.contains(id);
        if removed {
            debug!(
                event = events::DIRECTORY_SERVICE_UNREGISTERED,
                component = COMPONENT,
                service_id = %id,
                "service unregistered"
            );
        }
        removed
    }

    /// Changes the ranking of a registered service. Returns `false` when unknown.
    pub fn set_ranking(&self, id: ServiceId, ranking: i64) -> bool {
        let previous = self.snapshot.rcu(|current| {
            let mut next = DirectorySnapshot::clone(current);
            if let Some(slot) = next.services.iter_mut().find(|service| service.id == id) {
                next.version += 1;
                *slot = Arc::new(RegisteredService::new(
                    id,
                    &slot.name,
                    ranking,
                    slot.properties.clone(),
                ));
            }
            next
        });

        match previous.ranking_of(id) {
            Some(old_ranking) => {
                debug!(
                    event = events::DIRECTORY_RANKING_CHANGED,
                    component = COMPONENT,
                    service_id = %id,
                    old_ranking,
                    ranking,
                    "service ranking changed"
                );
                true
            }
            None => false,
        }
    }

    /// Number of mutations applied so far.
    pub fn version(&self) -> u64 {
        self.snapshot.load().version
    }

    /// Number of currently registered services.
    pub fn len(&self) -> usize {
        self.snapshot.load().services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ServiceDirectory for InMemoryServiceDirectory {
    fn find_highest_ranked(
        &self,
        service_name: &str,
        filter: Option<&ServiceFilter>,
    ) -> Option<ServiceId> {
        let snapshot = self.snapshot.load();
        snapshot
            .services
            .iter()
            .filter(|service| service.selected_by(service_name, filter))
            .max_by_key(|service| (service.ranking, Reverse(service.id)))
            .map(|service| service.id)
    }

    fn for_each_with_properties(
        &self,
        service_name: &str,
        filter: Option<&ServiceFilter>,
        visitor: &mut dyn FnMut(&Properties, i64, ServiceId),
    ) {
        let snapshot = self.snapshot.load_full();
        for service in snapshot
            .services
            .iter()
            .filter(|service| service.selected_by(service_name, filter))
        {
            visitor(&service.properties, service.ranking, service.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::InMemoryServiceDirectory;
    use crate::constants::{SERVICE_ID, SERVICE_RANKING};
    use crate::directory::{ServiceDirectory, ServiceId};
    use crate::filter::ServiceFilter;
    use crate::properties::Properties;

    const NAME: &str = "pubsub_protocol";

    fn typed(kind: &str) -> Properties {
        Properties::new().with("protocol.type", kind)
    }

    fn visited_ids(directory: &InMemoryServiceDirectory, filter: Option<&ServiceFilter>) -> Vec<u64> {
        let mut ids = Vec::new();
        directory.for_each_with_properties(NAME, filter, &mut |_, _, id| ids.push(id.value()));
        ids
    }

    #[test]
    fn register_assigns_increasing_ids_and_registry_keys() {
        let directory = InMemoryServiceDirectory::new();
        let first = directory.register(NAME, 0, typed("wire_v1"));
        let second = directory.register(NAME, 4, typed("wire_v2"));

        assert!(first < second);
        assert_eq!(directory.len(), 2);
        assert_eq!(directory.version(), 2);

        let mut seen = Vec::new();
        directory.for_each_with_properties(NAME, None, &mut |props, ranking, id| {
            assert_eq!(props.get_long(SERVICE_ID, -1), id.value() as i64);
            assert_eq!(props.get_long(SERVICE_RANKING, -1), ranking);
            seen.push(id);
        });
        assert_eq!(seen, vec![first, second]);
    }

    #[test]
    fn find_highest_ranked_breaks_ties_by_lowest_id() {
        let directory = InMemoryServiceDirectory::new();
        let _low = directory.register(NAME, 1, typed("a"));
        let first_top = directory.register(NAME, 9, typed("b"));
        let _second_top = directory.register(NAME, 9, typed("c"));

        assert_eq!(directory.find_highest_ranked(NAME, None), Some(first_top));
        assert_eq!(directory.find_highest_ranked("unknown", None), None);
    }

    #[test]
    fn filters_restrict_lookup_and_iteration() {
        let directory = InMemoryServiceDirectory::new();
        let a = directory.register(NAME, 7, typed("a"));
        let b = directory.register(NAME, 3, typed("b"));
        let filter = ServiceFilter::equals("protocol.type", "b");

        assert_eq!(directory.find_highest_ranked(NAME, Some(&filter)), Some(b));
        assert_eq!(visited_ids(&directory, Some(&filter)), vec![b.value()]);
        assert_eq!(visited_ids(&directory, None), vec![a.value(), b.value()]);
    }

    #[test]
    fn unregister_and_set_ranking_report_presence() {
        let directory = InMemoryServiceDirectory::new();
        let a = directory.register(NAME, 1, typed("a"));
        let b = directory.register(NAME, 2, typed("b"));

        assert_eq!(directory.find_highest_ranked(NAME, None), Some(b));
        assert!(directory.set_ranking(a, 5));
        assert_eq!(directory.find_highest_ranked(NAME, None), Some(a));

        assert!(directory.unregister(a));
        assert!(!directory.unregister(a));
        assert!(!directory.set_ranking(a, 1));
        assert!(!directory.set_ranking(ServiceId::new(999), 1));
        assert_eq!(visited_ids(&directory, None), vec![b.value()]);
    }

    #[test]
    fn unknown_mutations_do_not_advance_version() {
        let directory = InMemoryServiceDirectory::new();
        directory.register(NAME, 1, typed("a"));
        let version = directory.version();

        assert!(!directory.unregister(ServiceId::new(42)));
        assert_eq!(directory.version(), version);
    }
}
