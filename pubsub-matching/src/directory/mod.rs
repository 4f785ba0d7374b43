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

//! Service directory layer.
//!
//! Narrow read-only contract over the dynamic service registry, used by the
//! selection layer to look up serializer and protocol candidates, plus an
//! in-memory snapshot implementation.
//!
//! ```
//! use pubsub_matching::{
//!     InMemoryServiceDirectory, Properties, ServiceDirectory, SERIALIZATION_SERVICE_NAME,
//!     SERIALIZATION_TYPE_PROPERTY,
//! };
//!
//! let directory = InMemoryServiceDirectory::new();
//! let json = directory.register(
//!     SERIALIZATION_SERVICE_NAME,
//!     10,
//!     Properties::new().with(SERIALIZATION_TYPE_PROPERTY, "json"),
//! );
//!
//! assert_eq!(
//!     directory.find_highest_ranked(SERIALIZATION_SERVICE_NAME, None),
//!     Some(json)
//! );
//! ```

use std::fmt::{Display, Formatter};

use crate::filter::ServiceFilter;
use crate::properties::Properties;

pub(crate) mod in_memory;

/// Registry-assigned identifier of a registered service.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct ServiceId(u64);

impl ServiceId {
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    pub const fn value(self) -> u64 {
        self.0
    }
}

impl Display for ServiceId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Read-only lookup contract over the live service registry.
///
/// Both operations work on a point-in-time view of the registry. Visitors
/// passed to [`ServiceDirectory::for_each_with_properties`] may run while the
/// registry holds a lock: they must not block and must not call back into the
/// directory.
pub trait ServiceDirectory: Send + Sync {
    /// Returns the highest-ranked service registered under `service_name` that
    /// satisfies `filter` (every service of that name when `filter` is `None`).
    fn find_highest_ranked(
        &self,
        service_name: &str,
        filter: Option<&ServiceFilter>,
    ) -> Option<ServiceId>;

    /// Calls `visitor(properties, ranking, service_id)` once per matching service,
    /// in registry order.
    fn for_each_with_properties(
        &self,
        service_name: &str,
        filter: Option<&ServiceFilter>,
        visitor: &mut dyn FnMut(&Properties, i64, ServiceId),
    );
}

impl<T: ServiceDirectory + ?Sized> ServiceDirectory for std::sync::Arc<T> {
    fn find_highest_ranked(
        &self,
        service_name: &str,
        filter: Option<&ServiceFilter>,
    ) -> Option<ServiceId> {
        (**self).find_highest_ranked(service_name, filter)
    }

    fn for_each_with_properties(
        &self,
        service_name: &str,
        filter: Option<&ServiceFilter>,
        visitor: &mut dyn FnMut(&Properties, i64, ServiceId),
    ) {
        (**self).for_each_with_properties(service_name, filter, visitor)
    }
}
