/********************************************************************************
 * Copyright (c) 2026 Contributors to the Eclipse Foundation
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

//! Structured field value-format helpers.

use crate::directory::ServiceId;

pub const NONE: &str = "none";

/// Renders an optional requested type or admin for log fields.
pub fn format_requested(requested: Option<&str>) -> &str {
    requested.unwrap_or(NONE)
}

/// Renders an optional resolved service id for log fields.
pub fn format_service_id(service_id: Option<ServiceId>) -> String {
    service_id
        .map(|id| id.to_string())
        .unwrap_or_else(|| NONE.to_string())
}

#[cfg(test)]
mod tests {
    use super::{format_requested, format_service_id, NONE};
    use crate::directory::ServiceId;

    #[test]
    fn format_requested_falls_back_when_absent() {
        assert_eq!(format_requested(None), NONE);
        assert_eq!(format_requested(Some("json")), "json");
    }

    #[test]
    fn format_service_id_returns_id_when_present() {
        assert_eq!(format_service_id(Some(ServiceId::new(12))), "12");
        assert_eq!(format_service_id(None), NONE);
    }
}
