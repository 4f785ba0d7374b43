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

mod integration_test_fixtures;
pub use integration_test_fixtures::{
    register_protocol, register_serializer, score_config, subscriber_registration,
    topic_properties,
};

use std::sync::Once;

static INIT_LOGGING: Once = Once::new();

/// Installs a test-friendly `tracing` subscriber once per process.
///
/// Honors `RUST_LOG`; defaults to `debug` for the matching crate.
pub fn init_logging() {
    INIT_LOGGING.call_once(|| {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("pubsub_matching=debug"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    });
}
