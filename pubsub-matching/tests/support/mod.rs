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

use pubsub_matching::{InMemoryServiceDirectory, TopicMatcher};

pub(crate) const ADMIN_TYPE: &str = "tcp";

pub(crate) fn make_matcher(directory: &InMemoryServiceDirectory) -> TopicMatcher<'_> {
    TopicMatcher::new(directory, ADMIN_TYPE, integration_test_utils::score_config())
}
