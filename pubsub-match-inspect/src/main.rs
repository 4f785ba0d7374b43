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

mod config;
mod inspect;

use crate::config::Config;
use clap::Parser;
use pubsub_matching::TopicRole;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(about = "Replays a registry snapshot through the pub/sub match orchestrators")]
struct InspectArgs {
    #[arg(short, long, value_name = "FILE")]
    config: PathBuf,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();

    let args = InspectArgs::parse();
    let config = Config::from_file(&args.config)?;
    info!(
        admin_type = %config.admin.admin_type,
        services = config.services.len(),
        topics = config.topics.len(),
        endpoints = config.endpoints.len(),
        "Started pubsub-match-inspect"
    );

    let report = inspect::run(&config);
    let matched = report
        .topics
        .iter()
        .filter(|decision| decision.result.is_match())
        .count();
    let publishers = report
        .topics
        .iter()
        .filter(|decision| decision.role == TopicRole::Publisher)
        .count();
    let accepted = report
        .endpoints
        .iter()
        .filter(|outcome| outcome.matched)
        .count();
    info!(
        publishers,
        "{matched}/{} topics matched, {accepted}/{} endpoints accepted",
        report.topics.len(),
        report.endpoints.len()
    );
    Ok(())
}
