/*
 * This file is part of Synofan.
 *
 * Copyright (C) 2025 Synofan contributors
 *
 * Synofan is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * Synofan is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with Synofan. If not, see <https://www.gnu.org/licenses/>.
 */

//! Tracing setup
//!
//! Logs go to the systemd journal when its socket exists, otherwise to
//! stderr. stdout carries only the status lines.

use std::path::Path;

use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

use sf_core::constants::env;

const JOURNAL_SOCKET: &str = "/run/systemd/journal/socket";
const DEFAULT_FILTER: &str = "info";

/// Where log records end up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTarget {
    Journald,
    Stderr,
}

fn filter() -> EnvFilter {
    let level = std::env::var(env::LOG).unwrap_or_else(|_| DEFAULT_FILTER.to_string());
    EnvFilter::try_new(&level).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

fn init_stderr() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_level(true)
        .with_env_filter(filter())
        .init();
}

/// Install the global subscriber; call once at startup
pub fn init_tracing() -> LogTarget {
    if !Path::new(JOURNAL_SOCKET).exists() {
        init_stderr();
        return LogTarget::Stderr;
    }

    match tracing_journald::layer() {
        Ok(journald) => {
            tracing_subscriber::registry()
                .with(journald.with_syslog_identifier("synofan".to_string()))
                .with(filter())
                .init();
            LogTarget::Journald
        }
        Err(e) => {
            eprintln!("Failed to create journald layer: {}, falling back to stderr", e);
            init_stderr();
            LogTarget::Stderr
        }
    }
}
