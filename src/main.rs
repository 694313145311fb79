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

use std::io::stdout;
use std::process::exit;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::{debug, info};

use sf_core::{load_config, resolve_config_path, JsonStateStore};
use sf_dsm::DsmClient;
use synofan::cli::{cmd_check, cmd_run, cmd_state, report_invalid_config, Cli, Commands};
use synofan::logging::init_tracing;

const VERSION: &str = env!("CARGO_PKG_VERSION");

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let target = init_tracing();
    debug!(?target, "synofan {} starting", VERSION);

    let mut out = stdout().lock();

    let config_path = resolve_config_path(cli.config.as_deref());
    let config = match load_config(&config_path) {
        Ok(config) => config,
        Err(e) => exit(report_invalid_config(&mut out, &e)),
    };

    let store = Arc::new(JsonStateStore::new(config.state_file.clone()));

    let code = match cli.command() {
        Commands::Check => cmd_check(&mut out, &config)?,
        Commands::State => cmd_state(&mut out, store.as_ref())?,
        Commands::Run => {
            let client = match DsmClient::new(&config.dsm) {
                Ok(client) => Arc::new(client),
                Err(e) => exit(report_invalid_config(&mut out, &e)),
            };

            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .context("Failed to start async runtime")?;

            let code = runtime.block_on(cmd_run(&mut out, &config, client, store));
            info!(exit_code = code, "Run finished");
            code
        }
    };

    drop(out);
    exit(code)
}
