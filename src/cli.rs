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

//! Command-line interface
//!
//! Argument parsing plus the handlers behind each subcommand. Handlers write
//! the status contract to the supplied writer and return the process exit
//! code; diagnostics go through `tracing` to stderr or the journal.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::error;

use sf_core::{
    render_report, run_once, ControllerConfig, ManagementApi, StateStore, SynofanError,
};

/// Run completed, whether or not the mode changed
pub const EXIT_OK: i32 = 0;
/// No temperature could be read or the mode could not be applied
pub const EXIT_FAILURE: i32 = 1;
/// Configuration rejected before any run
pub const EXIT_INVALID_CONFIG: i32 = 2;

#[derive(Parser, Debug)]
#[command(name = "synofan")]
#[command(version)]
#[command(about = "Synofan - temperature-driven fan mode control for Synology DSM")]
#[command(long_about = "Synofan - temperature-driven fan mode control for Synology DSM

Reads one temperature (DSM thermal API, DSM system info, then hwmon), picks
quiet, cool or full fan mode and applies it only when it differs from the
last applied mode. Meant to be run periodically by a scheduler.

EXAMPLES:
    synofan                            One reconciliation run (default)
    synofan --config ./fan.json run    Run with an explicit config file
    synofan state                      Show the persisted fan state
    synofan check                      Validate the configuration

ENVIRONMENT VARIABLES:
    SYNOFAN_CONFIG      Config file path (default /etc/synofan/config.json)
    SYNOFAN_PASSWORD    DSM password, overrides the config file
    SYNOFAN_LOG         Log filter, e.g. debug or sf_core=trace")]
pub struct Cli {
    /// Path to the JSON configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Commands {
    /// Perform one reconciliation run (default)
    Run,
    /// Print the persisted fan state as JSON
    State,
    /// Validate the configuration and print the effective thresholds
    Check,
}

impl Cli {
    pub fn command(&self) -> Commands {
        self.command.unwrap_or(Commands::Run)
    }
}

/// Report a configuration that failed to load or validate
pub fn report_invalid_config<W: Write>(out: &mut W, err: &SynofanError) -> i32 {
    error!("Invalid configuration: {}", err);
    let _ = writeln!(out, "[ERROR] Invalid configuration: {}", err);
    EXIT_INVALID_CONFIG
}

/// One reconciliation run; prints the status contract
pub async fn cmd_run<W: Write>(
    out: &mut W,
    config: &ControllerConfig,
    api: Arc<dyn ManagementApi>,
    store: Arc<dyn StateStore>,
) -> i32 {
    let report = run_once(config, api, store).await;

    for line in render_report(&report, &config.dsm.fan_modes) {
        let _ = writeln!(out, "{}", line);
    }

    report.exit_code()
}

/// Print the persisted state
pub fn cmd_state<W: Write>(out: &mut W, store: &dyn StateStore) -> anyhow::Result<i32> {
    match store.read() {
        Ok(Some(state)) => {
            writeln!(out, "{}", serde_json::to_string_pretty(&state)?)?;
            Ok(EXIT_OK)
        }
        Ok(None) => {
            writeln!(out, "No fan state recorded")?;
            Ok(EXIT_OK)
        }
        Err(e) => {
            writeln!(out, "[ERROR] {}", e)?;
            Ok(EXIT_FAILURE)
        }
    }
}

/// Print the effective configuration summary
pub fn cmd_check<W: Write>(out: &mut W, config: &ControllerConfig) -> anyhow::Result<i32> {
    let t = &config.thresholds;
    let names = &config.dsm.fan_modes;
    let sources: Vec<&str> = config.sources.iter().map(|s| s.as_str()).collect();

    writeln!(out, "[OK] Configuration valid")?;
    writeln!(out, "  Host:      {}", config.dsm.host)?;
    writeln!(
        out,
        "  Modes:     {} < {:.1}°C <= {} < {:.1}°C <= {}",
        names.quiet, t.quiet_max, names.cool, t.cool_max, names.full
    )?;
    writeln!(out, "  Sources:   {}", sources.join(" -> "))?;
    writeln!(out, "  State:     {}", config.state_file.display())?;
    writeln!(out, "  Timeout:   {}s", config.dsm.timeout_secs)?;
    if let Some(secs) = config.force_refresh_secs {
        writeln!(out, "  Refresh:   every {}s", secs)?;
    }
    if let Some(secs) = config.min_change_interval_secs {
        writeln!(out, "  Min delay: {}s between changes", secs)?;
    }
    Ok(EXIT_OK)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sf_core::{FanMode, MemoryStateStore, PersistedState};

    #[test]
    fn test_default_command_is_run() {
        let cli = Cli::parse_from(["synofan"]);
        assert_eq!(cli.command(), Commands::Run);
        assert!(cli.config.is_none());
    }

    #[test]
    fn test_config_flag_after_subcommand() {
        let cli = Cli::parse_from(["synofan", "state", "--config", "/tmp/c.json"]);
        assert_eq!(cli.command(), Commands::State);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/c.json")));
    }

    #[test]
    fn test_state_without_record() {
        let mut out = Vec::new();
        let code = cmd_state(&mut out, &MemoryStateStore::new()).unwrap();
        assert_eq!(code, EXIT_OK);
        assert_eq!(String::from_utf8(out).unwrap().trim(), "No fan state recorded");
    }

    #[test]
    fn test_state_prints_json() {
        let store =
            MemoryStateStore::with_state(PersistedState::applied(FanMode::Cool, chrono::Utc::now()));
        let mut out = Vec::new();
        cmd_state(&mut out, &store).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("\"mode\": \"cool\""));
    }

    #[test]
    fn test_check_summary() {
        let mut config = ControllerConfig::default();
        config.dsm.host = "https://nas:5001".into();
        let mut out = Vec::new();
        assert_eq!(cmd_check(&mut out, &config).unwrap(), EXIT_OK);
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("quietfan < 40.0°C <= coolfan < 55.0°C <= fullfan"));
        assert!(text.contains("THERMAL_API -> SYSINFO_API -> HWMON"));
    }

    #[test]
    fn test_invalid_config_exit_code() {
        let mut out = Vec::new();
        let code = report_invalid_config(&mut out, &SynofanError::config("bad"));
        assert_eq!(code, EXIT_INVALID_CONFIG);
        assert!(String::from_utf8(out).unwrap().starts_with("[ERROR] Invalid configuration"));
    }
}
