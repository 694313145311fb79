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

//! Synofan - fan mode control for Synology DSM
//!
//! Binary glue around `sf-core`: argument parsing, tracing setup and the
//! subcommand handlers.

pub mod cli;
pub mod logging;
