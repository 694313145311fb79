//! Temperature source adapters
//!
//! Each adapter produces one reading or fails; none of them retries. Falling
//! back between adapters is the sequencer's job.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::constants::api;
use crate::data::{validate_temperature, ControllerConfig, TempSource, TemperatureReading};
use crate::engine::session::{with_timeout, ApiSession};
use crate::error::{Result, SynofanError};
use crate::hw::HwmonReader;

/// Produces a temperature reading or fails
#[async_trait]
pub trait TemperatureSource: Send + Sync {
    fn kind(&self) -> TempSource;

    async fn acquire(&self) -> Result<TemperatureReading>;
}

/// Management API thermal endpoint
pub struct ThermalApiSource {
    session: Arc<ApiSession>,
}

impl ThermalApiSource {
    pub fn new(session: Arc<ApiSession>) -> Self {
        Self { session }
    }
}

#[async_trait]
impl TemperatureSource for ThermalApiSource {
    fn kind(&self) -> TempSource {
        TempSource::ThermalApi
    }

    async fn acquire(&self) -> Result<TemperatureReading> {
        let session = self.session.get().await?;
        let info = with_timeout(
            api::THERMAL,
            self.session.timeout(),
            self.session.api().get_thermal_info(session),
        )
        .await?;

        let value = info
            .temperature()
            .ok_or_else(|| SynofanError::malformed(api::THERMAL, "no cpu_temp or system_temp"))?;
        let value = validate_temperature(value)?;

        debug!(value, "Thermal API reading");
        Ok(TemperatureReading::new(value, self.kind(), api::THERMAL))
    }
}

/// Management API system-info endpoint
pub struct SysinfoApiSource {
    session: Arc<ApiSession>,
}

impl SysinfoApiSource {
    pub fn new(session: Arc<ApiSession>) -> Self {
        Self { session }
    }
}

#[async_trait]
impl TemperatureSource for SysinfoApiSource {
    fn kind(&self) -> TempSource {
        TempSource::SysinfoApi
    }

    async fn acquire(&self) -> Result<TemperatureReading> {
        let session = self.session.get().await?;
        let info = with_timeout(
            api::SYSTEM,
            self.session.timeout(),
            self.session.api().get_system_info(session),
        )
        .await?;

        let value = info
            .temp
            .ok_or_else(|| SynofanError::malformed(api::SYSTEM, "no temp field"))?;
        let value = validate_temperature(value)?;

        debug!(value, "System info reading");
        Ok(TemperatureReading::new(value, self.kind(), api::SYSTEM))
    }
}

/// Direct hwmon sensor file
pub struct HwmonSource {
    reader: HwmonReader,
}

impl HwmonSource {
    pub fn new(reader: HwmonReader) -> Self {
        Self { reader }
    }
}

#[async_trait]
impl TemperatureSource for HwmonSource {
    fn kind(&self) -> TempSource {
        TempSource::Hwmon
    }

    async fn acquire(&self) -> Result<TemperatureReading> {
        let (value, path) = self.reader.read_temperature()?;
        Ok(TemperatureReading::new(
            value,
            self.kind(),
            path.display().to_string(),
        ))
    }
}

/// Build the configured sources, in configured order
pub fn build_sources(
    config: &ControllerConfig,
    session: Arc<ApiSession>,
) -> Vec<Box<dyn TemperatureSource>> {
    config
        .sources
        .iter()
        .map(|kind| -> Box<dyn TemperatureSource> {
            match kind {
                TempSource::ThermalApi => Box::new(ThermalApiSource::new(session.clone())),
                TempSource::SysinfoApi => Box::new(SysinfoApiSource::new(session.clone())),
                TempSource::Hwmon => Box::new(HwmonSource::new(
                    HwmonReader::new(&config.hwmon_base).with_sensor(config.hwmon_sensor.clone()),
                )),
            }
        })
        .collect()
}
