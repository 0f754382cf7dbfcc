pub mod console;
pub mod spi;

pub use console::ConsolePreview;
pub use spi::SpiStrip;

use cylinder_core::{Config, DisplayDriver, DriverKind};
use log::info;

/// Build the driver selected in `config`. Nothing is opened until `init`.
pub fn driver_from_config(config: &Config) -> Box<dyn DisplayDriver + Send> {
    let geometry = config.geometry();
    match config.driver.kind {
        DriverKind::Spi => {
            info!(
                "Using WS281x strip on {} ({} lights)",
                config.driver.device.display(),
                geometry.len()
            );
            Box::new(
                SpiStrip::new(&config.driver.device, geometry.len())
                    .with_speed(config.driver.speed_hz)
                    .with_brightness(config.panel.brightness),
            )
        }
        DriverKind::Console => {
            info!("Using console preview ({}x{})", geometry.width, geometry.height);
            Box::new(ConsolePreview::stdout(geometry).with_brightness(config.panel.brightness))
        }
    }
}
