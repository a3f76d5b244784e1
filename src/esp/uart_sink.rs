//! UART log output.
//!
//! TX-only UART driver; requires an external USB-UART adapter (CH340,
//! CP2102, etc) when the pin is not routed to the on-board bridge.
//!
//! # Hardware Setup
//!
//! ```text
//! ESP32 TX pin ──────▶ USB-UART RX
//!                       └─▶ PC Serial Monitor
//! ```
//!
//! The driver is created in [`Sink::init`], so a missing or busy UART shows
//! up as a failed sink instead of a panic at startup.

use esp_idf_svc::hal::gpio;
use esp_idf_svc::hal::peripheral::Peripheral;
use esp_idf_svc::hal::uart::{self, UartTxDriver};
use esp_idf_svc::hal::units::Hertz;
use esp_idf_svc::sys;

use crate::config::UartSinkConfig;
use crate::sink::Sink;
use crate::status::{LogResult, Status};

/// [`Sink`] writing to a UART through the ESP-IDF driver's TX ring buffer.
pub struct UartSink<'d, U, T>
where
    U: Peripheral<P = uart::UART1> + 'd,
    T: Peripheral<P = gpio::AnyOutputPin> + 'd,
{
    pins: Option<(U, T)>,
    driver: Option<UartTxDriver<'d>>,
    config: UartSinkConfig,
}

impl<'d, U, T> UartSink<'d, U, T>
where
    U: Peripheral<P = uart::UART1> + 'd,
    T: Peripheral<P = gpio::AnyOutputPin> + 'd,
{
    pub fn new(uart: U, tx_pin: T, config: UartSinkConfig) -> Self {
        Self {
            pins: Some((uart, tx_pin)),
            driver: None,
            config,
        }
    }
}

impl<'d, U, T> Sink for UartSink<'d, U, T>
where
    U: Peripheral<P = uart::UART1> + 'd,
    T: Peripheral<P = gpio::AnyOutputPin> + 'd,
{
    fn name(&self) -> &str {
        "Serial"
    }

    fn init(&mut self) -> LogResult {
        let (uart, tx_pin) = self.pins.take().ok_or(Status::Failed)?;
        let uart_config = uart::config::Config::default()
            .baudrate(Hertz(self.config.baud_rate))
            .tx_fifo_size(self.config.tx_buffer_size);

        let driver = UartTxDriver::new(
            uart,
            tx_pin,
            Option::<gpio::AnyIOPin>::None, // CTS
            Option::<gpio::AnyIOPin>::None, // RTS
            &uart_config,
        )
        .map_err(|_| Status::Failed)?;

        self.driver = Some(driver);
        Ok(())
    }

    /// Free space in the driver's TX ring buffer.
    fn write_size(&self) -> usize {
        let Some(driver) = self.driver.as_ref() else {
            return 0;
        };
        let mut free: usize = 0;
        // SAFETY: the port is owned by `driver`, which is installed.
        let err = unsafe { sys::uart_get_tx_buffer_free_size(driver.port(), &mut free) };
        sys::EspError::convert(err).map(|_| free).unwrap_or(0)
    }

    fn write(&mut self, bytes: &[u8]) -> usize {
        match self.driver.as_mut() {
            Some(driver) => driver.write(bytes).unwrap_or(0),
            None => 0,
        }
    }
}
