//! ESP-IDF platform support (FreeRTOS port, UART sink).

pub mod port;
pub mod uart_sink;

pub use port::EspPort;
pub use uart_sink::UartSink;
