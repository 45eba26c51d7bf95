//! Bus-attached devices: board config/status registers and the UART.

pub mod confreg;
pub mod ram;
pub mod uart8250;

pub use confreg::Confreg;
pub use ram::Ram;
pub use uart8250::Uart8250;
