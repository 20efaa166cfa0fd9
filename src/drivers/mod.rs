//! Hardware-near components: the GPIO backends, the serialized pin
//! register, the switch classifier and the status signal driver.

pub mod button;
pub mod gpio;
pub mod pin_register;
pub mod status_led;
