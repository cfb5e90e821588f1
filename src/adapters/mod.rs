//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter          | Implements    | Connects to                 |
//! |------------------|---------------|-----------------------------|
//! | `log_display`    | DisplayPort   | In-memory grid + debug log  |
//! |                  | BuzzerPort    | Log output                  |
//! | `log_sink`       | EventSink     | Log output                  |
//! | `settings_store` | SettingsPort  | Postcard file / memory blob |
//! | `sim_sensors`    | SensorPort    | Deterministic simulation    |

pub mod log_display;
pub mod log_sink;
pub mod settings_store;
pub mod sim_sensors;
