//! Adapters — concrete implementations of the hexagonal port traits.
//!
//! | Adapter        | Implements   | Connects to                     |
//! |----------------|--------------|---------------------------------|
//! | `config_file`  | ConfigPort   | JSON file on disk               |
//! | `log_display`  | DisplayPort  | Log output (16x2 panel mirror)  |
//! | `power`        | PowerPort    | Host `shutdown` command         |
//! | `relay`        | RelayPort    | embedded-hal output pin + timer |
//! | `sensors`      | SensorPort   | Latest fixed readings           |
//! | `sim_modem`    | ModemPort    | In-memory SIM store             |
//! | `time`         | ClockPort    | System clock                    |

pub mod config_file;
pub mod log_display;
pub mod power;
pub mod relay;
pub mod sensors;
pub mod sim_modem;
pub mod time;
