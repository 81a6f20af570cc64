// picar-pilot: remote-perception driving runtime for a four-wheel robot car
//
// The crate has two halves:
// - `drive`: wheel/car actuation over an injected GPIO/PWM capability
// - `pilot`: the length-prefixed frame streaming protocol (client and server)

pub mod config;
pub mod drive;
pub mod pilot;
