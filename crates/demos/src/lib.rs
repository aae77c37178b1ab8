//! Shared helpers for the Aquifer example applications.

use aquifer_zero_order::WaterStream;
use serde_json::{Map, Value, json};
use tracing_subscriber::EnvFilter;
use uom::si::{
    mass_density::kilogram_per_cubic_meter, mass_rate::kilogram_per_second,
    volume_rate::cubic_meter_per_second,
};

/// Installs a formatting subscriber filtered by `RUST_LOG`, defaulting to `info`.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();
}

/// Summarizes a stream as JSON: volumetric flow, mass flows, and concentrations.
#[must_use]
pub fn stream_json(stream: &WaterStream) -> Value {
    let mut flows = Map::new();
    let mut concentrations = Map::new();

    for component in stream.components() {
        if let Some(flow) = stream.flow_mass(component) {
            flows.insert(component.to_owned(), json!(flow.get::<kilogram_per_second>()));
        }
        if let Some(conc) = stream.conc_mass(component) {
            concentrations.insert(
                component.to_owned(),
                json!(conc.get::<kilogram_per_cubic_meter>()),
            );
        }
    }

    json!({
        "flow_vol_m3_per_s": stream.flow_vol().get::<cubic_meter_per_second>(),
        "flow_mass_kg_per_s": flows,
        "conc_mass_kg_per_m3": concentrations,
    })
}
