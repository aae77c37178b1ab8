//! Runs produced water through a pump, a brine concentrator, and a storage
//! tank, then reports the streams, electricity demand, and capital costs.
//!
//! Pass a directory of `<technology>.yaml` tables as the first argument to
//! use it instead of the bundled tables.
//!
//! ```sh
//! cargo run -p aquifer-demos --example treatment_train
//! ```

use std::{env, error::Error};

use aquifer_core::Model;
use aquifer_costing::{CapitalCost, TechnoEconomicDb};
use aquifer_demos::{init_tracing, stream_json};
use aquifer_zero_order::{LoadOptions, SidoUnit, SisoUnit, WaterStream, technology};
use serde_json::json;
use tracing::info;
use uom::si::{f64::MassRate, mass_rate::kilogram_per_second, power::kilowatt};

fn main() -> Result<(), Box<dyn Error>> {
    init_tracing();

    let db = match env::args().nth(1) {
        Some(dir) => TechnoEconomicDb::open(dir)?,
        None => TechnoEconomicDb::bundled(),
    };
    let options = LoadOptions {
        use_default_removal: true,
    };

    let pump = SisoUnit::from_database(&db, technology::PUMP, None)?;
    let concentrator = SidoUnit::from_database(
        &db,
        technology::BRINE_CONCENTRATOR,
        Some("produced_water"),
        options,
    )?;
    let tank = SisoUnit::from_database(&db, technology::STORAGE_TANK, None)?;

    let kg_s = |value| MassRate::new::<kilogram_per_second>(value);
    let feed = WaterStream::from_flows([
        ("H2O", kg_s(10_000.0)),
        ("tds", kg_s(250.0)),
        ("tss", kg_s(1.0)),
    ])?;

    let pumped = pump.call(&feed)?;
    let concentrated = concentrator.call(&pumped.outlet)?;
    let stored = tank.call(&concentrated.treated)?;

    let electricity = [pumped.electricity, concentrated.electricity, stored.electricity]
        .into_iter()
        .map(|power| power.get::<kilowatt>())
        .sum::<f64>();
    let capital = [pumped.capital_cost, concentrated.capital_cost, stored.capital_cost]
        .into_iter()
        .map(CapitalCost::in_dollars)
        .collect::<Vec<_>>();

    info!(electricity_kw = electricity, "treatment train solved");

    let report = json!({
        "feed": stream_json(&feed),
        "treated": stream_json(&stored.outlet),
        "brine": stream_json(&concentrated.byproduct),
        "electricity_kw": electricity,
        "capital_cost": capital,
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
