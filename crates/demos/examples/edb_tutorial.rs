//! Assembles thermo and reaction configurations for a calcium hydroxide
//! solubility system and prints them as JSON, then evaluates the dissolved
//! ions with the ion property package.
//!
//! The database location comes from `AQUIFER_EDB_URL` and
//! `AQUIFER_EDB_DATABASE`; it falls back to the bundled dataset when the
//! configured database cannot be reached.
//!
//! ```sh
//! RUST_LOG=debug cargo run -p aquifer-demos --example edb_tutorial
//! ```

use std::error::Error;

use aquifer_core::Model;
use aquifer_demos::init_tracing;
use aquifer_edb::{EdbConfig, ElectrolyteDb, Phase};
use aquifer_ion::{ActivityCoefficientModel, IonPropertyPackage, IonState, MolarFlow};
use tracing::{info, warn};
use uom::si::{
    catalytic_activity::mole_per_second,
    f64::{Pressure, ThermodynamicTemperature},
    molality::mole_per_kilogram,
    pressure::{kilopascal, pascal},
    thermodynamic_temperature::degree_celsius,
};

const COMPONENTS: [&str; 5] = ["H2O", "Ca[OH]2", "H_+", "OH_-", "Ca_2+"];

fn main() -> Result<(), Box<dyn Error>> {
    init_tracing();

    let config = EdbConfig::from_env();
    let db = match ElectrolyteDb::connect(&config) {
        Ok(db) => db,
        Err(err) => {
            warn!(%err, "falling back to the bundled electrolyte data");
            ElectrolyteDb::connect(&EdbConfig::new("memory:"))?
        }
    };

    // Liquid-vapor water system.
    let mut water = db.get_base("thermo_Liq_Vap_FpcTP")?;
    water.add(db.get_component("H2O")?)?;
    println!("{}", serde_json::to_string_pretty(&water)?);

    // Solid-liquid calcium hydroxide system with its inherent reactions.
    let mut thermo = db.get_base("thermo_Liq_Sol_FpcTP")?;
    thermo.add_all(db.get_components(COMPONENTS)?)?;

    let reactions = db.get_reactions(COMPONENTS, [Phase::Liq, Phase::Sol])?;
    let mut reaction = db.get_base("reaction")?;
    reaction.add_all(reactions.iter().cloned())?;

    let temperature = ThermodynamicTemperature::new::<degree_celsius>(50.0);
    for record in &reactions {
        info!(
            reaction = %record.name,
            k_eq = record.equilibrium_constant(temperature)?,
            "equilibrium constant at 50 °C"
        );
    }

    let liquid_only = db.get_reactions(COMPONENTS, [Phase::Liq])?;
    info!(
        liquid_and_solid = reactions.len(),
        liquid_only = liquid_only.len(),
        "reactions found"
    );

    println!("{}", serde_json::to_string_pretty(&thermo)?);
    println!("{}", serde_json::to_string_pretty(&reaction)?);

    // Saturated calcium hydroxide solution, about 20 mmol/kg.
    let ions = db.get_components(["H2O", "Ca_2+", "OH_-"])?;
    let package = IonPropertyPackage::from_components(&ions, ActivityCoefficientModel::Davies)?;
    let mut state = IonState::new(temperature, Pressure::new::<pascal>(101_325.0))?;
    for (component, flow) in [("H2O", 55.5), ("Ca_2+", 0.02), ("OH_-", 0.04)] {
        state.insert(component, MolarFlow::new::<mole_per_second>(flow))?;
    }
    let properties = package.call(&state)?;
    properties.assert_electroneutrality(None)?;
    info!(
        ionic_strength = properties.ionic_strength.get::<mole_per_kilogram>(),
        pressure_osm_kpa = properties.pressure_osm.get::<kilopascal>(),
        act_coeff_ca = properties.act_coeff_comp["Ca_2+"],
        "calcium hydroxide solution properties"
    );
    Ok(())
}
