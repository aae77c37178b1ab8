use std::{
    cell::RefCell,
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
    rc::Rc,
};

use tracing::{debug, info};

use crate::{CostingError, TechnoEconomicTable, Technology, UnitParameters};

static BUNDLED: [(&str, &str); 6] = [
    ("bioreactor", include_str!("../data/bioreactor.yaml")),
    ("brine_concentrator", include_str!("../data/brine_concentrator.yaml")),
    ("pump", include_str!("../data/pump.yaml")),
    ("static_mixer", include_str!("../data/static_mixer.yaml")),
    ("storage_tank", include_str!("../data/storage_tank.yaml")),
    ("vfa_recovery", include_str!("../data/vfa_recovery.yaml")),
];

#[derive(Debug)]
enum Source {
    Directory(PathBuf),
    Bundled,
}

/// Techno-economic tables looked up by technology name.
///
/// Each technology is read from `<technology>.yaml` the first time it is
/// requested and cached afterwards.
///
/// # Example
///
/// ```
/// use aquifer_costing::TechnoEconomicDb;
///
/// let db = TechnoEconomicDb::bundled();
/// let pump = db.get_unit_operation_parameters("pump", None).unwrap();
/// assert_eq!(pump.energy_electric_flow_vol_inlet.value, 0.051);
/// assert_eq!(pump.energy_electric_flow_vol_inlet.units, "kWh/m^3");
/// ```
#[derive(Debug)]
pub struct TechnoEconomicDb {
    source: Source,
    cache: RefCell<BTreeMap<String, Rc<Technology>>>,
}

impl TechnoEconomicDb {
    /// Opens a directory of `<technology>.yaml` files.
    ///
    /// # Errors
    ///
    /// Returns [`CostingError::Io`] if the directory cannot be accessed.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, CostingError> {
        let dir = dir.as_ref();
        fs::metadata(dir).map_err(|source| CostingError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        Ok(Self::with_source(Source::Directory(dir.to_path_buf())))
    }

    /// Uses the tables bundled with this crate.
    #[must_use]
    pub fn bundled() -> Self {
        Self::with_source(Source::Bundled)
    }

    fn with_source(source: Source) -> Self {
        Self {
            source,
            cache: RefCell::default(),
        }
    }

    /// Returns the names of the bundled technologies.
    pub fn bundled_technologies() -> impl Iterator<Item = &'static str> {
        BUNDLED.iter().map(|(name, _)| *name)
    }

    /// Returns every subtype table of a technology.
    ///
    /// # Errors
    ///
    /// Returns [`CostingError::UnknownTechnology`] if no file exists for it,
    /// or any error from reading and validating the file.
    pub fn technology(&self, name: &str) -> Result<Rc<Technology>, CostingError> {
        if let Some(technology) = self.cache.borrow().get(name) {
            return Ok(Rc::clone(technology));
        }

        let technology = Rc::new(Technology::from_yaml_str(name, &self.read(name)?)?);
        info!(
            technology = name,
            subtypes = technology.subtypes().count(),
            "loaded techno-economic table"
        );
        self.cache
            .borrow_mut()
            .insert(name.to_owned(), Rc::clone(&technology));
        Ok(technology)
    }

    /// Returns the parameter table for a technology and optional subtype.
    ///
    /// # Errors
    ///
    /// Returns [`CostingError::UnknownTechnology`] or
    /// [`CostingError::UnknownSubtype`] if the lookup misses, or any error
    /// from reading and validating the file.
    pub fn get_unit_operation_parameters(
        &self,
        technology: &str,
        subtype: Option<&str>,
    ) -> Result<TechnoEconomicTable, CostingError> {
        debug!(technology, subtype, "looking up unit operation parameters");
        self.technology(technology)?.table(subtype).cloned()
    }

    /// Like [`TechnoEconomicDb::get_unit_operation_parameters`], returning typed values.
    ///
    /// # Errors
    ///
    /// As for [`TechnoEconomicDb::get_unit_operation_parameters`].
    pub fn unit_parameters(
        &self,
        technology: &str,
        subtype: Option<&str>,
    ) -> Result<UnitParameters, CostingError> {
        self.technology(technology)?.table(subtype)?.parameters()
    }

    fn read(&self, name: &str) -> Result<String, CostingError> {
        let unknown = || CostingError::UnknownTechnology(name.to_owned());
        if name.is_empty() || name.contains(['/', '\\', '.']) {
            return Err(unknown());
        }

        match &self.source {
            Source::Bundled => BUNDLED
                .iter()
                .find(|(bundled, _)| *bundled == name)
                .map(|(_, text)| (*text).to_owned())
                .ok_or_else(unknown),
            Source::Directory(dir) => {
                let path = dir.join(format!("{name}.yaml"));
                if !path.is_file() {
                    return Err(unknown());
                }
                fs::read_to_string(&path).map_err(|source| CostingError::Io { path, source })
            }
        }
    }
}
