use std::{collections::BTreeSet, env, path::Path};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{
    Base, ComponentRecord, EdbError, MemoryStore, Phase, ReactionQuery, ReactionRecord,
    RecordKind, Repository,
};

/// Connection string used when none is configured.
pub const DEFAULT_URL: &str = "mongodb://localhost:27017";

/// Database name used when none is configured.
pub const DEFAULT_DATABASE: &str = "electrolytedb";

const URL_VAR: &str = "AQUIFER_EDB_URL";
const DATABASE_VAR: &str = "AQUIFER_EDB_DATABASE";

/// Where an [`ElectrolyteDb`] finds its documents.
///
/// Supported URL schemes:
///
/// - `memory:` uses the bundled dataset.
/// - `file://<dir>` loads collections from `<dir>/<database>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdbConfig {
    pub url: String,
    pub database: String,
}

impl Default for EdbConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_owned(),
            database: DEFAULT_DATABASE.to_owned(),
        }
    }
}

impl EdbConfig {
    /// Creates a configuration with the given URL and the default database.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    /// Returns a configuration using a different database name.
    #[must_use]
    pub fn with_database(self, database: impl Into<String>) -> Self {
        Self {
            database: database.into(),
            ..self
        }
    }

    /// Reads `AQUIFER_EDB_URL` and `AQUIFER_EDB_DATABASE`, falling back to
    /// the defaults for unset variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Like [`EdbConfig::from_env`], with variables resolved by `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            url: lookup(URL_VAR).unwrap_or(defaults.url),
            database: lookup(DATABASE_VAR).unwrap_or(defaults.database),
        }
    }
}

/// Query interface over an electrolyte [`Repository`].
///
/// # Example
///
/// ```
/// use aquifer_edb::{EdbConfig, ElectrolyteDb, Phase};
///
/// let db = ElectrolyteDb::connect(&EdbConfig::new("memory:")).unwrap();
///
/// let components = ["H2O", "Ca[OH]2", "H_+", "OH_-", "Ca_2+"];
/// let reactions = db.get_reactions(components, [Phase::Liq]).unwrap();
/// assert_eq!(reactions.len(), 1);
/// assert_eq!(reactions[0].name, "H2O_Kw");
/// ```
#[derive(Debug)]
pub struct ElectrolyteDb<R = Box<dyn Repository>> {
    repository: R,
}

impl ElectrolyteDb {
    /// Opens the database described by `config`.
    ///
    /// # Errors
    ///
    /// Returns [`EdbError::Connection`] if the URL scheme is unsupported or the
    /// backing data cannot be loaded.
    pub fn connect(config: &EdbConfig) -> Result<Self, EdbError> {
        let connection_error = |reason: String| EdbError::Connection {
            url: config.url.clone(),
            reason,
        };

        let store = if config.url == "memory:" {
            MemoryStore::bootstrap()
        } else if let Some(dir) = config.url.strip_prefix("file://") {
            MemoryStore::from_dir(Path::new(dir).join(&config.database))
        } else {
            let scheme = config.url.split_once(':').map_or("", |(scheme, _)| scheme);
            return Err(connection_error(format!(
                "unsupported scheme `{scheme}`, expected `memory:` or `file://`"
            )));
        }
        .map_err(|err| connection_error(err.to_string()))?;

        info!(url = %config.url, database = %config.database, "connected to electrolyte database");
        Ok(Self::new(Box::new(store)))
    }
}

impl<R: Repository> ElectrolyteDb<R> {
    /// Creates a client over an existing repository.
    pub fn new(repository: R) -> Self {
        Self { repository }
    }

    /// Returns the underlying repository.
    #[must_use]
    pub fn repository(&self) -> &R {
        &self.repository
    }

    /// Returns an owned copy of the named base, ready for records to be added.
    ///
    /// # Errors
    ///
    /// Returns [`EdbError::NotFound`] if no base has this name.
    pub fn get_base(&self, name: &str) -> Result<Base, EdbError> {
        debug!(base = name, "looking up base");
        self.repository
            .find_base(name)?
            .ok_or_else(|| EdbError::not_found(RecordKind::Base, name))
    }

    /// Returns the named component.
    ///
    /// # Errors
    ///
    /// Returns [`EdbError::NotFound`] if no component has this name.
    pub fn get_component(&self, name: &str) -> Result<ComponentRecord, EdbError> {
        let names = BTreeSet::from([name.to_owned()]);
        self.repository
            .find_components(&names)?
            .into_iter()
            .next()
            .ok_or_else(|| EdbError::not_found(RecordKind::Component, name))
    }

    /// Returns the components for every resolvable name, in name order.
    ///
    /// Names without a document are skipped; use
    /// [`ElectrolyteDb::get_component`] for a lookup that fails instead.
    ///
    /// # Errors
    ///
    /// Returns an [`EdbError`] if the repository fails.
    pub fn get_components<I, S>(&self, names: I) -> Result<Vec<ComponentRecord>, EdbError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: BTreeSet<String> = names.into_iter().map(Into::into).collect();
        let found = self.repository.find_components(&names)?;

        if found.len() < names.len() {
            let missing: Vec<&str> = names
                .iter()
                .filter(|name| !found.iter().any(|c| &c.name == *name))
                .map(String::as_str)
                .collect();
            debug!(?missing, "skipping unknown components");
        }
        Ok(found)
    }

    /// Returns every reaction whose species are all among `components` and
    /// whose phases are all among `phases`.
    ///
    /// # Errors
    ///
    /// Returns an [`EdbError`] if the repository fails.
    pub fn get_reactions<I, S>(
        &self,
        components: I,
        phases: impl IntoIterator<Item = Phase>,
    ) -> Result<Vec<ReactionRecord>, EdbError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.query_reactions(&ReactionQuery::new(components).phases(phases))
    }

    /// Returns every reaction matching `query`, in name order.
    ///
    /// # Errors
    ///
    /// Returns an [`EdbError`] if the repository fails.
    pub fn query_reactions(&self, query: &ReactionQuery) -> Result<Vec<ReactionRecord>, EdbError> {
        let reactions: Vec<_> = self
            .repository
            .find_reactions(query.components())?
            .into_iter()
            .filter(|reaction| query.matches(reaction))
            .collect();
        debug!(count = reactions.len(), "matched reactions");
        Ok(reactions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use proptest::{prelude::*, sample::subsequence};

    const TUTORIAL_COMPONENTS: [&str; 5] = ["H2O", "Ca[OH]2", "H_+", "OH_-", "Ca_2+"];

    fn db() -> ElectrolyteDb<MemoryStore> {
        ElectrolyteDb::new(MemoryStore::bootstrap().unwrap())
    }

    fn names(reactions: &[ReactionRecord]) -> Vec<&str> {
        reactions.iter().map(|r| r.name.as_str()).collect()
    }

    #[test]
    fn unknown_base_is_not_found() {
        let err = db().get_base("thermo_Plasma").unwrap_err();
        assert!(matches!(
            err,
            EdbError::NotFound {
                kind: RecordKind::Base,
                ref name
            } if name == "thermo_Plasma"
        ));
    }

    #[test]
    fn component_lookups() {
        let db = db();
        assert_eq!(db.get_component("OH_-").unwrap().charge(), Some(-1));
        assert!(db.get_component("unobtainium").is_err());

        let found = db.get_components(["Na_+", "unobtainium", "Cl_-"]).unwrap();
        let found: Vec<_> = found.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(found, ["Cl_-", "Na_+"]);
    }

    #[test]
    fn tutorial_reactions_by_phase() {
        let db = db();

        let liq_sol = db
            .get_reactions(TUTORIAL_COMPONENTS, [Phase::Liq, Phase::Sol])
            .unwrap();
        assert_eq!(names(&liq_sol), ["CaOH2_Ksp", "H2O_Kw"]);

        let liq = db.get_reactions(TUTORIAL_COMPONENTS, [Phase::Liq]).unwrap();
        assert_eq!(names(&liq), ["H2O_Kw"]);
    }

    #[test]
    fn carbonate_system_reactions() {
        let db = db();
        let components = ["H2O", "H_+", "OH_-", "CO2", "H2CO3", "HCO3_-", "CO3_2-"];

        let all = db.get_reactions(components, Phase::ALL).unwrap();
        assert_eq!(
            names(&all),
            ["CO2_to_H2CO3", "H2CO3_Ka1", "H2CO3_Ka2", "H2O_Kw"]
        );

        let query = ReactionQuery::new(components).names(["H2CO3_Ka1", "CaOH2_Ksp"]);
        assert_eq!(names(&db.query_reactions(&query).unwrap()), ["H2CO3_Ka1"]);
    }

    #[test]
    fn any_components_keeps_partial_matches() {
        let query = ReactionQuery::new(["Ca_2+"]).any_components(true);
        let reactions = db().query_reactions(&query).unwrap();
        assert_eq!(names(&reactions), ["CaOH2_Ksp"]);
    }

    #[test]
    fn merged_tutorial_base_serializes() {
        let db = db();
        let mut base = db.get_base("thermo_Liq_Sol_FpcTP").unwrap();
        base.add_all(db.get_components(TUTORIAL_COMPONENTS).unwrap())
            .unwrap();

        let mut reaction_base = db.get_base("reaction").unwrap();
        reaction_base
            .add_all(
                db.get_reactions(TUTORIAL_COMPONENTS, [Phase::Liq, Phase::Sol])
                    .unwrap(),
            )
            .unwrap();

        let thermo = base.thermo().unwrap();
        assert_eq!(thermo.components.len(), 5);
        assert!(thermo.components["Ca[OH]2"].phase_equilibrium_form.is_empty());

        let json = serde_json::to_value(&reaction_base).unwrap();
        assert_eq!(
            json["config"]["equilibrium_reactions"]["CaOH2_Ksp"]["equilibrium_form"],
            "log_solubility_product"
        );
    }

    #[test]
    fn connect_by_scheme() {
        let db = ElectrolyteDb::connect(&EdbConfig::new("memory:")).unwrap();
        assert!(db.get_base("reaction").is_ok());

        let err = ElectrolyteDb::connect(&EdbConfig::default()).unwrap_err();
        assert!(matches!(err, EdbError::Connection { ref url, .. } if url == DEFAULT_URL));
    }

    #[test]
    fn connect_to_directory() {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join("testdb");
        std::fs::create_dir(&dir).unwrap();
        std::fs::write(dir.join("component.yaml"), "- name: H2O\n").unwrap();

        let url = format!("file://{}", root.path().display());
        let db = ElectrolyteDb::connect(&EdbConfig::new(url).with_database("testdb")).unwrap();
        assert!(db.get_component("H2O").is_ok());

        let missing = EdbConfig::new(format!("file://{}", root.path().display()));
        assert!(matches!(
            ElectrolyteDb::connect(&missing),
            Err(EdbError::Connection { .. })
        ));
    }

    #[test]
    fn config_from_lookup() {
        let config = EdbConfig::from_lookup(|key| {
            (key == "AQUIFER_EDB_DATABASE").then(|| "scratch".to_owned())
        });
        assert_eq!(config.url, DEFAULT_URL);
        assert_eq!(config.database, "scratch");
    }

    fn all_components() -> Vec<String> {
        MemoryStore::bootstrap()
            .unwrap()
            .component_names()
            .map(str::to_owned)
            .collect()
    }

    proptest! {
        #[test]
        fn reactions_stay_within_components_and_phases(
            components in subsequence(all_components(), 0..=11),
            phases in subsequence(Phase::ALL.to_vec(), 0..=3),
        ) {
            let reactions = db().get_reactions(components.clone(), phases.clone()).unwrap();
            for reaction in &reactions {
                prop_assert!(reaction.phases().iter().all(|p| phases.contains(p)));
                prop_assert!(reaction.species().iter().all(|s| components.iter().any(|c| c == s)));
            }
        }

        #[test]
        fn narrowing_phases_never_grows_result(
            components in subsequence(all_components(), 0..=11),
        ) {
            let db = db();
            let wide = db.get_reactions(components.clone(), [Phase::Liq, Phase::Sol]).unwrap();
            let narrow = db.get_reactions(components, [Phase::Liq]).unwrap();
            prop_assert!(narrow.len() <= wide.len());
            prop_assert!(narrow.iter().all(|r| wide.contains(r)));
        }
    }
}
