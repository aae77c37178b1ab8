use std::{
    collections::{BTreeMap, BTreeSet},
    fs,
    path::Path,
};

use serde::de::DeserializeOwned;
use tracing::{debug, info};

use crate::{Base, ComponentRecord, EdbError, ReactionRecord, Repository};

const BOOTSTRAP_BASES: &str = include_str!("../data/base.yaml");
const BOOTSTRAP_COMPONENTS: &str = include_str!("../data/component.yaml");
const BOOTSTRAP_REACTIONS: &str = include_str!("../data/reaction.yaml");

/// File extensions tried, in order, for each collection in a directory.
const EXTENSIONS: [&str; 3] = ["yaml", "yml", "json"];

/// An in-memory [`Repository`].
///
/// Documents are validated on insert. Inserting a document whose name is
/// already present replaces it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemoryStore {
    bases: BTreeMap<String, Base>,
    components: BTreeMap<String, ComponentRecord>,
    reactions: BTreeMap<String, ReactionRecord>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store seeded with the bundled dataset.
    ///
    /// The dataset holds the `thermo_Liq_Vap_FpcTP`, `thermo_Liq_Sol_FpcTP`
    /// and `reaction` bases, water and calcium/carbonate/sodium chloride
    /// species, and their dissociation and solubility reactions.
    ///
    /// # Errors
    ///
    /// Returns an [`EdbError`] if the bundled documents fail to parse or validate.
    pub fn bootstrap() -> Result<Self, EdbError> {
        let mut store = Self::new();
        store.extend_from_str(BOOTSTRAP_BASES, BOOTSTRAP_COMPONENTS, BOOTSTRAP_REACTIONS)?;
        info!(
            bases = store.bases.len(),
            components = store.components.len(),
            reactions = store.reactions.len(),
            "loaded bootstrap electrolyte data"
        );
        Ok(store)
    }

    /// Loads a store from a directory holding `base`, `component` and
    /// `reaction` collections.
    ///
    /// Each collection is a YAML or JSON list of documents in a file named
    /// after it (`component.yaml`, `reaction.json`, ...). A missing
    /// collection file is treated as empty.
    ///
    /// # Errors
    ///
    /// Returns [`EdbError::Io`] if the directory or a file cannot be read,
    /// [`EdbError::Parse`] if a file is malformed, or
    /// [`EdbError::InvalidRecord`] if a document fails validation.
    pub fn from_dir(dir: impl AsRef<Path>) -> Result<Self, EdbError> {
        let dir = dir.as_ref();
        fs::metadata(dir).map_err(|source| EdbError::Io {
            path: dir.to_path_buf(),
            source,
        })?;

        let mut store = Self::new();
        for base in read_collection::<Base>(dir, "base")? {
            store.insert_base(base)?;
        }
        for component in read_collection::<ComponentRecord>(dir, "component")? {
            store.insert_component(component)?;
        }
        for reaction in read_collection::<ReactionRecord>(dir, "reaction")? {
            store.insert_reaction(reaction)?;
        }

        info!(
            path = %dir.display(),
            bases = store.bases.len(),
            components = store.components.len(),
            reactions = store.reactions.len(),
            "loaded electrolyte data"
        );
        Ok(store)
    }

    /// Parses and inserts the three collections from YAML/JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`EdbError::Parse`] or [`EdbError::InvalidRecord`].
    pub fn extend_from_str(
        &mut self,
        bases: &str,
        components: &str,
        reactions: &str,
    ) -> Result<(), EdbError> {
        for base in parse_collection::<Base>(bases, "base")? {
            self.insert_base(base)?;
        }
        for component in parse_collection::<ComponentRecord>(components, "component")? {
            self.insert_component(component)?;
        }
        for reaction in parse_collection::<ReactionRecord>(reactions, "reaction")? {
            self.insert_reaction(reaction)?;
        }
        Ok(())
    }

    /// Validates and inserts a base.
    ///
    /// # Errors
    ///
    /// Returns [`EdbError::InvalidRecord`] if the base fails validation.
    pub fn insert_base(&mut self, base: Base) -> Result<(), EdbError> {
        base.validate()?;
        self.bases.insert(base.name.clone(), base);
        Ok(())
    }

    /// Validates and inserts a component.
    ///
    /// # Errors
    ///
    /// Returns [`EdbError::InvalidRecord`] if the component fails validation.
    pub fn insert_component(&mut self, component: ComponentRecord) -> Result<(), EdbError> {
        component.validate()?;
        self.components.insert(component.name.clone(), component);
        Ok(())
    }

    /// Validates and inserts a reaction.
    ///
    /// # Errors
    ///
    /// Returns [`EdbError::InvalidRecord`] if the reaction fails validation.
    pub fn insert_reaction(&mut self, reaction: ReactionRecord) -> Result<(), EdbError> {
        reaction.validate()?;
        self.reactions.insert(reaction.name.clone(), reaction);
        Ok(())
    }

    /// Returns the names of all stored bases.
    pub fn base_names(&self) -> impl Iterator<Item = &str> {
        self.bases.keys().map(String::as_str)
    }

    /// Returns the names of all stored components.
    pub fn component_names(&self) -> impl Iterator<Item = &str> {
        self.components.keys().map(String::as_str)
    }

    /// Returns the names of all stored reactions.
    pub fn reaction_names(&self) -> impl Iterator<Item = &str> {
        self.reactions.keys().map(String::as_str)
    }
}

impl Repository for MemoryStore {
    fn find_base(&self, name: &str) -> Result<Option<Base>, EdbError> {
        Ok(self.bases.get(name).cloned())
    }

    fn find_components(&self, names: &BTreeSet<String>) -> Result<Vec<ComponentRecord>, EdbError> {
        Ok(names
            .iter()
            .filter_map(|name| self.components.get(name))
            .cloned()
            .collect())
    }

    fn find_reactions(
        &self,
        components: &BTreeSet<String>,
    ) -> Result<Vec<ReactionRecord>, EdbError> {
        Ok(self
            .reactions
            .values()
            .filter(|reaction| components.iter().any(|c| reaction.involves(c)))
            .cloned()
            .collect())
    }
}

fn parse_collection<T: DeserializeOwned>(text: &str, collection: &str) -> Result<Vec<T>, EdbError> {
    serde_yaml::from_str(text).map_err(|source| EdbError::Parse {
        collection: collection.to_owned(),
        source,
    })
}

fn read_collection<T: DeserializeOwned>(dir: &Path, collection: &str) -> Result<Vec<T>, EdbError> {
    let Some(path) = EXTENSIONS
        .iter()
        .map(|ext| dir.join(format!("{collection}.{ext}")))
        .find(|path| path.is_file())
    else {
        debug!(path = %dir.display(), collection, "collection file not found, treating as empty");
        return Ok(Vec::new());
    };

    let text = fs::read_to_string(&path).map_err(|source| EdbError::Io {
        path: path.clone(),
        source,
    })?;
    parse_collection(&text, collection)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(set: &[&str]) -> BTreeSet<String> {
        set.iter().map(|s| (*s).to_owned()).collect()
    }

    #[test]
    fn bootstrap_parses_bundled_data() {
        assert!(MemoryStore::bootstrap().is_ok());
    }

    #[test]
    fn bootstrap_keeps_bracketed_species_names() {
        let store = MemoryStore::bootstrap().unwrap();
        let ksp = &store.reactions["CaOH2_Ksp"];
        assert!(ksp.involves("Ca[OH]2"));
        assert!(!ksp.involves("Ca"));
    }

    #[test]
    fn bootstrap_holds_tutorial_records() {
        let store = MemoryStore::bootstrap().unwrap();

        assert_eq!(
            store.base_names().collect::<Vec<_>>(),
            ["reaction", "thermo_Liq_Sol_FpcTP", "thermo_Liq_Vap_FpcTP"]
        );
        for name in ["H2O", "H_+", "OH_-", "Ca[OH]2", "Ca_2+"] {
            assert!(store.component_names().any(|n| n == name), "{name}");
        }
        for name in ["H2O_Kw", "CaOH2_Ksp"] {
            assert!(store.reaction_names().any(|n| n == name), "{name}");
        }
    }

    #[test]
    fn find_components_skips_unknown_names() {
        let store = MemoryStore::bootstrap().unwrap();
        let found = store
            .find_components(&names(&["H2O", "unobtainium", "OH_-"]))
            .unwrap();
        let found: Vec<_> = found.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(found, ["H2O", "OH_-"]);
    }

    #[test]
    fn find_reactions_returns_candidates_touching_any_component() {
        let store = MemoryStore::bootstrap().unwrap();
        let candidates = store.find_reactions(&names(&["Ca_2+"])).unwrap();
        let candidates: Vec<_> = candidates.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(candidates, ["CaOH2_Ksp"]);
    }

    #[test]
    fn insert_rejects_invalid_documents() {
        let mut store = MemoryStore::new();
        let mut ion = ComponentRecord::new("Cl_-");
        ion.charge = Some(1);
        assert!(store.insert_component(ion).is_err());
        assert_eq!(store.component_names().count(), 0);
    }

    #[test]
    fn loads_collections_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("component.json"),
            r#"[{"name": "H2O"}, {"name": "Na_+"}]"#,
        )
        .unwrap();
        fs::write(
            dir.path().join("reaction.yaml"),
            "
- name: H2O_Kw
  stoichiometry:
    Liq: {H2O: -1, H_+: 1, OH_-: 1}
  parameter_data:
    dh_rxn_ref: {value: 55.83, units: kJ/mol}
    k_eq_ref: {value: 3.28e-18, units: dimensionless}
    T_eq_ref: {value: 298, units: K}
",
        )
        .unwrap();

        let store = MemoryStore::from_dir(dir.path()).unwrap();
        assert_eq!(store.base_names().count(), 0);
        assert_eq!(store.component_names().collect::<Vec<_>>(), ["H2O", "Na_+"]);
        assert_eq!(store.reaction_names().collect::<Vec<_>>(), ["H2O_Kw"]);
    }

    #[test]
    fn malformed_collection_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("base.yaml"), "- name: broken\n  config: 7\n").unwrap();

        let err = MemoryStore::from_dir(dir.path()).unwrap_err();
        assert!(matches!(err, EdbError::Parse { ref collection, .. } if collection == "base"));
    }

    #[test]
    fn missing_directory_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = MemoryStore::from_dir(dir.path().join("nope")).unwrap_err();
        assert!(matches!(err, EdbError::Io { .. }));
    }
}
