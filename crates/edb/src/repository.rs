use std::{collections::BTreeSet, fmt};

use crate::{Base, ComponentRecord, EdbError, ReactionRecord};

/// Storage behind an [`ElectrolyteDb`](crate::ElectrolyteDb).
///
/// Implementations only look documents up; filtering reactions by phase and
/// component subsets is done by the client so every backend agrees on it.
pub trait Repository {
    /// Returns the base with the given name, if present.
    ///
    /// # Errors
    ///
    /// Returns an [`EdbError`] if the backend fails.
    fn find_base(&self, name: &str) -> Result<Option<Base>, EdbError>;

    /// Returns the components whose names are in `names`, in name order.
    ///
    /// Names without a document are omitted.
    ///
    /// # Errors
    ///
    /// Returns an [`EdbError`] if the backend fails.
    fn find_components(&self, names: &BTreeSet<String>) -> Result<Vec<ComponentRecord>, EdbError>;

    /// Returns every reaction involving at least one of `components`, in
    /// name order.
    ///
    /// # Errors
    ///
    /// Returns an [`EdbError`] if the backend fails.
    fn find_reactions(
        &self,
        components: &BTreeSet<String>,
    ) -> Result<Vec<ReactionRecord>, EdbError>;
}

impl fmt::Debug for dyn Repository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("dyn Repository")
    }
}

impl<R: Repository + ?Sized> Repository for Box<R> {
    fn find_base(&self, name: &str) -> Result<Option<Base>, EdbError> {
        (**self).find_base(name)
    }

    fn find_components(&self, names: &BTreeSet<String>) -> Result<Vec<ComponentRecord>, EdbError> {
        (**self).find_components(names)
    }

    fn find_reactions(
        &self,
        components: &BTreeSet<String>,
    ) -> Result<Vec<ReactionRecord>, EdbError> {
        (**self).find_reactions(components)
    }
}

impl<R: Repository + ?Sized> Repository for &R {
    fn find_base(&self, name: &str) -> Result<Option<Base>, EdbError> {
        (**self).find_base(name)
    }

    fn find_components(&self, names: &BTreeSet<String>) -> Result<Vec<ComponentRecord>, EdbError> {
        (**self).find_components(names)
    }

    fn find_reactions(
        &self,
        components: &BTreeSet<String>,
    ) -> Result<Vec<ReactionRecord>, EdbError> {
        (**self).find_reactions(components)
    }
}
