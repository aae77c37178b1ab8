use serde::{Deserialize, Serialize};

/// Prefactor of the Debye-Hückel `A` constant, in K^1.5·(kg/mol)^0.5.
const DEBYE_HUCKEL_PREFACTOR: f64 = 1.82e6;

/// How solute activity coefficients are estimated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityCoefficientModel {
    /// Every activity coefficient is one.
    #[default]
    Ideal,

    /// The Davies equation,
    /// `log10 γ = −A·z²·(√I / (1 + √I) − 0.3·I)`.
    ///
    /// Reasonable up to an ionic strength of about 0.5 mol/kg.
    Davies,
}

impl ActivityCoefficientModel {
    /// Returns the activity coefficient of a solute with charge `charge`.
    ///
    /// `ionic_strength` is in mol/kg and `a` is the Debye-Hückel constant.
    pub(crate) fn coefficient(self, charge: i32, ionic_strength: f64, a: f64) -> f64 {
        match self {
            Self::Ideal => 1.0,
            Self::Davies => {
                let sqrt_i = ionic_strength.sqrt();
                let z2 = f64::from(charge * charge);
                10f64.powf(-a * z2 * (sqrt_i / (1.0 + sqrt_i) - 0.3 * ionic_strength))
            }
        }
    }
}

/// Debye-Hückel `A` constant for a solvent with the given dielectric constant.
pub(crate) fn debye_huckel_a(dielectric_constant: f64, temperature_k: f64) -> f64 {
    DEBYE_HUCKEL_PREFACTOR * (dielectric_constant * temperature_k).powf(-1.5)
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    #[test]
    fn water_at_room_temperature() {
        assert_relative_eq!(debye_huckel_a(78.54, 298.15), 0.5079, max_relative = 1e-3);
    }

    #[test]
    fn ideal_is_unity() {
        assert_eq!(ActivityCoefficientModel::Ideal.coefficient(2, 0.7, 0.51), 1.0);
    }

    #[test]
    fn davies_depends_on_charge_squared() {
        let a = debye_huckel_a(78.54, 298.15);
        let davies = ActivityCoefficientModel::Davies;

        let monovalent = davies.coefficient(1, 0.1, a);
        assert_relative_eq!(monovalent, 0.78201, max_relative = 1e-4);
        assert_relative_eq!(davies.coefficient(-1, 0.1, a), monovalent);
        assert_relative_eq!(
            davies.coefficient(2, 0.1, a),
            monovalent.powi(4),
            max_relative = 1e-12
        );
        assert_eq!(davies.coefficient(0, 0.1, a), 1.0);
    }

    #[test]
    fn deserializes_lowercase_names() {
        let model: ActivityCoefficientModel = serde_yaml::from_str("davies").unwrap();
        assert_eq!(model, ActivityCoefficientModel::Davies);
    }
}
