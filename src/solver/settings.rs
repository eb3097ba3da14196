use crate::algebra::*;
use derive_builder::Builder;
use thiserror::Error;

#[cfg(feature = "serde")]
use serde::{de::DeserializeOwned, Deserialize, Serialize};

/// Error type returned by settings validation.
#[derive(Error, Debug)]
pub enum SettingsError {
    /// An error attributable to one of the fields
    #[error("Bad value for field '{0}'")]
    BadFieldValue(&'static str),
}

/// Solver configuration, fixed for the lifetime of a
/// [`SparseSolver`](crate::solver::SparseSolver).
///
/// Example:
/// ```
/// use spsolve::solver::SolverSettingsBuilder;
///
/// let settings = SolverSettingsBuilder::<f64>::default()
///     .max_threads(1)
///     .dynamic_regularization_enable(true)
///     .build()
///     .unwrap();
/// ```
#[derive(Builder, Debug, Clone)]
#[builder(build_fn(validate = "Self::validate"))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(bound = "T: Serialize + DeserializeOwned"))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SolverSettings<T: FloatT> {
    ///maximum factorization threads
    ///choosing 0 lets the backend choose for itself
    #[builder(default = "0")]
    pub max_threads: u32,

    ///use a fill reducing ordering for symmetric factorizations
    #[builder(default = "true")]
    pub fill_reducing_ordering: bool,

    ///enable dynamic regularization of near-zero pivots in
    ///symmetric factorizations
    #[builder(default = "false")]
    pub dynamic_regularization_enable: bool,

    ///dynamic regularization pivot tolerance
    #[builder(default = "(1e-13).as_T()")]
    pub dynamic_regularization_eps: T,

    ///dynamic regularization pivot replacement
    #[builder(default = "(2e-7).as_T()")]
    pub dynamic_regularization_delta: T,

    ///explicitly drop structural zeros from sparse data inputs
    #[builder(default = "false")]
    pub input_sparse_dropzeros: bool,
}

impl<T> Default for SolverSettings<T>
where
    T: FloatT,
{
    fn default() -> SolverSettings<T> {
        SolverSettingsBuilder::<T>::default().build().unwrap()
    }
}

impl<T> SolverSettings<T>
where
    T: FloatT,
{
    /// Checks that the settings are valid.  This only ensures that
    /// numerical fields are in their admissible ranges.
    pub fn validate(&self) -> Result<(), SettingsError> {
        validate_regularization_term(self.dynamic_regularization_eps, "dynamic_regularization_eps")?;
        validate_regularization_term(
            self.dynamic_regularization_delta,
            "dynamic_regularization_delta",
        )?;
        Ok(())
    }
}

// pre build checker (for auto-validation when using the builder)

impl From<SettingsError> for SolverSettingsBuilderError {
    fn from(e: SettingsError) -> Self {
        SolverSettingsBuilderError::ValidationError(e.to_string())
    }
}

/// Automatic pre-build settings validation
impl<T> SolverSettingsBuilder<T>
where
    T: FloatT,
{
    /// check that regularization terms are in range
    pub fn validate(&self) -> Result<(), SettingsError> {
        if let Some(eps) = self.dynamic_regularization_eps {
            validate_regularization_term(eps, "dynamic_regularization_eps")?;
        }
        if let Some(delta) = self.dynamic_regularization_delta {
            validate_regularization_term(delta, "dynamic_regularization_delta")?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------
// individual validation functions go here
// ---------------------------------------------------------

fn validate_regularization_term<T: FloatT>(
    value: T,
    field: &'static str,
) -> Result<(), SettingsError> {
    if value < T::zero() {
        return Err(SettingsError::BadFieldValue(field));
    }
    Ok(())
}

#[test]
fn test_settings_validate() {
    // all standard settings
    SolverSettingsBuilder::<f64>::default().build().unwrap();

    // fail on negative regularization terms
    assert!(SolverSettingsBuilder::<f64>::default()
        .dynamic_regularization_eps(-1e-13)
        .build()
        .is_err());
    assert!(SolverSettingsBuilder::<f64>::default()
        .dynamic_regularization_delta(-2e-7)
        .build()
        .is_err());

    // directly construct bad settings and manually check
    let settings = SolverSettings::<f64> {
        dynamic_regularization_eps: -1.0,
        ..SolverSettings::default()
    };
    assert!(settings.validate().is_err());

    // defaults match the documented values
    let settings = SolverSettings::<f64>::default();
    assert_eq!(settings.max_threads, 0);
    assert!(settings.fill_reducing_ordering);
    assert!(!settings.dynamic_regularization_enable);
    assert!(!settings.input_sparse_dropzeros);
}
