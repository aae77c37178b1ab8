/// A deterministic mapping from a typed input to a typed output.
///
/// Zero-order unit models implement `Model` with an inlet stream as input and
/// their outlet streams and utility demands as output.
///
/// # Example
///
/// ```
/// use std::convert::Infallible;
/// use aquifer_core::Model;
///
/// struct Dilute(f64);
///
/// impl Model for Dilute {
///     type Input = f64;
///     type Output = f64;
///     type Error = Infallible;
///
///     fn call(&self, input: &f64) -> Result<f64, Infallible> {
///         Ok(input / self.0)
///     }
/// }
///
/// assert_eq!(Dilute(4.0).call(&10.0), Ok(2.5));
/// ```
pub trait Model {
    type Input;
    type Output;
    type Error: std::error::Error + Send + Sync + 'static;

    /// Calls the model with the given input.
    ///
    /// # Errors
    ///
    /// Each model defines what constitutes a failure within its domain.
    fn call(&self, input: &Self::Input) -> Result<Self::Output, Self::Error>;
}
