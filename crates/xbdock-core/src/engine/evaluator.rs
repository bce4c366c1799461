use crate::core::models::model::Model;

/// Scores a ligand pose against the receptor.
///
/// `cap` bounds each atom's positive interaction energy through the curl
/// transform; pass `f64::MAX` to leave energies untouched.
pub trait Evaluator {
    /// Total intermolecular energy of the current pose.
    fn eval(&self, model: &Model, cap: f64) -> f64;

    /// Like [`eval`](Self::eval), also overwriting every ligand atom's
    /// minus-force slot with its energy gradient.
    fn eval_deriv(&self, model: &mut Model, cap: f64) -> f64;
}
