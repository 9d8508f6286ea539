use std::collections::HashMap;

/// Inequality constraint on a particle position. A position is feasible for
/// this constraint when `margin >= 0`.
pub trait Constraint: Sync {
    fn margin(&self, position: &[f64]) -> f64;

    fn is_satisfied(&self, position: &[f64]) -> bool {
        self.margin(position) >= 0.0
    }
}

impl<F> Constraint for F
where
    F: Fn(&[f64]) -> f64 + Sync,
{
    fn margin(&self, position: &[f64]) -> f64 {
        self(position)
    }
}

/// Keeps a particle's keyword slots on distinct indices.
#[derive(Debug, Clone, Copy, Default)]
pub struct UniquenessConstraint;

impl Constraint for UniquenessConstraint {
    fn margin(&self, position: &[f64]) -> f64 {
        feasibility_margin(position)
    }
}

/// `Σ (1 - count)` over the distinct rounded coordinates: `0` when every
/// coordinate rounds to a different integer, `-(k - 1)` when one value shows
/// up `k` times.
pub fn feasibility_margin(position: &[f64]) -> f64 {
    let mut counts: HashMap<i64, usize> = HashMap::new();
    for &x in position {
        *counts.entry(x.round() as i64).or_insert(0) += 1;
    }
    counts.values().map(|&c| 1.0 - c as f64).sum()
}

/// True when every constraint is satisfied.
pub fn all_satisfied(constraints: &[&dyn Constraint], position: &[f64]) -> bool {
    constraints.iter().all(|c| c.is_satisfied(position))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distinct_coordinates_are_feasible() {
        assert_eq!(feasibility_margin(&[0.1, 1.2, 2.6, 5.4]), 0.0);
        assert!(UniquenessConstraint.is_satisfied(&[3.0, 4.0]));
    }

    #[test]
    fn single_repeat_costs_k_minus_one() {
        assert_eq!(feasibility_margin(&[2.2, 1.8, 2.4, 7.0]), -2.0);
        assert_eq!(feasibility_margin(&[4.0, 4.1]), -1.0);
        assert!(!UniquenessConstraint.is_satisfied(&[4.0, 4.1]));
    }

    #[test]
    fn repeated_sentinel_counts_too() {
        assert_eq!(feasibility_margin(&[0.0, 0.3, 0.2]), -2.0);
    }

    #[test]
    fn closures_are_constraints() {
        let below_five = |x: &[f64]| 5.0 - x.iter().sum::<f64>();
        let cs: [&dyn Constraint; 2] = [&UniquenessConstraint, &below_five];
        assert!(all_satisfied(&cs, &[1.0, 2.0]));
        assert!(!all_satisfied(&cs, &[3.0, 4.0]));
    }
}
