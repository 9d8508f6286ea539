//! Particle swarm optimization over a box in `R^D`.
//!
//! Each iteration is two phases: a sequential phase that draws the random
//! coefficients and moves every particle, then an evaluation phase that may
//! score all particles concurrently. Only the first phase touches the RNG, so
//! a seeded run is reproducible whether or not evaluation is parallel.
//!
//! Positions leaving the box are clamped onto the violated bound and the
//! velocity component along that axis is zeroed.

use crate::config::SwarmConfig;
use crate::constraint::{all_satisfied, Constraint};
use crate::error::{KeyswarmError, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Function minimized by the swarm.
pub trait Objective: Sync {
    fn evaluate(&self, position: &[f64]) -> f64;
}

impl<F> Objective for F
where
    F: Fn(&[f64]) -> f64 + Sync,
{
    fn evaluate(&self, position: &[f64]) -> f64 {
        self(position)
    }
}

/// Per-coordinate search box.
#[derive(Debug, Clone, PartialEq)]
pub struct Bounds {
    lower: Vec<f64>,
    upper: Vec<f64>,
}

impl Bounds {
    pub fn new(lower: Vec<f64>, upper: Vec<f64>) -> Result<Self> {
        if lower.is_empty() || lower.len() != upper.len() {
            return Err(KeyswarmError::InvalidConfig(format!(
                "bounds must be non-empty and of equal length (lower {}, upper {})",
                lower.len(),
                upper.len()
            )));
        }
        for (i, (lo, hi)) in lower.iter().zip(&upper).enumerate() {
            if !lo.is_finite() || !hi.is_finite() || lo > hi {
                return Err(KeyswarmError::InvalidConfig(format!(
                    "bad bounds at coordinate {i}: [{lo}, {hi}]"
                )));
            }
        }
        Ok(Self { lower, upper })
    }

    /// The same `[lower, upper]` on every coordinate.
    pub fn uniform(dimension: usize, lower: f64, upper: f64) -> Result<Self> {
        Self::new(vec![lower; dimension], vec![upper; dimension])
    }

    pub fn dimension(&self) -> usize { self.lower.len() }

    pub fn lower(&self) -> &[f64] { &self.lower }

    pub fn upper(&self) -> &[f64] { &self.upper }

    fn span(&self, i: usize) -> f64 { self.upper[i] - self.lower[i] }

    fn clamp(&self, position: &mut [f64], velocity: &mut [f64]) {
        for i in 0..position.len() {
            if position[i] < self.lower[i] {
                position[i] = self.lower[i];
                velocity[i] = 0.0;
            } else if position[i] > self.upper[i] {
                position[i] = self.upper[i];
                velocity[i] = 0.0;
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct Particle {
    pub position: Vec<f64>,
    pub velocity: Vec<f64>,
    /// Constrained fitness of `position`; `+inf` when infeasible.
    pub fitness: f64,
    pub best_position: Vec<f64>,
    pub best_fitness: f64,
    /// Whether `position` satisfied every constraint at its last evaluation.
    pub feasible: bool,
}

impl Particle {
    /// Adopt the current position as personal best on strict improvement.
    /// `best_fitness` therefore never increases.
    pub fn remember_if_better(&mut self) -> bool {
        if self.fitness < self.best_fitness {
            self.best_fitness = self.fitness;
            self.best_position.clone_from(&self.position);
            true
        } else {
            false
        }
    }
}

/// Why a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StopReason {
    MaxIterations,
    /// Global-best improvement fell to `tolerance` or below.
    FunctionTolerance,
    /// Global-best position moved by `min_step` or less.
    StepTolerance,
    /// `patience` iterations passed without improvement.
    Stagnation,
    Cancelled,
    Deadline,
}

#[derive(Debug, Clone)]
pub struct SwarmOutcome {
    pub best_position: Vec<f64>,
    /// `+inf` when no feasible particle was found.
    pub best_fitness: f64,
    pub feasible: bool,
    /// Some particle satisfied every constraint, even if its objective was
    /// never finite (for keywords: it decoded to the empty set).
    pub constraint_satisfied: bool,
    /// Iterations completed after initialization.
    pub iterations: usize,
    pub stop_reason: StopReason,
    /// Global-best fitness after initialization (index 0) and after each
    /// completed iteration.
    pub history: Vec<f64>,
}

/// Shared cancellation handle, checked once per iteration boundary.
#[derive(Debug, Clone, Default)]
pub struct StopFlag(Arc<AtomicBool>);

impl StopFlag {
    pub fn new() -> Self { Self::default() }

    pub fn stop(&self) { self.0.store(true, Ordering::SeqCst) }

    pub fn is_stopped(&self) -> bool { self.0.load(Ordering::SeqCst) }
}

struct GlobalBest {
    position: Vec<f64>,
    fitness: f64,
}

pub struct Swarm {
    config: SwarmConfig,
    bounds: Bounds,
    stop: StopFlag,
}

impl Swarm {
    pub fn new(config: SwarmConfig, bounds: Bounds) -> Result<Self> {
        config.validate()?;
        if bounds.dimension() != config.dimension {
            return Err(KeyswarmError::InvalidConfig(format!(
                "bounds have {} coordinates but dimension is {}",
                bounds.dimension(),
                config.dimension
            )));
        }
        Ok(Self { config, bounds, stop: StopFlag::new() })
    }

    pub fn with_stop_flag(mut self, stop: StopFlag) -> Self {
        self.stop = stop;
        self
    }

    pub fn stop_flag(&self) -> StopFlag { self.stop.clone() }

    pub fn config(&self) -> &SwarmConfig { &self.config }

    pub fn bounds(&self) -> &Bounds { &self.bounds }

    /// Minimize `objective` subject to `constraints`.
    pub fn optimize<O: Objective>(&self, objective: &O, constraints: &[&dyn Constraint]) -> SwarmOutcome {
        let cfg = &self.config;
        let started = Instant::now();
        // a deadline past what Instant can represent is no deadline
        let deadline = cfg.max_duration().and_then(|d| started.checked_add(d));
        let mut rng = match cfg.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let mut particles = self.spawn(&mut rng);
        self.evaluate(&mut particles, objective, constraints);
        for p in particles.iter_mut() {
            p.best_fitness = p.fitness;
        }
        let mut constraint_satisfied = particles.iter().any(|p| p.feasible);

        let mut global = best_of(&particles);
        match &global {
            Some(g) => tracing::debug!(fitness = g.fitness, "initial global best"),
            None => tracing::warn!("no feasible particle after initialization; continuing search"),
        }
        let mut history = vec![global.as_ref().map_or(f64::INFINITY, |g| g.fitness)];
        let mut last_improvement = 0;
        let mut completed = 0;
        let mut stop_reason = StopReason::MaxIterations;

        for iteration in 1..=cfg.iterations {
            if self.stop.is_stopped() {
                stop_reason = StopReason::Cancelled;
                break;
            }
            if deadline.is_some_and(|d| Instant::now() >= d) {
                stop_reason = StopReason::Deadline;
                break;
            }

            self.advance(&mut particles, global.as_ref(), &mut rng);
            self.evaluate(&mut particles, objective, constraints);

            constraint_satisfied |= particles.iter().any(|p| p.feasible);
            for p in particles.iter_mut() {
                p.remember_if_better();
            }

            let mut converged = None;
            if let Some(candidate) = best_of(&particles) {
                if global.as_ref().map_or(true, |g| candidate.fitness < g.fitness) {
                    if let Some(g) = &global {
                        if g.fitness - candidate.fitness <= cfg.tolerance {
                            converged = Some(StopReason::FunctionTolerance);
                        } else if distance(&g.position, &candidate.position) <= cfg.min_step {
                            converged = Some(StopReason::StepTolerance);
                        }
                    }
                    global = Some(candidate);
                    last_improvement = iteration;
                }
            }

            completed = iteration;
            let best = global.as_ref().map_or(f64::INFINITY, |g| g.fitness);
            history.push(best);
            tracing::debug!(iteration, best, "iteration complete");

            if let Some(reason) = converged {
                stop_reason = reason;
                break;
            }
            if cfg.patience().is_some_and(|n| iteration - last_improvement >= n) {
                stop_reason = StopReason::Stagnation;
                break;
            }
        }

        let outcome = match global {
            Some(g) => SwarmOutcome {
                best_position: g.position,
                best_fitness: g.fitness,
                feasible: true,
                constraint_satisfied,
                iterations: completed,
                stop_reason,
                history,
            },
            None => {
                tracing::warn!(
                    iterations = completed,
                    constraint_satisfied,
                    "search ended without a feasible particle"
                );
                SwarmOutcome {
                    best_position: self.bounds.lower.clone(),
                    best_fitness: f64::INFINITY,
                    feasible: false,
                    constraint_satisfied,
                    iterations: completed,
                    stop_reason,
                    history,
                }
            }
        };
        tracing::info!(
            iterations = outcome.iterations,
            fitness = outcome.best_fitness,
            reason = ?outcome.stop_reason,
            elapsed_s = started.elapsed().as_secs_f64(),
            "swarm finished"
        );
        outcome
    }

    fn spawn(&self, rng: &mut StdRng) -> Vec<Particle> {
        let dim = self.bounds.dimension();
        (0..self.config.swarm_size)
            .map(|_| {
                let position: Vec<f64> = (0..dim)
                    .map(|i| self.bounds.lower[i] + rng.gen::<f64>() * self.bounds.span(i))
                    .collect();
                let velocity: Vec<f64> = (0..dim)
                    .map(|i| {
                        let reach = self.config.velocity_fraction * self.bounds.span(i);
                        -reach + 2.0 * reach * rng.gen::<f64>()
                    })
                    .collect();
                Particle {
                    best_position: position.clone(),
                    position,
                    velocity,
                    fitness: f64::INFINITY,
                    best_fitness: f64::INFINITY,
                    feasible: false,
                }
            })
            .collect()
    }

    fn advance(&self, particles: &mut [Particle], global: Option<&GlobalBest>, rng: &mut StdRng) {
        let cfg = &self.config;
        for p in particles.iter_mut() {
            for i in 0..p.position.len() {
                let rp: f64 = rng.gen();
                let rg: f64 = rng.gen();
                let x = p.position[i];
                let cognitive = cfg.c1 * rp * (p.best_position[i] - x);
                let social = global.map_or(0.0, |g| cfg.c2 * rg * (g.position[i] - x));
                p.velocity[i] = cfg.omega * p.velocity[i] + cognitive + social;
                p.position[i] = x + p.velocity[i];
            }
            self.bounds.clamp(&mut p.position, &mut p.velocity);
        }
    }

    fn evaluate<O: Objective>(&self, particles: &mut [Particle], objective: &O, constraints: &[&dyn Constraint]) {
        let score = |p: &mut Particle| {
            p.feasible = all_satisfied(constraints, &p.position);
            p.fitness = if p.feasible { nan_as_inf(objective.evaluate(&p.position)) } else { f64::INFINITY };
        };
        if self.config.parallel {
            particles.par_iter_mut().for_each(score);
        } else {
            particles.iter_mut().for_each(score);
        }
    }
}

/// NaN objective values rank as infeasible.
fn nan_as_inf(f: f64) -> f64 {
    if f.is_nan() { f64::INFINITY } else { f }
}

/// Lowest finite personal best; the first one wins ties.
fn best_of(particles: &[Particle]) -> Option<GlobalBest> {
    let mut best: Option<&Particle> = None;
    for p in particles {
        if p.best_fitness.is_finite() && best.map_or(true, |b| p.best_fitness < b.best_fitness) {
            best = Some(p);
        }
    }
    best.map(|p| GlobalBest { position: p.best_position.clone(), fitness: p.best_fitness })
}

fn distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum::<f64>().sqrt()
}
