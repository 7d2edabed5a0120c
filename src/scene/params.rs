use {
    lazy_static::lazy_static,
    crate::{
        make_error,
        r#type::{
            Coord,
            Factor,
            Vector,
        },
        Result,
    },
};

lazy_static! {
    pub static ref DEFAULT_STEP: chrono::Duration = chrono::Duration::milliseconds(20);
    pub static ref DEFAULT_DURATION: chrono::Duration = chrono::Duration::seconds(4);
}

const DEFAULT_INTERSECTION_LIMIT: usize = 16;

/// Force-model and integration parameters of one computation.
///
/// The normalization factors are computed by the calling collaborator,
/// since they depend on population counts the engine does not own, and are
/// injected here per request (see [`same_group_normalization`] and
/// [`attractor_normalization`]).
#[derive(Debug, Clone)]
pub struct SimulationParameters {
    pub gravity: Vector,
    pub gravity_constant: Coord,
    pub same_group_factor: Factor,
    pub attractor_factor: Factor,
    pub same_group_force_limit: Coord,
    pub attractor_force_limit: Coord,
    pub intersection_limit: usize,
    pub step: chrono::Duration,
    pub duration: chrono::Duration,
}

impl SimulationParameters {
    /// Number of integration steps for (duration, step); each track holds
    /// one more sample than this: the initial location at t = 0.
    pub fn step_count(&self) -> usize {
        let step_ms = self.step.num_milliseconds();
        let duration_ms = self.duration.num_milliseconds();

        if step_ms <= 0 || duration_ms <= 0 {
            return 0;
        }

        ((duration_ms + step_ms - 1) / step_ms) as usize
    }

    pub fn validate(&self) -> Result<()> {
        if self.step <= chrono::Duration::zero() {
            return Err(make_error![Error::Physics::InvalidStep(
                "integration step must be positive".into()
            )]);
        }

        let scalars = [
            self.gravity_constant,
            self.same_group_factor,
            self.attractor_factor,
            self.same_group_force_limit,
            self.attractor_force_limit,
        ];

        if !scalars.iter().all(|value| value.is_finite())
            || !self.gravity.iter().all(|value| value.is_finite())
        {
            return Err(make_error![Error::Physics::InvalidStep(
                "parameters must be finite".into()
            )]);
        }

        if self.same_group_force_limit < 0.0 || self.attractor_force_limit < 0.0 {
            return Err(make_error![Error::Physics::InvalidStep(
                "force limits must not be negative".into()
            )]);
        }

        Ok(())
    }
}

impl Default for SimulationParameters {
    fn default() -> Self {
        Self {
            gravity: Vector::new(0.0, -9.8, 0.0),
            gravity_constant: 1.0,
            same_group_factor: 1.0,
            attractor_factor: 1.0,
            same_group_force_limit: 100.0,
            attractor_force_limit: 100.0,
            intersection_limit: DEFAULT_INTERSECTION_LIMIT,
            step: *DEFAULT_STEP,
            duration: *DEFAULT_DURATION,
        }
    }
}

/// Same-group normalization: spreads a configured base force over the
/// groups currently present so the per-pair magnitude stays
/// population-independent. The curve is tunable policy; callers may supply
/// any factor they prefer.
pub fn same_group_normalization(
    base_force: Coord,
    active_groups: usize,
    configured_kinds: usize,
) -> Factor {
    if active_groups == 0 || configured_kinds == 0 {
        return 0.0;
    }

    base_force / (active_groups * configured_kinds) as Factor
}

/// Attractor normalization: spreads a configured base force over the
/// active body population.
pub fn attractor_normalization(base_force: Coord, body_count: usize) -> Factor {
    if body_count == 0 {
        return 0.0;
    }

    base_force / body_count as Factor
}
