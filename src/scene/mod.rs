use {
    std::collections::{
        HashMap,
        HashSet,
    },
    crate::{
        make_error,
        r#type::GroupId,
        Result,
    },
};

mod attractor;
mod body;
mod params;
mod track;

pub use attractor::Attractor;
pub use body::Body;
pub use params::{
    attractor_normalization,
    same_group_normalization,
    SimulationParameters,
    DEFAULT_DURATION,
    DEFAULT_STEP,
};
pub use track::Track;

/// Immutable input of one computation, taken synchronously on the caller's
/// thread. The engine performs no further reads of mutable external state
/// once a snapshot has been handed over.
#[derive(Debug)]
pub struct SceneSnapshot {
    bodies: Vec<Body>,
    attractors: Vec<Attractor>,
    parameters: SimulationParameters,
}

impl SceneSnapshot {
    pub fn new(
        bodies: Vec<Body>,
        attractors: Vec<Attractor>,
        parameters: SimulationParameters,
    ) -> Result<Self> {
        let mut seen_ids = HashSet::with_capacity(bodies.len());

        for body in bodies.iter() {
            if !seen_ids.insert(body.id()) {
                return Err(make_error![Error::Scene::DuplicateBody(body.id())]);
            }

            if body.mass() <= 0.0 {
                return Err(make_error![Error::Scene::NonPositiveMass(body.id())]);
            }

            if body.radius() < 0.0 {
                return Err(make_error![Error::Scene::NegativeRadius(body.id())]);
            }
        }

        Ok(Self {
            bodies,
            attractors,
            parameters,
        })
    }

    pub fn bodies(&self) -> &[Body] {
        &self.bodies
    }

    pub fn attractors(&self) -> &[Attractor] {
        &self.attractors
    }

    pub fn parameters(&self) -> &SimulationParameters {
        &self.parameters
    }

    /// No bodies means no grouping context: such a snapshot resolves to the
    /// empty result without running the integrator.
    pub fn is_degenerate(&self) -> bool {
        self.bodies.is_empty()
    }

    /// Body indices per attraction group. Grouping is the engine's own
    /// responsibility: callers submit bodies in any order.
    pub(crate) fn group_indices(&self) -> HashMap<GroupId, Vec<usize>> {
        let mut groups: HashMap<GroupId, Vec<usize>> = HashMap::new();

        for (index, body) in self.bodies.iter().enumerate() {
            groups.entry(body.group()).or_default().push(index);
        }

        groups
    }
}

/// Number of distinct attraction groups among `bodies`, an input of the
/// caller-side normalization (see [`same_group_normalization`]).
pub fn active_group_count(bodies: &[Body]) -> usize {
    bodies
        .iter()
        .map(Body::group)
        .collect::<HashSet<_>>()
        .len()
}
