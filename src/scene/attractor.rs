use {
    crate::r#type::{
        AttractorId,
        Mass,
        Vector,
    }
};

/// A fixed-position mass source. Attractors pull every body regardless of
/// its attraction group and do not move for the whole computation.
#[derive(Debug, Clone)]
pub struct Attractor {
    id: AttractorId,
    location: Vector,
    mass: Mass,
}

impl Attractor {
    pub fn new(id: AttractorId, location: Vector, mass: Mass) -> Self {
        Self {
            id,
            location,
            mass,
        }
    }

    pub fn id(&self) -> AttractorId {
        self.id
    }

    pub fn location(&self) -> &Vector {
        &self.location
    }

    pub fn mass(&self) -> Mass {
        self.mass
    }
}
