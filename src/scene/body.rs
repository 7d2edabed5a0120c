use crate::r#type::{
    BodyId,
    BodyName,
    Distance,
    Factor,
    GroupId,
    Mass,
    Vector,
};

/// One simulated body. Immutable for the duration of one computation:
/// the engine reads it from the snapshot and never writes it back.
#[derive(Debug, Clone)]
pub struct Body {
    id: BodyId,
    name: BodyName,
    group: GroupId,
    mass: Mass,
    gravity_scale: Factor,
    drag: Factor,
    radius: Distance,
    location: Vector,
    velocity: Vector,
}

impl Body {
    pub fn new(
        id: BodyId,
        name: BodyName,
        group: GroupId,
        mass: Mass,
        gravity_scale: Factor,
        drag: Factor,
        radius: Distance,
        location: Vector,
        velocity: Vector,
    ) -> Self {
        Self {
            id,
            name,
            group,
            mass,
            gravity_scale,
            drag,
            radius,
            location,
            velocity,
        }
    }

    pub fn id(&self) -> BodyId {
        self.id
    }

    pub fn name(&self) -> &BodyName {
        &self.name
    }

    pub fn group(&self) -> GroupId {
        self.group
    }

    pub fn mass(&self) -> Mass {
        self.mass
    }

    pub fn gravity_scale(&self) -> Factor {
        self.gravity_scale
    }

    pub fn drag(&self) -> Factor {
        self.drag
    }

    pub fn radius(&self) -> Distance {
        self.radius
    }

    pub fn location(&self) -> &Vector {
        &self.location
    }

    pub fn velocity(&self) -> &Vector {
        &self.velocity
    }
}
