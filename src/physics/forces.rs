use {
    crate::{
        math::unit_direction,
        r#type::{
            Coord,
            Factor,
            Mass,
            Vector,
        },
        scene::{
            Attractor,
            SimulationParameters,
        },
    },
};

/// The force model of one computation, built once from the attractor set
/// and the request parameters, queried per body per step.
pub struct ForceField<'c> {
    attractors: &'c [Attractor],
    gravity: Vector,
    same_group_coeff: Coord,
    attractor_coeff: Coord,
    same_group_force_limit: Coord,
    attractor_force_limit: Coord,
}

/// Previous-step locations and masses of a body's own attraction group,
/// with the subject's own slot excluded from the sum.
pub struct Peers<'s> {
    pub locations: &'s [Vector],
    pub masses: &'s [Mass],
    pub subject: usize,
}

impl<'c> ForceField<'c> {
    pub fn new(attractors: &'c [Attractor], parameters: &SimulationParameters) -> Self {
        Self {
            attractors,
            gravity: parameters.gravity,
            same_group_coeff: parameters.gravity_constant * parameters.same_group_factor,
            attractor_coeff: parameters.gravity_constant * parameters.attractor_factor,
            same_group_force_limit: parameters.same_group_force_limit,
            attractor_force_limit: parameters.attractor_force_limit,
        }
    }

    /// Instantaneous acceleration of one body: the uniform field scaled by
    /// the body's own gravity scale, plus capped inverse-square attraction
    /// toward every same-group peer and toward every attractor. Peers of
    /// other groups contribute nothing.
    pub fn acceleration(
        &self,
        mass: Mass,
        gravity_scale: Factor,
        location: &Vector,
        peers: Peers,
    ) -> Vector {
        let mut acceleration = self.gravity * gravity_scale;

        for (index, peer_location) in peers.locations.iter().enumerate() {
            if index == peers.subject {
                continue;
            }

            acceleration += pair_attraction(
                mass,
                location,
                peer_location,
                peers.masses[index],
                self.same_group_coeff,
                self.same_group_force_limit,
            );
        }

        for attractor in self.attractors {
            acceleration += pair_attraction(
                mass,
                location,
                attractor.location(),
                attractor.mass(),
                self.attractor_coeff,
                self.attractor_force_limit,
            );
        }

        acceleration
    }
}

/// One inverse-square contribution. The magnitude of each pair is capped
/// separately, so near-zero separations stay bounded instead of blowing up.
fn pair_attraction(
    subject_mass: Mass,
    location: &Vector,
    other_location: &Vector,
    other_mass: Mass,
    coeff: Coord,
    force_limit: Coord,
) -> Vector {
    match unit_direction(location, other_location) {
        Some((dir, distance)) => {
            let force = coeff * subject_mass * other_mass / (distance * distance);

            dir.scale(force.min(force_limit) / subject_mass)
        },
        // coincident locations: the direction is undefined
        None => Vector::zeros(),
    }
}
