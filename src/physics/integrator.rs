use {
    crate::{
        make_error,
        physics::{
            forces::{ForceField, Peers},
            GenerationWatch,
        },
        r#type::{
            AsRelativeTime,
            BodyId,
            Mass,
            Vector,
        },
        scene::{
            Attractor,
            Body,
            SimulationParameters,
            Track,
        },
        Result,
    },
};

/// Integrates the bodies of one attraction group over the whole requested
/// span with semi-implicit Euler: velocity kick from the force model, a
/// multiplicative drag decay, then the position drift. Peer forces are
/// evaluated against the previous step's locations for every body of the
/// group, so the result does not depend on iteration order.
///
/// Attractors are fixed for the whole computation, which is what makes
/// per-group integration independent of the other groups.
pub fn integrate_group(
    bodies: &[Body],
    attractors: &[Attractor],
    parameters: &SimulationParameters,
    watch: &GenerationWatch,
) -> Result<Vec<(BodyId, Track)>> {
    // a group with no bodies is not an error
    if bodies.is_empty() {
        return Ok(vec![]);
    }

    let step = parameters.step.as_relative_time();
    let step_count = parameters.step_count();
    let field = ForceField::new(attractors, parameters);

    let masses: Vec<Mass> = bodies.iter().map(Body::mass).collect();

    let mut dampings = Vec::with_capacity(bodies.len());
    for body in bodies.iter() {
        let damping = 1.0 - body.drag() * step;

        if damping <= 0.0 {
            return Err(make_error![Error::Physics::UnstableDrag(body.id())]);
        }

        dampings.push(damping);
    }

    let mut locations: Vec<Vector> = bodies.iter().map(|body| *body.location()).collect();
    let mut velocities: Vec<Vector> = bodies.iter().map(|body| *body.velocity()).collect();
    let mut tracks: Vec<Track> = bodies
        .iter()
        .map(|body| Track::with_initial(*body.location(), step, step_count + 1))
        .collect();

    let mut snapshot = locations.clone();

    for _ in 0..step_count {
        if watch.is_superseded() {
            return Err(make_error![Error::Physics::Superseded(watch.generation())]);
        }

        snapshot.copy_from_slice(&locations);

        for (index, body) in bodies.iter().enumerate() {
            let acceleration = field.acceleration(
                masses[index],
                body.gravity_scale(),
                &snapshot[index],
                Peers {
                    locations: &snapshot,
                    masses: &masses,
                    subject: index,
                },
            );

            let velocity = (velocities[index] + acceleration * step) * dampings[index];
            let location = locations[index] + velocity * step;

            if !location.iter().all(|coord| coord.is_finite()) {
                return Err(make_error![Error::Physics::NonFiniteSample(body.id())]);
            }

            velocities[index] = velocity;
            locations[index] = location;
            tracks[index].push(location);
        }
    }

    Ok(bodies.iter().map(Body::id).zip(tracks).collect())
}
