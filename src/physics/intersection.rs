use {
    crate::{
        make_error,
        math::unit_direction,
        physics::GenerationWatch,
        r#type::{
            BodyId,
            Distance,
            SampleIndex,
            Vector,
        },
        scene::Track,
        Result,
    },
};

/// A first-contact event between two bodies: where it happened, who was
/// involved and at which sample column.
#[derive(Debug, Clone)]
pub struct Intersection {
    location: Vector,
    bodies: Vec<BodyId>,
    sample: SampleIndex,
}

impl Intersection {
    pub fn location(&self) -> &Vector {
        &self.location
    }

    pub fn bodies(&self) -> &[BodyId] {
        &self.bodies
    }

    pub fn sample(&self) -> SampleIndex {
        self.sample
    }
}

/// Scans all tracks column by column for pairs closer than half the sum of
/// their collision radii. Columns are the outer loop, so earlier contacts
/// are found first; the same pair may be reported again at later columns.
///
/// The scan is O(samples x bodies^2), so it stops entirely once `limit`
/// events have been recorded: for preview purposes only the first few
/// contacts matter.
pub fn find_intersections(
    tracks: &[(BodyId, Distance, &Track)],
    limit: usize,
    watch: &GenerationWatch,
) -> Result<Vec<Intersection>> {
    let mut intersections = vec![];

    if limit == 0 || tracks.len() < 2 {
        return Ok(intersections);
    }

    let column_count = tracks
        .iter()
        .map(|(_, _, track)| track.sample_count())
        .min()
        .unwrap_or(0);

    for sample in 0..column_count {
        if watch.is_superseded() {
            return Err(make_error![Error::Physics::Superseded(watch.generation())]);
        }

        for lhs in 0..tracks.len() {
            for rhs in (lhs + 1)..tracks.len() {
                let (lhs_id, lhs_radius, lhs_track) = tracks[lhs];
                let (rhs_id, rhs_radius, rhs_track) = tracks[rhs];

                let lhs_location = &lhs_track.locations()[sample];
                let rhs_location = &rhs_track.locations()[sample];

                let contact_distance = (lhs_radius + rhs_radius) / 2.0;

                let (location, separation) = match unit_direction(lhs_location, rhs_location) {
                    Some((dir, distance)) => {
                        (lhs_location + dir.scale(lhs_radius / 2.0), distance)
                    },
                    None => (*lhs_location, 0.0),
                };

                if separation < contact_distance {
                    intersections.push(Intersection {
                        location,
                        bodies: vec![lhs_id, rhs_id],
                        sample,
                    });

                    if intersections.len() >= limit {
                        return Ok(intersections);
                    }
                }
            }
        }
    }

    Ok(intersections)
}
