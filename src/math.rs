use {
    super::r#type::{
        Vector,
        Coord,
        Distance,
    }
};

/// Unit direction from `from` toward `to` together with the separation
/// distance. `None` when the points coincide and the direction is undefined.
pub fn unit_direction(from: &Vector, to: &Vector) -> Option<(Vector, Distance)> {
    let mut dir = to - from;
    let distance = dir.norm();

    if distance <= Coord::EPSILON {
        return None;
    }

    dir.unscale_mut(distance);

    Some((dir, distance))
}

pub fn lerp(from: &Vector, to: &Vector, t: Coord) -> Vector {
    from + (to - from).scale(t)
}
