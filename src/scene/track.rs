use {
    crate::{
        make_error,
        math::lerp,
        r#type::{
            RelativeTime,
            SampleIndex,
            Vector,
        },
        Result,
    },
};

/// Computed trajectory of one body: the location at every integration
/// sample, sample 0 being the initial location at t = 0. All tracks of one
/// computation share the same step and sample count.
#[derive(Debug, Clone)]
pub struct Track {
    step: RelativeTime,
    locations: Vec<Vector>,
}

impl Track {
    pub(crate) fn with_initial(location: Vector, step: RelativeTime, sample_count: usize) -> Self {
        let mut locations = Vec::with_capacity(sample_count);
        locations.push(location);

        Self {
            step,
            locations,
        }
    }

    pub(crate) fn push(&mut self, location: Vector) {
        self.locations.push(location);
    }

    pub fn sample_count(&self) -> usize {
        self.locations.len()
    }

    pub fn step(&self) -> RelativeTime {
        self.step
    }

    pub fn initial_location(&self) -> &Vector {
        &self.locations[0]
    }

    pub fn location(&self, sample: SampleIndex) -> Option<&Vector> {
        self.locations.get(sample)
    }

    pub fn locations(&self) -> &[Vector] {
        &self.locations
    }

    pub fn time_length(&self) -> RelativeTime {
        (self.locations.len() - 1) as RelativeTime * self.step
    }

    /// Location at an arbitrary virtual time within the computed span,
    /// linearly interpolated between the neighbouring samples.
    pub fn interpolate(&self, vtime: RelativeTime) -> Result<Vector> {
        if vtime < 0.0 || vtime > self.time_length() {
            return Err(make_error![Error::Scene::UncomputedTime(vtime)]);
        }

        if self.locations.len() == 1 {
            return Ok(*self.initial_location());
        }

        let last_segment = self.locations.len() - 2;
        let segment = ((vtime / self.step) as usize).min(last_segment);
        let t = (vtime - segment as RelativeTime * self.step) / self.step;

        Ok(lerp(
            &self.locations[segment],
            &self.locations[segment + 1],
            t,
        ))
    }
}
