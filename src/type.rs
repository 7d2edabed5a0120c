use std::fmt;
use nalgebra::Vector3;

pub type BodyName = String;
pub type Coord = f32;
pub type Vector = Vector3<Coord>;
pub type Mass = Coord;
pub type Distance = Coord;
pub type Factor = Coord;

pub type BodyId = u64;
pub type AttractorId = u64;
pub type GroupId = u32;

pub type Generation = u64;
pub type SampleIndex = usize;

/// Virtual time in seconds, the unit every integration formula works in.
pub type RelativeTime = f32;

pub trait AsRelativeTime {
    fn as_relative_time(&self) -> RelativeTime;
}

impl AsRelativeTime for chrono::Duration {
    fn as_relative_time(&self) -> RelativeTime {
        self.num_milliseconds() as RelativeTime / 1000.0
    }
}

pub enum TimeFormat {
    VirtualTime(chrono::Duration),
    VirtualTimeStep(chrono::Duration),
}

impl fmt::Display for TimeFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeFormat::VirtualTime(time) => {
                let hours_in_day = 24;
                let mins_in_hour = 60;
                let secs_in_min = 60;
                let millis_in_sec = 1000;

                if time.num_days() != 0 {
                    write!(f, "day #{}, ", time.num_days())?;
                }

                write!(
                    f, "{}:{}:{}:{}",
                    time.num_hours() % hours_in_day,
                    time.num_minutes() % mins_in_hour,
                    time.num_seconds() % secs_in_min,
                    time.num_milliseconds() % millis_in_sec
                )
            },
            TimeFormat::VirtualTimeStep(time) => {
                if time.num_hours() != 0 {
                    write!(f, "{}h", time.num_hours())
                } else if time.num_minutes() != 0 {
                    write!(f, "{}min", time.num_minutes())
                } else if time.num_seconds() != 0 {
                    write!(f, "{}s", time.num_seconds())
                } else {
                    write!(f, "{}ms", time.num_milliseconds())
                }
            }
        }
    }
}
