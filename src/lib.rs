pub mod scene;
pub mod physics;

pub mod error;

mod logger;
mod math;
mod r#type;

#[macro_use]
mod shared;

pub use error::Error;
pub type Result<T> = std::result::Result<T, Error>;

pub use logger::Logger;
pub use shared::Shared;
pub use r#type::{
    AttractorId,
    BodyId,
    BodyName,
    Coord,
    Distance,
    Factor,
    Generation,
    GroupId,
    Mass,
    RelativeTime,
    SampleIndex,
    Vector,
};
