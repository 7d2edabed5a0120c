use super::r#type::{BodyId, Generation, RelativeTime};
use std::fmt;

pub type Description = String;

#[macro_export]
macro_rules! make_error {
    ($($path:ident)::+$(($value:expr))?) => {
        $crate::make_error![@_impl $($path)::+$(($value))?]
    };

    (@_impl $err_enum:ident::$case:ident$(($value:expr))?) => {
        $crate::error::$err_enum::$case$(($value))?
    };

    (@_impl $err_enum:ident::$sub_err_enum:ident::$($err_tail:ident)::+$(($value:expr))?) => {
        $crate::error::$err_enum::$sub_err_enum(
            $crate::make_error![@_impl $sub_err_enum::$($err_tail)::+$(($value))?]
        )
    };
}

#[derive(Debug)]
pub enum Error {
    Sync(Description),
    Io(std::io::Error),
    Scene(Scene),
    Physics(Physics),
    SerializeCsv(csv::Error),
}

#[derive(Debug)]
pub enum Scene {
    DuplicateBody(BodyId),
    NonPositiveMass(BodyId),
    NegativeRadius(BodyId),
    UncomputedTime(RelativeTime),
}

#[derive(Debug)]
pub enum Physics {
    InvalidStep(Description),
    UnstableDrag(BodyId),
    NonFiniteSample(BodyId),
    Superseded(Generation),
    Dispatch(Description),
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<Scene> for Error {
    fn from(err: Scene) -> Self {
        Self::Scene(err)
    }
}

impl From<Physics> for Error {
    fn from(err: Physics) -> Self {
        Self::Physics(err)
    }
}

impl From<csv::Error> for Error {
    fn from(err: csv::Error) -> Self {
        Self::SerializeCsv(err)
    }
}

impl<T, E: From<Error>> Into<::std::result::Result<T, E>> for Error {
    fn into(self) -> ::std::result::Result<T, E> {
        Err(self.into())
    }
}

impl Into<()> for Error {
    fn into(self) {}
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Sync(desc) => write!(f, "[sync] {}", desc),
            Error::Io(err) => write!(f, "[io] {}", err),
            Error::Scene(err) => write!(f, "[scene] {}", err),
            Error::Physics(err) => write!(f, "[physics] {}", err),
            Error::SerializeCsv(err) => write!(f, "[csv] {}", err),
        }
    }
}

impl fmt::Display for Scene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateBody(id) => {
                write!(f, "BID#{}: body already present in the snapshot", id)
            },
            Self::NonPositiveMass(id) => {
                write!(f, "BID#{}: body mass must be positive", id)
            },
            Self::NegativeRadius(id) => {
                write!(f, "BID#{}: body radius must not be negative", id)
            },
            Self::UncomputedTime(time) => {
                write!(f, "t = {}s: outside the computed track span", time)
            },
        }
    }
}

impl fmt::Display for Physics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidStep(desc) => write!(f, "invalid simulation parameters: {}", desc),
            Self::UnstableDrag(id) => write!(
                f,
                "BID#{}: drag * step >= 1 would invert the velocity direction",
                id
            ),
            Self::NonFiniteSample(id) => {
                write!(f, "BID#{}: trajectory sample is not finite", id)
            },
            Self::Superseded(generation) => {
                write!(f, "computation #{} superseded by a newer request", generation)
            },
            Self::Dispatch(desc) => write!(f, "unable to dispatch computation: {}", desc),
        }
    }
}
