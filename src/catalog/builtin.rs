use nalgebra::{Point3, Vector3};

use super::{GestureDefinition, PoseTiming, StaticPoseRequirement, ZoneTiming};

include!(concat!(env!("OUT_DIR"), "/builtin_catalog.rs"));
