use serde::Deserialize;

pub const DEFAULT_DIRECTION_TOLERANCE_DEG: f32 = 45.0;

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct CatalogFile {
    #[serde(rename = "gesture")]
    pub gestures: Vec<GestureSpec>,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct GestureSpec {
    pub name: String,
    #[serde(default)]
    pub requires_movement: bool,
    #[serde(default)]
    pub requires_direction_change: bool,
    #[serde(default)]
    pub requires_rotation: bool,
    #[serde(default)]
    pub requires_circular_motion: bool,
    #[serde(default)]
    pub requires_spatial_zone: bool,
    #[serde(default)]
    pub primary_direction: Option<[f32; 3]>,
    #[serde(default = "default_direction_tolerance")]
    pub direction_tolerance_deg: f32,
    #[serde(default)]
    pub min_speed: f32,
    #[serde(default)]
    pub min_distance: f32,
    pub min_duration_s: f32,
    pub max_duration_s: f32,
    #[serde(default)]
    pub required_direction_changes: u32,
    #[serde(default)]
    pub min_rotation_deg: f32,
    #[serde(default)]
    pub min_circularity: f32,
    #[serde(default)]
    pub zone: Option<ZoneSpec>,
    #[serde(default, rename = "pose")]
    pub poses: Vec<PoseSpec>,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ZoneSpec {
    pub center: [f32; 3],
    pub radius: f32,
    #[serde(default)]
    pub timing: ZoneTimingSpec,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct PoseSpec {
    pub name: String,
    pub timing: PoseTimingSpec,
    #[serde(default)]
    pub optional: bool,
    #[serde(default)]
    pub alternatives: Vec<String>,
    #[serde(default)]
    pub shape_ref: Option<String>,
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum PoseTimingSpec {
    Start,
    During,
    End,
    Any,
}

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum ZoneTimingSpec {
    Start,
    #[default]
    During,
    End,
}

impl PoseTimingSpec {
    pub fn rust_variant(self) -> &'static str {
        match self {
            Self::Start => "PoseTiming::Start",
            Self::During => "PoseTiming::During",
            Self::End => "PoseTiming::End",
            Self::Any => "PoseTiming::Any",
        }
    }
}

impl ZoneTimingSpec {
    pub fn rust_variant(self) -> &'static str {
        match self {
            Self::Start => "ZoneTiming::Start",
            Self::During => "ZoneTiming::During",
            Self::End => "ZoneTiming::End",
        }
    }
}

fn default_direction_tolerance() -> f32 {
    DEFAULT_DIRECTION_TOLERANCE_DEG
}
