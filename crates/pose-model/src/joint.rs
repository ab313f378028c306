//! The fixed joint vocabulary tracked by the pipeline.
//!
//! Pose estimators emit many more landmarks (nose, eyes, ears, ...). Only
//! the limb joints below take part in kinematics; everything else is
//! discarded at extraction time.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A named anatomical joint from the fixed vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Joint {
    LeftShoulder,
    LeftElbow,
    LeftWrist,
    LeftHip,
    LeftKnee,
    LeftAnkle,
    RightShoulder,
    RightElbow,
    RightWrist,
    RightHip,
    RightKnee,
    RightAnkle,
}

/// Error returned when a name is outside the joint vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown joint name: {0}")]
pub struct UnknownJoint(pub String);

/// Body side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Left,
    Right,
}

impl Joint {
    /// Every joint in the vocabulary, left side first.
    pub const ALL: [Joint; 12] = [
        Joint::LeftShoulder,
        Joint::LeftElbow,
        Joint::LeftWrist,
        Joint::LeftHip,
        Joint::LeftKnee,
        Joint::LeftAnkle,
        Joint::RightShoulder,
        Joint::RightElbow,
        Joint::RightWrist,
        Joint::RightHip,
        Joint::RightKnee,
        Joint::RightAnkle,
    ];

    /// Wire name as emitted by pose estimators (e.g. `"left_ankle"`).
    pub fn as_str(self) -> &'static str {
        match self {
            Joint::LeftShoulder => "left_shoulder",
            Joint::LeftElbow => "left_elbow",
            Joint::LeftWrist => "left_wrist",
            Joint::LeftHip => "left_hip",
            Joint::LeftKnee => "left_knee",
            Joint::LeftAnkle => "left_ankle",
            Joint::RightShoulder => "right_shoulder",
            Joint::RightElbow => "right_elbow",
            Joint::RightWrist => "right_wrist",
            Joint::RightHip => "right_hip",
            Joint::RightKnee => "right_knee",
            Joint::RightAnkle => "right_ankle",
        }
    }

    /// Look up a joint by wire name. Returns `None` for names outside the vocabulary.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|joint| joint.as_str() == name)
    }

    pub fn side(self) -> Side {
        match self {
            Joint::LeftShoulder
            | Joint::LeftElbow
            | Joint::LeftWrist
            | Joint::LeftHip
            | Joint::LeftKnee
            | Joint::LeftAnkle => Side::Left,
            _ => Side::Right,
        }
    }
}

impl fmt::Display for Joint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Joint {
    type Err = UnknownJoint;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s.trim()).ok_or_else(|| UnknownJoint(s.to_string()))
    }
}

impl FromStr for Side {
    type Err = UnknownJoint;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "left" => Ok(Side::Left),
            "right" => Ok(Side::Right),
            other => Err(UnknownJoint(other.to_string())),
        }
    }
}

impl FromStr for Limb {
    type Err = UnknownJoint;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "leg" => Ok(Limb::Leg),
            "arm" => Ok(Limb::Arm),
            other => Err(UnknownJoint(other.to_string())),
        }
    }
}

/// Limb whose middle joint carries the reported angle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Limb {
    /// Hip-knee-ankle.
    #[default]
    Leg,
    /// Shoulder-elbow-wrist.
    Arm,
}

/// Three joints whose middle one is the vertex of the measured angle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct JointTriplet {
    pub proximal: Joint,
    pub vertex: Joint,
    pub distal: Joint,
}

impl JointTriplet {
    pub fn new(proximal: Joint, vertex: Joint, distal: Joint) -> Self {
        Self {
            proximal,
            vertex,
            distal,
        }
    }

    /// Hip-knee-ankle: the knee flexion angle.
    pub fn leg(side: Side) -> Self {
        match side {
            Side::Left => Self::new(Joint::LeftHip, Joint::LeftKnee, Joint::LeftAnkle),
            Side::Right => Self::new(Joint::RightHip, Joint::RightKnee, Joint::RightAnkle),
        }
    }

    /// Shoulder-elbow-wrist: the elbow flexion angle.
    pub fn arm(side: Side) -> Self {
        match side {
            Side::Left => Self::new(Joint::LeftShoulder, Joint::LeftElbow, Joint::LeftWrist),
            Side::Right => Self::new(Joint::RightShoulder, Joint::RightElbow, Joint::RightWrist),
        }
    }

    pub fn limb(limb: Limb, side: Side) -> Self {
        match limb {
            Limb::Leg => Self::leg(side),
            Limb::Arm => Self::arm(side),
        }
    }

    pub fn joints(&self) -> [Joint; 3] {
        [self.proximal, self.vertex, self.distal]
    }
}

impl Default for JointTriplet {
    fn default() -> Self {
        Self::leg(Side::Left)
    }
}
