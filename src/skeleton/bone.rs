use crate::pose::JointId::*;
use crate::pose::JointRef::{self, Paired, Single};

/// Authored bone images, one sprite each
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(usize)]
pub enum BoneId {
    LeftFemur = 0,
    LeftLowerArmAndHand = 1,
    LeftShinAndFoot = 2,
    LeftUpperArm = 3,
    Pelvis = 4,
    Ribcage = 5,
    RightFemur = 6,
    RightLowerArmAndHand = 7,
    RightShinAndFoot = 8,
    RightUpperArm = 9,
    Skull = 10,
}

impl BoneId {
    pub const COUNT: usize = 11;

    /// Draw order
    pub const ALL: [BoneId; Self::COUNT] = [
        Self::LeftFemur,
        Self::LeftLowerArmAndHand,
        Self::LeftShinAndFoot,
        Self::LeftUpperArm,
        Self::Pelvis,
        Self::Ribcage,
        Self::RightFemur,
        Self::RightLowerArmAndHand,
        Self::RightShinAndFoot,
        Self::RightUpperArm,
        Self::Skull,
    ];

    /// Asset file stem
    pub fn name(&self) -> &'static str {
        match self {
            Self::LeftFemur => "left-femur",
            Self::LeftLowerArmAndHand => "left-lower-arm-and-hand",
            Self::LeftShinAndFoot => "left-shin-and-foot",
            Self::LeftUpperArm => "left-upper-arm",
            Self::Pelvis => "pelvis",
            Self::Ribcage => "ribcage",
            Self::RightFemur => "right-femur",
            Self::RightLowerArmAndHand => "right-lower-arm-and-hand",
            Self::RightShinAndFoot => "right-shin-and-foot",
            Self::RightUpperArm => "right-upper-arm",
            Self::Skull => "skull",
        }
    }

    pub fn spec(&self) -> &'static BoneSpec {
        &BONE_SPECS[*self as usize]
    }
}

/// Reference geometry of a bone image. `coords[i]` is the pixel in the image
/// that sits on `endpoints[i]`; `coords[0]` is the pivot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoneSpec {
    pub endpoints: [JointRef; 2],
    pub coords: [[f32; 2]; 2],
}

impl BoneSpec {
    pub fn reference_length(&self) -> f32 {
        distance(self.coords[0], self.coords[1])
    }

    pub fn reference_angle(&self) -> f32 {
        angle_degrees(self.coords[0], self.coords[1])
    }
}

/// Indexed by `BoneId`
pub const BONE_SPECS: [BoneSpec; BoneId::COUNT] = [
    BoneSpec {
        endpoints: [Single(LeftHip), Single(LeftKnee)],
        coords: [[64.0, 18.0], [32.0, 330.0]],
    },
    BoneSpec {
        endpoints: [Single(LeftElbow), Single(LeftHand)],
        coords: [[62.0, 5.0], [62.0, 211.0]],
    },
    BoneSpec {
        endpoints: [Single(LeftKnee), Single(LeftFoot)],
        coords: [[72.0, 16.0], [47.0, 308.0]],
    },
    BoneSpec {
        endpoints: [Single(LeftShoulder), Single(LeftElbow)],
        coords: [[30.0, 20.0], [31.0, 237.0]],
    },
    BoneSpec {
        endpoints: [Single(LeftHip), Single(RightHip)],
        coords: [[29.0, 50.0], [177.0, 50.0]],
    },
    BoneSpec {
        endpoints: [Single(Neck), Paired(LeftHip, RightHip)],
        coords: [[164.0, 1.0], [164.0, 354.0]],
    },
    BoneSpec {
        endpoints: [Single(RightHip), Single(RightKnee)],
        coords: [[16.0, 19.0], [48.0, 330.0]],
    },
    BoneSpec {
        endpoints: [Single(RightElbow), Single(RightHand)],
        coords: [[61.0, 5.0], [61.0, 211.0]],
    },
    BoneSpec {
        endpoints: [Single(RightKnee), Single(RightFoot)],
        coords: [[29.0, 16.0], [55.0, 308.0]],
    },
    BoneSpec {
        endpoints: [Single(RightShoulder), Single(RightElbow)],
        coords: [[32.0, 18.0], [29.0, 237.0]],
    },
    BoneSpec {
        endpoints: [Single(Head), Single(Neck)],
        coords: [[63.0, 98.0], [63.0, 219.0]],
    },
];

pub fn distance(p1: [f32; 2], p2: [f32; 2]) -> f32 {
    ((p1[0] - p2[0]).powi(2) + (p1[1] - p2[1]).powi(2)).sqrt()
}

/// Bone angle in degrees: atan2 of p1->p2 folded into [0, 2pi), then
/// `360 - (deg - 90)`. Results lie in (90, 450]; only differences are used.
pub fn angle_degrees(p1: [f32; 2], p2: [f32; 2]) -> f32 {
    let theta = (p2[1] - p1[1]).atan2(p2[0] - p1[0]);
    let theta = if theta < 0.0 {
        2.0 * std::f32::consts::PI + theta
    } else {
        theta
    };
    360.0 - (theta.to_degrees() - 90.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f32, b: f32, eps: f32) -> bool {
        (a - b).abs() < eps
    }

    #[test]
    fn test_bone_table_order() {
        for (i, bone) in BoneId::ALL.iter().enumerate() {
            assert_eq!(*bone as usize, i);
        }
        assert_eq!(BoneId::Ribcage.spec().endpoints[1], Paired(LeftHip, RightHip));
        assert_eq!(BoneId::Skull.name(), "skull");
    }

    #[test]
    fn test_all_reference_lengths_positive() {
        for bone in BoneId::ALL {
            assert!(bone.spec().reference_length() > 0.0, "{}", bone.name());
        }
    }

    #[test]
    fn test_angle_convention() {
        // straight down the image
        assert!(approx_eq(angle_degrees([0.0, 0.0], [0.0, 100.0]), 360.0, 1e-4));
        // to the right; the convention is not folded back into [0, 360)
        assert!(approx_eq(angle_degrees([0.0, 0.0], [100.0, 0.0]), 450.0, 1e-4));
        // straight up
        assert!(approx_eq(angle_degrees([0.0, 0.0], [0.0, -100.0]), 180.0, 1e-4));
        // to the left
        assert!(approx_eq(angle_degrees([0.0, 0.0], [-100.0, 0.0]), 270.0, 1e-4));
    }

    #[test]
    fn test_pelvis_reference_geometry() {
        let spec = BoneId::Pelvis.spec();
        assert!(approx_eq(spec.reference_length(), 148.0, 1e-4));
        assert!(approx_eq(spec.reference_angle(), 450.0, 1e-4));
    }
}
