/// Tracker-assigned user id
pub type UserId = u16;

/// Joints reported by the skeleton tracker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(usize)]
pub enum JointId {
    Head = 0,
    Neck = 1,
    LeftShoulder = 2,
    RightShoulder = 3,
    LeftElbow = 4,
    RightElbow = 5,
    LeftHand = 6,
    RightHand = 7,
    Torso = 8,
    LeftHip = 9,
    RightHip = 10,
    LeftKnee = 11,
    RightKnee = 12,
    LeftFoot = 13,
    RightFoot = 14,
}

impl JointId {
    pub const COUNT: usize = 15;

    pub const ALL: [JointId; Self::COUNT] = [
        Self::Head,
        Self::Neck,
        Self::LeftShoulder,
        Self::RightShoulder,
        Self::LeftElbow,
        Self::RightElbow,
        Self::LeftHand,
        Self::RightHand,
        Self::Torso,
        Self::LeftHip,
        Self::RightHip,
        Self::LeftKnee,
        Self::RightKnee,
        Self::LeftFoot,
        Self::RightFoot,
    ];

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }
}

/// A single tracked joint in sensor world space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Joint {
    /// World position (x, y, z) in millimetres
    pub position: [f32; 3],
    /// Position confidence, 0.0 to 1.0
    pub confidence: f32,
}

impl Joint {
    pub fn new(position: [f32; 3], confidence: f32) -> Self {
        Self { position, confidence }
    }
}

impl Default for Joint {
    fn default() -> Self {
        Self {
            position: [0.0, 0.0, 0.0],
            confidence: 0.0,
        }
    }
}

/// One frame's skeleton snapshot for a single user
#[derive(Debug, Clone, PartialEq)]
pub struct Skeleton {
    pub joints: [Joint; JointId::COUNT],
}

impl Skeleton {
    pub fn new(joints: [Joint; JointId::COUNT]) -> Self {
        Self { joints }
    }

    pub fn get(&self, id: JointId) -> &Joint {
        &self.joints[id as usize]
    }

    pub fn set(&mut self, id: JointId, joint: Joint) {
        self.joints[id as usize] = joint;
    }
}

impl Default for Skeleton {
    fn default() -> Self {
        Self {
            joints: [Joint::default(); JointId::COUNT],
        }
    }
}

/// Bone endpoint: one joint, or the midpoint of two
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JointRef {
    Single(JointId),
    Paired(JointId, JointId),
}

impl JointRef {
    /// Sub-joints referenced by this endpoint
    pub fn joints(&self) -> impl Iterator<Item = JointId> {
        let (first, second) = match *self {
            JointRef::Single(a) => (a, None),
            JointRef::Paired(a, b) => (a, Some(b)),
        };
        std::iter::once(first).chain(second)
    }
}
