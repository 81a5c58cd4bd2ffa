pub mod atlas;
pub mod bone;
pub mod composer;
pub mod placement;

pub use atlas::BoneAtlas;
pub use bone::{angle_degrees, BoneId, BoneSpec, BONE_SPECS};
pub use composer::{referenced_joints, SkeletonComposer};
pub use placement::{rotated_origin, BonePlacement, Placement};
