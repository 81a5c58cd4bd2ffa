pub mod joint;
pub mod projection;
pub mod sample;

pub use joint::{Joint, JointId, JointRef, Skeleton, UserId};
pub use projection::{DepthProjection, PinholeProjection, PlanarProjection};
pub use sample::{resolve, JointSample, CONFIDENCE_THRESHOLD};
