use crate::pose::joint::{JointRef, Skeleton};
use crate::pose::projection::DepthProjection;

/// Joints above this confidence are trusted
pub const CONFIDENCE_THRESHOLD: f32 = 0.4;

/// Endpoint resolved into render space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JointSample {
    pub x: f32,
    pub y: f32,
    pub confident: bool,
}

/// Resolve a joint reference against one skeleton snapshot.
/// A paired reference is the midpoint of both projections and is only
/// confident when both sub-joints are.
pub fn resolve<P: DepthProjection + ?Sized>(
    skeleton: &Skeleton,
    joint_ref: JointRef,
    projection: &P,
) -> JointSample {
    match joint_ref {
        JointRef::Single(id) => {
            let joint = skeleton.get(id);
            let [x, y] = projection.project(joint.position);
            JointSample {
                x,
                y,
                confident: joint.confidence > CONFIDENCE_THRESHOLD,
            }
        }
        JointRef::Paired(a, b) => {
            let ja = skeleton.get(a);
            let jb = skeleton.get(b);
            let [xa, ya] = projection.project(ja.position);
            let [xb, yb] = projection.project(jb.position);
            JointSample {
                x: xa + (xb - xa) / 2.0,
                y: ya + (yb - ya) / 2.0,
                confident: ja.confidence > CONFIDENCE_THRESHOLD
                    && jb.confidence > CONFIDENCE_THRESHOLD,
            }
        }
    }
}
