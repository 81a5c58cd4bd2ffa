use std::collections::{BTreeSet, HashMap};

use image::RgbaImage;
use tracing::debug;

use crate::pose::{DepthProjection, JointId, Skeleton, UserId};
use crate::render::blit;
use crate::skeleton::atlas::BoneAtlas;
use crate::skeleton::bone::BoneId;
use crate::skeleton::placement::BonePlacement;

type UserBones = [BonePlacement; BoneId::COUNT];

/// Per-user bone state and compositing
pub struct SkeletonComposer {
    atlas: BoneAtlas,
    users: HashMap<UserId, UserBones>,
    offset: (i32, i32),
    referenced: Vec<JointId>,
}

impl SkeletonComposer {
    /// `offset` is added to every placement (render-space adjust)
    pub fn new(atlas: BoneAtlas, offset: (i32, i32)) -> Self {
        Self {
            atlas,
            users: HashMap::new(),
            offset,
            referenced: referenced_joints(),
        }
    }

    /// Update every bone of `user` from `skeleton` and draw them onto
    /// `surface`. Returns the user's tracking confidence.
    pub fn draw_user<P: DepthProjection + ?Sized>(
        &mut self,
        surface: &mut RgbaImage,
        user: UserId,
        skeleton: &Skeleton,
        projection: &P,
    ) -> f32 {
        let atlas = &self.atlas;
        let bones = self.users.entry(user).or_insert_with(|| {
            debug!("creating bone state for user {}", user);
            std::array::from_fn(|i| {
                let bone = BoneId::ALL[i];
                BonePlacement::new(*bone.spec(), atlas.image(bone))
            })
        });

        for bone in bones.iter_mut() {
            bone.update(skeleton, projection, self.offset);
            if let Some(p) = bone.placement() {
                blit(surface, &p.image, p.x, p.y, 255);
            }
        }

        self.confidence(skeleton)
    }

    /// Drop state of users the tracker no longer reports
    pub fn retain_users(&mut self, active: &[UserId]) {
        self.users.retain(|id, _| {
            let keep = active.contains(id);
            if !keep {
                debug!("dropping bone state for user {}", id);
            }
            keep
        });
    }

    pub fn user_count(&self) -> usize {
        self.users.len()
    }

    pub fn bones(&self, user: UserId) -> Option<&[BonePlacement]> {
        self.users.get(&user).map(|b| b.as_slice())
    }

    /// Mean confidence over every joint some bone references, each counted once
    pub fn confidence(&self, skeleton: &Skeleton) -> f32 {
        mean_confidence(skeleton, &self.referenced)
    }
}

/// Distinct joints referenced by the bone table, sub-joints of pairs included
pub fn referenced_joints() -> Vec<JointId> {
    BoneId::ALL
        .iter()
        .flat_map(|bone| bone.spec().endpoints)
        .flat_map(|endpoint| endpoint.joints())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

fn mean_confidence(skeleton: &Skeleton, joints: &[JointId]) -> f32 {
    if joints.is_empty() {
        return 0.0;
    }
    let total: f32 = joints.iter().map(|&id| skeleton.get(id).confidence).sum();
    total / joints.len() as f32
}
