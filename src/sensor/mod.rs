pub mod osc;
pub mod tilt;

use anyhow::Result;

use crate::pose::{DepthProjection, Skeleton, UserId};

pub use osc::{build_skeleton_message, OscTracker};
pub use tilt::set_tilt;

/// Scene state of a detected user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserState {
    Visible,
    OutOfScene,
}

/// One user in one tracker frame
#[derive(Debug, Clone, PartialEq)]
pub struct TrackedUser {
    pub id: UserId,
    /// First frame this user is reported
    pub is_new: bool,
    pub state: UserState,
    /// Skeleton tracking has calibrated for this user
    pub skeleton_tracked: bool,
    pub skeleton: Skeleton,
}

impl TrackedUser {
    pub fn is_tracked(&self) -> bool {
        self.state == UserState::Visible && self.skeleton_tracked
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackerFrame {
    pub users: Vec<TrackedUser>,
}

/// Skeleton tracking collaborator
pub trait UserTracker {
    /// Latest users; never blocks
    fn read_frame(&mut self) -> Result<TrackerFrame>;

    fn start_skeleton_tracking(&mut self, user: UserId) -> Result<()>;

    fn stop_skeleton_tracking(&mut self, user: UserId) -> Result<()>;

    /// World to render-space conversion for this device
    fn projection(&self) -> &dyn DepthProjection;
}
