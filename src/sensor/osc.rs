//! Skeleton input from an OSC bridge process that wraps the depth sensor.
//!
//! Messages understood:
//! - `/user/new id`
//! - `/user/lost id`
//! - `/user/state id visible` (visible: 0 or 1)
//! - `/user/skeleton id tracked x y z c ...` (15 joints, `JointId` order)
//!
//! Tracking requests go back to the bridge as `/tracking/start id` and
//! `/tracking/stop id`.

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::net::{SocketAddr, UdpSocket};

use anyhow::{bail, Context, Result};
use rosc::{decoder, encoder, OscMessage, OscPacket, OscType};
use tracing::{debug, info, warn};

use crate::pose::{DepthProjection, Joint, JointId, PinholeProjection, Skeleton, UserId};
use crate::sensor::{TrackedUser, TrackerFrame, UserState, UserTracker};

const SKELETON_ARGS: usize = 2 + JointId::COUNT * 4;

/// UDP OSC receiver keeping the set of users the bridge reported
pub struct OscTracker {
    socket: UdpSocket,
    bridge: Option<SocketAddr>,
    users: BTreeMap<UserId, TrackedUser>,
    projection: PinholeProjection,
}

impl OscTracker {
    /// Bind `listen_addr`; `capture` is the depth resolution the bridge
    /// reports positions for
    pub fn bind(listen_addr: &str, capture: (u32, u32)) -> Result<Self> {
        let socket = UdpSocket::bind(listen_addr)
            .with_context(|| format!("Failed to bind OSC socket on {}", listen_addr))?;
        socket.set_nonblocking(true)?;
        info!("listening for skeleton OSC on {}", socket.local_addr()?);
        Ok(Self {
            socket,
            bridge: None,
            users: BTreeMap::new(),
            projection: PinholeProjection::for_capture(capture.0, capture.1),
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.socket.local_addr()?)
    }

    fn handle_packet(&mut self, packet: OscPacket) {
        match packet {
            OscPacket::Message(msg) => {
                if let Err(e) = apply_message(&mut self.users, &msg) {
                    warn!("ignoring OSC message {}: {}", msg.addr, e);
                }
            }
            OscPacket::Bundle(bundle) => {
                for packet in bundle.content {
                    self.handle_packet(packet);
                }
            }
        }
    }

    fn send(&self, addr: &str, user: UserId) -> Result<()> {
        let Some(bridge) = self.bridge else {
            debug!("no bridge address yet, dropping {} {}", addr, user);
            return Ok(());
        };
        let packet = OscPacket::Message(OscMessage {
            addr: addr.to_string(),
            args: vec![OscType::Int(user as i32)],
        });
        let data = encoder::encode(&packet)?;
        self.socket.send_to(&data, bridge)?;
        Ok(())
    }
}

impl UserTracker for OscTracker {
    fn read_frame(&mut self) -> Result<TrackerFrame> {
        let mut buf = [0u8; rosc::decoder::MTU];
        loop {
            match self.socket.recv_from(&mut buf) {
                Ok((size, from)) => {
                    self.bridge = Some(from);
                    match decoder::decode_udp(&buf[..size]) {
                        Ok((_, packet)) => self.handle_packet(packet),
                        Err(e) => warn!("undecodable OSC packet from {}: {:?}", from, e),
                    }
                }
                Err(e) if e.kind() == ErrorKind::WouldBlock => break,
                Err(e) => return Err(e).context("OSC receive failed"),
            }
        }

        let frame = TrackerFrame {
            users: self.users.values().cloned().collect(),
        };
        for user in self.users.values_mut() {
            user.is_new = false;
        }
        Ok(frame)
    }

    fn start_skeleton_tracking(&mut self, user: UserId) -> Result<()> {
        self.send("/tracking/start", user)
    }

    fn stop_skeleton_tracking(&mut self, user: UserId) -> Result<()> {
        self.send("/tracking/stop", user)
    }

    fn projection(&self) -> &dyn DepthProjection {
        &self.projection
    }
}

fn new_user(id: UserId) -> TrackedUser {
    TrackedUser {
        id,
        is_new: true,
        state: UserState::Visible,
        skeleton_tracked: false,
        skeleton: Skeleton::default(),
    }
}

fn int_arg(msg: &OscMessage, index: usize) -> Result<i32> {
    match msg.args.get(index) {
        Some(OscType::Int(v)) => Ok(*v),
        Some(OscType::Long(v)) => Ok(*v as i32),
        other => bail!("argument {} is not an int: {:?}", index, other),
    }
}

fn float_arg(msg: &OscMessage, index: usize) -> Result<f32> {
    match msg.args.get(index) {
        Some(OscType::Float(v)) => Ok(*v),
        Some(OscType::Double(v)) => Ok(*v as f32),
        Some(OscType::Int(v)) => Ok(*v as f32),
        other => bail!("argument {} is not a float: {:?}", index, other),
    }
}

fn user_arg(msg: &OscMessage) -> Result<UserId> {
    let id = int_arg(msg, 0)?;
    UserId::try_from(id).with_context(|| format!("user id {} out of range", id))
}

/// Update the user table from one message
pub fn apply_message(users: &mut BTreeMap<UserId, TrackedUser>, msg: &OscMessage) -> Result<()> {
    match msg.addr.as_str() {
        "/user/new" => {
            let id = user_arg(msg)?;
            users.insert(id, new_user(id));
        }
        "/user/lost" => {
            let id = user_arg(msg)?;
            users.remove(&id);
        }
        "/user/state" => {
            let id = user_arg(msg)?;
            let visible = int_arg(msg, 1)? != 0;
            let user = users.entry(id).or_insert_with(|| new_user(id));
            user.state = if visible {
                UserState::Visible
            } else {
                UserState::OutOfScene
            };
        }
        "/user/skeleton" => {
            if msg.args.len() != SKELETON_ARGS {
                bail!("expected {} arguments, got {}", SKELETON_ARGS, msg.args.len());
            }
            let id = user_arg(msg)?;
            let tracked = int_arg(msg, 1)? != 0;
            let mut skeleton = Skeleton::default();
            for joint in JointId::ALL {
                let base = 2 + joint as usize * 4;
                skeleton.set(
                    joint,
                    Joint::new(
                        [
                            float_arg(msg, base)?,
                            float_arg(msg, base + 1)?,
                            float_arg(msg, base + 2)?,
                        ],
                        float_arg(msg, base + 3)?,
                    ),
                );
            }
            let user = users.entry(id).or_insert_with(|| new_user(id));
            user.skeleton_tracked = tracked;
            user.skeleton = skeleton;
        }
        other => bail!("unknown address {}", other),
    }
    Ok(())
}

/// Skeleton message as the bridge sends it
pub fn build_skeleton_message(user: UserId, tracked: bool, skeleton: &Skeleton) -> OscMessage {
    let mut args = Vec::with_capacity(SKELETON_ARGS);
    args.push(OscType::Int(user as i32));
    args.push(OscType::Int(tracked as i32));
    for joint in skeleton.joints.iter() {
        args.push(OscType::Float(joint.position[0]));
        args.push(OscType::Float(joint.position[1]));
        args.push(OscType::Float(joint.position[2]));
        args.push(OscType::Float(joint.confidence));
    }
    OscMessage {
        addr: "/user/skeleton".to_string(),
        args,
    }
}
