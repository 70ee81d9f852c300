//! Player sync messages.
//!
//! Peers mirror each other's players by exchanging [`PlayerSync`] states.
//! Messages are JSON, framed with a big-endian `u32` length prefix. The
//! transport that carries the frames is supplied by the host.

use anyhow::{bail, Context};
use bytes::{Buf, BufMut, Bytes, BytesMut};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{math::Vec2, role::PlayerRole};

/// Protocol version for compatibility checks.
pub const PROTOCOL_VERSION: u32 = 1;

/// Frames larger than this are rejected.
pub const MAX_FRAME_LEN: usize = 64 * 1024;

/// High-level message envelope.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum PatrolMsg {
    Hello { protocol: u32 },
    PlayerSync(PlayerSync),
}

/// Authoritative motion state of one player for one frame.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct PlayerSync {
    pub role: PlayerRole,
    pub tick: u32,
    pub position: Vec2,
    pub velocity: Vec2,
    pub force: Vec2,
}

/// Serializes a message without framing.
pub fn encode_to_bytes(msg: &PatrolMsg) -> anyhow::Result<Bytes> {
    let payload = serde_json::to_vec(msg).context("serialize")?;
    Ok(Bytes::from(payload))
}

pub fn decode_from_bytes(b: &[u8]) -> anyhow::Result<PatrolMsg> {
    serde_json::from_slice(b).context("deserialize")
}

/// Appends one length-prefixed frame to `buf`.
pub fn encode_frame(msg: &PatrolMsg, buf: &mut BytesMut) -> anyhow::Result<()> {
    let payload = serde_json::to_vec(msg).context("serialize msg")?;
    if payload.len() > MAX_FRAME_LEN {
        warn!(len = payload.len(), "outgoing frame over the size limit");
        bail!("frame too large: {} bytes", payload.len());
    }
    buf.reserve(4 + payload.len());
    buf.put_u32(payload.len() as u32);
    buf.extend_from_slice(&payload);
    Ok(())
}

/// Splits one complete frame off the front of `buf`.
///
/// Returns `Ok(None)` and leaves `buf` untouched while the frame is partial.
pub fn decode_frame(buf: &mut BytesMut) -> anyhow::Result<Option<PatrolMsg>> {
    if buf.len() < 4 {
        return Ok(None);
    }
    let len = u32::from_be_bytes([buf[0], buf[1], buf[2], buf[3]]) as usize;
    if len > MAX_FRAME_LEN {
        warn!(len, "incoming frame over the size limit");
        bail!("frame too large: {len} bytes");
    }
    if buf.len() < 4 + len {
        return Ok(None);
    }
    buf.advance(4);
    let payload = buf.split_to(len);
    let msg = serde_json::from_slice(&payload).context("deserialize msg")?;
    Ok(Some(msg))
}
