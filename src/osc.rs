use anyhow::Result;
use rosc::{encoder, OscBundle, OscMessage, OscPacket, OscTime, OscType};
use std::net::UdpSocket;

use crate::rig::{RigSnapshot, SegmentPose};

pub const SEGMENT_ADDRESS: &str = "/rig/segment";

/// 1セグメント分のOSCメッセージ
/// 引数: id, x, y, z, qx, qy, qz, qw
pub fn build_segment_message(pose: &SegmentPose) -> OscMessage {
    let p = pose.transform.position;
    let q = pose.transform.rotation.quaternion();
    OscMessage {
        addr: SEGMENT_ADDRESS.to_string(),
        args: vec![
            OscType::String(pose.id.as_str().to_string()),
            OscType::Float(p.x),
            OscType::Float(p.y),
            OscType::Float(p.z),
            OscType::Float(q.i),
            OscType::Float(q.j),
            OscType::Float(q.k),
            OscType::Float(q.w),
        ],
    }
}

/// スナップショット全体を1バンドルに (即時実行)
pub fn build_snapshot_bundle(snapshot: &RigSnapshot) -> OscPacket {
    OscPacket::Bundle(OscBundle {
        timetag: OscTime { seconds: 0, fractional: 1 },
        content: snapshot
            .segments
            .iter()
            .map(|pose| OscPacket::Message(build_segment_message(pose)))
            .collect(),
    })
}

pub fn encode_packet(packet: &OscPacket) -> Result<Vec<u8>> {
    Ok(encoder::encode(packet)?)
}

/// スナップショットをUDPで送る
pub struct SnapshotSender {
    socket: UdpSocket,
    target_addr: String,
}

impl SnapshotSender {
    pub fn new(target_addr: &str) -> Result<Self> {
        let socket = UdpSocket::bind("0.0.0.0:0")?;
        Ok(Self {
            socket,
            target_addr: target_addr.to_string(),
        })
    }

    pub fn send(&self, snapshot: &RigSnapshot) -> Result<()> {
        let data = encode_packet(&build_snapshot_bundle(snapshot))?;
        self.socket.send_to(&data, &self.target_addr)?;
        Ok(())
    }
}
