//! Synthetic frame builders shared by the unit tests.

use std::net::Ipv4Addr;

use pnet::packet::ethernet::{EtherType, EtherTypes, MutableEthernetPacket};
use pnet::packet::ip::{IpNextHeaderProtocol, IpNextHeaderProtocols};
use pnet::packet::ipv4::MutableIpv4Packet;
use pnet::packet::udp::MutableUdpPacket;
use pnet::packet::vlan::MutableVlanPacket;
use pnet::util::MacAddr;

const ETHERNET_HEADER_LEN: usize = 14;
const IPV4_HEADER_LEN: usize = 20;
const UDP_HEADER_LEN: usize = 8;
const VLAN_TAG_LEN: usize = 4;

pub fn ethernet(ethertype: EtherType, payload: &[u8]) -> Vec<u8> {
    let mut buffer = vec![0u8; ETHERNET_HEADER_LEN + payload.len()];
    let mut ethernet_packet = MutableEthernetPacket::new(&mut buffer).unwrap();
    ethernet_packet.set_source(MacAddr::new(0x02, 0, 0, 0, 0, 0x01));
    ethernet_packet.set_destination(MacAddr::new(0x02, 0, 0, 0, 0, 0x02));
    ethernet_packet.set_ethertype(ethertype);
    ethernet_packet.set_payload(payload);
    buffer
}

pub fn ipv4(protocol: u8, payload: &[u8]) -> Vec<u8> {
    let total_len = IPV4_HEADER_LEN + payload.len();
    let mut buffer = vec![0u8; total_len];
    let mut ipv4_packet = MutableIpv4Packet::new(&mut buffer).unwrap();
    ipv4_packet.set_version(4);
    ipv4_packet.set_header_length(5);
    ipv4_packet.set_total_length(total_len as u16);
    ipv4_packet.set_ttl(64);
    ipv4_packet.set_next_level_protocol(IpNextHeaderProtocol(protocol));
    ipv4_packet.set_source(Ipv4Addr::new(16, 0, 0, 1));
    ipv4_packet.set_destination(Ipv4Addr::new(48, 0, 0, 1));
    ipv4_packet.set_payload(payload);
    buffer
}

pub fn udp(payload: &[u8]) -> Vec<u8> {
    let len = UDP_HEADER_LEN + payload.len();
    let mut buffer = vec![0u8; len];
    let mut udp_packet = MutableUdpPacket::new(&mut buffer).unwrap();
    udp_packet.set_source(319);
    udp_packet.set_destination(319);
    udp_packet.set_length(len as u16);
    udp_packet.set_payload(payload);
    buffer
}

/// One 802.1Q-style tag carrying `ethertype` for whatever follows it.
pub fn vlan_tag(vlan_id: u16, ethertype: EtherType, payload: &[u8]) -> Vec<u8> {
    let mut buffer = vec![0u8; VLAN_TAG_LEN + payload.len()];
    let mut vlan_packet = MutableVlanPacket::new(&mut buffer).unwrap();
    vlan_packet.set_vlan_identifier(vlan_id);
    vlan_packet.set_ethertype(ethertype);
    vlan_packet.set_payload(payload);
    buffer
}

/// Ethernet frame whose `tags` (tag protocol id, VLAN id), outermost first,
/// wrap a payload of type `inner`.
pub fn vlan_tagged_ethertype(tags: &[(EtherType, u16)], inner: EtherType, payload: &[u8]) -> Vec<u8> {
    let Some((&(outer_tpid, _), _)) = tags.split_first() else {
        return ethernet(inner, payload);
    };

    let mut body = payload.to_vec();
    let mut next_ethertype = inner;
    for &(tpid, vlan_id) in tags.iter().rev() {
        body = vlan_tag(vlan_id, next_ethertype, &body);
        next_ethertype = tpid;
    }
    ethernet(outer_tpid, &body)
}

pub fn vlan_tagged(tags: &[(EtherType, u16)], ipv4_packet: &[u8]) -> Vec<u8> {
    vlan_tagged_ethertype(tags, EtherTypes::Ipv4, ipv4_packet)
}

pub fn ipv4_udp(payload: &[u8]) -> Vec<u8> {
    ipv4(IpNextHeaderProtocols::Udp.0, &udp(payload))
}

pub fn ethernet_ipv4(protocol: u8, payload: &[u8]) -> Vec<u8> {
    ethernet(EtherTypes::Ipv4, &ipv4(protocol, payload))
}

pub fn ethernet_ipv4_udp(payload: &[u8]) -> Vec<u8> {
    ethernet(EtherTypes::Ipv4, &ipv4_udp(payload))
}

/// A traffic-generator probe trailer as it appears at the end of the IPv4 payload.
pub fn probe_trailer(flow_id: u8, hardware_id: u16, sequence: u32, sent_ns: u64) -> [u8; 16] {
    let mut trailer = [0u8; 16];
    trailer[0] = 0xab;
    trailer[1] = flow_id;
    trailer[2..4].copy_from_slice(&hardware_id.to_le_bytes());
    trailer[4..8].copy_from_slice(&sequence.to_le_bytes());
    trailer[8..16].copy_from_slice(&sent_ns.to_le_bytes());
    trailer
}

/// UDP payload ending in a probe trailer, preceded by `filler` bytes.
pub fn probe_payload(filler: usize, trailer: &[u8; 16]) -> Vec<u8> {
    let mut payload = vec![0x5au8; filler];
    payload.extend_from_slice(trailer);
    payload
}

pub fn time_sync_message(message_type: u8, len: usize) -> Vec<u8> {
    let mut message = vec![0u8; len];
    if let Some(first) = message.first_mut() {
        *first = message_type;
    }
    message
}
