use std::ops::Range;

use chrono::{DateTime, Utc};
use pnet::packet::ethernet::{EtherType, EtherTypes, EthernetPacket};
use pnet::packet::ip::IpNextHeaderProtocols;
use pnet::packet::ipv4::Ipv4Packet;
use pnet::packet::udp::UdpPacket;
use pnet::packet::vlan::VlanPacket;

/// 802.1Q, 802.1ad and the legacy pre-standard QinQ tag.
const VLAN_ETHERTYPES: [u16; 3] = [0x8100, 0x88a8, 0x9100];

/// Layers the classifier asks a frame about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayerKind {
    Ethernet,
    Ipv4,
    Udp,
}

/// Link-layer framing of a capture, derived from its DLT value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkKind {
    Ethernet,
    RawIp,
    Unsupported(i32),
}

impl LinkKind {
    pub fn from_dlt(dlt: i32) -> Self {
        match dlt {
            1 => LinkKind::Ethernet,
            // DLT_RAW has two historical values, plus LINKTYPE_RAW and LINKTYPE_IPV4
            12 | 14 | 101 | 228 => LinkKind::RawIp,
            other => LinkKind::Unsupported(other),
        }
    }
}

/// Named-layer payload access.
///
/// `None` means the layer is not present in the frame; `Some(&[])` means the
/// layer was decoded but carries no payload bytes.
pub trait FrameLayers {
    fn payload(&self, layer: LayerKind) -> Option<&[u8]>;
}

/// Anything carrying a capture-supplied receive time.
pub trait Timestamped {
    fn received_at(&self) -> DateTime<Utc>;
}

/// One captured frame with its decoded layer boundaries.
#[derive(Debug, Clone)]
pub struct Frame {
    received_at: DateTime<Utc>,
    data: Vec<u8>,
    layers: LayerRanges,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct LayerRanges {
    ethernet: Option<Range<usize>>,
    ipv4: Option<Range<usize>>,
    udp: Option<Range<usize>>,
}

impl Frame {
    pub fn decode(link: LinkKind, received_at: DateTime<Utc>, data: Vec<u8>) -> Self {
        let layers = locate_layers(link, &data);
        Self {
            received_at,
            data,
            layers,
        }
    }
}

impl FrameLayers for Frame {
    fn payload(&self, layer: LayerKind) -> Option<&[u8]> {
        let range = match layer {
            LayerKind::Ethernet => self.layers.ethernet.clone(),
            LayerKind::Ipv4 => self.layers.ipv4.clone(),
            LayerKind::Udp => self.layers.udp.clone(),
        }?;
        self.data.get(range)
    }
}

impl Timestamped for Frame {
    fn received_at(&self) -> DateTime<Utc> {
        self.received_at
    }
}

fn locate_layers(link: LinkKind, data: &[u8]) -> LayerRanges {
    let mut layers = LayerRanges::default();

    let ip_offset = match link {
        LinkKind::Ethernet => {
            let Some(ethernet_packet) = EthernetPacket::new(data) else {
                return layers;
            };
            let header_len = EthernetPacket::minimum_packet_size();
            layers.ethernet = Some(header_len..data.len());

            let Some(offset) = skip_vlan_tags(data, ethernet_packet.get_ethertype(), header_len) else {
                return layers;
            };
            offset
        },
        LinkKind::RawIp => 0,
        LinkKind::Unsupported(_) => return layers,
    };

    let Some((ipv4_range, carries_udp)) = locate_ipv4_payload(data, ip_offset) else {
        return layers;
    };
    layers.ipv4 = Some(ipv4_range.clone());

    if carries_udp {
        layers.udp = locate_udp_payload(data, ipv4_range);
    }

    layers
}

/// Steps over any stacked VLAN tags and returns the offset of the IPv4
/// header, or `None` when the innermost ethertype is not IPv4.
fn skip_vlan_tags(data: &[u8], mut ethertype: EtherType, mut offset: usize) -> Option<usize> {
    while VLAN_ETHERTYPES.contains(&ethertype.0) {
        let vlan_packet = VlanPacket::new(data.get(offset..)?)?;
        ethertype = vlan_packet.get_ethertype();
        offset += VlanPacket::minimum_packet_size();
    }
    (ethertype == EtherTypes::Ipv4).then_some(offset)
}

/// Returns the IPv4 payload range and whether it holds the first fragment of a
/// UDP datagram.
fn locate_ipv4_payload(data: &[u8], offset: usize) -> Option<(Range<usize>, bool)> {
    let ipv4_packet = Ipv4Packet::new(data.get(offset..)?)?;
    if ipv4_packet.get_version() != 4 {
        return None;
    }

    let header_len = ipv4_packet.get_header_length() as usize * 4;
    if header_len < Ipv4Packet::minimum_packet_size() {
        return None;
    }

    let captured = data.len() - offset;
    let total_len = match ipv4_packet.get_total_length() as usize {
        // segmentation offload leaves the field zeroed
        0 => captured,
        len if len < header_len => return None,
        len => len.min(captured),
    };
    if header_len > total_len {
        return None;
    }

    let carries_udp = ipv4_packet.get_next_level_protocol() == IpNextHeaderProtocols::Udp
        && ipv4_packet.get_fragment_offset() == 0;

    Some((offset + header_len..offset + total_len, carries_udp))
}

fn locate_udp_payload(data: &[u8], ipv4_range: Range<usize>) -> Option<Range<usize>> {
    let udp_packet = UdpPacket::new(data.get(ipv4_range.clone())?)?;
    let header_len = UdpPacket::minimum_packet_size();
    let available = ipv4_range.len();

    let datagram_len = match udp_packet.get_length() as usize {
        0 => available,
        len if len < header_len => return None,
        len => len.min(available),
    };

    Some(ipv4_range.start + header_len..ipv4_range.start + datagram_len)
}
