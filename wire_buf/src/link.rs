//! Boundary between serialized buffers and a packet transport.
//!
//! The writer's [as_slice](crate::BufWriter::as_slice) is handed to [Link::send] without copying,
//! received bytes are wrapped back into a [BufReader].

use std::sync::mpsc::{channel, Receiver, Sender};

use crate::{AllocationMode, BufReader};

/// Delivery guarantees requested for one packet.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DeliveryClass {
    Unreliable,
    /// Unreliable, but older packets arriving after newer ones are dropped.
    UnreliableSequenced,
    Reliable,
    ReliableSequenced,
    /// Reliable and ordered, payloads larger than the MTU are split and re-assembled.
    ReliableFragmentedSequenced,
}

impl DeliveryClass {
    pub fn is_reliable(&self) -> bool {
        matches!(
            self,
            DeliveryClass::Reliable
                | DeliveryClass::ReliableSequenced
                | DeliveryClass::ReliableFragmentedSequenced
        )
    }

    pub fn is_fragmented(&self) -> bool {
        matches!(self, DeliveryClass::ReliableFragmentedSequenced)
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum LinkError {
    #[error("payload of {len} bytes exceeds MTU of {mtu} bytes for {class:?} delivery")]
    PayloadTooLarge {
        len: usize,
        mtu: usize,
        class: DeliveryClass,
    },
    #[error("unknown peer")]
    UnknownPeer,
    #[error("link disconnected")]
    Disconnected,
}

/// Received payload together with where it came from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Packet<P> {
    pub from: P,
    pub class: DeliveryClass,
    pub bytes: Vec<u8>,
}

impl<P> Packet<P> {
    /// Zero copy reader over the payload, valid while the packet is alive.
    pub fn reader(&self) -> BufReader<'_> {
        BufReader::new(&self.bytes, AllocationMode::Borrowed)
    }

    /// Reader that takes over the payload.
    pub fn into_reader(self) -> BufReader<'static> {
        BufReader::from_storage(crate::handle::Storage::Owned(self.bytes))
    }
}

/// Packet transport used by a simulation. Implementations decide how delivery classes are honored.
pub trait Link {
    type Peer;

    fn send(&mut self, to: Self::Peer, bytes: &[u8], class: DeliveryClass) -> Result<(), LinkError>;

    /// Next received packet, if any. Never blocks.
    fn poll(&mut self) -> Option<Packet<Self::Peer>>;
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct PeerId(pub u16);

/// In-process link connecting exactly two endpoints, delivering every packet in order.
///
/// Payloads over the MTU are rejected unless sent with
/// [ReliableFragmentedSequenced](DeliveryClass::ReliableFragmentedSequenced).
pub struct LoopbackLink {
    id: PeerId,
    peer: PeerId,
    mtu: usize,
    tx: Sender<Packet<PeerId>>,
    rx: Receiver<Packet<PeerId>>,
}

impl LoopbackLink {
    /// Two connected endpoints, `PeerId(0)` and `PeerId(1)`.
    pub fn pair(mtu: usize) -> (LoopbackLink, LoopbackLink) {
        let (tx_a, rx_b) = channel();
        let (tx_b, rx_a) = channel();
        let a = LoopbackLink {
            id: PeerId(0),
            peer: PeerId(1),
            mtu,
            tx: tx_a,
            rx: rx_a,
        };
        let b = LoopbackLink {
            id: PeerId(1),
            peer: PeerId(0),
            mtu,
            tx: tx_b,
            rx: rx_b,
        };
        (a, b)
    }

    pub fn id(&self) -> PeerId {
        self.id
    }

    pub fn peer(&self) -> PeerId {
        self.peer
    }

    pub fn mtu(&self) -> usize {
        self.mtu
    }
}

impl Link for LoopbackLink {
    type Peer = PeerId;

    fn send(&mut self, to: PeerId, bytes: &[u8], class: DeliveryClass) -> Result<(), LinkError> {
        if to != self.peer {
            return Err(LinkError::UnknownPeer);
        }
        if bytes.len() > self.mtu && !class.is_fragmented() {
            #[cfg(feature = "tracing-extended")]
            tracing::debug!(
                "dropping {} bytes to {to:?}, MTU is {}",
                bytes.len(),
                self.mtu
            );
            return Err(LinkError::PayloadTooLarge {
                len: bytes.len(),
                mtu: self.mtu,
                class,
            });
        }

        #[cfg(feature = "tracing-extended")]
        tracing::trace!("send {} bytes to {to:?} as {class:?}", bytes.len());

        self.tx
            .send(Packet {
                from: self.id,
                class,
                bytes: bytes.to_vec(),
            })
            .map_err(|_| LinkError::Disconnected)
    }

    fn poll(&mut self) -> Option<Packet<PeerId>> {
        self.rx.try_recv().ok()
    }
}
