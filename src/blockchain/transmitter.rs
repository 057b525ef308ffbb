// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! CCTP message transmitter bindings and message helpers.

use alloy::{
    primitives::{keccak256, Bytes, B256},
    sol,
    sol_types::{Revert, SolError},
};

sol! {
    #[sol(rpc)]
    interface IMessageTransmitter {
        event MessageSent(bytes message);

        function receiveMessage(bytes message, bytes attestation) external returns (bool success);
        function usedNonces(bytes32 sourceAndNonce) external view returns (uint256);
    }
}

/// Revert reason the transmitter emits for a replayed message.
pub const NONCE_ALREADY_USED: &str = "Nonce already used";

/// Header size of a version 0 burn message (fields before the body).
pub const MESSAGE_HEADER_LEN: usize = 116;

/// Fixed-layout header at the front of every transmitter message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageHeader {
    pub version: u32,
    pub source_domain: u32,
    pub destination_domain: u32,
    pub nonce: u64,
    pub sender: B256,
    pub recipient: B256,
    pub destination_caller: B256,
}

impl MessageHeader {
    /// Parse the header; `None` if the message is shorter than a header.
    pub fn parse(message: &[u8]) -> Option<Self> {
        if message.len() < MESSAGE_HEADER_LEN {
            return None;
        }
        let word = |at: usize| {
            let mut buf = [0u8; 4];
            buf.copy_from_slice(&message[at..at + 4]);
            u32::from_be_bytes(buf)
        };
        let mut nonce = [0u8; 8];
        nonce.copy_from_slice(&message[12..20]);

        Some(Self {
            version: word(0),
            source_domain: word(4),
            destination_domain: word(8),
            nonce: u64::from_be_bytes(nonce),
            sender: B256::from_slice(&message[20..52]),
            recipient: B256::from_slice(&message[52..84]),
            destination_caller: B256::from_slice(&message[84..116]),
        })
    }

    /// Key the transmitter records a consumed message under:
    /// `keccak256(sourceDomain ‖ nonce)`, both big-endian.
    pub fn nonce_key(&self) -> B256 {
        let mut packed = [0u8; 12];
        packed[..4].copy_from_slice(&self.source_domain.to_be_bytes());
        packed[4..].copy_from_slice(&self.nonce.to_be_bytes());
        keccak256(packed)
    }
}

/// What a `receiveMessage` revert means to the relay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RevertKind {
    /// The message was already received; treat as success.
    NonceAlreadyUsed,
    /// `Error(string)` with any other reason.
    Reason(String),
    /// Custom error or undecodable data.
    Other(Bytes),
    /// Revert without data.
    Empty,
}

/// Classify raw revert data returned by the transmitter.
pub fn classify_revert(data: &[u8]) -> RevertKind {
    if data.is_empty() {
        return RevertKind::Empty;
    }
    match Revert::abi_decode(data) {
        Ok(revert) if revert.reason == NONCE_ALREADY_USED => RevertKind::NonceAlreadyUsed,
        Ok(revert) => RevertKind::Reason(revert.reason),
        Err(_) => RevertKind::Other(Bytes::copy_from_slice(data)),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use alloy::sol_types::SolEvent;

    /// Build a version 0 message with the given routing fields and body.
    pub(crate) fn message(
        source_domain: u32,
        destination_domain: u32,
        nonce: u64,
        body: &[u8],
    ) -> Vec<u8> {
        let mut out = Vec::with_capacity(MESSAGE_HEADER_LEN + body.len());
        out.extend_from_slice(&0u32.to_be_bytes());
        out.extend_from_slice(&source_domain.to_be_bytes());
        out.extend_from_slice(&destination_domain.to_be_bytes());
        out.extend_from_slice(&nonce.to_be_bytes());
        out.extend_from_slice(&[0xaa; 32]);
        out.extend_from_slice(&[0xbb; 32]);
        out.extend_from_slice(&[0u8; 32]);
        out.extend_from_slice(body);
        out
    }

    #[test]
    fn message_sent_topic_matches_event_signature() {
        assert_eq!(
            IMessageTransmitter::MessageSent::SIGNATURE_HASH,
            keccak256("MessageSent(bytes)")
        );
    }

    #[test]
    fn parses_header_fields() {
        let raw = message(6, 0, 42, b"body");
        let header = MessageHeader::parse(&raw).unwrap();
        assert_eq!(header.version, 0);
        assert_eq!(header.source_domain, 6);
        assert_eq!(header.destination_domain, 0);
        assert_eq!(header.nonce, 42);
        assert_eq!(header.sender, B256::repeat_byte(0xaa));
        assert_eq!(header.recipient, B256::repeat_byte(0xbb));
        assert_eq!(header.destination_caller, B256::ZERO);
    }

    #[test]
    fn short_message_has_no_header() {
        assert!(MessageHeader::parse(&[0u8; MESSAGE_HEADER_LEN - 1]).is_none());
    }

    #[test]
    fn nonce_key_hashes_packed_domain_and_nonce() {
        let header = MessageHeader::parse(&message(6, 0, 42, &[])).unwrap();
        let mut packed = vec![0, 0, 0, 6];
        packed.extend_from_slice(&[0, 0, 0, 0, 0, 0, 0, 42]);
        assert_eq!(header.nonce_key(), keccak256(&packed));

        let other = MessageHeader::parse(&message(3, 0, 42, &[])).unwrap();
        assert_ne!(header.nonce_key(), other.nonce_key());
    }

    #[test]
    fn classifies_reverts() {
        let used = Revert::from(NONCE_ALREADY_USED).abi_encode();
        assert_eq!(classify_revert(&used), RevertKind::NonceAlreadyUsed);

        let other = Revert::from("Invalid attestation length").abi_encode();
        assert_eq!(
            classify_revert(&other),
            RevertKind::Reason("Invalid attestation length".into())
        );

        assert_eq!(classify_revert(&[]), RevertKind::Empty);
        assert_eq!(
            classify_revert(&[0xde, 0xad, 0xbe, 0xef]),
            RevertKind::Other(Bytes::from_static(&[0xde, 0xad, 0xbe, 0xef]))
        );
    }
}
