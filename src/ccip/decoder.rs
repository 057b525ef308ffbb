// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Resolver call decoding.
//!
//! The on-chain resolver reverts with `OffchainLookup` carrying the full
//! ENSIP-10 `resolve(bytes name, bytes data)` calldata. The gateway receives
//! that calldata verbatim, so the decoder checks the `resolve` selector and
//! ABI-decodes the `(name, data)` tuple. The inner `data` is itself a resolver
//! call whose selector picks the response format.

use alloy::{
    primitives::Bytes,
    sol,
    sol_types::SolCall,
};

use super::dns::{self, DnsNameError};

sol! {
    /// ENSIP-10 wildcard resolution entry point.
    interface IExtendedResolver {
        function resolve(bytes name, bytes data) external view returns (bytes);
    }

    /// EIP-137 single-coin address record.
    interface IAddrResolver {
        function addr(bytes32 node) external view returns (address);
    }

    /// ENSIP-9 multi-coin address record.
    interface IAddressResolver {
        function addr(bytes32 node, uint256 coinType) external view returns (bytes);
    }
}

/// Selector of `resolve(bytes,bytes)` (`0x9061b923`).
pub const RESOLVE_SELECTOR: [u8; 4] = IExtendedResolver::resolveCall::SELECTOR;

/// Selector of `addr(bytes32)` (`0x3b3b57de`).
pub const ADDR_SELECTOR: [u8; 4] = IAddrResolver::addrCall::SELECTOR;

/// Selector of `addr(bytes32,uint256)` (`0xf1cb7e06`).
pub const MULTICOIN_ADDR_SELECTOR: [u8; 4] = IAddressResolver::addrCall::SELECTOR;

/// A decoded `resolve(bytes,bytes)` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverCall {
    /// Dotted form of the DNS-encoded name.
    pub name: String,
    /// Raw DNS wire-format name as embedded in the call.
    pub dns_name: Bytes,
    /// Selector of the inner resolver call.
    pub selector: [u8; 4],
    /// ABI-encoded arguments of the inner resolver call.
    pub parameters: Bytes,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("calldata does not start with resolve(bytes,bytes) selector (found 0x{0})")]
    UnrecognizedPrefix(String),

    #[error("malformed resolve call: {0}")]
    MalformedCall(String),

    #[error("malformed DNS name: {0}")]
    MalformedName(#[from] DnsNameError),
}

/// Decode ENSIP-10 `resolve` calldata into its name and inner call.
pub fn decode_resolve_call(call_data: &[u8]) -> Result<ResolverCall, DecodeError> {
    let prefix = call_data.get(..4).unwrap_or(call_data);
    if prefix != RESOLVE_SELECTOR {
        return Err(DecodeError::UnrecognizedPrefix(alloy::hex::encode(prefix)));
    }

    let call = IExtendedResolver::resolveCall::abi_decode_raw(&call_data[4..])
        .map_err(|e| DecodeError::MalformedCall(e.to_string()))?;

    let name = dns::decode(&call.name)?;

    if call.data.len() < 4 {
        return Err(DecodeError::MalformedCall(format!(
            "inner call is {} bytes, expected at least a selector",
            call.data.len()
        )));
    }

    let mut selector = [0u8; 4];
    selector.copy_from_slice(&call.data[..4]);
    let parameters = Bytes::copy_from_slice(&call.data[4..]);

    Ok(ResolverCall {
        name,
        dns_name: call.name,
        selector,
        parameters,
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use alloy::primitives::{keccak256, B256, U256};

    /// EIP-137 namehash, used to build realistic inner calls.
    pub(crate) fn namehash(name: &str) -> B256 {
        let mut node = B256::ZERO;
        if name.is_empty() {
            return node;
        }
        for label in name.rsplit('.') {
            let mut buf = [0u8; 64];
            buf[..32].copy_from_slice(node.as_slice());
            buf[32..].copy_from_slice(keccak256(label.as_bytes()).as_slice());
            node = keccak256(buf);
        }
        node
    }

    /// Build `resolve(dnsencode(name), inner)` calldata.
    pub(crate) fn resolve_calldata(name: &str, inner: Vec<u8>) -> Vec<u8> {
        IExtendedResolver::resolveCall {
            name: dns::encode(name).unwrap().into(),
            data: inner.into(),
        }
        .abi_encode()
    }

    pub(crate) fn addr_call(name: &str) -> Vec<u8> {
        IAddrResolver::addrCall {
            node: namehash(name),
        }
        .abi_encode()
    }

    pub(crate) fn multicoin_addr_call(name: &str, coin_type: u64) -> Vec<u8> {
        IAddressResolver::addrCall {
            node: namehash(name),
            coinType: U256::from(coin_type),
        }
        .abi_encode()
    }

    #[test]
    fn selectors_match_known_values() {
        assert_eq!(RESOLVE_SELECTOR, [0x90, 0x61, 0xb9, 0x23]);
        assert_eq!(ADDR_SELECTOR, [0x3b, 0x3b, 0x57, 0xde]);
        assert_eq!(MULTICOIN_ADDR_SELECTOR, [0xf1, 0xcb, 0x7e, 0x06]);
    }

    #[test]
    fn decodes_single_coin_addr_call() {
        let inner = addr_call("alice.telepay.cc");
        let data = resolve_calldata("alice.telepay.cc", inner.clone());

        let call = decode_resolve_call(&data).unwrap();
        assert_eq!(call.name, "alice.telepay.cc");
        assert_eq!(call.selector, ADDR_SELECTOR);
        assert_eq!(&call.parameters[..], &inner[4..]);
        assert_eq!(&call.parameters[..], namehash("alice.telepay.cc").as_slice());
    }

    #[test]
    fn decodes_multicoin_addr_call() {
        let inner = multicoin_addr_call("bob.telepay.cc", 2147492101);
        let data = resolve_calldata("bob.telepay.cc", inner.clone());

        let call = decode_resolve_call(&data).unwrap();
        assert_eq!(call.name, "bob.telepay.cc");
        assert_eq!(call.selector, MULTICOIN_ADDR_SELECTOR);
        assert_eq!(call.parameters.len(), 64);
        assert_eq!(&call.parameters[..], &inner[4..]);
    }

    #[test]
    fn decoding_is_selector_agnostic() {
        let inner = vec![0xde, 0xad, 0xbe, 0xef, 0x01];
        let data = resolve_calldata("carol.telepay.cc", inner);

        let call = decode_resolve_call(&data).unwrap();
        assert_eq!(call.selector, [0xde, 0xad, 0xbe, 0xef]);
        assert_eq!(&call.parameters[..], &[0x01]);
    }

    #[test]
    fn bare_inner_call_is_unrecognized() {
        // Legacy shape: the inner addr(bytes32) call sent without the resolve wrapper.
        let data = addr_call("alice.telepay.cc");
        assert_eq!(
            decode_resolve_call(&data).unwrap_err(),
            DecodeError::UnrecognizedPrefix("3b3b57de".into())
        );
    }

    #[test]
    fn short_calldata_is_unrecognized() {
        assert_eq!(
            decode_resolve_call(&[0x90, 0x61]).unwrap_err(),
            DecodeError::UnrecognizedPrefix("9061".into())
        );
    }

    #[test]
    fn truncated_tuple_is_malformed() {
        let data = resolve_calldata("alice.telepay.cc", addr_call("alice.telepay.cc"));
        let err = decode_resolve_call(&data[..40]).unwrap_err();
        assert!(matches!(err, DecodeError::MalformedCall(_)), "{err:?}");
    }

    #[test]
    fn inner_call_without_selector_is_malformed() {
        let data = resolve_calldata("alice.telepay.cc", vec![0x3b, 0x3b]);
        assert!(matches!(
            decode_resolve_call(&data),
            Err(DecodeError::MalformedCall(_))
        ));
    }

    #[test]
    fn truncated_embedded_name_is_malformed_name() {
        let data = IExtendedResolver::resolveCall {
            name: vec![9u8, b'a', b'b'].into(),
            data: addr_call("ab").into(),
        }
        .abi_encode();
        assert!(matches!(
            decode_resolve_call(&data),
            Err(DecodeError::MalformedName(DnsNameError::Truncated { .. }))
        ));
    }
}
