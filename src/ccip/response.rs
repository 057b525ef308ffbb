// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! ABI-encoded replies for the supported resolver selectors.

use alloy::{
    primitives::{Address, Bytes},
    sol_types::SolValue,
};

use super::decoder::{ADDR_SELECTOR, MULTICOIN_ADDR_SELECTOR};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported resolver selector 0x{0}")]
pub struct UnsupportedSelector(pub String);

/// Encode the reply to the inner resolver call identified by `selector`.
///
/// `addr(bytes32)` returns the address itself. `addr(bytes32,uint256)`
/// returns the raw 20 address bytes as `bytes`, whatever coin type was asked
/// for: one address serves every chain.
pub fn encode_response(selector: [u8; 4], address: Address) -> Result<Bytes, UnsupportedSelector> {
    let encoded = match selector {
        ADDR_SELECTOR => (address,).abi_encode_params(),
        MULTICOIN_ADDR_SELECTOR => (Bytes::copy_from_slice(address.as_slice()),).abi_encode_params(),
        other => return Err(UnsupportedSelector(alloy::hex::encode(other))),
    };
    Ok(encoded.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::address;

    const ALICE: Address = address!("1111111111111111111111111111111111111111");

    #[test]
    fn addr_reply_is_left_padded_word() {
        let reply = encode_response(ADDR_SELECTOR, ALICE).unwrap();
        let mut expected = [0u8; 32];
        expected[12..].copy_from_slice(ALICE.as_slice());
        assert_eq!(&reply[..], &expected[..]);

        let (decoded,) = <(Address,)>::abi_decode_params(&reply).unwrap();
        assert_eq!(decoded, ALICE);
    }

    #[test]
    fn multicoin_reply_is_dynamic_bytes() {
        let reply = encode_response(MULTICOIN_ADDR_SELECTOR, ALICE).unwrap();
        // offset word, length word, one padded data word
        assert_eq!(reply.len(), 96);
        assert_eq!(reply[31], 0x20);
        assert_eq!(reply[63], 20);
        assert_eq!(&reply[64..84], ALICE.as_slice());

        let (decoded,) = <(Bytes,)>::abi_decode_params(&reply).unwrap();
        assert_eq!(&decoded[..], ALICE.as_slice());
    }

    #[test]
    fn other_selectors_are_rejected() {
        // text(bytes32,string)
        let err = encode_response([0x59, 0xd1, 0xd4, 0x3c], ALICE).unwrap_err();
        assert_eq!(err, UnsupportedSelector("59d1d43c".into()));
    }
}
