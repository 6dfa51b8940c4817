//! Wire encodings for explicit (unblinded) assets and amounts.
//!
//! Every output carries a 33-byte asset tag and a 9-byte confidential value.
//! This crate only ever produces the explicit variants; blinded commitments
//! are left to the wallet layer.

use lwk_wollet::elements::confidential::{Asset, Value as ConfValue};
use lwk_wollet::elements::encode::deserialize;

use crate::error::{Error, Result};

/// Prefix byte marking an explicit asset tag or explicit value.
pub const EXPLICIT_PREFIX: u8 = 0x01;

pub const ASSET_TAG_LEN: usize = 33;
pub const CONFIDENTIAL_VALUE_LEN: usize = 9;

/// Largest amount accepted by consensus for an explicit value.
pub const MAX_MONEY: u64 = 21_000_000 * 100_000_000;

/// Encode a hex asset id into its explicit 33-byte tag.
///
/// The hex form is in display order, so the 32 id bytes are reversed on the
/// wire.
pub fn encode_asset(asset_hex: &str) -> Result<[u8; ASSET_TAG_LEN]> {
    let bytes = hex::decode(asset_hex)
        .map_err(|e| Error::MalformedAsset(format!("{asset_hex}: {e}")))?;
    if bytes.len() != 32 {
        return Err(Error::MalformedAsset(format!(
            "expected 32 bytes, got {}",
            bytes.len()
        )));
    }

    let mut tag = [0u8; ASSET_TAG_LEN];
    tag[0] = EXPLICIT_PREFIX;
    for (dst, src) in tag[1..].iter_mut().zip(bytes.iter().rev()) {
        *dst = *src;
    }
    Ok(tag)
}

/// Decode an explicit asset tag back to its lowercase hex id.
pub fn decode_asset(tag: &[u8]) -> Result<String> {
    if tag.len() != ASSET_TAG_LEN {
        return Err(Error::MalformedAsset(format!(
            "expected {ASSET_TAG_LEN}-byte tag, got {}",
            tag.len()
        )));
    }
    if tag[0] != EXPLICIT_PREFIX {
        return Err(Error::MalformedAsset(format!(
            "tag prefix {:#04x} is not explicit",
            tag[0]
        )));
    }
    let id: Vec<u8> = tag[1..].iter().rev().copied().collect();
    Ok(hex::encode(id))
}

/// Encode a satoshi amount as an explicit confidential value.
pub fn encode_value(satoshis: u64) -> Result<[u8; CONFIDENTIAL_VALUE_LEN]> {
    if satoshis > MAX_MONEY {
        return Err(Error::ValueOutOfRange(satoshis));
    }
    let mut out = [0u8; CONFIDENTIAL_VALUE_LEN];
    out[0] = EXPLICIT_PREFIX;
    out[1..].copy_from_slice(&satoshis.to_be_bytes());
    Ok(out)
}

/// Decode an explicit confidential value back to satoshis.
pub fn decode_value(bytes: &[u8]) -> Result<u64> {
    if bytes.len() != CONFIDENTIAL_VALUE_LEN {
        return Err(Error::MalformedValue(format!(
            "expected {CONFIDENTIAL_VALUE_LEN} bytes, got {}",
            bytes.len()
        )));
    }
    if bytes[0] != EXPLICIT_PREFIX {
        return Err(Error::MalformedValue(format!(
            "prefix {:#04x} is not explicit",
            bytes[0]
        )));
    }
    let mut amount = [0u8; 8];
    amount.copy_from_slice(&bytes[1..]);
    let satoshis = u64::from_be_bytes(amount);
    if satoshis > MAX_MONEY {
        return Err(Error::ValueOutOfRange(satoshis));
    }
    Ok(satoshis)
}

/// Parse an encoded tag into the transaction-library asset type.
pub(crate) fn tag_to_asset(tag: &[u8; ASSET_TAG_LEN]) -> Result<Asset> {
    deserialize(tag).map_err(|e| Error::MalformedAsset(e.to_string()))
}

/// Parse an encoded value into the transaction-library value type.
pub(crate) fn bytes_to_value(bytes: &[u8; CONFIDENTIAL_VALUE_LEN]) -> Result<ConfValue> {
    deserialize(bytes).map_err(|e| Error::MalformedValue(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const LBTC: &str = "6f0279e9ed041c3d710a9f57d0c02928416460c4b722ae3457a11eec381c526d";

    #[test]
    fn asset_tag_layout() {
        let tag = encode_asset(LBTC).unwrap();
        assert_eq!(tag.len(), 33);
        assert_eq!(tag[0], 0x01);
        // last display byte comes first on the wire
        assert_eq!(tag[1], 0x6d);
        assert_eq!(tag[32], 0x6f);
        assert_eq!(decode_asset(&tag).unwrap(), LBTC);
    }

    #[test]
    fn asset_tag_matches_library_encoding() {
        let tag = encode_asset(LBTC).unwrap();
        match tag_to_asset(&tag).unwrap() {
            Asset::Explicit(id) => assert_eq!(id.to_string(), LBTC),
            other => panic!("expected explicit asset, got {other:?}"),
        }
    }

    #[test]
    fn uppercase_hex_decodes_to_lowercase() {
        let tag = encode_asset(&LBTC.to_uppercase()).unwrap();
        assert_eq!(decode_asset(&tag).unwrap(), LBTC);
    }

    #[test]
    fn rejects_short_and_non_hex_assets() {
        assert!(matches!(encode_asset("abcd"), Err(Error::MalformedAsset(_))));
        assert!(matches!(encode_asset(&"zz".repeat(32)), Err(Error::MalformedAsset(_))));
        assert!(matches!(decode_asset(&[0x01; 32]), Err(Error::MalformedAsset(_))));

        let mut tag = encode_asset(LBTC).unwrap();
        tag[0] = 0x0a;
        assert!(matches!(decode_asset(&tag), Err(Error::MalformedAsset(_))));
    }

    #[test]
    fn value_layout() {
        let bytes = encode_value(150_000).unwrap();
        assert_eq!(bytes[0], 0x01);
        assert_eq!(&bytes[1..], &150_000u64.to_be_bytes());
        assert_eq!(decode_value(&bytes).unwrap(), 150_000);
        assert_eq!(bytes_to_value(&bytes).unwrap(), ConfValue::Explicit(150_000));
    }

    #[test]
    fn value_bounds() {
        assert_eq!(decode_value(&encode_value(0).unwrap()).unwrap(), 0);
        assert_eq!(decode_value(&encode_value(MAX_MONEY).unwrap()).unwrap(), MAX_MONEY);
        assert!(matches!(
            encode_value(MAX_MONEY + 1),
            Err(Error::ValueOutOfRange(v)) if v == MAX_MONEY + 1
        ));
    }

    #[test]
    fn rejects_non_explicit_value() {
        let mut bytes = encode_value(1).unwrap();
        bytes[0] = 0x08;
        assert!(matches!(decode_value(&bytes), Err(Error::MalformedValue(_))));
        assert!(matches!(decode_value(&bytes[..4]), Err(Error::MalformedValue(_))));
    }
}
