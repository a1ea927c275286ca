//! Ethereum addresses.
use k256::elliptic_curve::sec1::ToEncodedPoint;
use keccak_hash::keccak;

pub fn bytes_to_lowerhex(bytes: &[u8]) -> String {
    "0x".to_string() + &hex::encode(bytes)
}

/// Compute a hash of a public key as an Ethereum address.
///
/// The hash is of the public key (64 bytes), using Keccak. The hash is truncated to the last 20
/// bytes, lowercase-hex-encoded, and prefixed with "0x" to form the resulting string.
pub fn hash_public_key(pk: &k256::PublicKey) -> String {
    let pk_ec = pk.to_encoded_point(false);
    let pk_bytes = pk_ec.as_bytes();
    let hash = keccak(&pk_bytes[1..65]).to_fixed_bytes();
    bytes_to_lowerhex(&hash[12..32])
}

/// Parses a `0x`-prefixed, 20 bytes hex address and returns its lowercase
/// form.
pub fn normalize_address(address: &str) -> Option<String> {
    let hex_str = address
        .strip_prefix("0x")
        .or_else(|| address.strip_prefix("0X"))?;
    if hex_str.len() != 40 || !hex_str.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    Some(format!("0x{}", hex_str.to_ascii_lowercase()))
}

/// Chain id of a `did:ethr` network name.
///
/// Named networks, `0x`-prefixed hex and decimal chain ids are accepted.
pub fn network_chain_id(network: &str) -> Option<u64> {
    let id = match network {
        "mainnet" => 1,
        "morden" => 2,
        "ropsten" => 3,
        "rinkeby" => 4,
        "goerli" => 5,
        "kovan" => 42,
        "sepolia" => 11155111,
        _ => {
            return match network.strip_prefix("0x") {
                Some(hex_str) => u64::from_str_radix(hex_str, 16).ok(),
                None => network.parse().ok(),
            }
        }
    };
    Some(id)
}
