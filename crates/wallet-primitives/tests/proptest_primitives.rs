use proptest::prelude::*;

use wallet_primitives::base58;
use wallet_primitives::bip32::{ExtendedKey, ExtendedKeyMaterial, MAINNET_PRIVATE};
use wallet_primitives::ec::private_key::PrivateKey;
use wallet_primitives::ec::signature::Signature;
use wallet_primitives::hash::sha256;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn ecdsa_sign_verify_roundtrip(
        seed in prop::array::uniform32(any::<u8>()),
        msg in prop::collection::vec(any::<u8>(), 0..256)
    ) {
        // Not all 32-byte arrays are valid private keys (must be < curve order, nonzero).
        if let Ok(pk) = PrivateKey::from_bytes(&seed) {
            let hash = sha256(&msg);
            let sig = pk.sign(&hash).unwrap();
            prop_assert!(sig.is_low_s());
            let parsed = Signature::from_bytes(&sig.to_bytes()).unwrap();
            prop_assert!(pk.pub_key().verify(&hash, &parsed));
        }
    }

    #[test]
    fn base58_check_roundtrip(data in prop::collection::vec(any::<u8>(), 0..96)) {
        let encoded = base58::check_encode(&data);
        prop_assert_eq!(base58::check_decode(&encoded).unwrap(), data);
    }

    #[test]
    fn extended_key_reduces_to_raw_key(
        seed in prop::array::uniform32(any::<u8>()),
        chain_code in prop::array::uniform32(any::<u8>()),
        child_number in any::<u32>()
    ) {
        if let Ok(pk) = PrivateKey::from_bytes(&seed) {
            let xprv = ExtendedKey {
                version: MAINNET_PRIVATE,
                depth: 1,
                parent_fingerprint: [1, 2, 3, 4],
                child_number,
                chain_code,
                key: ExtendedKeyMaterial::Private(pk.clone()),
            };
            let parsed = ExtendedKey::from_string(&xprv.to_string_encoded()).unwrap();
            prop_assert_eq!(parsed.private_key().unwrap().to_hex(), pk.to_hex());
            let xpub = ExtendedKey::from_string(&parsed.neuter().to_string_encoded()).unwrap();
            prop_assert_eq!(xpub.public_key(), pk.pub_key());
        }
    }
}
