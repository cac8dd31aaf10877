use proptest::prelude::*;

use wallet_core::{AddressCodec, BaseTransaction, TransactionBuilder};
use wallet_cspr::{CsprNetwork, Fee, KeyPair, TransactionBuilderFactory};

const SOURCE_PRV: &str = "07e998012c1137decdf3efbbb1c3ee6d79b015638cbc197bdbcce1875de4faad";
const TARGET: &str = "01513fa90c1a74c34a8958dd86055e9736edb1ead918bd4d4d750ca851946be7aa";

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Parsing a serialized transfer and rebuilding it yields the same bytes.
    #[test]
    fn transfer_round_trip_is_idempotent(
        extra in 0u64..u64::MAX / 2,
        transfer_id in proptest::option::of(any::<u64>()),
        gas_limit in 1u64..u64::MAX,
        gas_price in 1u64..1000,
        timestamp in 1_500_000_000_000u64..2_500_000_000_000,
        ttl in 1u64..=86_400_000,
        signed in any::<bool>(),
    ) {
        let factory = TransactionBuilderFactory::new(CsprNetwork::testnet());
        let source = KeyPair::from_private(SOURCE_PRV).unwrap();
        let amount = 2_000_000_000u64 + extra;

        let mut builder = factory.transfer_builder();
        builder
            .fee(Fee::new(gas_limit.to_string()).with_gas_price(gas_price.to_string()))
            .unwrap()
            .source(&source.address())
            .unwrap()
            .to(TARGET)
            .unwrap()
            .amount(&amount.to_string())
            .unwrap()
            .expiration(ttl)
            .unwrap()
            .timestamp(timestamp);
        if let Some(id) = transfer_id {
            builder.transfer_id(id);
        }
        if signed {
            builder.sign(&source).unwrap();
        }
        let raw = builder.build().unwrap().to_broadcast_format().unwrap();

        let rebuilt = factory.from(&raw).unwrap().build().unwrap();
        prop_assert_eq!(rebuilt.to_broadcast_format().unwrap(), raw);
        rebuilt.verify_signatures().unwrap();
    }

    /// Two owner lists give the same multisig address only when they are
    /// equal in order and threshold.
    #[test]
    fn multisig_address_is_order_sensitive(threshold in 1usize..=3, swap in any::<bool>()) {
        let codec = TransactionBuilderFactory::new(CsprNetwork::testnet()).codec();
        let a = "0202a1d59c993d7dcb91febde94fd3327f874c995a154dca4f7244e04724fb4c30c3";
        let b = "0202717cdbe1ab1ef5263e492ddd0e0b6b001e8667eef4eddced1da2577c98cb21c9";
        let c = "0202a7c81e290b61548a8e9c077296e6928ce7d79195d2bec3849fc10e5ace62a25e";
        let base = codec.derive_multisig_address(&[a, b, c], threshold).unwrap();
        let keys = if swap { [b, a, c] } else { [a, b, c] };
        let other = codec.derive_multisig_address(&keys, threshold).unwrap();
        prop_assert_eq!(base == other, !swap);
    }

    /// Garbage never panics the parser.
    #[test]
    fn from_never_panics(raw in ".{0,256}") {
        let factory = TransactionBuilderFactory::new(CsprNetwork::testnet());
        prop_assert!(factory.from(&raw).is_err());
    }
}
