use proptest::prelude::*;

use chain_eth::rlp::{self, RlpItem};
use chain_eth::{Address, Transaction};
use crypto_utils::{BigInt, PrivateKey};

fn rlp_item() -> impl Strategy<Value = RlpItem> {
    let leaf = prop::collection::vec(any::<u8>(), 0..80).prop_map(RlpItem::Bytes);
    leaf.prop_recursive(4, 64, 8, |inner| {
        prop::collection::vec(inner, 0..8).prop_map(RlpItem::List)
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn item_round_trip(item in rlp_item()) {
        let encoded = rlp::encode(&item);
        prop_assert_eq!(rlp::decode(&encoded).unwrap(), item);
    }

    #[test]
    fn byte_strings_match_alloy_rlp(bytes in prop::collection::vec(any::<u8>(), 0..300)) {
        let ours = rlp::encode(&RlpItem::from(bytes.as_slice()));
        prop_assert_eq!(&ours, &alloy_rlp::encode(bytes.as_slice()));
        prop_assert_eq!(rlp::decode(&ours).unwrap(), RlpItem::Bytes(bytes));
    }

    #[test]
    fn integers_match_alloy_rlp(value in any::<u64>()) {
        let ours = rlp::encode(&RlpItem::from_u64(value));
        prop_assert_eq!(&ours, &alloy_rlp::encode(value));
        prop_assert_eq!(rlp::decode(&ours).unwrap().as_u64().unwrap(), value);
    }

    #[test]
    fn lists_of_strings_match_alloy_rlp(items in prop::collection::vec(prop::collection::vec(any::<u8>(), 0..40), 0..12)) {
        let ours = rlp::encode_list(
            &items.iter().map(|b| RlpItem::from(b.as_slice())).collect::<Vec<_>>(),
        );
        let mut theirs = Vec::new();
        alloy_rlp::encode_list::<_, [u8]>(&items, &mut theirs);
        prop_assert_eq!(ours, theirs);
    }

    #[test]
    fn decode_prefix_reports_consumed_length(item in rlp_item(), tail in prop::collection::vec(any::<u8>(), 1..16)) {
        let encoded = rlp::encode(&item);
        let mut input = encoded.clone();
        input.extend_from_slice(&tail);

        let (decoded, used) = rlp::decode_prefix(&input).unwrap();
        prop_assert_eq!(decoded, item);
        prop_assert_eq!(used, encoded.len());
        prop_assert!(rlp::decode(&input).is_err());
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn signed_transactions_decode_and_recover(
        seed in 1u64..u64::MAX,
        nonce in any::<u64>(),
        chain_id in 1u64..100_000,
        value in any::<u128>(),
        data in prop::collection::vec(any::<u8>(), 0..64),
    ) {
        let mut secret = [0u8; 32];
        secret[24..].copy_from_slice(&seed.to_be_bytes());
        let key = PrivateKey::from_bytes(&secret).unwrap();

        let tx = Transaction::new(
            chain_id,
            nonce,
            Some(Address::new([0x42; 20])),
            BigInt::from(value),
            data,
            BigInt::from(1_000_000_000u64),
            BigInt::from(50_000u64),
        );

        let signed = tx.sign(&key).unwrap();
        let raw = signed.raw_transaction().unwrap();
        let decoded = Transaction::decode_raw(&raw).unwrap();

        prop_assert_eq!(&decoded, &signed);
        prop_assert_eq!(
            decoded.recover_sender().unwrap(),
            Address::from_public_key(&key.public_key())
        );
    }
}
