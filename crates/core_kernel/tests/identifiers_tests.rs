//! Unit and property tests for the identifiers module
//!
//! Tests cover parsing, display, raw conversion and the serialized form of
//! every identifier type.

use core_kernel::{
    BatchId, DocumentConfigId, EntityId, ErrorDetailId, MetadataValueId, ReferenceDataId,
    RequestId,
};
use proptest::prelude::*;

mod labels {
    use super::*;

    #[test]
    fn test_labels_name_the_entity() {
        assert_eq!(ReferenceDataId::label(), "Reference data");
        assert_eq!(DocumentConfigId::label(), "Document configuration");
        assert_eq!(RequestId::label(), "Document request");
        assert_eq!(MetadataValueId::label(), "Metadata value");
        assert_eq!(BatchId::label(), "Batch");
        assert_eq!(ErrorDetailId::label(), "Error detail");
    }
}

mod parsing {
    use super::*;

    #[test]
    fn test_non_numeric_is_rejected() {
        assert!("abc".parse::<RequestId>().is_err());
        assert!("".parse::<BatchId>().is_err());
        assert!("1.5".parse::<ReferenceDataId>().is_err());
    }

    #[test]
    fn test_surrounding_whitespace_is_ignored() {
        assert_eq!(" 8\n".parse::<ErrorDetailId>().unwrap(), ErrorDetailId::new(8));
    }
}

mod serialization {
    use super::*;

    #[test]
    fn test_serializes_as_bare_number() {
        let json = serde_json::to_string(&RequestId::new(1234)).unwrap();
        assert_eq!(json, "1234");
    }

    #[test]
    fn test_deserializes_from_bare_number() {
        let id: DocumentConfigId = serde_json::from_str("77").unwrap();
        assert_eq!(id.value(), 77);
    }

    #[test]
    fn test_ids_order_by_value() {
        let mut ids = vec![BatchId::new(3), BatchId::new(1), BatchId::new(2)];
        ids.sort();
        assert_eq!(ids, vec![BatchId::new(1), BatchId::new(2), BatchId::new(3)]);
    }
}

proptest! {
    #[test]
    fn display_then_parse_preserves_value(raw in any::<i64>()) {
        let id = MetadataValueId::new(raw);
        let parsed: MetadataValueId = id.to_string().parse().unwrap();
        prop_assert_eq!(parsed, id);
    }

    #[test]
    fn raw_accessors_agree(raw in any::<i64>()) {
        let id = ReferenceDataId::from_raw(raw);
        prop_assert_eq!(id.raw(), raw);
        prop_assert_eq!(id.value(), raw);
        prop_assert_eq!(i64::from(id), raw);
    }
}
