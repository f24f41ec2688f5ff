#![no_std] // The catalogs and wire schema must stay usable from embedded analyzer hosts

extern crate alloc;

// Enable std if the feature is active (for tests/tools)
#[cfg(feature = "std")]
extern crate std;

pub mod native;
pub mod tags;

// Re-export core types for convenience
pub use native::*;
pub use tags::{
    CoarseEntityType, DependencyTag, PhraseTag, PosTag, RoleType, TagClass, TagError,
};

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;
    use alloc::vec;
    use rkyv::{from_bytes, to_bytes};

    #[test]
    fn test_tag_serialization() {
        let original = PosTag::JKO;

        let bytes = to_bytes::<_, 256>(&original).expect("Failed to serialize PosTag");
        let deserialized: PosTag = from_bytes(&bytes).expect("Failed to deserialize PosTag");

        assert_eq!(original, deserialized);
    }

    #[test]
    fn test_native_sentence_archive() {
        let sentence = NativeSentence {
            words: vec![NativeWord {
                surface: "밥을".to_string(),
                morphemes: vec![
                    NativeMorpheme::new("밥", "NNG"),
                    NativeMorpheme::new("을", "JKO"),
                ],
            }],
            dependencies: Some(vec![NativeDepEdge {
                governor: None,
                dependent: 0,
                phrase_type: "NP".to_string(),
                dep_type: Some("OBJ".to_string()),
                original_label: None,
            }]),
            ..NativeSentence::default()
        };

        let bytes = to_bytes::<_, 1024>(&sentence).expect("Failed to serialize NativeSentence");
        let archived = rkyv::check_archived_root::<NativeSentence>(&bytes)
            .expect("Archive failed validation");

        assert_eq!(archived.words.len(), 1);
        assert_eq!(archived.words[0].morphemes[1].tag.as_str(), "JKO");

        let restored: NativeSentence = from_bytes(&bytes).expect("Failed to deserialize");
        assert_eq!(restored, sentence);
    }

    #[test]
    fn test_archived_role_keeps_variant_names() {
        let bytes = to_bytes::<_, 256>(&RoleType::ARGM_PRD).expect("Failed to serialize RoleType");
        let archived = rkyv::check_archived_root::<RoleType>(&bytes).expect("Archive failed validation");

        assert!(matches!(archived, tags::ArchivedRoleType::ARGM_PRD));
        let restored: RoleType = from_bytes(&bytes).expect("Failed to deserialize RoleType");
        assert_eq!(restored, RoleType::ARGM_PRD);
    }

    #[test]
    fn test_tag_layout() {
        assert_eq!(core::mem::size_of::<PosTag>(), 1);
        assert_eq!(core::mem::size_of::<Option<RoleType>>(), 1);
    }
}
