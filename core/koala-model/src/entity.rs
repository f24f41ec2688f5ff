use std::fmt;
use std::rc::{Rc, Weak};

use koala_protocol::CoarseEntityType;

use crate::error::{ModelError, Result};
use crate::list::ImmutableList;
use crate::morpheme::Morpheme;
use crate::once::WriteOnce;

/// Named-entity span over morphemes, possibly crossing word boundaries.
pub struct Entity {
    surface: String,
    label: CoarseEntityType,
    fine_label: String,
    original_label: Option<String>,
    morphemes: ImmutableList<Rc<Morpheme>>,
    coref_group: WriteOnce<Weak<CoreferenceGroup>>,
}

impl Entity {
    /// Registers the entity on every morpheme of its span.
    pub fn new(
        surface: impl Into<String>,
        label: CoarseEntityType,
        fine_label: impl Into<String>,
        morphemes: Vec<Rc<Morpheme>>,
        original_label: Option<String>,
    ) -> Result<Rc<Self>> {
        let surface = surface.into();
        if surface.is_empty() {
            return Err(ModelError::MissingField("Entity.surface"));
        }
        if morphemes.is_empty() {
            return Err(ModelError::MissingField("Entity.morphemes"));
        }

        let entity = Rc::new(Self {
            surface,
            label,
            fine_label: fine_label.into(),
            original_label,
            morphemes: morphemes.into(),
            coref_group: WriteOnce::new("Entity.coref_group"),
        });

        for morpheme in entity.morphemes.iter() {
            morpheme.attach_entity(Rc::downgrade(&entity));
        }

        Ok(entity)
    }

    pub fn surface(&self) -> &str {
        &self.surface
    }

    pub fn label(&self) -> CoarseEntityType {
        self.label
    }

    pub fn fine_label(&self) -> &str {
        &self.fine_label
    }

    pub fn original_label(&self) -> Option<&str> {
        self.original_label.as_deref()
    }

    pub fn morphemes(&self) -> &ImmutableList<Rc<Morpheme>> {
        &self.morphemes
    }

    pub fn coref_group(&self) -> Option<Rc<CoreferenceGroup>> {
        self.coref_group.upgrade()
    }

    pub(crate) fn in_coref_group(&self) -> bool {
        self.coref_group.is_set()
    }
}

impl PartialEq for Entity {
    fn eq(&self, other: &Self) -> bool {
        self.label == other.label
            && self.fine_label == other.fine_label
            && self.morphemes == other.morphemes
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({}; '{}')", self.label, self.fine_label, self.surface)
    }
}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entity")
            .field("surface", &self.surface)
            .field("label", &self.label)
            .field("fine_label", &self.fine_label)
            .field("morphemes", &self.morphemes)
            .finish()
    }
}

/// Entities referring to the same discourse referent.
pub struct CoreferenceGroup {
    entities: ImmutableList<Rc<Entity>>,
}

impl CoreferenceGroup {
    /// Claims every member. Fails without claiming any if one already belongs
    /// to another group or is listed twice.
    pub fn new(entities: Vec<Rc<Entity>>) -> Result<Rc<Self>> {
        if entities.is_empty() {
            return Err(ModelError::MissingField("CoreferenceGroup.entities"));
        }
        for (position, entity) in entities.iter().enumerate() {
            if entities[..position].iter().any(|seen| Rc::ptr_eq(seen, entity)) {
                return Err(ModelError::Duplicate {
                    kind: "coreference member",
                    item: entity.to_string(),
                });
            }
        }

        let describe = || {
            let names: Vec<String> = entities.iter().map(|e| e.to_string()).collect();
            format!("[{}]", names.join(", "))
        };
        for entity in &entities {
            entity.coref_group.ensure_vacant(describe)?;
        }

        let group = Rc::new(Self {
            entities: entities.into(),
        });
        for entity in group.entities.iter() {
            entity.coref_group.set(Rc::downgrade(&group))?;
        }

        Ok(group)
    }

    pub fn entities(&self) -> &ImmutableList<Rc<Entity>> {
        &self.entities
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Always false: a group has at least one member.
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

impl PartialEq for CoreferenceGroup {
    fn eq(&self, other: &Self) -> bool {
        self.entities == other.entities
    }
}

impl fmt::Display for CoreferenceGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<String> = self.entities.map(|e| e.to_string());
        write!(f, "[{}]", names.join(", "))
    }
}

impl fmt::Debug for CoreferenceGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CoreferenceGroup{}", self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::word::Word;
    use koala_protocol::PosTag;

    #[test]
    fn test_span_across_words() {
        let first = Word::new(
            "서울",
            vec![Morpheme::new("서울", PosTag::NNP).unwrap()],
        )
        .unwrap();
        let second = Word::new(
            "시청에",
            vec![
                Morpheme::new("시청", PosTag::NNG).unwrap(),
                Morpheme::new("에", PosTag::JKB).unwrap(),
            ],
        )
        .unwrap();

        let entity = Entity::new(
            "서울 시청",
            CoarseEntityType::OG,
            "OGG_POLITICS",
            vec![Rc::clone(&first.morphemes()[0]), Rc::clone(&second.morphemes()[0])],
            None,
        )
        .unwrap();

        assert!(Rc::ptr_eq(&first.morphemes()[0].entities()[0], &entity));
        assert!(Rc::ptr_eq(&second.morphemes()[0].entities()[0], &entity));
        assert!(second.morphemes()[1].entities().is_empty());

        for word in [&first, &second] {
            let entities = word.entities();
            assert_eq!(entities.len(), 1);
            assert!(Rc::ptr_eq(&entities[0], &entity));
        }
        assert_eq!(entity.to_string(), "OG(OGG_POLITICS; '서울 시청')");
    }

    #[test]
    fn test_overlapping_spans_are_kept_once_per_word() {
        let word = Word::new(
            "홍길동씨",
            vec![
                Morpheme::new("홍길동", PosTag::NNP).unwrap(),
                Morpheme::new("씨", PosTag::NNB).unwrap(),
            ],
        )
        .unwrap();
        let m = word.morphemes();

        let name = Entity::new("홍길동", CoarseEntityType::PS, "PS_NAME", vec![Rc::clone(&m[0])], None).unwrap();
        let title = Entity::new(
            "홍길동씨",
            CoarseEntityType::PS,
            "PS_NAME",
            vec![Rc::clone(&m[0]), Rc::clone(&m[1])],
            None,
        )
        .unwrap();

        assert_eq!(m[0].entities().len(), 2);
        let entities = word.entities();
        assert_eq!(entities.len(), 2);
        assert!(Rc::ptr_eq(&entities[0], &name));
        assert!(Rc::ptr_eq(&entities[1], &title));
        assert_ne!(*name, *title);
    }

    #[test]
    fn test_coreference_membership() {
        let word = Word::new("그는", vec![Morpheme::new("그", PosTag::NP).unwrap()]).unwrap();
        let other = Word::new("철수", vec![Morpheme::new("철수", PosTag::NNP).unwrap()]).unwrap();
        let he = Entity::new("그", CoarseEntityType::PS, "PS_NAME", vec![Rc::clone(&word.morphemes()[0])], None).unwrap();
        let name = Entity::new("철수", CoarseEntityType::PS, "PS_NAME", vec![Rc::clone(&other.morphemes()[0])], None).unwrap();

        let group = CoreferenceGroup::new(vec![Rc::clone(&name), Rc::clone(&he)]).unwrap();
        for entity in group.entities().iter() {
            assert!(Rc::ptr_eq(&entity.coref_group().unwrap(), &group));
        }

        let err = CoreferenceGroup::new(vec![he]).unwrap_err();
        assert!(matches!(err, ModelError::WriteOnce { field: "Entity.coref_group", .. }));
        assert_eq!(
            CoreferenceGroup::new(Vec::new()).unwrap_err(),
            ModelError::MissingField("CoreferenceGroup.entities")
        );
    }

    #[test]
    fn test_repeated_member_is_rejected() {
        let word = Word::new("철수", vec![Morpheme::new("철수", PosTag::NNP).unwrap()]).unwrap();
        let name = Entity::new("철수", CoarseEntityType::PS, "PS_NAME", vec![Rc::clone(&word.morphemes()[0])], None).unwrap();

        let err = CoreferenceGroup::new(vec![Rc::clone(&name), Rc::clone(&name)]).unwrap_err();
        assert_eq!(
            err,
            ModelError::Duplicate {
                kind: "coreference member",
                item: "PS(PS_NAME; '철수')".to_string(),
            }
        );
        // Nothing was claimed
        assert!(name.coref_group().is_none());
        assert!(CoreferenceGroup::new(vec![name]).is_ok());
    }
}
