use std::collections::HashMap;

use grafito::error::DbError;
use grafito::query::{Comparator, Condition, MultiCondition, RecordQuery};
use grafito::storage::record::encode_record;
use grafito::storage::{MemoryRecordStore, MemoryTree};
use grafito::types::{
    ClassAccessInfo, ClassId, ClassType, PositionId, PropertyAccessInfo, PropertyId, PropertyType,
    RecordDescriptor, RecordMeta, Value,
};
use grafito::SchemaCatalog;

struct Fixture {
    class_tree: MemoryTree,
    property_tree: MemoryTree,
    records: MemoryRecordStore,
}

impl Fixture {
    fn new() -> Self {
        Self {
            class_tree: MemoryTree::new(),
            property_tree: MemoryTree::new(),
            records: MemoryRecordStore::new(),
        }
    }

    fn catalog(&self) -> SchemaCatalog<'_> {
        SchemaCatalog::new(&self.class_tree, &self.property_tree)
    }
}

fn person_class() -> ClassAccessInfo {
    ClassAccessInfo {
        name: "Person".into(),
        id: ClassId(1),
        super_class_id: ClassId(0),
        class_type: ClassType::Vertex,
    }
}

/// Class `Person` (id=1) with `name:text`(id=1) and `age:int`(id=2), plus
/// records R1{name:"Ann", age:30} and R2{name:"Bob", age:25}.
fn seed_people(fixture: &Fixture) -> (RecordDescriptor, RecordDescriptor) {
    let catalog = fixture.catalog();
    catalog.classes.create(&person_class()).unwrap();
    catalog
        .properties
        .create(&PropertyAccessInfo {
            class_id: ClassId(1),
            name: "name".into(),
            id: PropertyId(1),
            property_type: PropertyType::Text,
        })
        .unwrap();
    catalog
        .properties
        .create(&PropertyAccessInfo {
            class_id: ClassId(1),
            name: "age".into(),
            id: PropertyId(2),
            property_type: PropertyType::Integer,
        })
        .unwrap();

    let meta = RecordMeta {
        version: 1,
        created_at: 1_700_000_000_000,
        updated_at: 1_700_000_000_000,
    };
    let r1 = fixture.records.insert(
        ClassId(1),
        encode_record(
            meta,
            &[
                (PropertyId(1), Value::Text("Ann".into())),
                (PropertyId(2), Value::Int(30)),
            ],
        )
        .unwrap(),
    );
    let r2 = fixture.records.insert(
        ClassId(1),
        encode_record(
            meta,
            &[
                (PropertyId(1), Value::Text("Bob".into())),
                (PropertyId(2), Value::Int(25)),
            ],
        )
        .unwrap(),
    );
    (r1, r2)
}

fn person_types() -> HashMap<String, PropertyType> {
    let mut types = HashMap::new();
    types.insert("name".to_owned(), PropertyType::Text);
    types.insert("age".to_owned(), PropertyType::Integer);
    types
}

#[test]
fn get_record_decodes_typed_fields() {
    let fixture = Fixture::new();
    let (r1, _) = seed_people(&fixture);
    let catalog = fixture.catalog();
    let query = RecordQuery::new(&catalog, &fixture.records);

    let record = query.get_record(&person_class(), r1).unwrap();
    assert_eq!(record.get("name"), Some(&Value::Text("Ann".into())));
    assert_eq!(record.get("age"), Some(&Value::Int(30)));
    assert_eq!(record.meta, None);
}

#[test]
fn basic_info_is_a_strict_superset() {
    let fixture = Fixture::new();
    let (r1, _) = seed_people(&fixture);
    let catalog = fixture.catalog();
    let query = RecordQuery::new(&catalog, &fixture.records);

    let plain = query.get_record(&person_class(), r1).unwrap();
    let full = query.get_record_with_basic_info(&person_class(), r1).unwrap();
    assert_eq!(full.props, plain.props);
    let meta = full.meta.expect("basic info populates metadata");
    assert_eq!(meta.version, 1);
    assert_eq!(meta.created_at, 1_700_000_000_000);
}

#[test]
fn get_record_not_found() {
    let fixture = Fixture::new();
    seed_people(&fixture);
    let catalog = fixture.catalog();
    let query = RecordQuery::new(&catalog, &fixture.records);

    let bogus = RecordDescriptor::new(ClassId(1), PositionId(999));
    assert!(matches!(
        query.get_record(&person_class(), bogus),
        Err(DbError::RecordNotFound(d)) if d == bogus
    ));

    let foreign = RecordDescriptor::new(ClassId(2), PositionId(1));
    assert!(matches!(
        query.get_record(&person_class(), foreign),
        Err(DbError::InvalidArgument(_))
    ));
}

#[test]
fn result_set_for_descriptors_preserves_order_and_is_all_or_nothing() {
    let fixture = Fixture::new();
    let (r1, r2) = seed_people(&fixture);
    let catalog = fixture.catalog();
    let query = RecordQuery::new(&catalog, &fixture.records);

    let set = query.get_result_set_for(&person_class(), &[r2, r1]).unwrap();
    assert_eq!(set.len(), 2);
    assert_eq!(set[0].descriptor, r2);
    assert_eq!(set[1].descriptor, r1);

    let bogus = RecordDescriptor::new(ClassId(1), PositionId(999));
    assert!(matches!(
        query.get_result_set_for(&person_class(), &[r1, bogus, r2]),
        Err(DbError::RecordNotFound(_))
    ));
}

#[test]
fn full_scan_and_cursor_agree() {
    let fixture = Fixture::new();
    let (r1, r2) = seed_people(&fixture);
    let catalog = fixture.catalog();
    let query = RecordQuery::new(&catalog, &fixture.records);

    let scanned = query.get_result_set(&person_class()).unwrap();
    assert_eq!(
        scanned.iter().map(|e| e.descriptor).collect::<Vec<_>>(),
        vec![r1, r2]
    );

    let cursor = query.get_result_set_cursor(&person_class()).unwrap();
    let lazy: Vec<_> = cursor.map(|e| e.unwrap()).collect();
    assert_eq!(lazy, scanned);
}

#[test]
fn cursor_over_empty_class_ends_immediately() {
    let fixture = Fixture::new();
    let catalog = fixture.catalog();
    catalog.classes.create(&person_class()).unwrap();
    let query = RecordQuery::new(&catalog, &fixture.records);

    let mut cursor = query.get_result_set_cursor(&person_class()).unwrap();
    assert!(cursor.next().is_none());
    assert!(cursor.next().is_none());
}

#[test]
fn condition_filter_matches_expected_subset() {
    let fixture = Fixture::new();
    let (_, r2) = seed_people(&fixture);
    let catalog = fixture.catalog();
    let query = RecordQuery::new(&catalog, &fixture.records);

    let under_28 = Condition::new("age", Comparator::Lt, Value::Int(28));
    let set = query
        .get_result_set_by_condition(&person_class(), PropertyType::Integer, &under_28)
        .unwrap();
    assert_eq!(set.len(), 1);
    assert_eq!(set[0].descriptor, r2);
    assert_eq!(set[0].record.get("name"), Some(&Value::Text("Bob".into())));

    let descriptors = query
        .get_record_descriptor_by_condition(&person_class(), PropertyType::Integer, &under_28)
        .unwrap();
    assert_eq!(
        descriptors,
        set.iter().map(|e| e.descriptor).collect::<Vec<_>>()
    );
}

#[test]
fn condition_type_mismatch_fails_fast() {
    let fixture = Fixture::new();
    seed_people(&fixture);
    let catalog = fixture.catalog();
    let query = RecordQuery::new(&catalog, &fixture.records);

    let text_operand = Condition::new("age", Comparator::Lt, "28");
    assert!(matches!(
        query.get_result_set_by_condition(&person_class(), PropertyType::Integer, &text_operand),
        Err(DbError::TypeMismatch { .. })
    ));

    let contains_int = Condition::new("age", Comparator::Contains, Value::Int(2));
    assert!(matches!(
        query.get_result_set_by_condition(&person_class(), PropertyType::Integer, &contains_int),
        Err(DbError::TypeMismatch { .. } | DbError::UnsupportedComparator { .. })
    ));
}

#[test]
fn multi_condition_scenario() {
    let fixture = Fixture::new();
    let (r1, _) = seed_people(&fixture);
    let catalog = fixture.catalog();
    let query = RecordQuery::new(&catalog, &fixture.records);

    let tree = MultiCondition::from(Condition::new("name", Comparator::Eq, "Ann"))
        .and(Condition::new("age", Comparator::Gt, Value::Int(20)).into());
    let set = query
        .get_result_set_by_multi_condition(&person_class(), &person_types(), &tree)
        .unwrap();
    assert_eq!(set.len(), 1);
    assert_eq!(set[0].descriptor, r1);

    let descriptors = query
        .get_record_descriptor_by_multi_condition(&person_class(), &person_types(), &tree)
        .unwrap();
    assert_eq!(descriptors, vec![r1]);
}

#[test]
fn multi_condition_set_algebra() {
    let fixture = Fixture::new();
    seed_people(&fixture);
    let catalog = fixture.catalog();
    let query = RecordQuery::new(&catalog, &fixture.records);
    let class = person_class();

    let ann: MultiCondition = Condition::new("name", Comparator::Eq, "Ann").into();
    let young: MultiCondition = Condition::new("age", Comparator::Lt, Value::Int(28)).into();

    let matches_of = |tree: &MultiCondition| {
        query
            .get_record_descriptor_by_multi_condition(&class, &person_types(), tree)
            .unwrap()
    };
    let ann_set = matches_of(&ann);
    let young_set = matches_of(&young);
    let and_set = matches_of(&ann.clone().and(young.clone()));
    let or_set = matches_of(&ann.clone().or(young.clone()));

    // AND is the intersection, OR the union, of the individual match sets.
    assert!(and_set.iter().all(|d| ann_set.contains(d) && young_set.contains(d)));
    for d in ann_set.iter().chain(&young_set) {
        assert!(or_set.contains(d));
    }
    assert_eq!(and_set.len(), 0);
    assert_eq!(or_set.len(), 2);

    let not_ann = matches_of(&ann.clone().not());
    assert_eq!(not_ann.len(), 1);
    assert!(!not_ann.iter().any(|d| ann_set.contains(d)));
}

#[test]
fn multi_condition_unknown_property_is_rejected() {
    let fixture = Fixture::new();
    seed_people(&fixture);
    let catalog = fixture.catalog();
    let query = RecordQuery::new(&catalog, &fixture.records);

    let tree: MultiCondition = Condition::new("ghost", Comparator::Eq, Value::Int(1)).into();
    assert!(matches!(
        query.get_result_set_by_multi_condition(&person_class(), &person_types(), &tree),
        Err(DbError::InvalidConditionReference(name)) if name == "ghost"
    ));
}

#[test]
fn case_insensitive_text_condition() {
    let fixture = Fixture::new();
    let (r1, _) = seed_people(&fixture);
    let catalog = fixture.catalog();
    let query = RecordQuery::new(&catalog, &fixture.records);

    let ci = Condition::new("name", Comparator::Eq, "ANN").ignore_case();
    let set = query
        .get_result_set_by_condition(&person_class(), PropertyType::Text, &ci)
        .unwrap();
    assert_eq!(set.len(), 1);
    assert_eq!(set[0].descriptor, r1);

    let cs = Condition::new("name", Comparator::Eq, "ANN");
    assert!(query
        .get_result_set_by_condition(&person_class(), PropertyType::Text, &cs)
        .unwrap()
        .is_empty());
}

#[test]
fn cmp_function_escape_hatch() {
    let fixture = Fixture::new();
    let (r1, r2) = seed_people(&fixture);
    let catalog = fixture.catalog();
    let query = RecordQuery::new(&catalog, &fixture.records);

    let short_name = |record: &grafito::Record| {
        matches!(record.get("name"), Some(Value::Text(name)) if name.len() <= 3)
    };
    let set = query
        .get_result_set_by_cmp_function(&person_class(), short_name)
        .unwrap();
    assert_eq!(
        set.iter().map(|e| e.descriptor).collect::<Vec<_>>(),
        vec![r1, r2]
    );

    let descriptors = query
        .get_record_descriptor_by_cmp_function(&person_class(), |record| {
            matches!(record.get("age"), Some(Value::Int(age)) if *age > 28)
        })
        .unwrap();
    assert_eq!(descriptors, vec![r1]);
}
