use family_core::{
    seed_default_family, FamilyService, Gender, InMemoryPersonRepository, PersonRepository,
    RelationType,
};

fn seeded() -> FamilyService<InMemoryPersonRepository> {
    let service = FamilyService::new(InMemoryPersonRepository::new());
    seed_default_family(&service).unwrap();
    service
}

fn describe(service: &FamilyService<InMemoryPersonRepository>, name: &str, other: &str) -> String {
    let person = service.require_by_name(name).unwrap();
    let other = service.require_by_name(other).unwrap();
    service.describe_relation(&person, &other).unwrap()
}

#[test]
fn relation_table_on_the_bundled_tree() {
    let service = seeded();
    let cases = [
        ("King Shan", "Queen Anga", "Spouse"),
        ("Queen Anga", "King Shan", "Spouse"),
        ("King Shan", "Ish", "Son"),
        ("Ish", "King Shan", "Father"),
        ("Queen Anga", "Ish", "Son"),
        ("Queen Anga", "Satya", "Daughter"),
        ("Satya", "Queen Anga", "Mother"),
        ("Ish", "Satya", "Sibling"),
        ("Ish", "Ambi", "Sister-in-law"),
        ("Ish", "Vyan", "Brother-in-law"),
        ("Vyan", "Ish", "Brother-in-law"),
        ("King Shan", "Drita", "Grand Son"),
        ("King Shan", "Chika", "Grand Daughter"),
        ("King Shan", "Lavnya", "Great Grand Daughter"),
        ("King Shan", "Misa", "Great Grand Son"),
        ("Misa", "King Shan", "Great Grand Father"),
        ("Misa", "Queen Anga", "Great Grand Mother"),
        ("Jata", "Chit", "Grand Father"),
        ("Jata", "Ambi", "Grand Mother"),
        ("Drita", "Vila", "Cousin"),
        ("Drita", "Ish", "Paternal Uncle"),
        ("Drita", "Lika", "Paternal Aunt"),
        // a mother's brothers are also the father's brothers-in-law
        ("Satvy", "Chit", "Paternal Uncle"),
        ("Satvy", "Ambi", "Maternal Aunt"),
        ("Jaya", "Vrita", "Brother-in-law"),
    ];
    for (name, other, expected) in cases {
        assert_eq!(describe(&service, name, other), expected, "{name} -> {other}");
    }
}

#[test]
fn unrelated_or_distant_pairs_have_no_relation() {
    let service = seeded();
    // cousin's child: paths diverge and the other person is deeper
    assert_eq!(describe(&service, "Drita", "Lavnya"), "None");
    // same generation, different branches, not in-laws
    assert_eq!(describe(&service, "Jaya", "Jnki"), "None");
    assert_eq!(describe(&service, "Ish", "Ish"), "None");
}

#[test]
fn relation_of_self_is_none_for_everyone() {
    let service = seeded();
    for person in service.repository().list_persons().unwrap() {
        assert_eq!(service.relation_of(&person, &person).unwrap(), None, "{}", person.name);
    }
}

#[test]
fn inferred_relation_is_confirmed_by_lookup() {
    let service = seeded();
    let persons = service.repository().list_persons().unwrap();
    for person in &persons {
        for other in &persons {
            if let Some(relation) = service.relation_of(person, other).unwrap() {
                let relatives = service.relatives_of_type(person, relation).unwrap();
                assert!(
                    relatives.iter().any(|relative| relative.id == other.id),
                    "{} -> {} inferred as {relation}",
                    person.name,
                    other.name
                );
            }
        }
    }
}

#[test]
fn parent_and_child_relations_are_mirrored() {
    let service = seeded();
    let persons = service.repository().list_persons().unwrap();
    for child in &persons {
        let Some(father) = service.father(child).unwrap() else {
            continue;
        };
        let expected = match child.gender {
            Gender::Male => RelationType::Sons,
            Gender::Female => RelationType::Daughters,
        };
        assert_eq!(service.relation_of(&father, child).unwrap(), Some(expected));
        assert_eq!(
            service.relation_of(child, &father).unwrap(),
            Some(RelationType::Father)
        );
    }
}

#[test]
fn new_birth_is_inferred_as_great_grand_child() {
    let service = seeded();
    let lavnya = service.require_by_name("Lavnya").unwrap();
    let vanya = service
        .add_child_to_mother(lavnya.id.unwrap(), "vanya", Gender::Female)
        .unwrap();
    let vich = service.require_by_name("Vich").unwrap();

    assert_eq!(
        service.relation_of(&vich, &vanya).unwrap(),
        Some(RelationType::GreatGrandDaughters)
    );
    // deeper than great-grand generations is out of range
    let king = service.require_by_name("King Shan").unwrap();
    assert_eq!(service.relation_of(&king, &vanya).unwrap(), None);
}
