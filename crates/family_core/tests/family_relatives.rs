use family_core::{
    seed_default_family, FamilyError, FamilyService, Gender, InMemoryPersonRepository, Person,
    PersonRepository, RelationType, RelationTypeError,
};

fn seeded() -> FamilyService<InMemoryPersonRepository> {
    let service = FamilyService::new(InMemoryPersonRepository::new());
    seed_default_family(&service).unwrap();
    service
}

fn relatives(service: &FamilyService<InMemoryPersonRepository>, name: &str, label: &str) -> String {
    let person = service.require_by_name(name).unwrap();
    service
        .relatives(&person, label)
        .unwrap()
        .iter()
        .map(|relative| relative.name.as_str())
        .collect::<Vec<_>>()
        .join(",")
}

#[test]
fn king_shan_relatives() {
    let service = seeded();
    let cases = [
        ("Spouse", "Queen Anga"),
        ("Child(ren)", "Ish,Chit,Vich,Satya"),
        ("Son(s)", "Ish,Chit,Vich"),
        ("Daughter(s)", "Satya"),
        ("Grand Child(ren)", "Drita,Vrita,Vila,Chika,Satvy,Savya,Saayan"),
        ("Grand Son(s)", "Drita,Vrita,Vila,Savya,Saayan"),
        ("Grand Daughter(s)", "Chika,Satvy"),
        ("Great Grand Child(ren)", "Jata,Driya,Lavnya,Kriya,Misa"),
        ("Great Grand Son(s)", "Jata,Kriya,Misa"),
        ("Great Grand Daughter(s)", "Driya,Lavnya"),
        ("Father", ""),
        ("Mother", ""),
        ("Sibling(s)", ""),
        ("Cousin(s)", ""),
        ("Grand Father", ""),
    ];
    for (label, expected) in cases {
        assert_eq!(relatives(&service, "King Shan", label), expected, "{label}");
    }
}

#[test]
fn queen_anga_shares_the_royal_children() {
    let service = seeded();
    let cases = [
        ("Spouse", "King Shan"),
        ("Child(ren)", "Ish,Chit,Vich,Satya"),
        ("Daughter(s)", "Satya"),
        ("Grand Daughter(s)", "Chika,Satvy"),
        ("Great Grand Son(s)", "Jata,Kriya,Misa"),
    ];
    for (label, expected) in cases {
        assert_eq!(relatives(&service, "Queen Anga", label), expected, "{label}");
    }
}

#[test]
fn ish_relatives() {
    let service = seeded();
    let cases = [
        ("Father", "King Shan"),
        ("Mother", "Queen Anga"),
        ("Spouse", ""),
        ("Sibling(s)", "Chit,Vich,Satya"),
        ("Brother(s)", "Chit,Vich"),
        ("Sister(s)", "Satya"),
        ("Brother-in-law(s)", "Vyan"),
        ("Sister-in-law(s)", "Ambi,Lika"),
        ("Child(ren)", ""),
        ("Paternal Uncle(s)", ""),
    ];
    for (label, expected) in cases {
        assert_eq!(relatives(&service, "Ish", label), expected, "{label}");
    }
}

#[test]
fn drita_uncles_aunts_and_cousins() {
    let service = seeded();
    let cases = [
        ("Paternal Uncle(s)", "Ish,Vich,Vyan"),
        ("Paternal Aunt(s)", "Satya,Lika"),
        ("Maternal Uncle(s)", "Ish,Vich"),
        ("Maternal Aunt(s)", "Satya"),
        ("Cousin(s)", "Vila,Chika,Satvy,Savya,Saayan"),
        ("Male Cousin(s)", "Vila,Savya,Saayan"),
        ("Female Cousin(s)", "Chika,Satvy"),
        ("Grand Father", "King Shan"),
        ("Grand Mother", "Queen Anga"),
        ("Brother(s)", "Vrita"),
    ];
    for (label, expected) in cases {
        assert_eq!(relatives(&service, "Drita", label), expected, "{label}");
    }
}

#[test]
fn satvy_uncles_and_aunts_come_from_both_parents() {
    let service = seeded();
    assert_eq!(relatives(&service, "Satvy", "Maternal Uncle(s)"), "Ish,Chit,Vich");
    assert_eq!(relatives(&service, "Satvy", "Maternal Aunt(s)"), "Ambi,Lika");
    assert_eq!(relatives(&service, "Satvy", "Paternal Uncle(s)"), "Ish,Chit,Vich");
    assert_eq!(relatives(&service, "Satvy", "Paternal Aunt(s)"), "");
    assert_eq!(relatives(&service, "Satvy", "Father"), "Vyan");
}

#[test]
fn great_grand_parents_follow_the_blood_line() {
    let service = seeded();
    assert_eq!(relatives(&service, "Misa", "Great Grand Father"), "King Shan");
    assert_eq!(relatives(&service, "Misa", "Great Grand Mother"), "Queen Anga");
    assert_eq!(relatives(&service, "Lavnya", "Grand Father"), "Vich");
    assert_eq!(relatives(&service, "Lavnya", "Grand Mother"), "Lika");
}

#[test]
fn married_in_members_see_in_laws_through_their_spouse() {
    let service = seeded();
    assert_eq!(relatives(&service, "Vyan", "Brother-in-law(s)"), "Ish,Chit,Vich");
    assert_eq!(relatives(&service, "Ambi", "Sister-in-law(s)"), "Satya");
    assert_eq!(relatives(&service, "Vyan", "Sibling(s)"), "");
    assert_eq!(relatives(&service, "Vyan", "Father"), "");
}

#[test]
fn relation_labels_and_indices_are_interchangeable() {
    let service = seeded();
    let king = service.require_by_name("King Shan").unwrap();

    for relation in RelationType::ALL {
        let by_label = service.relatives(&king, relation.label()).unwrap();
        let by_index = service.relatives(&king, relation.index()).unwrap();
        assert_eq!(by_label, by_index, "{relation}");
    }

    let lower = service.relatives(&king, "son(s)").unwrap();
    assert_eq!(lower.len(), 3);
}

#[test]
fn unknown_relation_keys_are_rejected() {
    let service = seeded();
    let king = service.require_by_name("King Shan").unwrap();

    let err = service.relatives(&king, "Nephew(s)").unwrap_err();
    assert!(matches!(
        err,
        FamilyError::InvalidRelationType(RelationTypeError::InvalidLabel(_))
    ));

    let err = service.relatives(&king, 28usize).unwrap_err();
    assert!(matches!(
        err,
        FamilyError::InvalidRelationType(RelationTypeError::InvalidIndex(28))
    ));
}

#[test]
fn name_lookup_is_case_insensitive_and_strict() {
    let service = seeded();
    let chit = service.find_by_name("  cHIT ").unwrap().unwrap();
    assert_eq!(chit.id, Some(4));
    assert!(service.find_by_name("Nobody").unwrap().is_none());
    assert!(matches!(
        service.require_by_name("Nobody"),
        Err(FamilyError::NameNotFound(name)) if name == "Nobody"
    ));
}

#[test]
fn duplicate_names_make_lookup_ambiguous() {
    let service = seeded();
    service.marry_into(3, "Satvy", Gender::Female).unwrap();

    match service.find_by_name("satvy") {
        Err(FamilyError::AmbiguousName { matches, .. }) => assert_eq!(matches, vec![22, 30]),
        other => panic!("unexpected lookup result: {other:?}"),
    }
}

#[test]
fn marrying_twice_is_rejected() {
    let service = seeded();
    assert!(matches!(
        service.marry_into(1, "Another Queen", Gender::Female),
        Err(FamilyError::AlreadyMarried(1))
    ));
}

#[test]
fn nobody_is_their_own_sibling() {
    let service = seeded();
    for person in service.repository().list_persons().unwrap() {
        let siblings = service.siblings(&person, None).unwrap();
        assert!(
            siblings.iter().all(|sibling| sibling.id != person.id),
            "{} lists themselves",
            person.name
        );
    }
}

#[test]
fn spouse_links_are_symmetric() {
    let service = seeded();
    for person in service.repository().list_persons().unwrap() {
        if let Some(spouse) = service.spouse(&person).unwrap() {
            assert_eq!(spouse.spouse_id, person.id, "{}", person.name);
        }
    }
}

#[test]
fn ancestor_path_grows_by_one_per_generation() {
    let service = seeded();
    for person in service.repository().list_persons().unwrap() {
        let Some(father) = service.father(&person).unwrap() else {
            assert_eq!(person.ancestors.len(), 1, "{}", person.name);
            continue;
        };
        let mother = service.mother(&person).unwrap().unwrap();
        let blood_parent: &Person = if father.is_blood_line() || !mother.is_blood_line() {
            &father
        } else {
            &mother
        };
        assert_eq!(
            person.ancestors.len(),
            blood_parent.ancestors.len() + 1,
            "{}",
            person.name
        );
    }
}
