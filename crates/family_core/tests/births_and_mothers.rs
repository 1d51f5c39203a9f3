use family_core::{
    seed_default_family, FamilyError, FamilyService, Gender, InMemoryPersonRepository, Person,
    RelationType,
};

fn seeded() -> FamilyService<InMemoryPersonRepository> {
    let service = FamilyService::new(InMemoryPersonRepository::new());
    seed_default_family(&service).unwrap();
    service
}

fn id_of(service: &FamilyService<InMemoryPersonRepository>, name: &str) -> i64 {
    service.require_by_name(name).unwrap().id.unwrap()
}

fn names(persons: &[Person]) -> Vec<&str> {
    persons.iter().map(|person| person.name.as_str()).collect()
}

#[test]
fn births_extend_both_parents_and_the_blood_line() {
    let service = seeded();
    let births = [
        ("Lavnya", "Vanya", Gender::Female, "Gru"),
        ("Driya", "Priya", Gender::Female, "Mnu"),
        ("Satvy", "Ra", Gender::Male, "Asva"),
    ];

    for (mother, child, gender, father) in births {
        let mother_id = id_of(&service, mother);
        let born = service.add_child_to_mother(mother_id, child, gender).unwrap();
        let born_id = born.id.unwrap();

        assert_eq!(born.gender, gender);
        assert_eq!(service.father(&born).unwrap().unwrap().name, father);
        assert_eq!(service.mother(&born).unwrap().unwrap().name, mother);

        let mother = service.person(mother_id).unwrap();
        let father = service.require_by_name(father).unwrap();
        assert_eq!(mother.children.last(), Some(&born_id));
        assert_eq!(father.children.last(), Some(&born_id));
        assert_eq!(born.ancestors.len(), mother.ancestors.len() + 1);
    }
}

#[test]
fn birth_to_satya_adds_a_grand_daughter() {
    let service = seeded();
    service
        .add_child_to_mother(id_of(&service, "Satya"), "Priya", Gender::Female)
        .unwrap();

    let king = service.require_by_name("King Shan").unwrap();
    let grand_daughters = service.relatives(&king, RelationType::GrandDaughters).unwrap();
    assert_eq!(names(&grand_daughters), vec!["Chika", "Satvy", "Priya"]);
}

#[test]
fn queries_through_a_copy_taken_before_a_birth_see_the_new_child() {
    let service = seeded();
    let satya = service.require_by_name("Satya").unwrap();
    let priya = service
        .add_child_to_mother(satya.id.unwrap(), "Priya", Gender::Female)
        .unwrap();

    assert_eq!(satya.children, vec![22, 24, 27]);
    let daughters = service.relatives(&satya, "Daughter(s)").unwrap();
    assert_eq!(names(&daughters), vec!["Satvy", "Priya"]);
    assert_eq!(service.describe_relation(&satya, &priya).unwrap(), "Daughter");

    let vyan = service.spouse(&satya).unwrap().unwrap();
    assert_eq!(service.describe_relation(&vyan, &priya).unwrap(), "Daughter");
    let siblings = service.siblings(&priya, None).unwrap();
    assert_eq!(names(&siblings), vec!["Satvy", "Savya", "Saayan"]);
}

#[test]
fn birth_names_are_title_cased_and_unique() {
    let service = seeded();
    let jaya_id = id_of(&service, "Jaya");

    let drini = service
        .add_child_to_mother(jaya_id, "  dRINI ", Gender::Female)
        .unwrap();
    assert_eq!(drini.name, "Drini");

    let err = service
        .add_child_to_mother(jaya_id, "drini", Gender::Male)
        .unwrap_err();
    assert!(matches!(err, FamilyError::DuplicateName(name) if name == "Drini"));

    let err = service
        .add_child_to_mother(jaya_id, "   ", Gender::Male)
        .unwrap_err();
    assert!(matches!(err, FamilyError::InvalidName));
}

#[test]
fn only_married_women_can_give_birth() {
    let service = seeded();

    let err = service
        .add_child_to_mother(id_of(&service, "Ish"), "Tara", Gender::Female)
        .unwrap_err();
    assert!(matches!(err, FamilyError::NotAMother(3)));

    let err = service
        .add_child_to_mother(999, "Tara", Gender::Female)
        .unwrap_err();
    assert!(matches!(err, FamilyError::NotFound(999)));
}

#[test]
fn unmarried_daughter_is_not_a_mother() {
    let service = seeded();
    let vanya = service
        .add_child_to_mother(id_of(&service, "Lavnya"), "Vanya", Gender::Female)
        .unwrap();

    let err = service
        .add_child_to_mother(vanya.id.unwrap(), "Tara", Gender::Female)
        .unwrap_err();
    assert!(matches!(err, FamilyError::NotAMother(id) if Some(id) == vanya.id));
}

#[test]
fn mothers_with_most_daughters_track_new_births() {
    let service = seeded();
    let most_daughters = |service: &FamilyService<InMemoryPersonRepository>| {
        service
            .mothers_with_most_children(Some(Gender::Female))
            .unwrap()
            .into_iter()
            .map(|person| person.name)
            .collect::<Vec<_>>()
    };

    assert_eq!(
        most_daughters(&service),
        vec!["Queen Anga", "Jaya", "Lika", "Jnki", "Satya"]
    );

    service
        .add_child_to_mother(id_of(&service, "Jaya"), "Drini", Gender::Female)
        .unwrap();
    assert_eq!(most_daughters(&service), vec!["Jaya"]);

    service
        .add_child_to_mother(id_of(&service, "Lika"), "Mini", Gender::Female)
        .unwrap();
    assert_eq!(most_daughters(&service), vec!["Jaya", "Lika"]);
}

#[test]
fn mothers_with_most_children_counts_every_child_without_a_filter() {
    let service = seeded();
    let mothers = service.mothers_with_most_children(None).unwrap();
    assert_eq!(names(&mothers), vec!["Queen Anga"]);

    let sons = service.mothers_with_most_children(Some(Gender::Male)).unwrap();
    assert_eq!(names(&sons), vec!["Queen Anga"]);
}

#[test]
fn mothers_query_is_empty_without_children() {
    let service = FamilyService::new(InMemoryPersonRepository::new());
    assert!(service.mothers_with_most_children(None).unwrap().is_empty());

    let mut king = Person::new("King Shan", Gender::Male);
    let king_id = service.save(&mut king).unwrap();
    service
        .marry_into(king_id, "Queen Anga", Gender::Female)
        .unwrap();
    assert!(service
        .mothers_with_most_children(Some(Gender::Female))
        .unwrap()
        .is_empty());
}
