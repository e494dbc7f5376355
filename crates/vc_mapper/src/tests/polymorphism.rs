use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec;

use super::models::{Basket, Cat, Dog, Holder, Kennel, Pet, concrete};
use crate::{DocumentErrorKind, JsonMapper, MapperOptions, XmlMapper};

fn options() -> MapperOptions {
    MapperOptions::new().with_extra_type::<Dog>().with_extra_type::<Cat>()
}

fn rex() -> Dog {
    Dog {
        name: String::from("Rex"),
        good: true,
    }
}

fn tom() -> Cat {
    Cat {
        name: String::from("Tom"),
        lives: 9,
    }
}

#[test]
fn concrete_types_survive_xml() {
    let mapper = XmlMapper::<Kennel>::new(options()).unwrap();
    let kennel = Kennel {
        pets: vec![Box::new(rex()), Box::new(tom())],
        favorite: Some(Box::new(tom())),
    };

    let xml = mapper.serialize(&kennel).unwrap();
    assert!(xml.contains(concat!(
        r#"<Pets><Pet xsi:type="Dog" good="true"><Name>Rex</Name></Pet>"#,
        r#"<Pet xsi:type="Cat" lives="9"><Name>Tom</Name></Pet></Pets>"#,
    )));
    assert!(xml.contains(r#"<Favorite xsi:type="Cat" lives="9"><Name>Tom</Name></Favorite>"#));

    let back = mapper.deserialize(&xml).unwrap();
    assert_eq!(back.pets.len(), 2);
    assert_eq!(concrete::<Dog>(&*back.pets[0]), Some(&rex()));
    assert_eq!(concrete::<Cat>(&*back.pets[1]), Some(&tom()));
    assert_eq!(back.favorite.as_deref().map(|pet| pet.sound()), Some("meow"));
}

#[test]
fn each_graph_keeps_its_own_type() {
    let mapper = JsonMapper::<Kennel>::new(options()).unwrap();
    let with_dog = Kennel {
        pets: vec![],
        favorite: Some(Box::new(rex())),
    };
    let with_cat = Kennel {
        pets: vec![],
        favorite: Some(Box::new(tom())),
    };

    let dog_json = mapper.serialize(&with_dog).unwrap();
    assert_eq!(dog_json, r#"{"Pets":[],"Favorite":{"$type":"Dog","good":true,"Name":"Rex"}}"#);
    let cat_json = mapper.serialize(&with_cat).unwrap();

    let dog = mapper.deserialize(&dog_json).unwrap().favorite.unwrap();
    let cat = mapper.deserialize(&cat_json).unwrap().favorite.unwrap();
    assert_eq!(concrete::<Dog>(&*dog), Some(&rex()));
    assert!(concrete::<Cat>(&*dog).is_none());
    assert_eq!(concrete::<Cat>(&*cat), Some(&tom()));
}

#[test]
fn nil_interfaces() {
    let mapper = XmlMapper::<Kennel>::new(options().with_always_emit_nil(true)).unwrap();
    let xml = mapper.serialize(&Kennel::default()).unwrap();
    assert!(xml.ends_with(r#"><Pets /><Favorite xsi:nil="true" /></Kennel>"#));
    assert!(mapper.deserialize(&xml).unwrap().favorite.is_none());

    let quiet = XmlMapper::<Kennel>::new(options()).unwrap();
    assert!(!quiet.serialize(&Kennel::default()).unwrap().contains("Favorite"));

    let json = JsonMapper::<Kennel>::new(options().with_always_emit_nil(true)).unwrap();
    let text = json.serialize(&Kennel::default()).unwrap();
    assert_eq!(text, r#"{"Pets":[],"Favorite":null}"#);
    assert!(json.deserialize(&text).unwrap().favorite.is_none());
}

#[test]
fn missing_and_unknown_tags() {
    let mapper = XmlMapper::<Kennel>::new(options()).unwrap();

    let untagged = r#"<Kennel><Favorite lives="1"><Name>Kit</Name></Favorite></Kennel>"#;
    let error = mapper.deserialize(untagged).map(|_| ()).unwrap_err();
    assert!(matches!(error.document_kind(), Some(DocumentErrorKind::NoTypeHint(_))));

    let unknown = r#"<Kennel><Favorite xsi:type="Fish"><Name>Nemo</Name></Favorite></Kennel>"#;
    let error = mapper.deserialize(unknown).map(|_| ()).unwrap_err();
    assert!(matches!(
        error.document_kind(),
        Some(DocumentErrorKind::UnknownTypeHint(tag)) if tag == "Fish"
    ));

    let unlisted = XmlMapper::<Kennel>::new(MapperOptions::new()).unwrap();
    let tagged = r#"<Kennel><Favorite xsi:type="Dog"><Name>Rex</Name></Favorite></Kennel>"#;
    assert!(unlisted.deserialize(tagged).is_err());
    assert!(mapper.deserialize(tagged).unwrap().favorite.is_some());
}

#[test]
fn tags_naming_other_types_are_incompatible() {
    let mapper = XmlMapper::<Kennel>::new(options().with_extra_type::<Basket>()).unwrap();
    let error = mapper
        .deserialize(r#"<Kennel><Favorite xsi:type="Basket" id="1" /></Kennel>"#)
        .map(|_| ())
        .unwrap_err();
    assert!(matches!(
        error.document_kind(),
        Some(DocumentErrorKind::IncompatibleTypeHint { hint, .. }) if hint == "Basket"
    ));

    let holder = XmlMapper::<Holder>::new(options()).unwrap();
    let error = holder
        .deserialize(r#"<Holder><Vault xsi:type="Dog" /></Holder>"#)
        .unwrap_err();
    assert!(matches!(
        error.document_kind(),
        Some(DocumentErrorKind::IncompatibleTypeHint { hint, .. }) if hint == "Dog"
    ));
}

#[cfg(feature = "auto_register")]
#[test]
fn registered_types_resolve_tags() {
    let mapper = XmlMapper::<Kennel>::new(MapperOptions::new().with_registered_types()).unwrap();
    let kennel = Kennel {
        pets: vec![Box::new(tom())],
        favorite: None,
    };
    let xml = mapper.serialize(&kennel).unwrap();
    let back = mapper.deserialize(&xml).unwrap();
    assert_eq!(concrete::<Cat>(&*back.pets[0]), Some(&tom()));
}
