//! Types shared by the tests of this crate.

use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;

use vc_shape::{
    ArgError, Constructor, ConstructorArgs, DynamicValue, FieldInfo, Mapped, MarkupDecl, ParamInfo, RecordInfo, Shape, ShapeCell,
    Typed,
};

// -----------------------------------------------------------------------------
// Plain records

#[derive(Debug, Default, PartialEq)]
pub(crate) struct Basket {
    pub id: u32,
    pub fruits: Vec<String>,
    pub tags: Vec<String>,
    pub note: Option<String>,
}

impl Typed for Basket {
    fn type_shape() -> &'static Shape {
        static CELL: ShapeCell = ShapeCell::new();
        CELL.get_or_init(|| {
            Shape::record::<Self>(
                RecordInfo::new([
                    FieldInfo::new("Id", |b: &Basket| &b.id)
                        .with_setter(|b: &mut Basket, v| b.id = v)
                        .attribute("id"),
                    FieldInfo::new("Fruits", |b: &Basket| &b.fruits)
                        .with_setter(|b: &mut Basket, v| b.fruits = v)
                        .element("Fruit"),
                    FieldInfo::new("Tags", |b: &Basket| &b.tags)
                        .with_setter(|b: &mut Basket, v| b.tags = v)
                        .renamed("Labels"),
                    FieldInfo::new("Note", |b: &Basket| &b.note).with_setter(|b: &mut Basket, v| b.note = v),
                ])
                .with_default::<Self>(),
            )
        })
    }
}

#[derive(Debug, Default, PartialEq)]
pub(crate) struct Node {
    pub name: String,
    pub children: Vec<Node>,
}

impl Typed for Node {
    fn type_shape() -> &'static Shape {
        static CELL: ShapeCell = ShapeCell::new();
        CELL.get_or_init(|| {
            Shape::record::<Self>(
                RecordInfo::new([
                    FieldInfo::new("Name", |n: &Node| &n.name)
                        .with_setter(|n: &mut Node, v| n.name = v)
                        .attribute("name"),
                    FieldInfo::new("Children", |n: &Node| &n.children)
                        .with_setter(|n: &mut Node, v| n.children = v)
                        .item_name("Child"),
                ])
                .with_default::<Self>(),
            )
        })
    }
}

/// Text content next to an attribute.
#[derive(Debug, Default, PartialEq)]
pub(crate) struct Price {
    pub currency: String,
    pub amount: String,
}

impl Typed for Price {
    fn type_shape() -> &'static Shape {
        static CELL: ShapeCell = ShapeCell::new();
        CELL.get_or_init(|| {
            Shape::record::<Self>(
                RecordInfo::new([
                    FieldInfo::new("Currency", |p: &Price| &p.currency)
                        .with_setter(|p: &mut Price, v| p.currency = v)
                        .attribute("currency"),
                    FieldInfo::new("Amount", |p: &Price| &p.amount)
                        .with_setter(|p: &mut Price, v| p.amount = v)
                        .text(),
                ])
                .with_default::<Self>(),
            )
        })
    }
}

/// Text content followed by a child element.
#[derive(Debug, Default, PartialEq)]
pub(crate) struct Memo {
    pub body: String,
    pub title: String,
}

impl Typed for Memo {
    fn type_shape() -> &'static Shape {
        static CELL: ShapeCell = ShapeCell::new();
        CELL.get_or_init(|| {
            Shape::record::<Self>(
                RecordInfo::new([
                    FieldInfo::new("Body", |m: &Memo| &m.body)
                        .with_setter(|m: &mut Memo, v| m.body = v)
                        .text(),
                    FieldInfo::new("Title", |m: &Memo| &m.title).with_setter(|m: &mut Memo, v| m.title = v),
                ])
                .with_default::<Self>(),
            )
        })
    }
}

#[derive(Debug, Default, PartialEq)]
pub(crate) struct Envelope {
    pub kind: String,
    pub body: DynamicValue,
}

impl Typed for Envelope {
    fn type_shape() -> &'static Shape {
        static CELL: ShapeCell = ShapeCell::new();
        CELL.get_or_init(|| {
            Shape::record::<Self>(
                RecordInfo::new([
                    FieldInfo::new("Kind", |e: &Envelope| &e.kind)
                        .with_setter(|e: &mut Envelope, v| e.kind = v)
                        .attribute("kind"),
                    FieldInfo::new("Body", |e: &Envelope| &e.body).with_setter(|e: &mut Envelope, v| e.body = v),
                ])
                .with_default::<Self>(),
            )
        })
    }
}

// -----------------------------------------------------------------------------
// Construction

/// Built by one of three constructors, `built_with` tells which.
#[derive(Debug, PartialEq)]
pub(crate) struct Triple {
    pub a: i32,
    pub b: String,
    pub c: Option<bool>,
    pub extra: Option<String>,
    pub built_with: u8,
}

impl Typed for Triple {
    fn type_shape() -> &'static Shape {
        static CELL: ShapeCell = ShapeCell::new();
        CELL.get_or_init(|| {
            let by_a = |args: &mut ConstructorArgs| -> Result<Triple, ArgError> {
                Ok(Triple {
                    a: args.take("a")?,
                    b: String::new(),
                    c: None,
                    extra: None,
                    built_with: 1,
                })
            };
            let by_a_b = |args: &mut ConstructorArgs| -> Result<Triple, ArgError> {
                Ok(Triple {
                    a: args.take("a")?,
                    b: args.take("b")?,
                    c: None,
                    extra: None,
                    built_with: 2,
                })
            };
            let by_a_b_c = |args: &mut ConstructorArgs| -> Result<Triple, ArgError> {
                Ok(Triple {
                    a: args.take("a")?,
                    b: args.take("b")?,
                    c: args.take("c")?,
                    extra: None,
                    built_with: 3,
                })
            };

            Shape::record::<Self>(
                RecordInfo::new([
                    FieldInfo::new("A", |t: &Triple| &t.a),
                    FieldInfo::new("B", |t: &Triple| &t.b),
                    FieldInfo::new("C", |t: &Triple| &t.c).with_setter(|t: &mut Triple, v| t.c = v),
                    FieldInfo::new("Extra", |t: &Triple| &t.extra).with_setter(|t: &mut Triple, v| t.extra = v),
                ])
                .with_constructor(Constructor::new(by_a).with_param(ParamInfo::new::<i32>("a")))
                .with_constructor(
                    Constructor::new(by_a_b)
                        .with_param(ParamInfo::new::<i32>("a"))
                        .with_param(ParamInfo::new::<String>("b")),
                )
                .with_constructor(
                    Constructor::new(by_a_b_c)
                        .with_param(ParamInfo::new::<i32>("a"))
                        .with_param(ParamInfo::new::<String>("b"))
                        .with_param(ParamInfo::new::<Option<bool>>("c")),
                ),
            )
        })
    }
}

// -----------------------------------------------------------------------------
// Interfaces

pub(crate) trait Pet: Mapped {
    fn sound(&self) -> &'static str;
}

vc_shape::impl_interface!(Pet);

/// The concrete pet behind `pet`, if it is a `T`.
pub(crate) fn concrete<T: Typed>(pet: &dyn Pet) -> Option<&T> {
    let pet: &dyn Mapped = pet;
    pet.downcast_ref::<T>()
}

#[derive(Debug, Default, PartialEq)]
pub(crate) struct Dog {
    pub name: String,
    pub good: bool,
}

impl Pet for Dog {
    fn sound(&self) -> &'static str {
        "woof"
    }
}

impl Typed for Dog {
    fn type_shape() -> &'static Shape {
        static CELL: ShapeCell = ShapeCell::new();
        CELL.get_or_init(|| {
            Shape::record::<Self>(
                RecordInfo::new([
                    FieldInfo::new("Name", |d: &Dog| &d.name).with_setter(|d: &mut Dog, v| d.name = v),
                    FieldInfo::new("Good", |d: &Dog| &d.good)
                        .with_setter(|d: &mut Dog, v| d.good = v)
                        .attribute("good"),
                ])
                .with_default::<Self>(),
            )
            .with_cast(|d: Dog| Box::new(d) as Box<dyn Pet>)
        })
    }
}

#[derive(Debug, Default, PartialEq)]
pub(crate) struct Cat {
    pub name: String,
    pub lives: u8,
}

impl Pet for Cat {
    fn sound(&self) -> &'static str {
        "meow"
    }
}

impl Typed for Cat {
    fn type_shape() -> &'static Shape {
        static CELL: ShapeCell = ShapeCell::new();
        CELL.get_or_init(|| {
            Shape::record::<Self>(
                RecordInfo::new([
                    FieldInfo::new("Name", |c: &Cat| &c.name).with_setter(|c: &mut Cat, v| c.name = v),
                    FieldInfo::new("Lives", |c: &Cat| &c.lives)
                        .with_setter(|c: &mut Cat, v| c.lives = v)
                        .attribute("lives"),
                ])
                .with_default::<Self>(),
            )
            .with_cast(|c: Cat| Box::new(c) as Box<dyn Pet>)
        })
    }
}

vc_shape::register_type!(Dog, Cat);

pub(crate) mod other {
    use alloc::boxed::Box;

    use vc_shape::{RecordInfo, Shape, ShapeCell, Typed};

    use super::Pet;

    /// Shares its short name with [`super::Dog`].
    #[derive(Debug, Default)]
    pub(crate) struct Dog;

    impl Pet for Dog {
        fn sound(&self) -> &'static str {
            "yip"
        }
    }

    impl Typed for Dog {
        fn type_shape() -> &'static Shape {
            static CELL: ShapeCell = ShapeCell::new();
            CELL.get_or_init(|| {
                Shape::record::<Self>(RecordInfo::new([]).with_default::<Self>())
                    .with_cast(|d: Dog| Box::new(d) as Box<dyn Pet>)
            })
        }
    }
}

pub(crate) trait Tagged: Mapped {}

vc_shape::impl_interface!(Tagged, [("Code", MarkupDecl::Attribute("code"))]);

/// Leaves the markup of `Code` to the interfaces it implements.
#[derive(Debug, Default, PartialEq)]
pub(crate) struct Badge {
    pub code: String,
}

impl Tagged for Badge {}

impl Typed for Badge {
    fn type_shape() -> &'static Shape {
        static CELL: ShapeCell = ShapeCell::new();
        CELL.get_or_init(|| {
            Shape::record::<Self>(
                RecordInfo::new([
                    FieldInfo::new("Code", |b: &Badge| &b.code).with_setter(|b: &mut Badge, v| b.code = v)
                ])
                .with_default::<Self>(),
            )
            .with_cast(|b: Badge| Box::new(b) as Box<dyn Tagged>)
        })
    }
}

#[derive(Default)]
pub(crate) struct Kennel {
    pub pets: Vec<Box<dyn Pet>>,
    pub favorite: Option<Box<dyn Pet>>,
}

impl Typed for Kennel {
    fn type_shape() -> &'static Shape {
        static CELL: ShapeCell = ShapeCell::new();
        CELL.get_or_init(|| {
            Shape::record::<Self>(
                RecordInfo::new([
                    FieldInfo::new("Pets", |k: &Kennel| &k.pets).with_setter(|k: &mut Kennel, v| k.pets = v),
                    FieldInfo::new("Favorite", |k: &Kennel| &k.favorite)
                        .with_setter(|k: &mut Kennel, v| k.favorite = v),
                ])
                .with_default::<Self>(),
            )
        })
    }
}

// -----------------------------------------------------------------------------
// Encryption

/// Three independently encrypted fields.
#[derive(Debug, Default, PartialEq)]
pub(crate) struct Wallet {
    pub owner: String,
    pub pin: u32,
    pub card: String,
    pub memo: String,
}

impl Typed for Wallet {
    fn type_shape() -> &'static Shape {
        static CELL: ShapeCell = ShapeCell::new();
        CELL.get_or_init(|| {
            Shape::record::<Self>(
                RecordInfo::new([
                    FieldInfo::new("Owner", |w: &Wallet| &w.owner).with_setter(|w: &mut Wallet, v| w.owner = v),
                    FieldInfo::new("Pin", |w: &Wallet| &w.pin)
                        .with_setter(|w: &mut Wallet, v| w.pin = v)
                        .attribute("pin")
                        .encrypted(),
                    FieldInfo::new("Card", |w: &Wallet| &w.card)
                        .with_setter(|w: &mut Wallet, v| w.card = v)
                        .encrypted(),
                    FieldInfo::new("Memo", |w: &Wallet| &w.memo)
                        .with_setter(|w: &mut Wallet, v| w.memo = v)
                        .encrypted(),
                ])
                .with_default::<Self>(),
            )
        })
    }
}

/// A type encrypted wherever it appears.
#[derive(Debug, Default, PartialEq)]
pub(crate) struct Vault {
    pub hint: u32,
    pub code: String,
}

impl Typed for Vault {
    fn type_shape() -> &'static Shape {
        static CELL: ShapeCell = ShapeCell::new();
        CELL.get_or_init(|| {
            Shape::record::<Self>(
                RecordInfo::new([
                    FieldInfo::new("Hint", |v: &Vault| &v.hint)
                        .with_setter(|v: &mut Vault, x| v.hint = x)
                        .attribute("hint"),
                    FieldInfo::new("Code", |v: &Vault| &v.code).with_setter(|v: &mut Vault, x| v.code = x),
                ])
                .with_default::<Self>(),
            )
            .encrypted()
        })
    }
}

#[derive(Debug, Default, PartialEq)]
pub(crate) struct Holder {
    pub label: String,
    pub vault: Vault,
}

impl Typed for Holder {
    fn type_shape() -> &'static Shape {
        static CELL: ShapeCell = ShapeCell::new();
        CELL.get_or_init(|| {
            Shape::record::<Self>(
                RecordInfo::new([
                    FieldInfo::new("Label", |h: &Holder| &h.label).with_setter(|h: &mut Holder, v| h.label = v),
                    FieldInfo::new("Vault", |h: &Holder| &h.vault).with_setter(|h: &mut Holder, v| h.vault = v),
                ])
                .with_default::<Self>(),
            )
        })
    }
}

/// An encrypted inline list, which takes over the whole content.
#[derive(Debug, Default, PartialEq)]
pub(crate) struct Ledger {
    pub owner: String,
    pub entries: Vec<String>,
}

impl Typed for Ledger {
    fn type_shape() -> &'static Shape {
        static CELL: ShapeCell = ShapeCell::new();
        CELL.get_or_init(|| {
            Shape::record::<Self>(
                RecordInfo::new([
                    FieldInfo::new("Owner", |l: &Ledger| &l.owner)
                        .with_setter(|l: &mut Ledger, v| l.owner = v)
                        .attribute("owner"),
                    FieldInfo::new("Entries", |l: &Ledger| &l.entries)
                        .with_collection(|l: &mut Ledger| &mut l.entries)
                        .element("Entry")
                        .encrypted(),
                ])
                .with_default::<Self>(),
            )
        })
    }
}

#[derive(Debug, Default, PartialEq)]
pub(crate) struct Profile {
    pub name: String,
    pub phone: String,
    pub verified: bool,
    pub city: String,
}

impl Typed for Profile {
    fn type_shape() -> &'static Shape {
        static CELL: ShapeCell = ShapeCell::new();
        CELL.get_or_init(|| {
            Shape::record::<Self>(
                RecordInfo::new([
                    FieldInfo::new("Name", |p: &Profile| &p.name)
                        .with_setter(|p: &mut Profile, v| p.name = v)
                        .redacted(),
                    FieldInfo::new("Phone", |p: &Profile| &p.phone)
                        .with_setter(|p: &mut Profile, v| p.phone = v)
                        .attribute("phone")
                        .redacted(),
                    FieldInfo::new("Verified", |p: &Profile| &p.verified)
                        .with_setter(|p: &mut Profile, v| p.verified = v)
                        .redacted(),
                    FieldInfo::new("City", |p: &Profile| &p.city).with_setter(|p: &mut Profile, v| p.city = v),
                ])
                .with_default::<Self>(),
            )
        })
    }
}

// -----------------------------------------------------------------------------
// Inheritance

#[derive(Debug, Default, PartialEq)]
pub(crate) struct Animal {
    pub id: u32,
}

impl Typed for Animal {
    fn type_shape() -> &'static Shape {
        static CELL: ShapeCell = ShapeCell::new();
        CELL.get_or_init(|| {
            Shape::record::<Self>(
                RecordInfo::new([FieldInfo::new("Id", |a: &Animal| &a.id)
                    .with_setter(|a: &mut Animal, v| a.id = v)
                    .attribute("id")])
                .with_default::<Self>(),
            )
        })
    }
}

#[derive(Debug, Default, PartialEq)]
pub(crate) struct Puppy {
    pub animal: Animal,
    pub age: u8,
}

impl Typed for Puppy {
    fn type_shape() -> &'static Shape {
        static CELL: ShapeCell = ShapeCell::new();
        CELL.get_or_init(|| {
            Shape::record::<Self>(
                RecordInfo::new([
                    FieldInfo::new("Age", |p: &Puppy| &p.age).with_setter(|p: &mut Puppy, v| p.age = v),
                ])
                .with_base(|p: &Puppy| &p.animal, |p: &mut Puppy| &mut p.animal)
                .with_default::<Self>(),
            )
        })
    }
}

/// Redeclares the base attribute `Id` as an element.
#[derive(Debug, Default)]
pub(crate) struct Stray {
    pub animal: Animal,
}

impl Typed for Stray {
    fn type_shape() -> &'static Shape {
        static CELL: ShapeCell = ShapeCell::new();
        CELL.get_or_init(|| {
            Shape::record::<Self>(
                RecordInfo::new([FieldInfo::new("Id", |s: &Stray| &s.animal.id).element("Id")])
                    .with_base(|s: &Stray| &s.animal, |s: &mut Stray| &mut s.animal)
                    .with_default::<Self>(),
            )
        })
    }
}
