use alloc::string::{String, ToString};
use alloc::sync::Arc;
use alloc::vec;
use alloc::vec::Vec;
use std::sync::Mutex;

use alloc::boxed::Box;

use vc_markup::xml::{self, XmlReader};
use vc_markup::{Flavor, MarkupError, MarkupReader, MarkupWriter, Position, Token, TokenBuffer};

use super::models::{Basket, Holder, Ledger, Vault, Wallet};
use crate::{
    DocumentErrorKind, EncryptionError, EncryptionMechanism, JsonMapper, Mapper, MapperOptions, MarkupFormat,
    SerializationState, Xml, XmlMapper,
};

/// Reverses the text behind an `ENC:` prefix.
struct Reverse;

fn reverse(text: &str) -> String {
    text.chars().rev().collect()
}

impl EncryptionMechanism for Reverse {
    fn encrypt(&self, plaintext: &str, _: Option<&str>, _: &mut SerializationState) -> Result<String, EncryptionError> {
        Ok(alloc::format!("ENC:{}", reverse(plaintext)))
    }

    fn decrypt(&self, ciphertext: &str, _: Option<&str>, _: &mut SerializationState) -> Result<String, EncryptionError> {
        ciphertext
            .strip_prefix("ENC:")
            .map(reverse)
            .ok_or_else(|| EncryptionError::Decrypt(String::from("missing prefix")))
    }
}

/// Logs each call with the state id and key it was given.
#[derive(Default)]
struct Recorder {
    calls: Mutex<Vec<(&'static str, u64, Option<String>)>>,
}

impl Recorder {
    fn record(&self, op: &'static str, key: Option<&str>, state: &SerializationState) {
        let mut calls = self.calls.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        calls.push((op, state.id(), key.map(ToString::to_string)));
    }

    fn take(&self) -> Vec<(&'static str, u64, Option<String>)> {
        core::mem::take(&mut *self.calls.lock().unwrap())
    }
}

impl EncryptionMechanism for Recorder {
    fn encrypt(&self, plaintext: &str, key: Option<&str>, state: &mut SerializationState) -> Result<String, EncryptionError> {
        self.record("encrypt", key, state);
        Reverse.encrypt(plaintext, key, state)
    }

    fn decrypt(&self, ciphertext: &str, key: Option<&str>, state: &mut SerializationState) -> Result<String, EncryptionError> {
        self.record("decrypt", key, state);
        Reverse.decrypt(ciphertext, key, state)
    }
}

/// XML whose decrypted fragments lose their last token.
struct Truncated;

struct TruncatedReader<'a>(XmlReader<'a>);

impl MarkupReader for TruncatedReader<'_> {
    fn flavor(&self) -> Flavor {
        Flavor::Xml
    }

    fn next_token(&mut self) -> Result<Option<Token>, MarkupError> {
        self.0.next_token()
    }

    fn position(&self) -> Position {
        self.0.position()
    }

    fn fragment(&self, text: &str) -> Result<TokenBuffer, MarkupError> {
        let mut full = xml::read_fragment(text)?;
        let mut tokens = Vec::new();
        while let Some(token) = full.next_token()? {
            tokens.push(token);
        }
        tokens.pop();
        Ok(TokenBuffer::new(Flavor::Xml, tokens))
    }
}

impl MarkupFormat for Truncated {
    fn writer(options: &MapperOptions) -> Box<dyn MarkupWriter> {
        Xml::writer(options)
    }

    fn reader(text: &str) -> Result<Box<dyn MarkupReader + '_>, MarkupError> {
        Ok(Box::new(TruncatedReader(XmlReader::new(text))))
    }
}

fn wallet() -> Wallet {
    Wallet {
        owner: String::from("Ann"),
        pin: 1234,
        card: String::from("4111"),
        memo: String::from("hi"),
    }
}

fn reversing() -> MapperOptions {
    MapperOptions::new().with_mechanism(Reverse)
}

#[test]
fn encrypted_fields() {
    let mapper = XmlMapper::<Wallet>::new(reversing()).unwrap();
    let xml = mapper.serialize(&wallet()).unwrap();
    assert!(xml.contains(r#" pin="ENC:4321">"#));
    assert!(xml.contains("<Owner>Ann</Owner>"));
    assert!(xml.contains("<Card>ENC:1114</Card>"));
    assert!(xml.contains("<Memo>ENC:ih</Memo>"));
    assert_eq!(mapper.deserialize(&xml).unwrap(), wallet());

    let json = JsonMapper::<Wallet>::new(reversing()).unwrap();
    let text = json.serialize(&wallet()).unwrap();
    assert_eq!(text, r#"{"pin":"ENC:4321","Owner":"Ann","Card":"ENC:1114","Memo":"ENC:ih"}"#);
    assert_eq!(json.deserialize(&text).unwrap(), wallet());
}

#[test]
fn clear_text_by_default() {
    let mapper = XmlMapper::<Wallet>::new(MapperOptions::new()).unwrap();
    let xml = mapper.serialize(&wallet()).unwrap();
    assert!(xml.contains(r#" pin="1234">"#));
    assert!(xml.contains("<Card>4111</Card>"));
    assert_eq!(mapper.deserialize(&xml).unwrap(), wallet());
}

#[test]
fn legacy_plain_text_is_accepted() {
    let mapper = XmlMapper::<Wallet>::new(reversing()).unwrap();
    let plain = r#"<Wallet pin="1234"><Owner>Ann</Owner><Card>4111</Card><Memo>hi</Memo></Wallet>"#;
    assert_eq!(mapper.deserialize(plain).unwrap(), wallet());
}

#[test]
fn one_state_per_call() {
    let recorder = Arc::new(Recorder::default());
    let options = MapperOptions::new()
        .with_shared_mechanism(recorder.clone())
        .with_encrypt_key("k1");
    let mapper = XmlMapper::<Wallet>::new(options).unwrap();

    let xml = mapper.serialize(&wallet()).unwrap();
    let first = recorder.take();
    assert_eq!(first.len(), 3);
    assert!(first.iter().all(|(op, id, key)| {
        *op == "encrypt" && *id == first[0].1 && key.as_deref() == Some("k1")
    }));

    mapper.serialize(&wallet()).unwrap();
    let second = recorder.take();
    assert_eq!(second.len(), 3);
    assert_ne!(second[0].1, first[0].1);

    mapper.deserialize(&xml).unwrap();
    let read = recorder.take();
    assert_eq!(read.len(), 3);
    assert!(read.iter().all(|(op, id, _)| *op == "decrypt" && *id == read[0].1));
    assert_ne!(read[0].1, second[0].1);
}

#[test]
fn encrypted_types() {
    let holder = Holder {
        label: String::from("main"),
        vault: Vault {
            hint: 3,
            code: String::from("abc"),
        },
    };

    let mapper = XmlMapper::<Holder>::new(reversing()).unwrap();
    let xml = mapper.serialize(&holder).unwrap();
    assert!(xml.contains(r#"<Vault hint="ENC:3">"#));
    assert!(!xml.contains("<Code>"));
    assert_eq!(mapper.deserialize(&xml).unwrap(), holder);

    let json = JsonMapper::<Holder>::new(reversing()).unwrap();
    let text = json.serialize(&holder).unwrap();
    assert!(text.starts_with(r#"{"Label":"main","Vault":"ENC:"#));
    assert!(!text.contains("Code"));
    assert_eq!(json.deserialize(&text).unwrap(), holder);
}

fn holder() -> Holder {
    Holder {
        label: String::from("main"),
        vault: Vault {
            hint: 3,
            code: String::from("abc"),
        },
    }
}

#[test]
fn decrypted_content_must_close_its_elements() {
    let xml = XmlMapper::<Holder>::new(reversing()).unwrap().serialize(&holder()).unwrap();

    let truncated = Mapper::<Holder, Truncated>::new(reversing()).unwrap();
    let error = truncated.deserialize(&xml).unwrap_err();
    assert!(matches!(error.document_kind(), Some(DocumentErrorKind::ScopeExitedEarly)));
}

#[test]
fn malformed_decrypted_content_is_an_error() {
    let mapper = XmlMapper::<Holder>::new(reversing()).unwrap();
    // `ENC:` followed by `<Code>abc` reversed and escaped.
    let xml = r#"<Holder><Label>main</Label><Vault hint="ENC:3">ENC:cba&gt;edoC&lt;</Vault></Holder>"#;
    let error = mapper.deserialize(xml).unwrap_err();
    let Some(DocumentErrorKind::MalformedFragment(source)) = error.document_kind() else {
        panic!("expected a malformed fragment, got {error}");
    };
    assert!(matches!(source, MarkupError::UnexpectedEof { element } if element == "Code"));

    let plain = r#"<Holder><Label>main</Label><Vault hint="3">abc</Vault></Holder>"#;
    assert_eq!(mapper.deserialize(plain).unwrap().vault.hint, 3);
}

#[test]
fn encrypted_inline_list() {
    let ledger = Ledger {
        owner: String::from("Bo"),
        entries: vec![String::from("+5"), String::from("-2")],
    };

    let mapper = XmlMapper::<Ledger>::new(reversing()).unwrap();
    let xml = mapper.serialize(&ledger).unwrap();
    assert!(xml.contains(r#" owner="Bo">ENC:"#));
    assert!(!xml.contains("<Entry>"));
    assert_eq!(mapper.deserialize(&xml).unwrap(), ledger);

    let json = JsonMapper::<Ledger>::new(reversing()).unwrap();
    let text = json.serialize(&ledger).unwrap();
    assert!(!text.contains("Entry"));
    assert_eq!(json.deserialize(&text).unwrap(), ledger);
}

#[test]
fn encrypted_root() {
    let basket = Basket {
        id: 4,
        fruits: vec![String::from("fig")],
        tags: Vec::new(),
        note: None,
    };
    let options = || reversing().with_encrypt_root(true);

    let mapper = XmlMapper::<Basket>::new(options()).unwrap();
    let xml = mapper.serialize(&basket).unwrap();
    assert!(!xml.contains("<Fruit>"));
    assert_eq!(mapper.deserialize(&xml).unwrap(), basket);

    let json = JsonMapper::<Basket>::new(options()).unwrap();
    let text = json.serialize(&basket).unwrap();
    assert!(text.starts_with(r#""ENC:"#));
    assert_eq!(json.deserialize(&text).unwrap(), basket);
}
