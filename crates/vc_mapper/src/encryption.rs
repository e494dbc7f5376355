use alloc::boxed::Box;
use alloc::string::String;
use core::any::{Any, TypeId};
use core::sync::atomic::{AtomicU64, Ordering};

use vc_shape::hash::{TypeIdMap, new_map};

use crate::EncryptionError;

// -----------------------------------------------------------------------------
// SerializationState

/// Opaque state shared by every mechanism call of one serialize or
/// deserialize call.
///
/// Mechanisms may stash anything here, one value per type, e.g. a derived key
/// or an invocation counter. A fresh state is created for each call.
///
/// # Examples
///
/// ```
/// use vc_mapper::SerializationState;
///
/// let mut state = SerializationState::new();
/// *state.get_or_insert_with(|| 0_u32) += 1;
/// *state.get_or_insert_with(|| 0_u32) += 1;
/// assert_eq!(state.get::<u32>(), Some(&2));
/// assert_ne!(state.id(), SerializationState::new().id());
/// ```
pub struct SerializationState {
    id: u64,
    entries: TypeIdMap<Box<dyn Any + Send>>,
}

impl SerializationState {
    pub fn new() -> Self {
        static NEXT_ID: AtomicU64 = AtomicU64::new(1);
        Self {
            id: NEXT_ID.fetch_add(1, Ordering::Relaxed),
            entries: new_map(),
        }
    }

    /// A process-unique identifier of this state.
    #[inline]
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn get<T: Any>(&self) -> Option<&T> {
        self.entries
            .get(&TypeId::of::<T>())
            .and_then(|entry| (**entry).downcast_ref::<T>())
    }

    pub fn get_or_insert_with<T: Any + Send>(&mut self, f: impl FnOnce() -> T) -> &mut T {
        let entry = self
            .entries
            .entry(TypeId::of::<T>())
            .or_insert_with(|| Box::new(f()));
        match (**entry).downcast_mut::<T>() {
            Some(value) => value,
            None => unreachable!("entries are keyed by their own type"),
        }
    }
}

// -----------------------------------------------------------------------------
// EncryptionMechanism

/// Encrypts and decrypts the content of encrypted fields and types.
pub trait EncryptionMechanism: Send + Sync {
    fn encrypt(
        &self,
        plaintext: &str,
        key: Option<&str>,
        state: &mut SerializationState,
    ) -> Result<String, EncryptionError>;

    fn decrypt(
        &self,
        ciphertext: &str,
        key: Option<&str>,
        state: &mut SerializationState,
    ) -> Result<String, EncryptionError>;
}

/// The identity mechanism, used when none is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClearTextMechanism;

impl EncryptionMechanism for ClearTextMechanism {
    #[inline]
    fn encrypt(&self, plaintext: &str, _: Option<&str>, _: &mut SerializationState) -> Result<String, EncryptionError> {
        Ok(String::from(plaintext))
    }

    #[inline]
    fn decrypt(&self, ciphertext: &str, _: Option<&str>, _: &mut SerializationState) -> Result<String, EncryptionError> {
        Ok(String::from(ciphertext))
    }
}

// -----------------------------------------------------------------------------
// EncryptionScope

/// Encryption state of one serialize or deserialize call.
///
/// At most one scope region is active at a time: entering while active does
/// nothing and reports `false`, so only the outermost encrypted value or type
/// is routed through the mechanism.
pub(crate) struct EncryptionScope<'a> {
    mechanism: &'a dyn EncryptionMechanism,
    key: Option<&'a str>,
    state: SerializationState,
    active: bool,
}

impl<'a> EncryptionScope<'a> {
    pub fn new(mechanism: &'a dyn EncryptionMechanism, key: Option<&'a str>) -> Self {
        Self {
            mechanism,
            key,
            state: SerializationState::new(),
            active: false,
        }
    }

    /// Activates the scope. Returns `false` if it already was.
    #[inline]
    pub fn enter(&mut self) -> bool {
        !core::mem::replace(&mut self.active, true)
    }

    #[inline]
    pub fn exit(&mut self) {
        self.active = false;
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn encrypt(&mut self, plaintext: &str) -> Result<String, EncryptionError> {
        self.mechanism.encrypt(plaintext, self.key, &mut self.state)
    }

    pub fn decrypt(&mut self, ciphertext: &str) -> Result<String, EncryptionError> {
        self.mechanism.decrypt(ciphertext, self.key, &mut self.state)
    }
}
