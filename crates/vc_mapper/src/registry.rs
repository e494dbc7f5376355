use alloc::sync::Arc;
use alloc::vec::Vec;
use core::any::TypeId;
use std::sync::{LazyLock, PoisonError, RwLock};

use vc_shape::Shape;
use vc_shape::hash::{HashMap, new_map, new_set};

use crate::{ConfigError, PlanOptions, TypePlan};

#[derive(Clone, PartialEq, Eq, Hash)]
struct PlanKey {
    id: TypeId,
    encrypted: bool,
    options: Arc<PlanOptions>,
}

/// Cache of built [`TypePlan`]s, keyed by type, encryption marker and options.
///
/// Lookups take a read lock. A missing plan is built outside the lock and
/// then published; concurrent first builds of the same key may both run, and
/// the last one to publish wins. Plans are pure functions of their key, so
/// either result is correct.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
///
/// use vc_mapper::{PlanOptions, TypePlanRegistry};
/// use vc_shape::Typed;
///
/// let registry = TypePlanRegistry::new();
/// let options = Arc::new(PlanOptions::default());
///
/// let first = registry.get_plan(u32::type_shape(), false, &options).unwrap();
/// let again = registry.get_plan(u32::type_shape(), false, &options).unwrap();
/// assert!(Arc::ptr_eq(&first, &again));
/// assert_eq!(registry.len(), 1);
/// ```
pub struct TypePlanRegistry {
    plans: RwLock<HashMap<PlanKey, Arc<TypePlan>>>,
}

impl Default for TypePlanRegistry {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl TypePlanRegistry {
    #[inline]
    pub const fn new() -> Self {
        Self {
            plans: RwLock::new(new_map()),
        }
    }

    /// The process-wide registry used by default.
    pub fn global() -> Arc<TypePlanRegistry> {
        static GLOBAL: LazyLock<Arc<TypePlanRegistry>> = LazyLock::new(|| Arc::new(TypePlanRegistry::new()));
        GLOBAL.clone()
    }

    /// Returns the plan of `shape`, building it on first request.
    pub fn get_plan(
        &self,
        shape: &'static Shape,
        encrypted: bool,
        options: &Arc<PlanOptions>,
    ) -> Result<Arc<TypePlan>, ConfigError> {
        let key = PlanKey {
            id: shape.id(),
            encrypted,
            options: options.clone(),
        };

        let cached = self
            .plans
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
            .cloned();
        if let Some(plan) = cached {
            return Ok(plan);
        }

        let plan = Arc::new(TypePlan::build(shape, encrypted, options)?);
        log::debug!("built plan for `{}` (encrypted: {encrypted})", shape.type_path());

        self.plans
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, plan.clone());
        Ok(plan)
    }

    /// Builds the plan of `shape` and of everything reachable from it,
    /// extra types included, so configuration errors surface at once.
    pub fn warm(
        &self,
        shape: &'static Shape,
        encrypted: bool,
        options: &Arc<PlanOptions>,
    ) -> Result<Arc<TypePlan>, ConfigError> {
        let root = self.get_plan(shape, encrypted, options)?;

        let mut pending = alloc::vec![root.clone()];
        for extra in options.extra_types() {
            pending.push(self.get_plan(extra, false, options)?);
        }

        let mut visited = new_set();
        while let Some(plan) = pending.pop() {
            if !visited.insert((plan.shape().id(), plan.is_encrypted())) {
                continue;
            }
            for child in plan.children() {
                pending.push(child.get(self, options)?);
            }
        }
        Ok(root)
    }

    /// Number of cached plans.
    pub fn len(&self) -> usize {
        self.plans.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops every cached plan.
    pub fn clear(&self) {
        self.plans.write().unwrap_or_else(PoisonError::into_inner).clear();
    }
}
