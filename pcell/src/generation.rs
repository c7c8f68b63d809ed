//! Memoization of generated views, keyed by component type and parameters.

use std::any::TypeId;
use std::collections::{HashMap, HashSet};
use std::hash::Hash;
use std::sync::Arc;

use arcstr::ArcStr;
use slotmap::{Key, SlotMap};

use crate::component::{serialize_params, Component};
use crate::error::Result;

/// The identity of a generated view: the component type and its serialized parameters.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub(crate) struct ParamKey {
    type_id: TypeId,
    params: Vec<u8>,
}

impl ParamKey {
    pub(crate) fn from_params<T>(params: &T::Params) -> Result<Self>
    where
        T: Component,
    {
        Ok(Self {
            type_id: TypeId::of::<T>(),
            params: serialize_params(params)?,
        })
    }
}

/// The result of looking up a view in a [`GenerationMap`].
pub(crate) enum GeneratedCheck<T, K> {
    /// The view was already generated.
    Exists(T),
    /// The view must be generated under the given ID.
    MustGenerate(K),
}

/// A map from parameters to generated values.
///
/// Values are stored in generation order.
#[derive(Debug)]
pub(crate) struct GenerationMap<P, K, V>
where
    K: Key,
{
    ids: HashMap<P, K>,
    values: SlotMap<K, Option<Arc<V>>>,
    names: HashSet<ArcStr>,
}

impl<P, K, V> Default for GenerationMap<P, K, V>
where
    K: Key,
{
    fn default() -> Self {
        Self {
            ids: HashMap::new(),
            values: SlotMap::with_key(),
            names: HashSet::new(),
        }
    }
}

impl<P, K, V> GenerationMap<P, K, V>
where
    P: Hash + Eq,
    K: Key,
{
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Returns the generated value for `params`, or reserves an ID under which it must be generated.
    ///
    /// A reserved ID whose generation failed is handed out again on the next lookup.
    pub(crate) fn get(&mut self, params: P) -> GeneratedCheck<Arc<V>, K> {
        if let Some(&id) = self.ids.get(&params) {
            return match self.values.get(id) {
                Some(Some(value)) => GeneratedCheck::Exists(value.clone()),
                _ => GeneratedCheck::MustGenerate(id),
            };
        }
        let id = self.values.insert(None);
        self.ids.insert(params, id);
        GeneratedCheck::MustGenerate(id)
    }

    /// Stores the generated value for a reserved ID.
    pub(crate) fn set(&mut self, id: K, value: V) -> Arc<V> {
        let value = Arc::new(value);
        if let Some(slot) = self.values.get_mut(id) {
            *slot = Some(value.clone());
        }
        value
    }

    /// Allocates an unused name derived from the given base name.
    ///
    /// The returned name is reserved and will not be handed out again.
    pub(crate) fn alloc_name(&mut self, base_name: impl Into<ArcStr>) -> ArcStr {
        let base_name = base_name.into();
        let mut name = base_name.clone();
        let mut i = 1;
        while self.names.contains(&name) {
            name = arcstr::format!("{}_{}", base_name, i);
            i += 1;
        }
        self.names.insert(name.clone());
        name
    }

    /// Makes a previously allocated name available again.
    pub(crate) fn release_name(&mut self, name: &ArcStr) {
        self.names.remove(name);
    }

    /// Returns an iterator over the generated values, in generation order.
    pub(crate) fn values(&self) -> impl Iterator<Item = &Arc<V>> {
        self.values.values().filter_map(|v| v.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use slotmap::new_key_type;

    use super::*;

    new_key_type! {
        struct TestKey;
    }

    #[test]
    fn test_generation_map_memoizes() {
        let mut map: GenerationMap<u32, TestKey, &'static str> = GenerationMap::new();
        let id = match map.get(7) {
            GeneratedCheck::MustGenerate(id) => id,
            GeneratedCheck::Exists(_) => panic!("value should not exist yet"),
        };
        map.set(id, "seven");
        match map.get(7) {
            GeneratedCheck::Exists(v) => assert_eq!(*v, "seven"),
            GeneratedCheck::MustGenerate(_) => panic!("value should have been memoized"),
        }
        assert_eq!(map.values().count(), 1);
    }

    #[test]
    fn test_failed_generation_reuses_id() {
        let mut map: GenerationMap<u32, TestKey, ()> = GenerationMap::new();
        let first = match map.get(1) {
            GeneratedCheck::MustGenerate(id) => id,
            GeneratedCheck::Exists(_) => panic!("value should not exist yet"),
        };
        let second = match map.get(1) {
            GeneratedCheck::MustGenerate(id) => id,
            GeneratedCheck::Exists(_) => panic!("value was never set"),
        };
        assert_eq!(first, second);
        assert_eq!(map.values().count(), 0);
    }

    #[test]
    fn test_alloc_name() {
        let mut map: GenerationMap<u32, TestKey, ()> = GenerationMap::new();
        assert_eq!(map.alloc_name("diode"), "diode");
        assert_eq!(map.alloc_name("diode"), "diode_1");
        assert_eq!(map.alloc_name("diode"), "diode_2");
        assert_eq!(map.alloc_name("ring"), "ring");

        map.release_name(&arcstr::literal!("diode_1"));
        assert_eq!(map.alloc_name("diode"), "diode_1");
        assert_eq!(map.alloc_name("diode"), "diode_3");
    }
}
