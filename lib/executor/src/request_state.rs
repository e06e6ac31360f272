use std::any::{Any, TypeId};

use dashmap::{
    mapref::one::{Ref, RefMut},
    DashMap,
};

/// Per-request user data handed to every resolver, keyed by type. Safe to read and write from
/// concurrently running resolvers.
#[derive(Default)]
pub struct RequestState {
    inner: DashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

pub struct RequestStateRefEntry<'a, T> {
    pub entry: Option<Ref<'a, TypeId, Box<dyn Any + Send + Sync>>>,
    phantom: std::marker::PhantomData<T>,
}

impl<'a, T: Any + Send + Sync> RequestStateRefEntry<'a, T> {
    pub fn get_ref(&self) -> Option<&T> {
        match &self.entry {
            None => None,
            Some(entry) => entry.value().downcast_ref::<T>(),
        }
    }
}

pub struct RequestStateMutEntry<'a, T> {
    pub entry: Option<RefMut<'a, TypeId, Box<dyn Any + Send + Sync>>>,
    phantom: std::marker::PhantomData<T>,
}

impl<'a, T: Any + Send + Sync> RequestStateMutEntry<'a, T> {
    pub fn get_ref_mut(&mut self) -> Option<&mut T> {
        match &mut self.entry {
            None => None,
            Some(entry) => entry.value_mut().downcast_mut::<T>(),
        }
    }
}

impl RequestState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains<T: Any + Send + Sync>(&self) -> bool {
        self.inner.contains_key(&TypeId::of::<T>())
    }

    /// Stores `value`, returning the previous value of the same type.
    pub fn insert<T: Any + Send + Sync>(&self, value: T) -> Option<Box<T>> {
        self.inner
            .insert(TypeId::of::<T>(), Box::new(value))
            .and_then(|boxed_any| boxed_any.downcast::<T>().ok())
    }

    pub fn get_ref_entry<T: Any + Send + Sync>(&self) -> RequestStateRefEntry<'_, T> {
        RequestStateRefEntry {
            entry: self.inner.get(&TypeId::of::<T>()),
            phantom: std::marker::PhantomData,
        }
    }

    /// Holds a write lock on the entry's shard until dropped; do not keep it across an await.
    pub fn get_mut_entry<T: Any + Send + Sync>(&self) -> RequestStateMutEntry<'_, T> {
        RequestStateMutEntry {
            entry: self.inner.get_mut(&TypeId::of::<T>()),
            phantom: std::marker::PhantomData,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::RequestState;

    struct Viewer {
        pub id: u32,
    }

    #[test]
    fn inserts_and_gets_immut_ref() {
        let state = RequestState::default();
        state.insert(Viewer { id: 42 });

        let entry = state.get_ref_entry();
        let viewer: &Viewer = entry.get_ref().unwrap();
        assert_eq!(viewer.id, 42);
        assert!(!state.contains::<String>());
    }

    #[test]
    fn inserts_and_mutates_with_mut_ref() {
        let state = RequestState::default();
        state.insert(Viewer { id: 42 });

        {
            let mut entry = state.get_mut_entry();
            let viewer: &mut Viewer = entry.get_ref_mut().unwrap();
            viewer.id = 100;
        }

        let entry = state.get_ref_entry();
        let viewer: &Viewer = entry.get_ref().unwrap();
        assert_eq!(viewer.id, 100);
    }

    #[test]
    fn insert_returns_previous_value() {
        let state = RequestState::default();
        assert!(state.insert(Viewer { id: 1 }).is_none());
        let previous = state.insert(Viewer { id: 2 }).unwrap();
        assert_eq!(previous.id, 1);
    }
}
