use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};
use std::{collections::HashSet, hash::Hash};

pub trait SliceUtil<T> {
    /// Values that appear more than once, in order of their second
    /// occurrence.
    fn duplicates(&self) -> Vec<&T>
    where
        T: Eq + Hash;

    /// Permutes the slice deterministically, so a failing declaration order
    /// can be replayed from its seed.
    fn shuffle_with_seed(&mut self, seed: u64);
}

impl<T> SliceUtil<T> for [T] {
    fn duplicates(&self) -> Vec<&T>
    where
        T: Eq + Hash,
    {
        let mut seen = HashSet::new();
        self.iter().filter(|value| !seen.insert(*value)).collect()
    }

    fn shuffle_with_seed(&mut self, seed: u64) {
        SliceRandom::shuffle(self, &mut StdRng::seed_from_u64(seed));
    }
}

#[macro_export]
macro_rules! assert_unique {
    ($slice:expr) => {{
        use $crate::slice::SliceUtil;
        let duplicates = $slice[..].duplicates();
        assert!(
            duplicates.is_empty(),
            "expected `{}` to be unique; duplicates={:?}",
            stringify!($slice),
            duplicates,
        );
    }};
}

#[macro_export]
macro_rules! assert_empty {
    ($slice:expr) => {{
        let slice = &$slice[..];
        assert!(
            slice.is_empty(),
            "expected `{}` to be empty; actual={:?}",
            stringify!($slice),
            slice,
        );
    }};
}
