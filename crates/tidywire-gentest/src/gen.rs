//! Finite, index-addressed sample generators.
//!
//! A generator is a size plus a deterministic index-to-value function, so
//! any sample can be regenerated from its index alone. Randomized
//! generators derive a fresh seeded `fastrand::Rng` per index; nothing
//! draws from an ambient random source.

use std::rc::Rc;

use tidywire_schematic::geometry::Point;

/// A finite generator: `size` samples addressed by index.
pub struct Gen<T> {
    size: usize,
    func: Rc<dyn Fn(usize) -> T>,
}

impl<T> Clone for Gen<T> {
    fn clone(&self) -> Self {
        Self {
            size: self.size,
            func: Rc::clone(&self.func),
        }
    }
}

impl<T: 'static> Gen<T> {
    pub fn new(size: usize, func: impl Fn(usize) -> T + 'static) -> Self {
        Self {
            size,
            func: Rc::new(func),
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Generate the sample at `index`. Panics outside `0..size`; the test
    /// runner converts such panics into `Exception` outcomes.
    pub fn value(&self, index: usize) -> T {
        assert!(
            index < self.size,
            "sample index {index} out of range 0..{}",
            self.size
        );
        (self.func)(index)
    }

    /// Finite enumeration of a fixed list.
    pub fn from_list(items: Vec<T>) -> Self
    where
        T: Clone,
    {
        let size = items.len();
        Self::new(size, move |i| items[i].clone())
    }

    /// Single-sample generator.
    pub fn constant(item: T) -> Self
    where
        T: Clone,
    {
        Self::new(1, move |_| item.clone())
    }

    pub fn map<U: 'static>(self, f: impl Fn(T) -> U + 'static) -> Gen<U> {
        let inner = self.func;
        Gen {
            size: self.size,
            func: Rc::new(move |i| f(inner(i))),
        }
    }

    /// Cartesian pairing: size is the product of both sizes and index `i`
    /// maps to `(a(i / b.size), b(i % b.size))`.
    pub fn product<U: 'static>(self, other: Gen<U>) -> Gen<(T, U)> {
        let a = self.func;
        let b = other.func;
        let b_size = other.size;
        Gen {
            size: self.size * b_size,
            func: Rc::new(move |i| (a(i / b_size), b(i % b_size))),
        }
    }

    /// Bound the run length. The runner never short-circuits, so callers
    /// wanting fewer samples truncate the generator instead.
    pub fn take(self, n: usize) -> Self {
        Self {
            size: self.size.min(n),
            func: self.func,
        }
    }
}

/// Per-index seeded rng: a failing sample replays byte-for-byte from
/// (seed, index).
pub fn sample_rng(seed: u64, index: usize) -> fastrand::Rng {
    let salt = (index as u64).wrapping_add(1).wrapping_mul(0x9e37_79b9_7f4a_7c15);
    fastrand::Rng::with_seed(seed ^ salt)
}

/// Each sample is a Fisher-Yates permutation of `items`, drawn from the
/// index-seeded rng. Used for randomized wiring order.
pub fn shuffles<T: Clone + 'static>(items: Vec<T>, size: usize, seed: u64) -> Gen<Vec<T>> {
    Gen::new(size, move |index| {
        let mut rng = sample_rng(seed, index);
        let mut shuffled = items.clone();
        for i in (1..shuffled.len()).rev() {
            let j = rng.usize(0..=i);
            shuffled.swap(i, j);
        }
        shuffled
    })
}

/// Grid-snapped pseudo-random positions within `[min, max]` on both axes.
pub fn random_points(size: usize, min: Point, max: Point, step: f64, seed: u64) -> Gen<Point> {
    Gen::new(size, move |index| {
        let mut rng = sample_rng(seed, index);
        let snap = |lo: f64, hi: f64, rng: &mut fastrand::Rng| {
            let cells = ((hi - lo) / step).floor() as u64;
            lo + rng.u64(0..=cells) as f64 * step
        };
        let x = snap(min.x, max.x, &mut rng);
        let y = snap(min.y, max.y, &mut rng);
        Point::new(x, y)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_list_enumerates_in_order() {
        let g = Gen::from_list(vec![10, 20, 30]);
        assert_eq!(g.size(), 3);
        assert_eq!(g.value(0), 10);
        assert_eq!(g.value(2), 30);
    }

    #[test]
    fn map_transforms_values() {
        let g = Gen::from_list(vec![1, 2, 3]).map(|n| n * 2);
        assert_eq!((0..3).map(|i| g.value(i)).collect::<Vec<_>>(), vec![2, 4, 6]);
    }

    #[test]
    fn product_covers_all_pairs() {
        let g = Gen::from_list(vec!['a', 'b']).product(Gen::from_list(vec![1, 2, 3]));
        assert_eq!(g.size(), 6);
        let pairs: Vec<_> = (0..6).map(|i| g.value(i)).collect();
        assert_eq!(pairs[0], ('a', 1));
        assert_eq!(pairs[2], ('a', 3));
        assert_eq!(pairs[3], ('b', 1));
        assert_eq!(pairs[5], ('b', 3));
    }

    #[test]
    fn take_truncates_size() {
        let g = Gen::from_list(vec![1, 2, 3, 4, 5]).take(2);
        assert_eq!(g.size(), 2);
        assert_eq!(g.value(1), 2);
    }

    #[test]
    fn shuffles_are_deterministic_permutations() {
        let items = vec![1, 2, 3, 4, 5, 6, 7];
        let a = shuffles(items.clone(), 4, 99);
        let b = shuffles(items.clone(), 4, 99);
        for i in 0..4 {
            let mut sample = a.value(i);
            assert_eq!(sample, b.value(i));
            sample.sort_unstable();
            assert_eq!(sample, items);
        }
        // A different seed gives a different permutation somewhere.
        let c = shuffles(items.clone(), 4, 100);
        assert!((0..4).any(|i| a.value(i) != c.value(i)));
    }

    #[test]
    fn random_points_stay_on_grid_and_in_range() {
        let g = random_points(
            20,
            Point::new(100.0, 0.0),
            Point::new(400.0, 300.0),
            10.0,
            7,
        );
        for i in 0..20 {
            let p = g.value(i);
            assert!(p.x >= 100.0 && p.x <= 400.0);
            assert!(p.y >= 0.0 && p.y <= 300.0);
            assert_eq!((p.x - 100.0) % 10.0, 0.0);
            assert_eq!(p.y % 10.0, 0.0);
        }
        // Replay is exact.
        let h = random_points(
            20,
            Point::new(100.0, 0.0),
            Point::new(400.0, 300.0),
            10.0,
            7,
        );
        assert_eq!(g.value(13), h.value(13));
    }
}
