use rand::Rng;
use rand::seq::SliceRandom;

/// Picks up to `count` items uniformly at random, without replacement.
///
/// Every item has the same chance of selection and the result order is
/// random as well. Fewer than `count` items means all of them, shuffled.
pub(crate) fn sample<T, R>(mut items: Vec<T>, count: usize, rng: &mut R) -> Vec<T>
where
    R: Rng + ?Sized,
{
    items.as_mut_slice().shuffle(rng);
    items.truncate(count);
    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::HashSet;

    #[test]
    fn under_supply_returns_everything() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut picked = sample(vec![1, 2, 3], 5, &mut rng);
        picked.sort_unstable();
        assert_eq!(picked, vec![1, 2, 3]);
    }

    #[test]
    fn picks_distinct_items() {
        let mut rng = StdRng::seed_from_u64(11);
        let picked = sample((0..20).collect(), 5, &mut rng);
        assert_eq!(picked.len(), 5);
        assert_eq!(picked.iter().collect::<HashSet<_>>().len(), 5);
    }

    #[test]
    fn every_item_is_equally_likely() {
        const DRAWS: usize = 30_000;
        let mut rng = StdRng::seed_from_u64(3);
        let mut picked = [0_usize; 6];
        let mut first = [0_usize; 6];
        for _ in 0..DRAWS {
            let chosen = sample((0..6).collect::<Vec<usize>>(), 2, &mut rng);
            first[chosen[0]] += 1;
            for item in chosen {
                picked[item] += 1;
            }
        }

        // 2 of 6 per draw: 10k picks each, sd about 82. First slot: 5k, sd about 65.
        for (item, hits) in picked.iter().enumerate() {
            assert!(hits.abs_diff(10_000) < 500, "item {item} picked {hits} times");
        }
        for (item, hits) in first.iter().enumerate() {
            assert!(hits.abs_diff(5_000) < 400, "item {item} first {hits} times");
        }
    }

    #[test]
    fn same_seed_same_selection() {
        let a = sample((0..50).collect::<Vec<u32>>(), 10, &mut StdRng::seed_from_u64(42));
        let b = sample((0..50).collect::<Vec<u32>>(), 10, &mut StdRng::seed_from_u64(42));
        assert_eq!(a, b);
    }
}
