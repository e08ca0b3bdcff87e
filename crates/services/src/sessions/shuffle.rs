use rand::Rng;

/// Fisher–Yates shuffle into a new `Vec`; `items` is left untouched.
///
/// Walks from the last index down to 1, swapping each slot with a uniformly
/// drawn index in `0..=i`.
pub fn shuffle<T: Clone, R: Rng + ?Sized>(items: &[T], rng: &mut R) -> Vec<T> {
    let mut shuffled = items.to_vec();
    for i in (1..shuffled.len()).rev() {
        let j = rng.random_range(0..=i);
        shuffled.swap(i, j);
    }
    shuffled
}
