//! Thread-local RNG adapter for the domain's injected-closure contract.

use rand::Rng;

/// A die roller over the thread-local RNG: uniform in `[1, sides]`.
///
/// Each caller gets its own closure, so concurrent rolls never contend
/// on shared state.
pub fn thread_roller() -> impl FnMut(u32) -> u32 {
    let mut rng = rand::thread_rng();
    move |sides: u32| rng.gen_range(1..=sides)
}
