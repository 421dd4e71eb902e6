//! # saveandmiss-core
//!
//! Reference implementation of `SaveAndMiss`, the function the fixture
//! harness validates.
//!
//! The input is walked in alternating runs of `num` characters: the first run
//! is kept, the next is dropped, and so on until the input is exhausted.

#![forbid(unsafe_code)]

/// Keeps `num` characters, skips `num` characters, and repeats.
///
/// A non-positive `num` returns `arg` unchanged. Runs are counted in Unicode
/// scalar values, not bytes, so multi-byte characters are never split.
///
/// ```
/// use saveandmiss_core::save_and_miss;
///
/// assert_eq!(save_and_miss("123456789", 3), "123789");
/// assert_eq!(save_and_miss("hello", 0), "hello");
/// ```
#[must_use]
pub fn save_and_miss(arg: &str, num: i64) -> String {
    if num <= 0 {
        return arg.to_owned();
    }
    let run = usize::try_from(num).unwrap_or(usize::MAX);
    arg.chars()
        .enumerate()
        .filter(|(i, _)| (i / run) % 2 == 0)
        .map(|(_, c)| c)
        .collect()
}
