//! Round-robin selection over a platform's package list.
//!
//! The server keeps no cursor: clients send the name of the game they received last
//! and get the one after it.

use crate::package::PckMetadata;

/// Index of the package following the one named `last_game`.
///
/// Wraps to `0` after the last entry and falls back to `0` when `last_game` is absent or unknown.
/// Returns [`None`] for an empty list.
pub fn next_index(packages: &[PckMetadata], last_game: Option<&str>) -> Option<usize> {
    if packages.is_empty() {
        return None;
    }

    let next = last_game
        .and_then(|name| packages.iter().position(|p| p.gamename == name))
        .map(|index| if index + 1 < packages.len() { index + 1 } else { 0 })
        .unwrap_or(0);

    Some(next)
}

/// The package following the one named `last_game`, see [`next_index`].
pub fn next_package<'a>(
    packages: &'a [PckMetadata],
    last_game: Option<&str>,
) -> Option<&'a PckMetadata> {
    next_index(packages, last_game).and_then(|index| packages.get(index))
}
