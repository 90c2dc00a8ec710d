#![forbid(unsafe_code)]

/// Below this gap between neighbor keys, midpoint insertion stops producing
/// reliably distinct values and the partition must be renumbered.
pub const MIN_KEY_GAP: f64 = 1e-9;

/// Outcome of placing a task at a position within a partition's key sequence.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Placement {
    /// A key strictly ordered against both neighbors.
    Key(f64),
    /// The neighbor gap has converged; rewrite the partition to integer keys
    /// first, then place with `key_after_renumber`.
    NeedsRenumber,
}

/// Chooses a sort key for insertion at `index` into the ordered key sequence
/// of the destination partition (the moved task excluded). Head insertion goes
/// strictly below the first key, tail insertion strictly above the last, and
/// interior insertion takes the neighbor midpoint. An out-of-range index is
/// treated as the tail.
pub fn place(keys: &[f64], index: usize) -> Placement {
    if keys.is_empty() {
        return Placement::Key(0.0);
    }
    let index = index.min(keys.len());
    if index == 0 {
        return Placement::Key(keys[0] - 1.0);
    }
    if index == keys.len() {
        return Placement::Key(keys[keys.len() - 1] + 1.0);
    }

    let before = keys[index - 1];
    let after = keys[index];
    if after - before <= MIN_KEY_GAP {
        return Placement::NeedsRenumber;
    }
    let mid = before + (after - before) / 2.0;
    if mid <= before || mid >= after {
        return Placement::NeedsRenumber;
    }
    Placement::Key(mid)
}

/// Fresh integer keys for a partition of `len` tasks, preserving their order.
pub fn integer_keys(len: usize) -> impl Iterator<Item = f64> {
    (0..len).map(|i| i as f64)
}

/// The key for inserting at `index` after the partition has been rewritten to
/// `integer_keys(len)`. Closed form of `place` over `0.0..len`, which can no
/// longer converge.
pub fn key_after_renumber(len: usize, index: usize) -> f64 {
    if len == 0 {
        return 0.0;
    }
    let index = index.min(len);
    if index == 0 {
        -1.0
    } else if index == len {
        len as f64
    } else {
        index as f64 - 0.5
    }
}
