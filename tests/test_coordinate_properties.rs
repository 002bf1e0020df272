/// Property-based tests for projections between nested coordinate frames
///
/// Uses proptest to check the identities projection must always satisfy.
use pathmerge::{AlignError, CoordArena, CoordId};
use proptest::prelude::*;

/// Build root -> child -> grandchild..., each window reduced to fit its parent
fn nested(arena: &mut CoordArena, root_len: usize, cuts: &[(usize, usize)]) -> Vec<CoordId> {
    let mut frames = vec![arena.root(root_len)];
    for &(a, b) in cuts {
        let parent = *frames.last().unwrap();
        let len = arena.length(parent).unwrap();
        let offset = a % (len + 1);
        let length = b % (len - offset + 1);
        frames.push(arena.make_child(parent, offset, length).unwrap());
    }
    frames
}

/// Property: projecting a point into its own frame is the identity
#[test]
fn prop_self_projection() {
    proptest!(|(
        root_len in 1usize..500,
        cuts in prop::collection::vec((0usize..1000, 0usize..1000), 0..4),
        pos in 0usize..1000
    )| {
        let mut arena = CoordArena::new();
        let frames = nested(&mut arena, root_len, &cuts);
        for id in frames {
            let len = arena.length(id).unwrap();
            if len == 0 {
                continue;
            }
            let p = arena.point(id, pos % len).unwrap();
            prop_assert_eq!(arena.project_point(p, id).unwrap(), p);
        }
    });
}

/// Property: a point survives a trip to any related frame and back
#[test]
fn prop_round_trip() {
    proptest!(|(
        root_len in 1usize..500,
        cuts in prop::collection::vec((0usize..1000, 0usize..1000), 1..4),
        sibling in (0usize..1000, 0usize..1000),
        pos in 0usize..1000
    )| {
        let mut arena = CoordArena::new();
        let frames = nested(&mut arena, root_len, &cuts);
        let root = frames[0];
        let deepest = *frames.last().unwrap();
        let len = arena.length(deepest).unwrap();
        prop_assume!(len > 0);
        let p = arena.point(deepest, pos % len).unwrap();

        // Upward projection always lands inside the ancestor
        for &ancestor in &frames {
            let up = arena.project_point(p, ancestor).unwrap();
            prop_assert_eq!(arena.project_point(up, deepest).unwrap(), p);
        }

        // A sibling window of the root may or may not cover the point
        let offset = sibling.0 % (root_len + 1);
        let length = sibling.1 % (root_len - offset + 1);
        let other = arena.make_child(root, offset, length).unwrap();
        let in_root = arena.project_point(p, root).unwrap();
        let covered = in_root.pos() >= offset && in_root.pos() < offset + length;
        match arena.project_point(p, other) {
            Ok(q) => {
                prop_assert!(covered);
                prop_assert_eq!(arena.project_point(q, deepest).unwrap(), p);
            }
            Err(AlignError::InvalidRange { .. }) => prop_assert!(!covered),
            Err(e) => prop_assert!(false, "unexpected error {:?}", e),
        }
        prop_assert_eq!(arena.contains(arena.full(other).unwrap(), p).unwrap(), covered);
    });
}

/// Property: interval projection shifts both ends by the same amount
#[test]
fn prop_interval_span_preserved() {
    proptest!(|(
        root_len in 1usize..500,
        cuts in prop::collection::vec((0usize..1000, 0usize..1000), 1..4),
        a in 0usize..1000,
        b in 0usize..1000
    )| {
        let mut arena = CoordArena::new();
        let frames = nested(&mut arena, root_len, &cuts);
        let deepest = *frames.last().unwrap();
        let len = arena.length(deepest).unwrap();
        let start = a % (len + 1);
        let end = start + b % (len - start + 1);
        let interval = arena.interval(deepest, start, end).unwrap();

        let up = arena.project_interval(interval, frames[0]).unwrap();
        prop_assert_eq!(up.len(), interval.len());
        prop_assert_eq!(arena.project_interval(up, deepest).unwrap(), interval);
    });
}

/// Property: chunks tile the interval in order without gaps or overlap
#[test]
fn prop_chunks_cover_interval() {
    proptest!(|(
        len in 0usize..1000,
        a in 0usize..1000,
        b in 0usize..1000,
        size in 1usize..120
    )| {
        let mut arena = CoordArena::new();
        let root = arena.root(len);
        let start = a % (len + 1);
        let end = start + b % (len - start + 1);
        let interval = arena.interval(root, start, end).unwrap();

        let chunks = interval.chunks(size).unwrap();
        prop_assert_eq!(chunks.len(), interval.len().div_ceil(size));
        let mut next = start;
        for chunk in &chunks {
            prop_assert_eq!(chunk.start(), next);
            prop_assert!(chunk.len() <= size && !chunk.is_empty());
            next = chunk.end();
        }
        prop_assert_eq!(next, end);
    });
}

#[test]
fn test_unrelated_roots() {
    let mut arena = CoordArena::new();
    let a = arena.root(5);
    let b = arena.root(5);
    let child = arena.make_child(a, 1, 2).unwrap();
    let p = arena.point(child, 0).unwrap();
    assert_eq!(arena.project_point(p, b), Err(AlignError::UnrelatedSpace));
    assert_eq!(arena.common_ancestor(child, a), Ok(a));
}

#[test]
fn test_zero_chunk_size() {
    let mut arena = CoordArena::new();
    let root = arena.root(4);
    assert!(matches!(
        arena.full(root).unwrap().chunks(0),
        Err(AlignError::InvalidRange { .. })
    ));
}
