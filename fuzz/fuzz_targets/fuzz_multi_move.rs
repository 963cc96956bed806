#![no_main]

use std::collections::{BTreeMap, BTreeSet};

use arbitrary::Arbitrary;
use ftui_sortable::reorder::{EntryPosition, multi_move};
use ftui_sortable::CollectionId;
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct Input {
    lens: Vec<u8>,
    picks: Vec<(u8, u8)>,
    destination: (u8, u8),
}

fuzz_target!(|input: Input| {
    // Up to four collections of up to 16 items, values unique across all.
    let mut collections = BTreeMap::new();
    let mut next = 0u32;
    for (i, len) in input.lens.iter().take(4).enumerate() {
        let items: Vec<u32> = (0..u32::from(len % 17)).map(|k| next + k).collect();
        next += u32::from(len % 17);
        collections.insert(CollectionId::new(i as u64), items);
    }
    if collections.is_empty() {
        return;
    }
    let ids: Vec<CollectionId> = collections.keys().copied().collect();

    let mut sources = Vec::new();
    let mut seen = BTreeSet::new();
    for (c, i) in input.picks.iter().take(32) {
        let id = ids[usize::from(*c) % ids.len()];
        let len = collections[&id].len();
        if len == 0 {
            continue;
        }
        let position = EntryPosition::new(id, usize::from(*i) % len);
        if seen.insert(position) {
            sources.push(position);
        }
    }
    let destination = EntryPosition::new(
        ids[usize::from(input.destination.0) % ids.len()],
        usize::from(input.destination.1),
    );

    let Ok(outcome) = multi_move(&collections, &sources, destination) else {
        assert!(sources.is_empty(), "multi_move rejected a valid move set");
        return;
    };

    // Conservation: nothing lost or duplicated across touched collections.
    let before: usize = outcome
        .collections
        .keys()
        .map(|id| collections[id].len())
        .sum();
    let after: usize = outcome.collections.values().map(Vec::len).sum();
    assert_eq!(before, after, "item count changed");
    assert_eq!(outcome.moved.len(), sources.len());

    // The moved block sits contiguously at the reported destination.
    let dest = &outcome.collections[&outcome.destination.collection];
    let start = outcome.destination.index;
    assert_eq!(&dest[start..start + outcome.moved.len()], outcome.moved.as_slice());
});
