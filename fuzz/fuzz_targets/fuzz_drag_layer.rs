#![no_main]

use arbitrary::Arbitrary;
use ftui_sortable::{
    Bounds, CollectionId, DragLayer, ItemHandle, Modifiers, Position, SortableConfig,
};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
enum Op {
    Down { item: u8, x: i8, y: i8, mods: u8 },
    Background { mods: u8 },
    Move { x: i8, y: i8 },
    Up,
    Cancel,
    Blur,
    Disable { item: u8, disabled: bool },
    Pin { item: u8, pinned: bool },
    Unregister { item: u8 },
}

#[derive(Debug, Arbitrary)]
struct Input {
    threshold: u8,
    multiple: bool,
    cross: bool,
    ops: Vec<Op>,
}

const LISTS: [CollectionId; 3] = [
    CollectionId::new(1),
    CollectionId::new(2),
    CollectionId::new(3),
];

fuzz_target!(|input: Input| {
    let config = SortableConfig::default()
        .with_distance_threshold(u16::from(input.threshold % 8))
        .with_multiple(input.multiple)
        .with_cross_collection_drag(input.cross);
    let Ok(mut layer) = DragLayer::new(config) else {
        return;
    };

    // Three side-by-side lists of four two-cell rows.
    let mut handles: Vec<ItemHandle> = Vec::new();
    for (c, list) in LISTS.iter().enumerate() {
        let x = c as i32 * 20;
        layer.register_collection(*list, None, false);
        let _ = layer.set_collection_bounds(*list, Some(Bounds::new(x, 0, 10, 10)));
        for i in 0..4 {
            let handle = layer.register(*list, i, false, false);
            let _ = layer.set_bounds(handle, Some(Bounds::new(x, i as i32 * 2, 10, 2)));
            handles.push(handle);
        }
    }

    for op in input.ops.into_iter().take(256) {
        let pick = |item: u8| handles[usize::from(item) % handles.len()];
        let _ = match op {
            Op::Down { item, x, y, mods } => layer.on_pointer_down(
                Some(pick(item)),
                Position::new(i32::from(x), i32::from(y)),
                Modifiers::from_bits_truncate(mods),
            ),
            Op::Background { mods } => layer.on_pointer_down(
                None,
                Position::new(-1, -1),
                Modifiers::from_bits_truncate(mods),
            ),
            Op::Move { x, y } => layer.on_pointer_move(Position::new(i32::from(x), i32::from(y))),
            Op::Up => layer.on_pointer_up(),
            Op::Cancel => layer.on_pointer_cancel(),
            Op::Blur => layer.on_blur(),
            Op::Disable { item, disabled } => layer.update_disabled(pick(item), disabled),
            Op::Pin { item, pinned } => layer.update_pinned(pick(item), pinned),
            Op::Unregister { item } => {
                let events = layer.unregister(pick(item));
                // Hosts close the gap left by an unmounted row.
                for list in LISTS {
                    let order = layer.registry().ordered_handles(list);
                    for (index, handle) in order.into_iter().enumerate() {
                        let _ = layer.update_index(handle, index);
                    }
                }
                Ok(events)
            }
        };

        // Indices stay dense in every list, and marked items stay registered.
        for list in LISTS {
            assert!(layer.registry().is_contiguous(list), "{list} lost contiguity");
        }
        for handle in layer.selection().marked() {
            assert!(layer.registry().contains(handle), "{handle} marked after removal");
        }
    }
});
