//! Host model for nested parts/lessons lists.
//!
//! [`NestedLists`] plays the role of the UI: it owns the course data,
//! registers every part and lesson with a [`DragLayer`], lays them out on a
//! cell grid, and applies the layer's reorder events back onto the course.
//!
//! Layout (x right, y down, two-cell rows):
//!
//! ```text
//! y=top      Part header                (part bounds start)
//! y=top+2    Lesson 0                   (lesson list bounds start)
//! ...
//! y=top+2+2n append zone for lessons
//! ```
//!
//! Parts are stacked with no gap; the parts list carries one extra append
//! row at the bottom.

use std::collections::{BTreeMap, BTreeSet};

use ftui_sortable::{
    Bounds, CollectionId, DragLayer, ItemHandle, Modifiers, MultiSortEnd, OrderedCollection,
    Position, SortEnd, SortEvent, SortableConfig,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{HarnessError, Result};

pub const PARTS: CollectionId = CollectionId::new(0);

const ROW: i32 = 2;
const PART_WIDTH: u32 = 40;
const LESSON_X: i32 = 2;
const LESSON_WIDTH: u32 = 30;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Part {
    pub title: String,
    pub lessons: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    pub parts: Vec<Part>,
    /// Pinned lesson.
    #[serde(default)]
    pub active_lesson: Option<String>,
    #[serde(default)]
    pub disabled: bool,
}

impl Course {
    /// `parts` parts of `lessons` lessons each, titled `Part-i` and
    /// `Lesson-i-j` (1-based).
    #[must_use]
    pub fn generate(parts: usize, lessons: usize) -> Self {
        Self {
            parts: (1..=parts)
                .map(|p| Part {
                    title: format!("Part-{p}"),
                    lessons: (1..=lessons).map(|l| format!("Lesson-{p}-{l}")).collect(),
                })
                .collect(),
            active_lesson: None,
            disabled: false,
        }
    }

    /// Twenty parts of five lessons with `Lesson-1-2` active.
    #[must_use]
    pub fn story() -> Self {
        let mut course = Self::generate(20, 5);
        course.active_lesson = Some("Lesson-1-2".to_string());
        course
    }

    #[must_use]
    pub fn part(&self, title: &str) -> Option<&Part> {
        self.parts.iter().find(|part| part.title == title)
    }

    fn validate(&self) -> Result<()> {
        let mut seen = BTreeSet::new();
        for part in &self.parts {
            for title in std::iter::once(&part.title).chain(&part.lessons) {
                if !seen.insert(title.as_str()) {
                    return Err(HarnessError::invalid(format!("duplicate title {title}")));
                }
            }
        }
        if let Some(active) = &self.active_lesson
            && !self.parts.iter().any(|p| p.lessons.contains(active))
        {
            return Err(HarnessError::unknown(active.clone()));
        }
        Ok(())
    }
}

/// Where a drag should be released.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DropTarget {
    /// Upper half of the named part or lesson.
    Before(String),
    /// Lower half of the named part or lesson.
    After(String),
    /// Append zone of the named part's lesson list.
    EndOf(String),
    /// Append zone of the parts list.
    EndOfParts,
}

/// The course bound to a drag layer.
#[derive(Debug)]
pub struct NestedLists {
    layer: DragLayer,
    course: Course,
    handles: BTreeMap<String, ItemHandle>,
    titles: BTreeMap<ItemHandle, String>,
    /// Part title -> its lesson list.
    lesson_lists: BTreeMap<String, CollectionId>,
}

impl NestedLists {
    pub fn new(course: Course, config: SortableConfig) -> Result<Self> {
        course.validate()?;
        let mut layer = DragLayer::new(config)?;
        let disabled = course.disabled;
        layer.register_collection(PARTS, None, disabled);

        let mut handles = BTreeMap::new();
        let mut titles = BTreeMap::new();
        let mut lesson_lists = BTreeMap::new();
        for (p, part) in course.parts.iter().enumerate() {
            let part_handle = layer.register(PARTS, p, disabled, false);
            handles.insert(part.title.clone(), part_handle);
            titles.insert(part_handle, part.title.clone());

            let list = CollectionId::new(p as u64 + 1);
            layer.register_collection(list, Some(part_handle), disabled);
            lesson_lists.insert(part.title.clone(), list);
            for (l, lesson) in part.lessons.iter().enumerate() {
                let pinned = course.active_lesson.as_deref() == Some(lesson.as_str());
                let handle = layer.register(list, l, disabled, pinned);
                handles.insert(lesson.clone(), handle);
                titles.insert(handle, lesson.clone());
            }
        }

        let mut lists = Self {
            layer,
            course,
            handles,
            titles,
            lesson_lists,
        };
        lists.relayout()?;
        info!(
            parts = lists.course.parts.len(),
            items = lists.layer.registry().len(),
            "nested lists mounted"
        );
        Ok(lists)
    }

    #[must_use]
    pub const fn course(&self) -> &Course {
        &self.course
    }

    #[must_use]
    pub const fn layer(&self) -> &DragLayer {
        &self.layer
    }

    pub fn handle(&self, title: &str) -> Result<ItemHandle> {
        self.handles
            .get(title)
            .copied()
            .ok_or_else(|| HarnessError::unknown(title))
    }

    #[must_use]
    pub fn title(&self, handle: ItemHandle) -> Option<&str> {
        self.titles.get(&handle).map(String::as_str)
    }

    /// Titles of selected and pinned items.
    #[must_use]
    pub fn selected_titles(&self) -> Vec<String> {
        self.layer
            .selection()
            .marked()
            .into_iter()
            .filter_map(|h| self.title(h).map(str::to_string))
            .collect()
    }

    fn is_lesson(&self, title: &str) -> bool {
        self.course.parts.iter().any(|p| p.lessons.iter().any(|l| l == title))
    }

    fn bounds_of(&self, title: &str) -> Result<Bounds> {
        let handle = self.handle(title)?;
        self.layer
            .registry()
            .get(handle)
            .and_then(|entry| entry.bounds)
            .ok_or_else(|| HarnessError::unknown(title))
    }

    /// Cell a press on `title` lands on: its top-left interior cell.
    pub fn grab_point(&self, title: &str) -> Result<Position> {
        let bounds = self.bounds_of(title)?;
        Ok(Position::new(bounds.x + 1, bounds.y))
    }

    pub fn target_point(&self, target: &DropTarget) -> Result<Position> {
        match target {
            DropTarget::Before(title) => self.grab_point(title),
            DropTarget::After(title) => {
                let bounds = self.bounds_of(title)?;
                Ok(Position::new(bounds.x + 1, bounds.y + bounds.height as i32 - 1))
            }
            DropTarget::EndOf(part) => {
                let list = self
                    .lesson_lists
                    .get(part)
                    .ok_or_else(|| HarnessError::unknown(part.clone()))?;
                self.append_cell(*list)
            }
            DropTarget::EndOfParts => self.append_cell(PARTS),
        }
    }

    fn append_cell(&self, collection: CollectionId) -> Result<Position> {
        let bounds = self
            .layer
            .registry()
            .collection(collection)
            .and_then(|entry| entry.bounds)
            .ok_or_else(|| HarnessError::unknown(collection.to_string()))?;
        Ok(Position::new(bounds.x + 1, bounds.y + bounds.height as i32 - 1))
    }

    // --- interactions ---

    pub fn press(&mut self, title: &str, modifiers: Modifiers) -> Result<Vec<SortEvent>> {
        let handle = self.handle(title)?;
        let at = self.grab_point(title)?;
        Ok(self.layer.on_pointer_down(Some(handle), at, modifiers)?)
    }

    pub fn pointer_move(&mut self, position: Position) -> Result<Vec<SortEvent>> {
        Ok(self.layer.on_pointer_move(position)?)
    }

    /// Release and apply any reorder to the course.
    pub fn release(&mut self) -> Result<Vec<SortEvent>> {
        let events = self.layer.on_pointer_up()?;
        self.apply(&events)?;
        Ok(events)
    }

    pub fn background(&mut self, modifiers: Modifiers) -> Result<Vec<SortEvent>> {
        let mut events = self
            .layer
            .on_pointer_down(None, Position::new(-1, -1), modifiers)?;
        events.extend(self.layer.on_pointer_up()?);
        Ok(events)
    }

    pub fn cancel(&mut self) -> Result<Vec<SortEvent>> {
        Ok(self.layer.on_pointer_cancel()?)
    }

    pub fn blur(&mut self) -> Result<Vec<SortEvent>> {
        Ok(self.layer.on_blur()?)
    }

    /// Press and release in place. A plain click on a lesson also makes it
    /// the active lesson.
    pub fn click(&mut self, title: &str, modifiers: Modifiers) -> Result<Vec<SortEvent>> {
        let mut events = self.press(title, modifiers)?;
        events.extend(self.release()?);
        if !modifiers.is_additive() && self.is_lesson(title) {
            events.extend(self.set_active(Some(title))?);
        }
        Ok(events)
    }

    /// Full drag: press, lift past the threshold, move onto the target,
    /// release.
    pub fn drag(
        &mut self,
        title: &str,
        target: &DropTarget,
        modifiers: Modifiers,
    ) -> Result<Vec<SortEvent>> {
        let grab = self.grab_point(title)?;
        let drop_at = self.target_point(target)?;
        let lift = i32::from(self.layer.config().distance_threshold) + 1;
        let mut events = self.press(title, modifiers)?;
        events.extend(self.pointer_move(Position::new(grab.x + lift, grab.y))?);
        events.extend(self.pointer_move(drop_at)?);
        events.extend(self.release()?);
        Ok(events)
    }

    pub fn set_active(&mut self, lesson: Option<&str>) -> Result<Vec<SortEvent>> {
        if self.course.active_lesson.as_deref() == lesson {
            return Ok(Vec::new());
        }
        let mut events = Vec::new();
        if let Some(previous) = self.course.active_lesson.take() {
            let handle = self.handle(&previous)?;
            events.extend(self.layer.update_pinned(handle, false)?);
        }
        if let Some(next) = lesson {
            let handle = self.handle(next)?;
            events.extend(self.layer.update_pinned(handle, true)?);
            self.course.active_lesson = Some(next.to_string());
        }
        debug!(active = ?self.course.active_lesson, "active lesson changed");
        Ok(events)
    }

    /// Disable or enable every list at once.
    pub fn set_disabled(&mut self, disabled: bool) -> Result<Vec<SortEvent>> {
        self.course.disabled = disabled;
        let mut events = self.layer.set_collection_disabled(PARTS, disabled)?;
        let lists: Vec<CollectionId> = self.lesson_lists.values().copied().collect();
        for list in lists {
            events.extend(self.layer.set_collection_disabled(list, disabled)?);
        }
        Ok(events)
    }

    // --- data sync ---

    fn apply(&mut self, events: &[SortEvent]) -> Result<()> {
        let mut touched = false;
        for event in events {
            match event {
                SortEvent::SortEnd(end) => {
                    self.apply_sort_end(end)?;
                    touched = true;
                }
                SortEvent::MultiSortEnd(end) => {
                    self.apply_multi_sort_end(end)?;
                    touched = true;
                }
                _ => {}
            }
        }
        if touched {
            self.check_sync()?;
            self.relayout()?;
        }
        Ok(())
    }

    fn apply_sort_end(&mut self, end: &SortEnd) -> Result<()> {
        if end.collection == PARTS {
            let mut parts =
                OrderedCollection::from_vec(PARTS, std::mem::take(&mut self.course.parts));
            let outcome = parts.apply_sort_end(end);
            self.course.parts = parts.into_vec();
            outcome?;
            return Ok(());
        }
        let part = self.part_for_list(end.collection)?;
        let lessons = &mut self.course.parts[part].lessons;
        let mut list = OrderedCollection::from_vec(end.collection, std::mem::take(lessons));
        let outcome = list.apply_sort_end(end);
        *lessons = list.into_vec();
        outcome?;
        Ok(())
    }

    fn apply_multi_sort_end(&mut self, end: &MultiSortEnd) -> Result<()> {
        if end.destination_collection == PARTS {
            let mut parts = [OrderedCollection::from_vec(
                PARTS,
                std::mem::take(&mut self.course.parts),
            )];
            let outcome = OrderedCollection::apply_multi_sort_end(&mut parts, end);
            let [parts] = parts;
            self.course.parts = parts.into_vec();
            outcome?;
            return Ok(());
        }
        let mut lists: Vec<OrderedCollection<String>> = self
            .course
            .parts
            .iter()
            .filter_map(|part| {
                let id = self.lesson_lists.get(&part.title)?;
                Some(OrderedCollection::from_vec(*id, part.lessons.clone()))
            })
            .collect();
        let at = OrderedCollection::apply_multi_sort_end(&mut lists, end)?;
        for (part, list) in self.course.parts.iter_mut().zip(lists) {
            part.lessons = list.into_vec();
        }
        debug!(destination = %at.collection, index = at.index, "lessons moved");
        Ok(())
    }

    fn part_for_list(&self, list: CollectionId) -> Result<usize> {
        self.course
            .parts
            .iter()
            .position(|part| self.lesson_lists.get(&part.title) == Some(&list))
            .ok_or_else(|| HarnessError::unknown(list.to_string()))
    }

    /// The course and the layer's registry must agree after every commit.
    fn check_sync(&self) -> Result<()> {
        let registry = self.layer.registry();
        let order = |collection: CollectionId| -> Vec<&str> {
            registry
                .ordered_handles(collection)
                .into_iter()
                .filter_map(|h| self.title(h))
                .collect()
        };
        let parts: Vec<&str> = self.course.parts.iter().map(|p| p.title.as_str()).collect();
        if order(PARTS) != parts {
            return Err(HarnessError::Desync {
                collection: PARTS.to_string(),
            });
        }
        for part in &self.course.parts {
            let list = self.lesson_lists[&part.title];
            let lessons: Vec<&str> = part.lessons.iter().map(String::as_str).collect();
            if order(list) != lessons {
                return Err(HarnessError::Desync {
                    collection: part.title.clone(),
                });
            }
        }
        Ok(())
    }

    /// Recompute every rectangle from the course order.
    fn relayout(&mut self) -> Result<()> {
        let mut top = 0;
        for part in &self.course.parts {
            let lessons = part.lessons.len() as i32;
            let height = ROW + lessons * ROW + ROW;
            let part_handle = self.handle(&part.title)?;
            self.layer.set_bounds(
                part_handle,
                Some(Bounds::new(0, top, PART_WIDTH, height as u32)),
            )?;
            let list = self.lesson_lists[&part.title];
            let list_top = top + ROW;
            self.layer.set_collection_bounds(
                list,
                Some(Bounds::new(
                    LESSON_X,
                    list_top,
                    LESSON_WIDTH,
                    (lessons * ROW + ROW) as u32,
                )),
            )?;
            for (l, lesson) in part.lessons.iter().enumerate() {
                let handle = self.handle(lesson)?;
                self.layer.set_bounds(
                    handle,
                    Some(Bounds::new(
                        LESSON_X,
                        list_top + l as i32 * ROW,
                        LESSON_WIDTH,
                        ROW as u32,
                    )),
                )?;
            }
            top += height;
        }
        self.layer
            .set_collection_bounds(PARTS, Some(Bounds::new(0, 0, PART_WIDTH, (top + ROW) as u32)))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small() -> NestedLists {
        let mut course = Course::generate(3, 3);
        course.active_lesson = Some("Lesson-1-2".to_string());
        NestedLists::new(course, SortableConfig::default()).unwrap()
    }

    #[test]
    fn generate_titles() {
        let course = Course::generate(2, 2);
        assert_eq!(course.parts[1].title, "Part-2");
        assert_eq!(course.parts[1].lessons, vec!["Lesson-2-1", "Lesson-2-2"]);
        assert_eq!(Course::story().parts.len(), 20);
    }

    #[test]
    fn duplicate_titles_rejected() {
        let mut course = Course::generate(2, 1);
        course.parts[1].title = "Part-1".to_string();
        let err = NestedLists::new(course, SortableConfig::default()).unwrap_err();
        assert!(matches!(err, HarnessError::InvalidArgument { .. }));
    }

    #[test]
    fn active_lesson_is_pinned_on_mount() {
        let lists = small();
        assert_eq!(lists.selected_titles(), vec!["Lesson-1-2"]);
    }

    #[test]
    fn plain_click_moves_active_lesson() {
        let mut lists = small();
        lists.click("Lesson-2-1", Modifiers::NONE).unwrap();
        assert_eq!(lists.course().active_lesson.as_deref(), Some("Lesson-2-1"));
        assert_eq!(lists.selected_titles(), vec!["Lesson-2-1"]);
    }

    #[test]
    fn drag_part_to_top() {
        let mut lists = small();
        lists
            .drag("Part-3", &DropTarget::Before("Part-1".into()), Modifiers::NONE)
            .unwrap();
        let titles: Vec<_> = lists.course().parts.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, vec!["Part-3", "Part-1", "Part-2"]);
        // Layout follows the new order.
        assert_eq!(lists.grab_point("Part-3").unwrap(), Position::new(1, 0));
    }

    #[test]
    fn multi_drag_lessons_with_active() {
        let mut lists = small();
        lists.click("Lesson-3-3", Modifiers::CTRL).unwrap();
        lists
            .drag(
                "Lesson-3-3",
                &DropTarget::EndOf("Part-2".into()),
                Modifiers::NONE,
            )
            .unwrap();
        let course = lists.course();
        assert_eq!(course.parts[0].lessons, vec!["Lesson-1-1", "Lesson-1-3"]);
        assert_eq!(
            course.parts[1].lessons,
            vec!["Lesson-2-1", "Lesson-2-2", "Lesson-2-3", "Lesson-1-2", "Lesson-3-3"]
        );
        assert_eq!(course.parts[2].lessons, vec!["Lesson-3-1", "Lesson-3-2"]);
    }

    #[test]
    fn disable_toggle_blocks_drags() {
        let mut lists = small();
        lists.set_disabled(true).unwrap();
        assert!(lists.selected_titles().is_empty());
        let events = lists
            .drag("Part-2", &DropTarget::Before("Part-1".into()), Modifiers::NONE)
            .unwrap();
        assert!(events.is_empty());
        lists.set_disabled(false).unwrap();
        assert_eq!(lists.selected_titles(), vec!["Lesson-1-2"]);
    }
}
