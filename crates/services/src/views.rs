//! Read-only catalog views: the material sidebar, the filtered catalog
//! listing, and lesson navigation.
//!
//! Everything here is a pure function over a `UserProgress` snapshot; these
//! surfaces never write through to the store.

use progress_core::catalog::{self, MaterialKind};
use progress_core::model::{MaterialId, UserProgress};

/// One sidebar/catalog row: static catalog data joined with user progress.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaterialListItem {
    pub id: MaterialId,
    pub title: &'static str,
    pub kind: MaterialKind,
    pub category: &'static str,
    pub duration_minutes: u32,
    pub completed: bool,
    pub percent: u8,
}

/// Kind filter for the catalog listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KindFilter {
    #[default]
    All,
    Video,
    Text,
}

impl KindFilter {
    fn matches(self, kind: MaterialKind) -> bool {
        match self {
            KindFilter::All => true,
            KindFilter::Video => kind == MaterialKind::Video,
            KindFilter::Text => kind == MaterialKind::Text,
        }
    }
}

/// Per-kind item counts shown next to the catalog filter tabs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListCounts {
    pub all: usize,
    pub video: usize,
    pub text: usize,
}

#[must_use]
pub fn list_counts() -> ListCounts {
    ListCounts {
        all: catalog::TOTAL_MATERIALS,
        video: catalog::count_by_kind(MaterialKind::Video),
        text: catalog::count_by_kind(MaterialKind::Text),
    }
}

/// All catalog materials in track order, joined with the snapshot.
#[must_use]
pub fn material_list(snapshot: &UserProgress) -> Vec<MaterialListItem> {
    catalog::materials()
        .iter()
        .map(|material| {
            let entry = snapshot.material(&material.id());
            MaterialListItem {
                id: material.id(),
                title: material.title(),
                kind: material.kind(),
                category: material.category(),
                duration_minutes: material.duration_minutes(),
                completed: entry.is_some_and(|e| e.completed()),
                percent: entry.map_or(0, |e| e.percent()),
            }
        })
        .collect()
}

/// The catalog listing with search and filters applied.
///
/// `search` matches the title or category, case-insensitively.
#[must_use]
pub fn filtered_list(
    snapshot: &UserProgress,
    kind: KindFilter,
    category: Option<&str>,
    search: Option<&str>,
) -> Vec<MaterialListItem> {
    let needle = search.map(str::to_lowercase);
    material_list(snapshot)
        .into_iter()
        .filter(|item| kind.matches(item.kind))
        .filter(|item| category.is_none_or(|c| item.category == c))
        .filter(|item| {
            needle.as_deref().is_none_or(|needle| {
                item.title.to_lowercase().contains(needle)
                    || item.category.to_lowercase().contains(needle)
            })
        })
        .collect()
}

/// True once every catalog material is completed (the congrats trigger).
#[must_use]
pub fn all_complete(snapshot: &UserProgress) -> bool {
    catalog::materials()
        .iter()
        .all(|material| snapshot.material(&material.id()).is_some_and(|e| e.completed()))
}

/// Id of the material after `id` in track order.
#[must_use]
pub fn next_material(id: &MaterialId) -> Option<MaterialId> {
    catalog::next_after(id).map(|m| m.id())
}

/// Id of the material before `id` in track order.
#[must_use]
pub fn previous_material(id: &MaterialId) -> Option<MaterialId> {
    catalog::previous_before(id).map(|m| m.id())
}

#[cfg(test)]
mod tests {
    use super::*;
    use progress_core::time::fixed_now;

    #[test]
    fn material_list_joins_snapshot_onto_catalog() {
        let mut snapshot = UserProgress::default();
        snapshot.update_progress(&MaterialId::new("css-flexbox"), 40, None, fixed_now());
        snapshot.mark_complete(&MaterialId::new("git-fundamentals"), fixed_now());

        let list = material_list(&snapshot);
        assert_eq!(list.len(), 8);
        assert!(list[0].completed);
        assert_eq!(list[0].id, MaterialId::new("git-fundamentals"));
        let flexbox = list.iter().find(|i| i.id.as_str() == "css-flexbox").unwrap();
        assert!(!flexbox.completed);
        assert_eq!(flexbox.percent, 40);
    }

    #[test]
    fn unknown_progress_entries_do_not_appear_in_the_list() {
        let mut snapshot = UserProgress::default();
        snapshot.mark_complete(&MaterialId::new("not-in-catalog"), fixed_now());

        let list = material_list(&snapshot);
        assert_eq!(list.len(), 8);
        assert!(list.iter().all(|item| !item.completed));
    }

    #[test]
    fn filters_narrow_the_listing() {
        let snapshot = UserProgress::default();

        let videos = filtered_list(&snapshot, KindFilter::Video, None, None);
        assert_eq!(videos.len(), 5);

        let css = filtered_list(&snapshot, KindFilter::All, Some("CSS"), None);
        assert_eq!(css.len(), 3);

        let css_texts = filtered_list(&snapshot, KindFilter::Text, Some("CSS"), None);
        assert!(css_texts.iter().all(|i| i.kind == MaterialKind::Text));

        let grid = filtered_list(&snapshot, KindFilter::All, None, Some("grid"));
        assert_eq!(grid.len(), 1);
        assert_eq!(grid[0].id.as_str(), "css-grid");
    }

    #[test]
    fn counts_match_the_catalog() {
        let counts = list_counts();
        assert_eq!(counts.all, 8);
        assert_eq!(counts.video + counts.text, counts.all);
    }

    #[test]
    fn all_complete_requires_every_catalog_material() {
        let mut snapshot = UserProgress::default();
        for material in catalog::materials().iter().skip(1) {
            snapshot.mark_complete(&material.id(), fixed_now());
        }
        assert!(!all_complete(&snapshot));

        snapshot.mark_complete(&catalog::materials()[0].id(), fixed_now());
        assert!(all_complete(&snapshot));
    }

    #[test]
    fn navigation_walks_the_track() {
        let first = MaterialId::new("git-fundamentals");
        assert_eq!(
            next_material(&first),
            Some(MaterialId::new("html-semantic"))
        );
        assert_eq!(previous_material(&first), None);
        assert_eq!(next_material(&MaterialId::new("scss-advanced")), None);
        assert_eq!(next_material(&MaterialId::new("unknown")), None);
    }
}
