//! The fixed frontend-track material catalog.
//!
//! The catalog is mock data baked into the binary, mirroring the eight
//! lessons of the learning track. `TOTAL_MATERIALS` is the denominator for
//! the overall progress percentage and is deliberately a property of the
//! catalog, not of how many materials a user happens to have started.

use crate::model::MaterialId;

/// Content type of a catalog material.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaterialKind {
    Video,
    Text,
}

/// One entry of the fixed catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Material {
    slug: &'static str,
    title: &'static str,
    kind: MaterialKind,
    duration_minutes: u32,
    category: &'static str,
}

impl Material {
    #[must_use]
    pub fn id(&self) -> MaterialId {
        MaterialId::new(self.slug)
    }

    #[must_use]
    pub fn slug(&self) -> &'static str {
        self.slug
    }

    #[must_use]
    pub fn title(&self) -> &'static str {
        self.title
    }

    #[must_use]
    pub fn kind(&self) -> MaterialKind {
        self.kind
    }

    /// Advertised duration of the lesson, in minutes.
    #[must_use]
    pub fn duration_minutes(&self) -> u32 {
        self.duration_minutes
    }

    #[must_use]
    pub fn category(&self) -> &'static str {
        self.category
    }
}

const fn material(
    slug: &'static str,
    title: &'static str,
    kind: MaterialKind,
    duration_minutes: u32,
    category: &'static str,
) -> Material {
    Material {
        slug,
        title,
        kind,
        duration_minutes,
        category,
    }
}

const MATERIALS: [Material; 8] = [
    material(
        "git-fundamentals",
        "Git Fundamentals",
        MaterialKind::Video,
        45,
        "Git",
    ),
    material(
        "html-semantic",
        "HTML Semantik",
        MaterialKind::Text,
        30,
        "HTML",
    ),
    material(
        "css-flexbox",
        "CSS Flexbox Layout",
        MaterialKind::Video,
        60,
        "CSS",
    ),
    material(
        "responsive-design",
        "Responsive Web Design",
        MaterialKind::Text,
        50,
        "CSS",
    ),
    material(
        "tailwind-intro",
        "Pengenalan TailwindCSS",
        MaterialKind::Video,
        40,
        "TailwindCSS",
    ),
    material(
        "javascript-basics",
        "JavaScript Fundamentals",
        MaterialKind::Video,
        90,
        "JavaScript",
    ),
    material(
        "css-grid",
        "CSS Grid Layout",
        MaterialKind::Text,
        55,
        "CSS",
    ),
    material(
        "scss-advanced",
        "Advanced SCSS Techniques",
        MaterialKind::Video,
        65,
        "SCSS",
    ),
];

/// Fixed size of the full catalog.
pub const TOTAL_MATERIALS: usize = MATERIALS.len();

/// All catalog materials in track order.
#[must_use]
pub fn materials() -> &'static [Material] {
    &MATERIALS
}

/// Looks a material up by id.
#[must_use]
pub fn find(id: &MaterialId) -> Option<&'static Material> {
    MATERIALS.iter().find(|m| m.slug == id.as_str())
}

/// The material after `id` in track order, if any.
#[must_use]
pub fn next_after(id: &MaterialId) -> Option<&'static Material> {
    let index = MATERIALS.iter().position(|m| m.slug == id.as_str())?;
    MATERIALS.get(index + 1)
}

/// The material before `id` in track order, if any.
#[must_use]
pub fn previous_before(id: &MaterialId) -> Option<&'static Material> {
    let index = MATERIALS.iter().position(|m| m.slug == id.as_str())?;
    index.checked_sub(1).and_then(|i| MATERIALS.get(i))
}

/// Number of catalog materials of the given kind.
#[must_use]
pub fn count_by_kind(kind: MaterialKind) -> usize {
    MATERIALS.iter().filter(|m| m.kind == kind).count()
}

/// Distinct categories in track order of first appearance.
#[must_use]
pub fn categories() -> Vec<&'static str> {
    let mut out: Vec<&'static str> = Vec::new();
    for material in &MATERIALS {
        if !out.contains(&material.category) {
            out.push(material.category);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_has_the_fixed_size() {
        assert_eq!(TOTAL_MATERIALS, 8);
        assert_eq!(materials().len(), TOTAL_MATERIALS);
    }

    #[test]
    fn slugs_are_unique() {
        for (i, a) in materials().iter().enumerate() {
            for b in &materials()[i + 1..] {
                assert_ne!(a.slug(), b.slug());
            }
        }
    }

    #[test]
    fn find_resolves_known_ids() {
        let material = find(&MaterialId::new("javascript-basics")).unwrap();
        assert_eq!(material.title(), "JavaScript Fundamentals");
        assert_eq!(material.kind(), MaterialKind::Video);
        assert!(find(&MaterialId::new("quantum-css")).is_none());
    }

    #[test]
    fn navigation_follows_track_order() {
        let first = &materials()[0];
        let last = &materials()[TOTAL_MATERIALS - 1];
        assert!(previous_before(&first.id()).is_none());
        assert!(next_after(&last.id()).is_none());

        let second = next_after(&first.id()).unwrap();
        assert_eq!(second.slug(), "html-semantic");
        assert_eq!(previous_before(&second.id()).unwrap().slug(), first.slug());
    }

    #[test]
    fn kind_counts_cover_the_catalog() {
        let videos = count_by_kind(MaterialKind::Video);
        let texts = count_by_kind(MaterialKind::Text);
        assert_eq!(videos + texts, TOTAL_MATERIALS);
        assert_eq!(videos, 5);
    }

    #[test]
    fn categories_are_distinct() {
        let categories = categories();
        assert!(categories.contains(&"CSS"));
        let mut deduped = categories.clone();
        deduped.dedup();
        assert_eq!(categories, deduped);
    }
}
