//! Attribute names making up a SpaceNode's channel set.
//!
//! `TARGETS` doubles as the SpaceNode marker; `SPACE_NODE` is the locked
//! back-reference a controlled transform carries to its SpaceNode;
//! `WORLD_MARKER` tags the per-graph world anchor singleton.

/// Ordered node-reference list of targets; presence marks a SpaceNode.
pub const TARGETS: &str = "spaceTargets";
/// Enum selector; labels are the label list, index is the current space.
pub const SPACE: &str = "space";
/// Display tag assigned at build time.
pub const NAME_TAG: &str = "spaceTag";
/// Live continuity offset, shared across every constraint target.
pub const OFFSET_TRANSLATE: &str = "spaceOffsetTranslate";
pub const OFFSET_ROTATE: &str = "spaceOffsetRotate";
/// Back-reference attribute on the controlled transform.
pub const SPACE_NODE: &str = "spaceNode";
/// Marker attribute on the world anchor node.
pub const WORLD_MARKER: &str = "worldSpace";

/// Reserved labels for the two implicit targets at indices 0 and 1.
pub const LABEL_DEFAULT: &str = "Default";
pub const LABEL_WORLD: &str = "World";

pub fn weight_attr(index: usize) -> String {
    format!("spaceWeight{index}")
}

pub fn default_translate_attr(index: usize) -> String {
    format!("spaceDefaultTranslate{index}")
}

pub fn default_rotate_attr(index: usize) -> String {
    format!("spaceDefaultRotate{index}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn per_index_names_are_positional() {
        assert_eq!(weight_attr(0), "spaceWeight0");
        assert_eq!(weight_attr(12), "spaceWeight12");
        assert_eq!(default_translate_attr(3), "spaceDefaultTranslate3");
        assert_eq!(default_rotate_attr(3), "spaceDefaultRotate3");
    }
}
