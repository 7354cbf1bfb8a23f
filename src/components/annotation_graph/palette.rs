/// Category colors, indexed by the category's position in the selection.
pub const ANNOTATION_COLORS: [&str; 6] = [
	"#D8E0F1", "#EBE1EE", "#F0EDD9", "#D9F7D9", "#EEEEEE", "#F1D8D8",
];

/// Edge color used when category coloring is off.
pub const DEFAULT_EDGE_COLOR: &str = "#64B4FF";
pub const GENE_COLOR: &str = "#87BEF5";
pub const TERM_COLOR: &str = "#C9E1F9";

/// Palette lookup. Indices past the palette wrap around.
pub fn color_for(category_index: usize) -> &'static str {
	ANNOTATION_COLORS[category_index % ANNOTATION_COLORS.len()]
}

/// Swatch shown next to a category toggle. Minimal mode draws no category
/// colors at all.
pub fn swatch(category_index: usize, minimal_mode: bool) -> Option<&'static str> {
	(!minimal_mode).then(|| color_for(category_index))
}
