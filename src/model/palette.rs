//! Display colors for labels.

/// An RGBA color with 8-bit channels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    /// Creates a color from explicit channel values.
    #[inline]
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Creates a fully opaque color.
    #[inline]
    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }
}

/// The fixed cycle new labels draw colors from, in assignment order.
const DEFAULT_CYCLE: [Color; 8] = [
    Color::opaque(230, 57, 70),   // red
    Color::opaque(42, 157, 143),  // teal
    Color::opaque(69, 123, 157),  // steel blue
    Color::opaque(244, 162, 97),  // orange
    Color::opaque(142, 68, 173),  // purple
    Color::opaque(233, 196, 106), // yellow
    Color::opaque(38, 70, 83),    // slate
    Color::opaque(231, 111, 81),  // coral
];

/// Insertion-ordered label → color registry.
///
/// Colors are assigned from a fixed cycle on first sight of a label, so
/// the same sequence of labels always shows the same colors. The palette
/// is derived display state and is never persisted.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LabelPalette {
    entries: Vec<(String, Color)>,
}

impl LabelPalette {
    /// Creates an empty palette.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the color for `label`, assigning the next cycle color on
    /// first sight.
    pub fn color_for(&mut self, label: &str) -> Color {
        if let Some(color) = self.get(label) {
            return color;
        }
        let color = DEFAULT_CYCLE[self.entries.len() % DEFAULT_CYCLE.len()];
        self.entries.push((label.to_owned(), color));
        color
    }

    /// Returns the color previously assigned to `label`, if any.
    pub fn get(&self, label: &str) -> Option<Color> {
        self.entries
            .iter()
            .find(|(name, _)| name == label)
            .map(|(_, color)| *color)
    }

    /// Carries an assigned color across a label rename: the new name keeps
    /// the old name's color. A rename onto an already-assigned name keeps
    /// that name's existing color and forgets the old entry. Unknown `old`
    /// is a no-op.
    pub fn rename(&mut self, old: &str, new: &str) {
        if old == new || self.get(old).is_none() {
            return;
        }
        if self.get(new).is_some() {
            self.entries.retain(|(name, _)| name != old);
            return;
        }
        for entry in &mut self.entries {
            if entry.0 == old {
                entry.0 = new.to_owned();
            }
        }
    }

    /// Labels in assignment order.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    /// Number of assigned labels.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no label has been assigned a color yet.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
