//! The hanged figure, drawn one body part per lost life.

/// Figure parts in the order they appear.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyPart {
    Rope,
    Face,
    Body,
    LeftArm,
    RightArm,
    LeftLeg,
    RightLeg,
}

impl BodyPart {
    pub const ALL: [BodyPart; 7] = [
        BodyPart::Rope,
        BodyPart::Face,
        BodyPart::Body,
        BodyPart::LeftArm,
        BodyPart::RightArm,
        BodyPart::LeftLeg,
        BodyPart::RightLeg,
    ];

    /// Default number of lives: one per part.
    pub const COUNT: u8 = Self::ALL.len() as u8;

    fn index(self) -> usize {
        self as usize
    }

    /// Whether this part is drawn with `lives` of `max_lives` remaining.
    pub fn is_visible(self, lives: u8, max_lives: u8) -> bool {
        self.index() < visible_parts(lives, max_lives)
    }
}

/// Number of parts drawn after losing `max_lives - lives` lives.
///
/// Scales to the seven parts when `max_lives` differs from the part count,
/// rounding up so the first miss always shows something.
pub fn visible_parts(lives: u8, max_lives: u8) -> usize {
    if max_lives == 0 {
        return BodyPart::ALL.len();
    }
    let lost = usize::from(max_lives.saturating_sub(lives.min(max_lives)));
    let parts = BodyPart::ALL.len();
    (lost * parts).div_ceil(usize::from(max_lives)).min(parts)
}

/// ASCII rendering of the gallows with the visible parts.
pub fn render_ascii(lives: u8, max_lives: u8) -> Vec<String> {
    let shown = |part: BodyPart, glyph: &'static str| {
        if part.is_visible(lives, max_lives) { glyph } else { " " }
    };

    vec![
        "  +-----+".to_string(),
        format!("  |     {}", shown(BodyPart::Rope, "|")),
        format!("  |     {}", shown(BodyPart::Face, "O")),
        format!(
            "  |    {}{}{}",
            shown(BodyPart::LeftArm, "/"),
            shown(BodyPart::Body, "|"),
            shown(BodyPart::RightArm, "\\")
        ),
        format!(
            "  |    {} {}",
            shown(BodyPart::LeftLeg, "/"),
            shown(BodyPart::RightLeg, "\\")
        ),
        "  |".to_string(),
        "=====".to_string(),
    ]
}
