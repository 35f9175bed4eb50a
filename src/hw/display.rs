//! # Display frames.
//!
//! The entrance display has two fixed-width lines. [`DisplayFrame`] is the
//! content; [`DisplayFrame::lines`] renders it for a given width:
//!
//! ```text
//! FreeSlots([1, 3])  →  "Free:"            Full  →  "FULL"
//!                       "S1 S3"                     ""
//! ```

/// Content for the entrance display.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DisplayFrame {
    /// Free slot numbers, ascending. An empty list renders as "FULL".
    FreeSlots(Vec<u16>),
    /// Explicit "FULL" notice.
    Full,
}

impl DisplayFrame {
    /// Summary frame for the given free slots.
    pub fn summary(free: Vec<u16>) -> Self {
        if free.is_empty() {
            DisplayFrame::Full
        } else {
            DisplayFrame::FreeSlots(free)
        }
    }

    /// Renders the two display lines, each truncated to `width` characters.
    ///
    /// # Example
    /// ```
    /// use lotkeeper::DisplayFrame;
    ///
    /// let frame = DisplayFrame::summary(vec![1, 2, 3]);
    /// assert_eq!(frame.lines(16), ["Free:".to_string(), "S1 S2 S3".to_string()]);
    /// assert_eq!(DisplayFrame::summary(vec![]).lines(16)[0], "FULL");
    /// ```
    pub fn lines(&self, width: usize) -> [String; 2] {
        match self {
            DisplayFrame::FreeSlots(free) if !free.is_empty() => {
                let labels = free
                    .iter()
                    .map(|n| format!("S{n}"))
                    .collect::<Vec<_>>()
                    .join(" ");
                [truncate("Free:", width), truncate(&labels, width)]
            }
            _ => [truncate("FULL", width), String::new()],
        }
    }
}

fn truncate(text: &str, width: usize) -> String {
    text.chars().take(width).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn long_lists_are_truncated() {
        let frame = DisplayFrame::summary((1..=9).collect());
        let [top, bottom] = frame.lines(16);
        assert_eq!(top, "Free:");
        assert_eq!(bottom, "S1 S2 S3 S4 S5 S");
        assert_eq!(bottom.len(), 16);
    }

    #[test]
    fn narrow_display_truncates_both_lines() {
        assert_eq!(DisplayFrame::Full.lines(2), ["FU".to_string(), String::new()]);
        assert_eq!(
            DisplayFrame::FreeSlots(vec![2]).lines(3),
            ["Fre".to_string(), "S2".to_string()]
        );
    }

    #[test]
    fn empty_free_list_is_full() {
        assert_eq!(DisplayFrame::summary(Vec::new()), DisplayFrame::Full);
        assert_eq!(DisplayFrame::FreeSlots(Vec::new()).lines(16)[0], "FULL");
    }
}
