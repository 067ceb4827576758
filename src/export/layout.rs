//! Page layout for the PDF export
//!
//! All positions are millimeters from the top-left corner of an A4 page.
//! The layout is computed independently of the PDF backend so pagination can
//! be tested without rendering.

use super::ExportContext;
use crate::recommendations::group_by_area;
use crate::schedule::DaySchedule;

/// A4 size in mm
pub const A4_WIDTH_MM: f32 = 210.0;
pub const A4_HEIGHT_MM: f32 = 297.0;

pub const LEFT_MARGIN_MM: f32 = 20.0;
/// Indent for secondary lines (descriptions, slots)
pub const INDENT_MM: f32 = 25.0;
/// A line starting below this starts a new page
pub const PAGE_BREAK_Y_MM: f32 = 270.0;
/// Cursor position at the top of a continuation page
pub const TOP_Y_MM: f32 = 20.0;

/// mm → pt (1mm = 72/25.4 pt)
pub const MM_TO_PT: f32 = 72.0 / 25.4;
/// Rough Helvetica advance as a share of the font size
const AVG_CHAR_WIDTH_EM: f32 = 0.5;

const TITLE_SIZE: f32 = 20.0;
const HEADING_SIZE: f32 = 14.0;
const SUBHEADING_SIZE: f32 = 12.0;
const BODY_SIZE: f32 = 10.0;

/// Line height for body text
const BODY_LINE_MM: f32 = 6.0;
/// Gap after each recommendation entry
const ENTRY_GAP_MM: f32 = 8.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextStyle {
    Title,
    Heading,
    Body,
    Muted,
}

impl TextStyle {
    /// RGB fill color, components in 0..=1
    #[must_use]
    pub fn color(self) -> (f32, f32, f32) {
        match self {
            TextStyle::Title => (102.0 / 255.0, 126.0 / 255.0, 234.0 / 255.0),
            TextStyle::Heading | TextStyle::Body => (0.0, 0.0, 0.0),
            TextStyle::Muted => (0.4, 0.4, 0.4),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextLine {
    pub text: String,
    pub size: f32,
    pub x_mm: f32,
    pub y_mm: f32,
    pub style: TextStyle,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub lines: Vec<TextLine>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DocumentLayout {
    pub title: String,
    pub pages: Vec<Page>,
}

/// Greedy word wrap to a maximum number of characters per line.
/// Words longer than the limit are split.
#[must_use]
pub fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();
        while word.len() > max_chars {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            let rest = word.split_off(max_chars);
            lines.push(word.into_iter().collect());
            word = rest;
        }

        let word: String = word.into_iter().collect();
        let needed = if current.is_empty() {
            word.chars().count()
        } else {
            current.chars().count() + 1 + word.chars().count()
        };
        if needed > max_chars && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(&word);
    }

    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

fn is_latin1(c: char) -> bool {
    u32::from(c) <= 0xFF
}

/// Make text printable with the built-in Helvetica, which only covers Latin-1.
///
/// Words written entirely in another script are dropped. When they precede a
/// parenthesized name, as in `local (English)`, the parentheses go and the
/// English name stands in; otherwise a single `?` marks the gap. Any other
/// character outside Latin-1 becomes `?`.
#[must_use]
pub fn pdf_safe_text(text: &str) -> String {
    if text.chars().all(is_latin1) {
        return text.to_string();
    }

    let mut words: Vec<String> = Vec::new();
    let mut after_dropped = false;
    let mut unwrapping = false;
    for word in text.split_whitespace() {
        let foreign = word.chars().any(|c| !is_latin1(c))
            && !word.chars().any(|c| is_latin1(c) && c.is_alphanumeric());
        if foreign {
            after_dropped = true;
            continue;
        }

        let mut word = word.to_string();
        if after_dropped {
            if word.starts_with('(') {
                word.remove(0);
                unwrapping = true;
            } else {
                words.push("?".to_string());
            }
            after_dropped = false;
        }
        if unwrapping {
            if let Some(end) = word.rfind(')') {
                word.remove(end);
                unwrapping = false;
            }
        }
        if !word.is_empty() {
            words.push(word.chars().map(|c| if is_latin1(c) { c } else { '?' }).collect());
        }
    }
    if after_dropped || words.is_empty() {
        words.push("?".to_string());
    }
    words.join(" ")
}

/// Characters that fit between `x_mm` and the right margin at `size` pt
#[must_use]
pub fn chars_per_line(x_mm: f32, size: f32) -> usize {
    let width_pt = (A4_WIDTH_MM - LEFT_MARGIN_MM - x_mm) * MM_TO_PT;
    (width_pt / (size * AVG_CHAR_WIDTH_EM)).floor().max(1.0) as usize
}

/// Writes lines top to bottom and opens pages as needed
struct PageWriter {
    pages: Vec<Page>,
    y: f32,
}

impl PageWriter {
    fn new() -> Self {
        Self {
            pages: vec![Page::default()],
            y: TOP_Y_MM,
        }
    }

    fn new_page(&mut self) {
        self.pages.push(Page::default());
        self.y = TOP_Y_MM;
    }

    fn at_page_top(&self) -> bool {
        self.pages.last().is_none_or(|p| p.lines.is_empty())
    }

    /// Move a block of the given height to a fresh page unless it fits
    fn keep_together(&mut self, height: f32) {
        if self.y + height > PAGE_BREAK_Y_MM && !self.at_page_top() {
            self.new_page();
        }
    }

    fn place(&mut self, text: impl Into<String>, size: f32, x_mm: f32, y_mm: f32, style: TextStyle) {
        if let Some(page) = self.pages.last_mut() {
            page.lines.push(TextLine {
                text: pdf_safe_text(&text.into()),
                size,
                x_mm,
                y_mm,
                style,
            });
        }
    }

    /// Write at the cursor, then advance it
    fn line(&mut self, text: impl Into<String>, size: f32, x_mm: f32, style: TextStyle, advance: f32) {
        if self.y > PAGE_BREAK_Y_MM {
            self.new_page();
        }
        let y = self.y;
        self.place(text, size, x_mm, y, style);
        self.y += advance;
    }

    fn wrapped(&mut self, text: &str, size: f32, x_mm: f32, style: TextStyle, advance: f32) {
        for part in wrap_text(&pdf_safe_text(text), chars_per_line(x_mm, size)) {
            self.line(part, size, x_mm, style, advance);
        }
    }

    fn gap(&mut self, mm: f32) {
        self.y += mm;
    }
}

/// Text lines of one day block, before placement
fn day_block(day: &DaySchedule) -> Vec<(String, f32, TextStyle)> {
    let mut lines = vec![(day.title(), SUBHEADING_SIZE, TextStyle::Heading)];

    if !day.stops.is_empty() {
        let stops = day
            .stops
            .iter()
            .map(|s| s.short_name())
            .collect::<Vec<_>>()
            .join(", ");
        lines.push((pdf_safe_text(&format!("Stops: {stops}")), BODY_SIZE, TextStyle::Muted));
    }
    for slot in &day.slots {
        let text = pdf_safe_text(&format!("{}  {}: {}", slot.time, slot.label, slot.activity));
        for part in wrap_text(&text, chars_per_line(INDENT_MM, BODY_SIZE)) {
            lines.push((part, BODY_SIZE, TextStyle::Body));
        }
    }
    lines
}

fn day_block_height(lines: &[(String, f32, TextStyle)]) -> f32 {
    // Heading advances 8mm, everything else one body line
    8.0 + (lines.len().saturating_sub(1)) as f32 * BODY_LINE_MM
}

impl DocumentLayout {
    /// Lay out header, trip summary, day plan and the recommendation appendix
    #[must_use]
    pub fn build(ctx: &ExportContext<'_>) -> Self {
        let mut writer = PageWriter::new();
        let itinerary = ctx.itinerary;

        // Header and summary sit at fixed positions on the first page
        writer.place("Travel Itinerary", TITLE_SIZE, LEFT_MARGIN_MM, 30.0, TextStyle::Title);
        writer.place("Trip Details:", HEADING_SIZE, LEFT_MARGIN_MM, 50.0, TextStyle::Heading);

        let mut summary = vec![
            format!("Source: {}", itinerary.source.name),
            format!("Destination: {}", itinerary.destination.name),
            format!("Distance: {}", ctx.distance_text()),
            format!("Estimated Time: {}", ctx.duration_text()),
        ];
        if let Some(route) = ctx.route {
            summary.push(format!(
                "Estimated Cost: Rs {} ({})",
                route.cost,
                ctx.preference.label()
            ));
        }
        if let Some(days) = itinerary.trip_duration {
            let unit = if days == 1 { "day" } else { "days" };
            summary.push(format!("Trip Duration: {days} {unit}"));
        }

        writer.y = 65.0;
        for line in summary {
            writer.wrapped(&line, SUBHEADING_SIZE, LEFT_MARGIN_MM, TextStyle::Body, 10.0);
        }
        writer.gap(10.0);

        if !ctx.schedule.is_empty() {
            writer.keep_together(20.0);
            writer.line("Day-by-Day Plan:", HEADING_SIZE, LEFT_MARGIN_MM, TextStyle::Heading, 12.0);
            for day in ctx.schedule {
                let lines = day_block(day);
                writer.keep_together(day_block_height(&lines));
                for (index, (text, size, style)) in lines.into_iter().enumerate() {
                    if index == 0 {
                        writer.line(text, size, LEFT_MARGIN_MM, style, 8.0);
                    } else {
                        writer.line(text, size, INDENT_MM, style, BODY_LINE_MM);
                    }
                }
                writer.gap(6.0);
            }
        }

        if !ctx.recommendations.is_empty() {
            writer.keep_together(20.0);
            writer.line("Recommendations:", HEADING_SIZE, LEFT_MARGIN_MM, TextStyle::Heading, 12.0);
            for group in group_by_area(ctx.recommendations) {
                writer.keep_together(8.0 + BODY_LINE_MM * 2.0);
                writer.line(group.label, SUBHEADING_SIZE, LEFT_MARGIN_MM, TextStyle::Heading, 8.0);
                for rec in group.recommendations {
                    writer.wrapped(
                        &format!("{} ({})", pdf_safe_text(&rec.name), rec.kind),
                        BODY_SIZE,
                        LEFT_MARGIN_MM,
                        TextStyle::Body,
                        BODY_LINE_MM,
                    );
                    writer.wrapped(&rec.description, BODY_SIZE, INDENT_MM, TextStyle::Muted, BODY_LINE_MM);
                    writer.gap(ENTRY_GAP_MM - BODY_LINE_MM);
                }
                writer.gap(4.0);
            }
        }

        Self {
            title: format!(
                "{} to {}",
                itinerary.source.short_name(),
                itinerary.destination.short_name()
            ),
            pages: writer.pages,
        }
    }

    #[must_use]
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// All text in page order, for searching and tests
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.pages
            .iter()
            .flat_map(|p| p.lines.iter())
            .map(|l| l.text.as_str())
    }
}
