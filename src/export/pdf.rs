//! PDF rendering of a [`DocumentLayout`] with printpdf's built-in Helvetica

use printpdf::{BuiltinFont, Color, Mm, PdfDocument, Rgb};
use tracing::debug;

use super::layout::{A4_HEIGHT_MM, A4_WIDTH_MM, DocumentLayout};
use crate::{Result, TripPlannerError};

/// Render the layout into PDF bytes
pub fn render(layout: &DocumentLayout) -> Result<Vec<u8>> {
    let (doc, first_page, first_layer) = PdfDocument::new(
        layout.title.as_str(),
        Mm(A4_WIDTH_MM),
        Mm(A4_HEIGHT_MM),
        "Layer 1",
    );

    let font = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| TripPlannerError::export(format!("Font error: {e:?}")))?;

    for (index, page) in layout.pages.iter().enumerate() {
        let (page_index, layer_index) = if index == 0 {
            (first_page, first_layer)
        } else {
            doc.add_page(Mm(A4_WIDTH_MM), Mm(A4_HEIGHT_MM), format!("Layer {}", index + 1))
        };
        let layer = doc.get_page(page_index).get_layer(layer_index);

        for line in &page.lines {
            let (r, g, b) = line.style.color();
            layer.set_fill_color(Color::Rgb(Rgb::new(r, g, b, None)));
            // PDF space grows upwards from the bottom edge
            layer.use_text(
                line.text.as_str(),
                line.size,
                Mm(line.x_mm),
                Mm(A4_HEIGHT_MM - line.y_mm),
                &font,
            );
        }
    }

    let bytes = doc
        .save_to_bytes()
        .map_err(|e| TripPlannerError::export(format!("PDF save error: {e:?}")))?;
    debug!("Rendered {} pages, {} bytes", layout.page_count(), bytes.len());
    Ok(bytes)
}
