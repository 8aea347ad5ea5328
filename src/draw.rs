use crate::canvas::Canvas;
use crate::font::approx_text_width;
use crate::types::{Color, Pt, Size};

/// Cubic arc constant for quarter-circle corners.
const KAPPA: f32 = 0.552_284_8;

/// Millimetre coordinate frame over a page. Page builders think in
/// top-down mm from the upper-left corner; the frame converts to the
/// bottom-up point space the content streams use.
#[derive(Debug, Clone, Copy)]
pub(crate) struct PageFrame {
    size: Size,
}

impl PageFrame {
    pub fn new(size: Size) -> Self {
        Self { size }
    }

    pub fn width_mm(&self) -> f32 {
        self.size.width.to_f32() * 25.4 / 72.0
    }

    pub fn x(&self, x_mm: f32) -> Pt {
        Pt::from_mm(x_mm)
    }

    /// Distance from the top edge, flipped into page space.
    pub fn y(&self, y_mm: f32) -> Pt {
        self.size.height - Pt::from_mm(y_mm)
    }

    /// Filled rectangle whose top-left corner sits at (`x_mm`, `y_mm`).
    pub fn fill_rect(&self, canvas: &mut Canvas, x_mm: f32, y_mm: f32, w_mm: f32, h_mm: f32) {
        canvas.draw_rect(
            self.x(x_mm),
            self.y(y_mm + h_mm),
            Pt::from_mm(w_mm),
            Pt::from_mm(h_mm),
        );
        canvas.fill();
    }

    /// Rounded rectangle path via cubic corner arcs, then filled.
    pub fn fill_rounded_rect(
        &self,
        canvas: &mut Canvas,
        x_mm: f32,
        y_mm: f32,
        w_mm: f32,
        h_mm: f32,
        radius_mm: f32,
    ) {
        let r = radius_mm.min(w_mm / 2.0).min(h_mm / 2.0);
        if r <= 0.0 {
            self.fill_rect(canvas, x_mm, y_mm, w_mm, h_mm);
            return;
        }
        let k = KAPPA * r;
        let (x0, x1) = (x_mm, x_mm + w_mm);
        let (y0, y1) = (y_mm, y_mm + h_mm);

        canvas.move_to(self.x(x0 + r), self.y(y0));
        canvas.line_to(self.x(x1 - r), self.y(y0));
        canvas.curve_to(
            self.x(x1 - r + k),
            self.y(y0),
            self.x(x1),
            self.y(y0 + r - k),
            self.x(x1),
            self.y(y0 + r),
        );
        canvas.line_to(self.x(x1), self.y(y1 - r));
        canvas.curve_to(
            self.x(x1),
            self.y(y1 - r + k),
            self.x(x1 - r + k),
            self.y(y1),
            self.x(x1 - r),
            self.y(y1),
        );
        canvas.line_to(self.x(x0 + r), self.y(y1));
        canvas.curve_to(
            self.x(x0 + r - k),
            self.y(y1),
            self.x(x0),
            self.y(y1 - r + k),
            self.x(x0),
            self.y(y1 - r),
        );
        canvas.line_to(self.x(x0), self.y(y0 + r));
        canvas.curve_to(
            self.x(x0),
            self.y(y0 + r - k),
            self.x(x0 + r - k),
            self.y(y0),
            self.x(x0 + r),
            self.y(y0),
        );
        canvas.close_path();
        canvas.fill();
    }

    pub fn fill_circle(&self, canvas: &mut Canvas, cx_mm: f32, cy_mm: f32, r_mm: f32) {
        if r_mm <= 0.0 {
            return;
        }
        let k = KAPPA * r_mm;
        let (cx, cy, r) = (cx_mm, cy_mm, r_mm);
        canvas.move_to(self.x(cx + r), self.y(cy));
        canvas.curve_to(
            self.x(cx + r),
            self.y(cy + k),
            self.x(cx + k),
            self.y(cy + r),
            self.x(cx),
            self.y(cy + r),
        );
        canvas.curve_to(
            self.x(cx - k),
            self.y(cy + r),
            self.x(cx - r),
            self.y(cy + k),
            self.x(cx - r),
            self.y(cy),
        );
        canvas.curve_to(
            self.x(cx - r),
            self.y(cy - k),
            self.x(cx - k),
            self.y(cy - r),
            self.x(cx),
            self.y(cy - r),
        );
        canvas.curve_to(
            self.x(cx + k),
            self.y(cy - r),
            self.x(cx + r),
            self.y(cy - k),
            self.x(cx + r),
            self.y(cy),
        );
        canvas.close_path();
        canvas.fill();
    }

    pub fn stroke_line(
        &self,
        canvas: &mut Canvas,
        x1_mm: f32,
        y1_mm: f32,
        x2_mm: f32,
        y2_mm: f32,
        width: Pt,
        color: Color,
    ) {
        canvas.set_stroke_color(color);
        canvas.set_line_width(width);
        canvas.move_to(self.x(x1_mm), self.y(y1_mm));
        canvas.line_to(self.x(x2_mm), self.y(y2_mm));
        canvas.stroke();
    }

    /// Left-aligned text with its baseline `y_mm` from the top edge.
    pub fn text(
        &self,
        canvas: &mut Canvas,
        x_mm: f32,
        y_mm: f32,
        font: &str,
        size: Pt,
        color: Color,
        content: &str,
    ) {
        canvas.set_fill_color(color);
        canvas.set_font_name(font);
        canvas.set_font_size(size);
        canvas.draw_string(self.x(x_mm), self.y(y_mm), content);
    }

    /// Text centered on `cx_mm`, width estimated from the metric heuristic.
    pub fn text_centered(
        &self,
        canvas: &mut Canvas,
        cx_mm: f32,
        y_mm: f32,
        font: &str,
        size: Pt,
        color: Color,
        content: &str,
    ) {
        let width = approx_text_width(size, content);
        let x = self.x(cx_mm) - width / 2.0;
        canvas.set_fill_color(color);
        canvas.set_font_name(font);
        canvas.set_font_size(size);
        canvas.draw_string(x, self.y(y_mm), content);
    }

    /// Text whose right edge ends at `right_mm`.
    pub fn text_right(
        &self,
        canvas: &mut Canvas,
        right_mm: f32,
        y_mm: f32,
        font: &str,
        size: Pt,
        color: Color,
        content: &str,
    ) {
        let width = approx_text_width(size, content);
        let x = self.x(right_mm) - width;
        canvas.set_fill_color(color);
        canvas.set_font_name(font);
        canvas.set_font_size(size);
        canvas.draw_string(x, self.y(y_mm), content);
    }

    /// Image placed by its top-left corner in mm.
    pub fn image(
        &self,
        canvas: &mut Canvas,
        x_mm: f32,
        y_mm: f32,
        w_mm: f32,
        h_mm: f32,
        resource_id: &str,
    ) {
        canvas.draw_image(
            self.x(x_mm),
            self.y(y_mm + h_mm),
            Pt::from_mm(w_mm),
            Pt::from_mm(h_mm),
            resource_id,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::Command;

    #[test]
    fn y_axis_flips_against_page_height() {
        let frame = PageFrame::new(Size::a4());
        // 10mm from the top lands 10mm below the page's top edge.
        let expected = Pt::from_f32(841.89) - Pt::from_mm(10.0);
        assert_eq!(frame.y(10.0), expected);
        assert!((frame.width_mm() - 210.0).abs() < 0.05);
    }

    #[test]
    fn fill_rect_anchors_top_left() {
        let frame = PageFrame::new(Size::a4());
        let mut canvas = Canvas::new(Size::a4());
        frame.fill_rect(&mut canvas, 20.0, 30.0, 50.0, 10.0);
        let doc = canvas.finish();
        let rect = doc.pages[0]
            .commands
            .iter()
            .find_map(|c| match c {
                Command::DrawRect { x, y, .. } => Some((*x, *y)),
                _ => None,
            })
            .expect("rect recorded");
        assert_eq!(rect.0, Pt::from_mm(20.0));
        // Bottom edge sits 40mm from the top.
        assert_eq!(rect.1, frame.y(40.0));
    }

    #[test]
    fn centered_text_offsets_by_half_estimated_width() {
        let frame = PageFrame::new(Size::a4());
        let mut canvas = Canvas::new(Size::a4());
        frame.text_centered(
            &mut canvas,
            105.0,
            50.0,
            "Helvetica",
            Pt::from_f32(10.0),
            Color::BLACK,
            "abcd",
        );
        let doc = canvas.finish();
        let x = doc.pages[0]
            .commands
            .iter()
            .find_map(|c| match c {
                Command::DrawString { x, .. } => Some(*x),
                _ => None,
            })
            .expect("string recorded");
        // 4 chars at 10pt estimate to 24pt, so the start is 12pt left of centre.
        assert_eq!(x, frame.x(105.0) - Pt::from_f32(12.0));
    }

    #[test]
    fn rounded_rect_records_closed_filled_path() {
        let frame = PageFrame::new(Size::a4());
        let mut canvas = Canvas::new(Size::a4());
        frame.fill_rounded_rect(&mut canvas, 10.0, 10.0, 40.0, 20.0, 3.0);
        let doc = canvas.finish();
        let commands = &doc.pages[0].commands;
        assert!(commands.iter().any(|c| matches!(c, Command::CurveTo { .. })));
        assert!(commands.iter().any(|c| matches!(c, Command::ClosePath)));
        assert!(commands.iter().any(|c| matches!(c, Command::Fill)));
    }
}
