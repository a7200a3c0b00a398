use std::cell::RefCell;
use std::f64::consts::PI;
use std::rc::Rc;

use gtk4::prelude::*;

/// Build the lap chart. The returned vector is the chart's data model: write
/// the current lap list into it and call `queue_draw` on the area.
pub fn build_chart() -> (gtk4::DrawingArea, Rc<RefCell<Vec<f64>>>) {
    let laps: Rc<RefCell<Vec<f64>>> = Rc::new(RefCell::new(Vec::new()));

    let area = gtk4::DrawingArea::new();
    area.set_content_height(220);
    area.set_hexpand(true);
    area.set_vexpand(true);

    let laps_for_draw = laps.clone();
    area.set_draw_func(move |_area, cr, width, height| {
        draw_lap_chart(cr, width, height, &laps_for_draw.borrow());
    });

    (area, laps)
}

/// Lap index vs duration, as a line with point markers.
fn draw_lap_chart(cr: &gtk4::cairo::Context, width: i32, height: i32, laps: &[f64]) {
    let w = width as f64;
    let h = height as f64;
    let margin = 32.0;

    // Axes
    cr.set_source_rgba(0.5, 0.5, 0.5, 0.8);
    cr.set_line_width(1.0);
    cr.move_to(margin, margin / 2.0);
    cr.line_to(margin, h - margin);
    cr.line_to(w - margin / 2.0, h - margin);
    let _ = cr.stroke();

    cr.set_font_size(11.0);
    if laps.is_empty() {
        cr.set_source_rgba(0.5, 0.5, 0.5, 0.9);
        cr.move_to(margin + 10.0, margin + 10.0);
        let _ = cr.show_text("No laps recorded yet");
        return;
    }

    let max_lap = laps
        .iter()
        .copied()
        .fold(f64::MIN_POSITIVE, f64::max);
    let plot_w = w - margin * 2.0;
    let plot_h = h - margin * 2.0;

    let position = |index: usize, lap: f64| -> (f64, f64) {
        let x = if laps.len() == 1 {
            margin + plot_w / 2.0
        } else {
            margin + plot_w * index as f64 / (laps.len() - 1) as f64
        };
        let y = h - margin - (lap / max_lap) * plot_h;
        (x, y)
    };

    // Lap-time polyline
    cr.set_source_rgba(0.21, 0.52, 0.89, 1.0);
    cr.set_line_width(2.0);
    for (index, &lap) in laps.iter().enumerate() {
        let (x, y) = position(index, lap);
        if index == 0 {
            cr.move_to(x, y);
        } else {
            cr.line_to(x, y);
        }
    }
    let _ = cr.stroke();

    // Point markers
    for (index, &lap) in laps.iter().enumerate() {
        let (x, y) = position(index, lap);
        cr.arc(x, y, 3.5, 0.0, 2.0 * PI);
        let _ = cr.fill();
    }

    // Scale hints
    cr.set_source_rgba(0.5, 0.5, 0.5, 0.9);
    cr.move_to(2.0, margin / 2.0 + 4.0);
    let _ = cr.show_text(&format!("{max_lap:.1}s"));
    cr.move_to(w / 2.0 - 24.0, h - margin / 2.0 + 8.0);
    let _ = cr.show_text("Lap Number");
}
