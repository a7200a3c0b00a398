use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use gtk4::prelude::*;
use gtk4::{self, Align};
#[cfg(target_os = "linux")]
use gtk4_layer_shell::LayerShell;

use crate::app::OverlayPhase;

const NUM_BARS: usize = 24;

/// Handles returned from building the listening overlay bar.
pub struct OverlayWidgets {
    pub window: gtk4::Window,
    pub waveform: gtk4::DrawingArea,
    pub audio_levels: Rc<RefCell<VecDeque<f32>>>,
    // Phase-transition widgets
    pub dot: gtk4::Label,
    pub listening_label: gtk4::Label,
    pub hbox: gtk4::Box,
    pub status_label: gtk4::Label,
}

/// Append a microphone level sample and repaint the waveform.
pub fn push_audio_level(overlay: &OverlayWidgets, level: f32) {
    let mut levels = overlay.audio_levels.borrow_mut();
    if levels.len() >= NUM_BARS {
        levels.pop_front();
    }
    levels.push_back(level);
    overlay.waveform.queue_draw();
}

/// Update overlay widgets to reflect the current voice-command phase.
pub fn set_overlay_phase(overlay: &OverlayWidgets, phase: &OverlayPhase) {
    match phase {
        OverlayPhase::Listening => {
            overlay.dot.set_visible(true);
            overlay.listening_label.set_visible(true);
            overlay.waveform.set_visible(true);
            overlay.status_label.set_visible(false);
            overlay.hbox.remove_css_class("heard-bar");
        }
        OverlayPhase::Recognizing => {
            overlay.dot.set_visible(false);
            overlay.listening_label.set_visible(false);
            overlay.waveform.set_visible(false);
            overlay.status_label.set_text("Recognizing\u{2026}");
            overlay.status_label.set_visible(true);
            overlay.hbox.remove_css_class("heard-bar");
        }
        OverlayPhase::Heard(command) => {
            overlay.dot.set_visible(false);
            overlay.listening_label.set_visible(false);
            overlay.waveform.set_visible(false);
            overlay
                .status_label
                .set_text(&format!("\u{2713} {command}"));
            overlay.status_label.set_visible(true);
            overlay.hbox.add_css_class("heard-bar");
        }
        OverlayPhase::NotUnderstood => {
            overlay.dot.set_visible(false);
            overlay.listening_label.set_visible(false);
            overlay.waveform.set_visible(false);
            overlay.status_label.set_text("Didn't catch that");
            overlay.status_label.set_visible(true);
            overlay.hbox.remove_css_class("heard-bar");
        }
    }
}

/// Build the listening overlay bar.
pub fn build_overlay(app: &libadwaita::Application) -> OverlayWidgets {
    let window = gtk4::Window::builder()
        .application(app)
        .title("Listening")
        .decorated(false)
        .resizable(false)
        .default_width(320)
        .default_height(44)
        .build();

    window.add_css_class("listen-overlay");

    let css_provider = gtk4::CssProvider::new();
    css_provider.load_from_string(
        r#"
        window.listen-overlay {
            background-color: transparent;
        }
        .listen-bar {
            background-color: rgba(30, 30, 30, 0.90);
            border-radius: 22px;
            padding: 8px 20px;
        }
        .listen-bar.heard-bar {
            background-color: rgba(30, 100, 30, 0.90);
        }
        .listen-dot {
            color: #ff3b30;
            font-size: 18px;
        }
        .listen-label {
            color: white;
            font-weight: bold;
            font-size: 14px;
        }
        .listen-status {
            color: white;
            font-weight: bold;
            font-size: 14px;
        }
        "#,
    );
    if let Some(display) = gtk4::gdk::Display::default() {
        gtk4::style_context_add_provider_for_display(
            &display,
            &css_provider,
            gtk4::STYLE_PROVIDER_PRIORITY_APPLICATION,
        );
    }

    let hbox = gtk4::Box::new(gtk4::Orientation::Horizontal, 10);
    hbox.set_halign(Align::Center);
    hbox.set_valign(Align::Center);
    hbox.add_css_class("listen-bar");

    let dot = gtk4::Label::new(Some("\u{25CF}"));
    dot.add_css_class("listen-dot");

    let listening_label = gtk4::Label::new(Some("Listening"));
    listening_label.add_css_class("listen-label");

    let audio_levels: Rc<RefCell<VecDeque<f32>>> =
        Rc::new(RefCell::new(VecDeque::from(vec![0.0; NUM_BARS])));
    let waveform = gtk4::DrawingArea::new();
    waveform.set_content_width(((3 + 2) * NUM_BARS) as i32);
    waveform.set_content_height(28);

    let levels_for_draw = audio_levels.clone();
    waveform.set_draw_func(move |_area, cr, width, height| {
        draw_waveform(cr, width, height, &levels_for_draw.borrow());
    });

    let status_label = gtk4::Label::new(None);
    status_label.add_css_class("listen-status");
    status_label.set_visible(false);

    hbox.append(&dot);
    hbox.append(&listening_label);
    hbox.append(&waveform);
    hbox.append(&status_label);

    window.set_child(Some(&hbox));

    // Click dismisses the bar early.
    let click = gtk4::GestureClick::new();
    let window_for_click = window.clone();
    click.connect_released(move |_, _, _, _| {
        window_for_click.set_visible(false);
    });
    window.add_controller(click);

    // Platform-specific window positioning
    #[cfg(target_os = "linux")]
    {
        let is_wayland = std::env::var("XDG_SESSION_TYPE")
            .map(|s| s == "wayland")
            .unwrap_or(false);

        if is_wayland && gtk4_layer_shell::is_supported() {
            window.init_layer_shell();
            window.set_layer(gtk4_layer_shell::Layer::Overlay);
            window.set_anchor(gtk4_layer_shell::Edge::Bottom, true);
            window.set_margin(gtk4_layer_shell::Edge::Bottom, 30);
            window.set_anchor(gtk4_layer_shell::Edge::Left, false);
            window.set_anchor(gtk4_layer_shell::Edge::Right, false);
        }
    }

    #[cfg(target_os = "macos")]
    {
        // GTK4 handles native window management; keep a plain floating bar.
        window.set_decorated(false);
    }

    window.set_visible(false);

    window.connect_close_request(|w| {
        w.set_visible(false);
        gtk4::glib::Propagation::Stop
    });

    OverlayWidgets {
        window,
        waveform,
        audio_levels,
        dot,
        listening_label,
        hbox,
        status_label,
    }
}

fn draw_waveform(cr: &gtk4::cairo::Context, width: i32, height: i32, levels: &VecDeque<f32>) {
    let h = height as f64;
    let bar_w = 3.0;
    let gap = 2.0;
    let total_w = (bar_w + gap) * NUM_BARS as f64 - gap;
    let x_offset = (width as f64 - total_w) / 2.0;

    for (i, &level) in levels.iter().enumerate() {
        // Microphone RMS is small; scale up before clamping.
        let clamped = (level as f64 * 6.0).clamp(0.0, 1.0);
        let bar_h = (2.0 + clamped * (h - 4.0)).max(2.0);
        let x = x_offset + i as f64 * (bar_w + gap);
        let y = (h - bar_h) / 2.0;
        let alpha = 0.3 + 0.7 * clamped;
        cr.set_source_rgba(1.0, 1.0, 1.0, alpha);
        cr.rectangle(x, y, bar_w, bar_h);
        let _ = cr.fill();
    }
}
