use std::cell::RefCell;
use std::rc::Rc;

use gtk4::prelude::*;
use libadwaita::prelude::*;

/// Handles returned from building the dashboard window.
pub struct DashboardWidgets {
    pub window: libadwaita::ApplicationWindow,
    pub time_label: gtk4::Label,
    pub status_label: gtk4::Label,
    pub progress_bar: gtk4::ProgressBar,
    pub chart: gtk4::DrawingArea,
    pub chart_laps: Rc<RefCell<Vec<f64>>>,
    pub insights_view: gtk4::TextView,
    pub start_button: gtk4::Button,
    pub stop_button: gtk4::Button,
    pub reset_button: gtk4::Button,
    pub lap_button: gtk4::Button,
    pub voice_button: gtk4::Button,
    pub export_button: gtk4::Button,
    pub analyze_button: gtk4::Button,
}

/// Build the main stopwatch window.
pub fn build_dashboard(app: &libadwaita::Application, initial_status: &str) -> DashboardWidgets {
    let window = libadwaita::ApplicationWindow::builder()
        .application(app)
        .title("Voice Stopwatch")
        .default_width(560)
        .default_height(680)
        .build();

    let css_provider = gtk4::CssProvider::new();
    css_provider.load_from_string(
        r#"
        .time-display {
            font-family: monospace;
            font-size: 44px;
            font-weight: bold;
        }
        .insights-pane {
            font-family: monospace;
            font-size: 12px;
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

    let toolbar_view = libadwaita::ToolbarView::new();
    let header = libadwaita::HeaderBar::new();

    let menu_button = gtk4::MenuButton::new();
    menu_button.set_icon_name("open-menu-symbolic");
    let menu = gtk4::gio::Menu::new();
    menu.append(Some("Quit"), Some("app.quit"));
    menu_button.set_menu_model(Some(&menu));
    header.pack_end(&menu_button);

    toolbar_view.add_top_bar(&header);

    let content = gtk4::Box::new(gtk4::Orientation::Vertical, 0);
    content.set_margin_start(16);
    content.set_margin_end(16);
    content.set_margin_top(12);
    content.set_margin_bottom(12);

    // --- Elapsed time ---
    let time_label = gtk4::Label::new(Some("00:00:00"));
    time_label.add_css_class("time-display");
    time_label.set_margin_bottom(8);
    content.append(&time_label);

    // --- Lap chart ---
    let (chart, chart_laps) = super::chart::build_chart();
    let chart_frame = gtk4::Frame::new(Some("Lap Times"));
    chart_frame.set_child(Some(&chart));
    content.append(&chart_frame);

    // --- Controls ---
    let controls = gtk4::Box::new(gtk4::Orientation::Horizontal, 6);
    controls.set_halign(gtk4::Align::Center);
    controls.set_margin_top(12);
    controls.set_margin_bottom(12);

    let start_button = gtk4::Button::with_label("Start");
    start_button.add_css_class("suggested-action");
    let stop_button = gtk4::Button::with_label("Stop");
    stop_button.add_css_class("destructive-action");
    stop_button.set_sensitive(false);
    let reset_button = gtk4::Button::with_label("Reset");
    let lap_button = gtk4::Button::with_label("Lap");
    let voice_button = gtk4::Button::with_label("Voice Control");
    let export_button = gtk4::Button::with_label("Export Data");
    let analyze_button = gtk4::Button::with_label("Analyze");

    for button in [
        &start_button,
        &stop_button,
        &reset_button,
        &lap_button,
        &voice_button,
        &export_button,
        &analyze_button,
    ] {
        controls.append(button);
    }
    content.append(&controls);

    // --- Voice status ---
    let status_group = libadwaita::PreferencesGroup::new();
    status_group.set_title("Voice Control");
    let status_row = libadwaita::ActionRow::builder().title("Status").build();
    let status_label = gtk4::Label::new(Some(initial_status));
    status_label.add_css_class("dim-label");
    status_row.add_suffix(&status_label);
    status_group.add(&status_row);
    content.append(&status_group);

    // --- Insights ---
    let insights_group = libadwaita::PreferencesGroup::new();
    insights_group.set_title("Productivity Insights");
    insights_group.set_margin_top(12);

    let insights_view = gtk4::TextView::new();
    insights_view.set_editable(false);
    insights_view.set_cursor_visible(false);
    insights_view.set_wrap_mode(gtk4::WrapMode::WordChar);
    insights_view.add_css_class("insights-pane");
    insights_view.set_left_margin(8);
    insights_view.set_top_margin(8);

    let insights_scroll = gtk4::ScrolledWindow::builder()
        .hscrollbar_policy(gtk4::PolicyType::Never)
        .min_content_height(150)
        .child(&insights_view)
        .build();
    insights_group.add(&insights_scroll);
    content.append(&insights_group);

    // --- Model download progress ---
    let progress_bar = gtk4::ProgressBar::new();
    progress_bar.set_margin_top(16);
    progress_bar.set_visible(false);
    progress_bar.set_show_text(true);
    progress_bar.set_text(Some("Downloading speech model..."));
    content.append(&progress_bar);

    let scrolled = gtk4::ScrolledWindow::builder()
        .hscrollbar_policy(gtk4::PolicyType::Never)
        .child(&content)
        .build();
    toolbar_view.set_content(Some(&scrolled));
    window.set_content(Some(&toolbar_view));

    DashboardWidgets {
        window,
        time_label,
        status_label,
        progress_bar,
        chart,
        chart_laps,
        insights_view,
        start_button,
        stop_button,
        reset_button,
        lap_button,
        voice_button,
        export_button,
        analyze_button,
    }
}
