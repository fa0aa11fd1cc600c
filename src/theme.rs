use eframe::egui::{self, Color32, CornerRadius, FontId, Frame, Margin, Stroke, TextStyle};

#[derive(Debug, Clone)]
pub struct Theme {
    pub surface_0: Color32,
    pub surface_1: Color32,
    pub surface_2: Color32,
    pub surface_3: Color32,
    pub accent_primary: Color32,
    pub accent_muted: Color32,
    pub success: Color32,
    pub danger: Color32,
    pub text_primary: Color32,
    pub text_muted: Color32,
    pub text_on_accent: Color32,
    pub border_subtle: Color32,
    pub spacing_8: f32,
    pub spacing_12: f32,
    pub spacing_16: f32,
    pub radius_10: u8,
    pub radius_12: u8,
    pub button_height: f32,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            surface_0: Color32::from_rgb(0x02, 0x06, 0x17),
            surface_1: Color32::from_rgb(0x0F, 0x17, 0x2A),
            surface_2: Color32::from_rgb(0x1E, 0x29, 0x3B),
            surface_3: Color32::from_rgb(0x33, 0x41, 0x55),
            accent_primary: Color32::from_rgb(0x0E, 0xA5, 0xE9),
            accent_muted: Color32::from_rgb(0x02, 0x84, 0xC7),
            success: Color32::from_rgb(0x4A, 0xDE, 0x80),
            danger: Color32::from_rgb(0xF8, 0x71, 0x71),
            text_primary: Color32::from_rgb(0xE2, 0xE8, 0xF0),
            text_muted: Color32::from_rgb(0x64, 0x74, 0x8B),
            text_on_accent: Color32::WHITE,
            border_subtle: Color32::from_rgba_premultiplied(255, 255, 255, 13),
            spacing_8: Self::P8,
            spacing_12: Self::P12,
            spacing_16: Self::P16,
            radius_10: 10,
            radius_12: Self::R12,
            button_height: 44.0,
        }
    }
}

impl Theme {
    pub const R12: u8 = 12;
    pub const P8: f32 = 8.0;
    pub const P12: f32 = 12.0;
    pub const P16: f32 = 16.0;

    pub fn apply_visuals(&self, ctx: &egui::Context) {
        let mut visuals = egui::Visuals::dark();
        visuals.panel_fill = self.surface_0;
        visuals.extreme_bg_color = self.surface_1;
        visuals.override_text_color = Some(self.text_primary);
        visuals.widgets.noninteractive.bg_fill = self.surface_1;
        visuals.widgets.noninteractive.weak_bg_fill = self.surface_1;
        visuals.widgets.noninteractive.bg_stroke = Stroke::new(1.0, self.border_subtle);
        visuals.widgets.inactive.bg_fill = self.surface_2;
        visuals.widgets.inactive.weak_bg_fill = self.surface_2;
        visuals.widgets.inactive.bg_stroke = Stroke::NONE;
        visuals.widgets.hovered.bg_fill = self.surface_3;
        visuals.widgets.hovered.weak_bg_fill = self.surface_3;
        visuals.widgets.hovered.bg_stroke = Stroke::NONE;
        visuals.widgets.active.bg_fill = self.accent_muted;
        visuals.widgets.active.bg_stroke = Stroke::NONE;
        visuals.selection.bg_fill = self.accent_muted;
        visuals.selection.stroke = Stroke::new(1.0, self.accent_primary);
        visuals.window_fill = self.surface_1;
        visuals.window_stroke = Stroke::new(1.0, self.border_subtle);
        visuals.window_corner_radius = CornerRadius::same(self.radius_10);

        let mut style = (*ctx.style()).clone();
        style.visuals = visuals;
        style.spacing.item_spacing = egui::vec2(10.0, 10.0);
        style.spacing.button_padding = egui::vec2(12.0, 8.0);
        style.text_styles.insert(TextStyle::Heading, FontId::proportional(18.0));
        style.text_styles.insert(TextStyle::Body, FontId::proportional(14.0));
        style.text_styles.insert(TextStyle::Monospace, FontId::monospace(13.0));
        style.text_styles.insert(TextStyle::Small, FontId::proportional(12.0));
        ctx.set_style(style);
    }

    pub fn panel_frame(&self, fill: Color32, inner_padding: i8) -> Frame {
        Frame::new()
            .fill(fill)
            .inner_margin(Margin::same(inner_padding))
            .corner_radius(CornerRadius::same(self.radius_12))
            .stroke(Stroke::new(1.0, self.border_subtle))
    }

    pub fn card_frame(&self) -> Frame {
        self.panel_frame(self.surface_1, self.spacing_12 as i8)
    }

    pub fn editor_frame(&self) -> Frame {
        self.panel_frame(self.surface_1, self.spacing_16 as i8)
    }

    pub fn primary_button(&self, label: &str, enabled: bool) -> egui::Button<'static> {
        let (fill, text) = if enabled {
            (self.accent_muted, self.text_on_accent)
        } else {
            (self.surface_2, self.text_muted)
        };
        egui::Button::new(egui::RichText::new(label.to_string()).strong().size(16.0).color(text))
            .fill(fill)
            .min_size(egui::vec2(0.0, self.button_height))
    }

    pub fn copy_button(&self, copied: bool) -> egui::Button<'static> {
        if copied {
            egui::Button::new(egui::RichText::new("✔ 已复制！").color(self.success))
                .stroke(Stroke::new(1.0, self.success))
        } else {
            egui::Button::new("📋 复制内容").stroke(Stroke::new(1.0, self.border_subtle))
        }
    }
}
