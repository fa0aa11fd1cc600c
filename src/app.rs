use crate::catalog::{OptimizationGoal, TargetModel, LANGUAGES};
use crate::controller::Controller;
use crate::event::AppEvent;
use crate::history::HistoryItem;
use crate::theme::Theme;
use eframe::egui::{self, RichText, ScrollArea};
use std::sync::mpsc::{Receiver, TryRecvError};
use std::time::Instant;

const PREVIEW_CHARS: usize = 80;

pub struct PromptsmithApp {
    rx: Receiver<AppEvent>,
    controller: Controller,
    theme: Theme,
    history_open: bool,
    channel_closed: bool,
}

impl PromptsmithApp {
    pub fn new(rx: Receiver<AppEvent>, controller: Controller, ctx: &egui::Context) -> Self {
        let theme = Theme::default();
        theme.apply_visuals(ctx);
        Self {
            rx,
            controller,
            theme,
            history_open: false,
            channel_closed: false,
        }
    }

    fn drain_events(&mut self, ctx: &egui::Context) {
        if self.channel_closed {
            return;
        }
        loop {
            match self.rx.try_recv() {
                Ok(event) => {
                    self.controller.apply_event(event);
                    ctx.request_repaint();
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    log::warn!("event channel disconnected");
                    self.channel_closed = true;
                    break;
                }
            }
        }
    }

    fn render_top_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("top_bar")
            .frame(
                egui::Frame::new()
                    .fill(self.theme.surface_0)
                    .inner_margin(egui::Margin::same(12)),
            )
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.label(RichText::new("✨ PromptMaster").heading().strong());
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        let label = format!("🕘 历史记录 ({})", self.controller.history().len());
                        if ui.selectable_label(self.history_open, label).clicked() {
                            self.history_open = !self.history_open;
                        }
                    });
                });
            });
    }

    fn render_history_panel(&mut self, ctx: &egui::Context) {
        if !self.history_open {
            return;
        }

        let theme = &self.theme;
        let controller = &mut self.controller;
        let mut selected: Option<String> = None;
        let mut close = false;

        egui::SidePanel::left("history_panel")
            .resizable(true)
            .default_width(300.0)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading("历史记录");
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        close = ui.button("✖").clicked();
                    });
                });
                ui.separator();

                let history = controller.history();
                if history.is_empty() {
                    ui.centered_and_justified(|ui| {
                        ui.label(RichText::new("暂无记录").color(theme.text_muted));
                    });
                    return;
                }

                let list_height = (ui.available_height() - 48.0).max(120.0);
                ScrollArea::vertical()
                    .id_salt("history_list")
                    .max_height(list_height)
                    .show(ui, |ui| {
                        for item in history.items() {
                            if history_entry(ui, theme, item).clicked() {
                                selected = Some(item.id.clone());
                            }
                        }
                    });

                ui.separator();
                let clear = egui::Button::new(RichText::new("🗑 清空历史").color(theme.danger));
                if ui.add_sized([ui.available_width(), 32.0], clear).clicked() {
                    controller.request_clear_history();
                }
            });

        if let Some(id) = selected {
            controller.load_from_history(&id);
        }
        if close {
            self.history_open = false;
        }
    }

    fn render_config_bar(&mut self, ui: &mut egui::Ui) {
        let theme = &self.theme;
        let config = self.controller.config_mut();

        theme.card_frame().show(ui, |ui| {
            ui.label(RichText::new("⚙ 优化设置").color(theme.text_muted));
            ui.horizontal_wrapped(|ui| {
                ui.vertical(|ui| {
                    ui.small("目标模型");
                    egui::ComboBox::from_id_salt("target_model")
                        .width(200.0)
                        .selected_text(model_text(config.target_model))
                        .show_ui(ui, |ui| {
                            for model in TargetModel::ALL {
                                ui.selectable_value(&mut config.target_model, model, model_text(model));
                            }
                        });
                });

                ui.vertical(|ui| {
                    ui.small("优化目标");
                    egui::ComboBox::from_id_salt("goal")
                        .width(200.0)
                        .selected_text(config.goal.label())
                        .show_ui(ui, |ui| {
                            for goal in OptimizationGoal::ALL {
                                ui.selectable_value(&mut config.goal, goal, goal.label())
                                    .on_hover_text(goal.description());
                            }
                        });
                    ui.small(RichText::new(config.goal.description()).color(theme.text_muted));
                });

                ui.vertical(|ui| {
                    ui.small("输出语言");
                    ui.horizontal(|ui| {
                        ui.add(egui::TextEdit::singleline(&mut config.language).desired_width(150.0));
                        egui::ComboBox::from_id_salt("language")
                            .width(24.0)
                            .selected_text("")
                            .show_ui(ui, |ui| {
                                for language in LANGUAGES {
                                    let chosen = config.language == language;
                                    if ui.selectable_label(chosen, language).clicked() {
                                        config.language = language.to_string();
                                    }
                                }
                            });
                    });
                });
            });
        });
    }

    fn render_input_column(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.label(RichText::new("原始需求").strong().color(self.theme.text_muted));
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.small(format!("{} 字", self.controller.input_char_count()));
                if !self.controller.input().is_empty() && ui.small_button("✖ 清空输入").clicked() {
                    self.controller.clear_input();
                }
            });
        });

        let editor_height = (ui.available_height() - self.theme.button_height - 2.0 * self.theme.spacing_16)
            .max(200.0);
        self.theme.editor_frame().show(ui, |ui| {
            ScrollArea::vertical()
                .id_salt("input_editor")
                .max_height(editor_height)
                .show(ui, |ui| {
                    ui.add_sized(
                        [ui.available_width(), editor_height],
                        egui::TextEdit::multiline(self.controller.input_mut())
                            .hint_text("在此输入您的原始想法... 例如：'帮我写一篇关于人工智能未来的公众号文章'...")
                            .frame(false),
                    );
                });
        });

        let can_submit = self.controller.can_submit();
        let label = if self.controller.is_streaming() {
            "⏳ 优化中..."
        } else {
            "🪄 一键生成优化提示词"
        };
        let button = self.theme.primary_button(label, can_submit);
        if ui
            .add_enabled_ui(can_submit, |ui| ui.add_sized([ui.available_width(), self.theme.button_height], button))
            .inner
            .clicked()
        {
            self.controller.submit();
        }
    }

    fn render_output_column(&mut self, ui: &mut egui::Ui, ctx: &egui::Context) {
        ui.horizontal(|ui| {
            ui.label(RichText::new("✨ 优化结果").strong().color(self.theme.accent_primary));
            if self.controller.is_streaming() {
                ui.spinner();
            }
            if !self.controller.output().is_empty() {
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.small(
                        RichText::new(self.controller.config().target_model.value())
                            .color(self.theme.accent_primary),
                    );
                });
            }
        });

        let body_height = (ui.available_height() - self.theme.button_height - 2.0 * self.theme.spacing_16)
            .max(200.0);
        self.theme.editor_frame().show(ui, |ui| {
            ui.set_min_height(body_height);
            if self.controller.output().is_empty() {
                ui.vertical_centered(|ui| {
                    ui.add_space(body_height / 3.0);
                    ui.label(RichText::new("准备就绪").heading().color(self.theme.text_muted));
                    ui.label(
                        RichText::new("在左侧输入您的需求并选择目标模型，AI 将为您生成专业的结构化提示词。")
                            .color(self.theme.text_muted),
                    );
                });
                return;
            }

            ScrollArea::vertical()
                .id_salt("output_view")
                .max_height(body_height)
                .stick_to_bottom(self.controller.is_streaming())
                .show(ui, |ui| {
                    ui.set_width(ui.available_width());
                    ui.label(self.controller.output());
                });
        });

        if self.controller.output().is_empty() {
            return;
        }

        let now = Instant::now();
        ui.horizontal(|ui| {
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.spacing_mut().item_spacing.x = self.theme.spacing_8;
                if ui.add(self.theme.copy_button(self.controller.is_copied(now))).clicked() {
                    if let Some(text) = self.controller.copy_output(now) {
                        ctx.copy_text(text);
                    }
                }
                if ui.button("清空").clicked() {
                    self.controller.clear_output();
                }
            });
        });

        if let Some(remaining) = self.controller.copied_remaining(Instant::now()) {
            ctx.request_repaint_after(remaining);
        }
    }

    fn render_confirm_clear(&mut self, ctx: &egui::Context) {
        if !self.controller.is_clear_history_pending() {
            return;
        }

        let mut answer: Option<bool> = None;
        let modal = egui::Modal::new(egui::Id::new("confirm_clear_history")).show(ctx, |ui| {
            ui.set_width(280.0);
            ui.heading("清空历史");
            ui.label("确定要清空所有历史记录吗？");
            ui.add_space(self.theme.spacing_8);
            ui.horizontal(|ui| {
                if ui
                    .button(RichText::new("确定").color(self.theme.danger))
                    .clicked()
                {
                    answer = Some(true);
                }
                if ui.button("取消").clicked() {
                    answer = Some(false);
                }
            });
        });
        if modal.should_close() && answer.is_none() {
            answer = Some(false);
        }

        if let Some(confirmed) = answer {
            self.controller.resolve_clear_history(confirmed);
        }
    }
}

fn model_text(model: TargetModel) -> String {
    format!("{} {}", model.icon(), model.label())
}

fn preview(text: &str) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(PREVIEW_CHARS).collect();
    if chars.next().is_some() {
        format!("{head}…")
    } else {
        head
    }
}

fn local_time(timestamp_ms: i64) -> String {
    chrono::DateTime::from_timestamp_millis(timestamp_ms)
        .map(|time| time.with_timezone(&chrono::Local).format("%H:%M").to_string())
        .unwrap_or_default()
}

fn history_entry(ui: &mut egui::Ui, theme: &Theme, item: &HistoryItem) -> egui::Response {
    let inner = theme.card_frame().show(ui, |ui| {
        ui.set_width(ui.available_width());
        ui.horizontal(|ui| {
            ui.small(RichText::new(item.config.target_model.short_tag()).color(theme.accent_primary));
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.small(RichText::new(local_time(item.timestamp)).color(theme.text_muted));
            });
        });
        ui.add(egui::Label::new(preview(&item.original)).truncate());
        ui.small(RichText::new("✔ 已优化").color(theme.success));
    });
    ui.interact(
        inner.response.rect,
        ui.id().with(("history_entry", &item.id)),
        egui::Sense::click(),
    )
    .on_hover_cursor(egui::CursorIcon::PointingHand)
}

impl eframe::App for PromptsmithApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.drain_events(ctx);
        if self.controller.is_streaming() {
            ctx.request_repaint();
        }

        self.render_top_bar(ctx);
        self.render_history_panel(ctx);
        egui::CentralPanel::default().show(ctx, |ui| {
            self.render_config_bar(ui);
            ui.add_space(self.theme.spacing_8);
            ui.columns(2, |columns| {
                self.render_input_column(&mut columns[0]);
                self.render_output_column(&mut columns[1], ctx);
            });
        });
        self.render_confirm_clear(ctx);
    }
}

#[cfg(test)]
mod tests {
    use super::{local_time, preview, PREVIEW_CHARS};

    #[test]
    fn preview_truncates_on_char_boundaries() {
        let long = "提".repeat(PREVIEW_CHARS + 3);
        let shown = preview(&long);
        assert_eq!(shown.chars().count(), PREVIEW_CHARS + 1);
        assert!(shown.ends_with('…'));
        assert_eq!(preview("short"), "short");
    }

    #[test]
    fn local_time_formats_hours_and_minutes() {
        let shown = local_time(1_700_000_000_000);
        assert_eq!(shown.len(), 5);
        assert_eq!(&shown[2..3], ":");
    }
}
