//! Settings panel — model picker, API key, system prompt, proxy and voice.

use egui::{self, RichText};

use chat_types::config::{ChatConfig, ModelChoice, TTS_VOICES};

use crate::theme::*;

/// Render the settings panel. Returns true when any field changed so the
/// caller can rebuild adapters and persist.
pub fn settings_panel(ui: &mut egui::Ui, config: &mut ChatConfig) -> bool {
    let mut changed = false;

    egui::Frame::default()
        .fill(BG_SECONDARY)
        .inner_margin(PANEL_PADDING)
        .corner_radius(PANEL_ROUNDING)
        .show(ui, |ui| {
            ui.heading(RichText::new("Settings").color(TEXT_PRIMARY));
            ui.separator();

            // ── Model Section ────────────────────────────────
            ui.label(RichText::new("Model").color(ACCENT).strong());
            ui.add_space(2.0);

            egui::ComboBox::from_id_salt("model_choice")
                .selected_text(config.model.label())
                .show_ui(ui, |ui| {
                    for model in ModelChoice::all() {
                        if ui
                            .selectable_value(&mut config.model, *model, model.label())
                            .changed()
                        {
                            changed = true;
                        }
                    }
                });

            ui.add_space(4.0);

            // API Key (masked)
            ui.label(RichText::new("API Key").color(TEXT_SECONDARY).small());
            let api_key_edit = egui::TextEdit::singleline(&mut config.api_key)
                .password(true)
                .hint_text("sk-...");
            if ui.add(api_key_edit).changed() {
                changed = true;
            }

            ui.add_space(4.0);

            // System prompt
            ui.label(
                RichText::new("System Prompt")
                    .color(TEXT_SECONDARY)
                    .small(),
            );
            if ui
                .add(
                    egui::TextEdit::multiline(&mut config.system_prompt)
                        .desired_rows(4)
                        .desired_width(f32::INFINITY),
                )
                .changed()
            {
                changed = true;
            }

            ui.add_space(4.0);

            // Proxy base URL
            ui.label(
                RichText::new("Proxy URL (optional)")
                    .color(TEXT_SECONDARY)
                    .small(),
            );
            if ui
                .add(
                    egui::TextEdit::singleline(&mut config.proxy_base)
                        .hint_text("same origin"),
                )
                .changed()
            {
                changed = true;
            }

            ui.add_space(12.0);
            ui.separator();
            ui.add_space(4.0);

            // ── Speech Section ───────────────────────────────
            ui.label(RichText::new("Speech").color(ACCENT).strong());
            ui.add_space(2.0);

            ui.label(RichText::new("Voice").color(TEXT_SECONDARY).small());
            egui::ComboBox::from_id_salt("tts_voice")
                .selected_text(config.tts.voice.clone())
                .show_ui(ui, |ui| {
                    for voice in TTS_VOICES {
                        if ui
                            .selectable_value(
                                &mut config.tts.voice,
                                voice.to_string(),
                                *voice,
                            )
                            .changed()
                        {
                            changed = true;
                        }
                    }
                });

            ui.add_space(4.0);
            ui.label(
                RichText::new("Remote synthesis falls back to the browser voice when unavailable.")
                    .color(TEXT_SECONDARY)
                    .small()
                    .italics(),
            );
        });

    changed
}
