//! Chat panel — displays the current conversation and the input field.

use egui::{self, Align, Layout, RichText, ScrollArea, Vec2};

use chat_core::markdown::{self, THINKING_PLACEHOLDER};
use chat_types::conversation::Conversation;
use chat_types::message::{Message, Role};

use crate::richtext::{parse_fragment, DisplayBlock, InlineSpan};
use crate::state::UiState;
use crate::theme::*;

/// What the user asked for while the panel was rendered.
pub enum ChatAction {
    Send(String),
    Retry(i64),
    Regenerate(i64),
    Speak(String),
}

/// Render the chat panel. Returns at most one action per frame.
pub fn chat_panel(
    ui: &mut egui::Ui,
    state: &mut UiState,
    conversation: Option<&Conversation>,
) -> Option<ChatAction> {
    let mut action = None;

    egui::Frame::default()
        .fill(BG_PRIMARY)
        .inner_margin(PANEL_PADDING)
        .show(ui, |ui| {
            ui.vertical(|ui| {
                // Header
                ui.horizontal(|ui| {
                    let title = conversation.map_or("No conversation", |c| c.title.as_str());
                    ui.heading(RichText::new(title).color(TEXT_PRIMARY).strong());
                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        let status_color = if state.is_busy() { WARNING } else { SUCCESS };
                        ui.label(
                            RichText::new(&state.status_text)
                                .color(status_color)
                                .small(),
                        );
                    });
                });

                ui.separator();

                // Messages area
                let available_height = ui.available_height() - 60.0;
                ScrollArea::vertical()
                    .max_height(available_height)
                    .auto_shrink([false, false])
                    .stick_to_bottom(true)
                    .show(ui, |ui| {
                        if let Some(conversation) = conversation {
                            for message in &conversation.messages {
                                if let Some(a) = render_message(ui, message, conversation) {
                                    action = Some(a);
                                }
                                ui.add_space(4.0);
                            }
                        }
                    });

                ui.add_space(8.0);

                // Input area
                let in_flight = conversation.is_some_and(|c| c.is_in_flight());
                ui.horizontal(|ui| {
                    let input = egui::TextEdit::singleline(&mut state.input_text)
                        .hint_text("Type a message...")
                        .desired_width(ui.available_width() - 70.0)
                        .font(egui::FontId::proportional(14.0));

                    let response = ui.add(input);

                    let send_enabled = !state.input_text.trim().is_empty()
                        && !in_flight
                        && conversation.is_some();
                    let send_btn = ui.add_enabled(
                        send_enabled,
                        egui::Button::new(RichText::new("Send").color(TEXT_PRIMARY))
                            .fill(if send_enabled { ACCENT } else { BG_SURFACE })
                            .corner_radius(PANEL_ROUNDING)
                            .min_size(Vec2::new(60.0, 0.0)),
                    );

                    // Submit on Enter or button click
                    if (response.lost_focus()
                        && ui.input(|i| i.key_pressed(egui::Key::Enter))
                        && send_enabled)
                        || send_btn.clicked()
                    {
                        let text = state.input_text.trim().to_string();
                        action = Some(ChatAction::Send(text));
                        state.input_text.clear();
                        response.request_focus();
                    }
                });
            });
        });

    action
}

fn render_message(
    ui: &mut egui::Ui,
    message: &Message,
    conversation: &Conversation,
) -> Option<ChatAction> {
    let mut action = None;

    let pending = conversation.in_flight == Some(message.id) && message.content.is_empty();
    let (label, label_color, bg) = match message.role {
        Role::User => ("You", ACCENT, BG_SECONDARY),
        Role::Assistant => ("Assistant", SUCCESS, BG_SECONDARY),
        Role::System => ("System", TEXT_SECONDARY, BG_SURFACE),
    };

    egui::Frame::default()
        .fill(bg)
        .corner_radius(PANEL_ROUNDING)
        .inner_margin(8.0)
        .show(ui, |ui| {
            ui.label(RichText::new(label).color(label_color).strong().small());

            // The renderer passes the pending placeholder through unchanged,
            // so the indicator is never wrapped in markup.
            let text = if pending {
                THINKING_PLACEHOLDER
            } else {
                message.content.as_str()
            };
            let rendered = markdown::render(text);
            if pending {
                ui.label(RichText::new(rendered).color(TEXT_SECONDARY).italics());
            } else {
                render_blocks(ui, &parse_fragment(&rendered));
            }

            let streaming = conversation.in_flight == Some(message.id);
            ui.horizontal(|ui| match message.role {
                Role::User if !conversation.is_in_flight() => {
                    if ui
                        .small_button(RichText::new("Retry").color(TEXT_SECONDARY))
                        .clicked()
                    {
                        action = Some(ChatAction::Retry(message.id));
                    }
                }
                Role::Assistant if !streaming && !message.content.is_empty() => {
                    if ui
                        .small_button(RichText::new("Regenerate").color(TEXT_SECONDARY))
                        .clicked()
                    {
                        action = Some(ChatAction::Regenerate(message.id));
                    }
                    if ui
                        .small_button(RichText::new("Listen").color(TEXT_SECONDARY))
                        .clicked()
                    {
                        action = Some(ChatAction::Speak(message.content.clone()));
                    }
                }
                _ => {}
            });
        });

    action
}

fn render_blocks(ui: &mut egui::Ui, blocks: &[DisplayBlock]) {
    for block in blocks {
        match block {
            DisplayBlock::Paragraph(spans) => render_spans(ui, spans),
            DisplayBlock::Heading { level, spans } => {
                let size = match level {
                    1 => 20.0,
                    2 => 17.0,
                    _ => 15.0,
                };
                ui.horizontal_wrapped(|ui| {
                    ui.spacing_mut().item_spacing.x = 0.0;
                    for span in spans {
                        ui.label(span_text(span).size(size).strong());
                    }
                });
            }
            DisplayBlock::CodeBlock(code) => {
                egui::Frame::default()
                    .fill(CODE_BG)
                    .corner_radius(PANEL_ROUNDING)
                    .inner_margin(8.0)
                    .show(ui, |ui| {
                        ui.label(RichText::new(code).color(CODE_FG).monospace());
                    });
            }
            DisplayBlock::ListItem { ordinal, spans } => {
                ui.horizontal_wrapped(|ui| {
                    ui.spacing_mut().item_spacing.x = 0.0;
                    let marker = match ordinal {
                        Some(n) => format!("{}. ", n),
                        None => "• ".to_string(),
                    };
                    ui.label(RichText::new(marker).color(TEXT_SECONDARY));
                    for span in spans {
                        render_span(ui, span);
                    }
                });
            }
        }
    }
}

fn render_spans(ui: &mut egui::Ui, spans: &[InlineSpan]) {
    ui.horizontal_wrapped(|ui| {
        ui.spacing_mut().item_spacing.x = 0.0;
        for span in spans {
            render_span(ui, span);
        }
    });
}

fn render_span(ui: &mut egui::Ui, span: &InlineSpan) {
    match &span.link {
        Some(url) => {
            ui.hyperlink_to(span_text(span).color(ACCENT), url);
        }
        None => {
            ui.label(span_text(span));
        }
    }
}

fn span_text(span: &InlineSpan) -> RichText {
    let mut rich = RichText::new(&span.text).color(TEXT_PRIMARY);
    if span.bold {
        rich = rich.strong();
    }
    if span.italic {
        rich = rich.italics();
    }
    if span.code {
        rich = rich.code();
    }
    rich
}
