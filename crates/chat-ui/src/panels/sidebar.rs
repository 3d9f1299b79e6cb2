//! Sidebar panel — conversation list with create, select, rename and delete.

use egui::{self, Align, Layout, RichText, ScrollArea};

use chat_types::conversation::Conversation;

use crate::state::UiState;
use crate::theme::*;

pub enum SidebarAction {
    Select(u64),
    Create,
    Delete(u64),
    Rename(u64, String),
}

/// Render the conversation list. Returns at most one action per frame.
pub fn sidebar_panel(
    ui: &mut egui::Ui,
    state: &mut UiState,
    conversations: &[Conversation],
    current_id: u64,
) -> Option<SidebarAction> {
    let mut action = None;

    ui.horizontal(|ui| {
        ui.label(
            RichText::new("Conversations")
                .color(TEXT_PRIMARY)
                .strong(),
        );
        ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
            if ui
                .button(RichText::new("+").color(TEXT_PRIMARY).strong())
                .on_hover_text("New conversation")
                .clicked()
            {
                action = Some(SidebarAction::Create);
            }
        });
    });

    ui.separator();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui| {
            for conversation in conversations {
                let editing = state
                    .editing_title
                    .as_ref()
                    .is_some_and(|(id, _)| *id == conversation.id);

                if editing {
                    let mut commit = false;
                    if let Some((_, buffer)) = state.editing_title.as_mut() {
                        ui.horizontal(|ui| {
                            let response = ui.add(
                                egui::TextEdit::singleline(buffer)
                                    .hint_text("Conversation title")
                                    .desired_width(ui.available_width() - 28.0),
                            );
                            if response.lost_focus()
                                && ui.input(|i| i.key_pressed(egui::Key::Enter))
                            {
                                commit = true;
                            }
                            if ui
                                .small_button(RichText::new("✓").color(SUCCESS))
                                .clicked()
                            {
                                commit = true;
                            }
                        });
                    }
                    if commit {
                        if let Some((id, title)) = state.editing_title.take() {
                            action = Some(SidebarAction::Rename(id, title));
                        }
                    }
                    continue;
                }

                let selected = conversation.id == current_id;
                let response = ui.selectable_label(
                    selected,
                    RichText::new(&conversation.title).color(TEXT_PRIMARY),
                );
                if response.clicked() {
                    action = Some(SidebarAction::Select(conversation.id));
                }
                response.context_menu(|ui| {
                    if ui.button("Rename").clicked() {
                        state.editing_title =
                            Some((conversation.id, conversation.title.clone()));
                        ui.close();
                    }
                    if ui
                        .button(RichText::new("Delete").color(ERROR))
                        .clicked()
                    {
                        action = Some(SidebarAction::Delete(conversation.id));
                        ui.close();
                    }
                });
            }

            if conversations.is_empty() {
                ui.label(
                    RichText::new("No conversations yet")
                        .color(TEXT_SECONDARY)
                        .italics()
                        .small(),
                );
            }
        });

    action
}
