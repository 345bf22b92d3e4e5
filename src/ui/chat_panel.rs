use std::sync::atomic::Ordering;
use std::sync::mpsc::TryRecvError;

use eframe::egui::{Align, Color32, Key, Layout, RichText, ScrollArea, TextEdit, Ui};

use crate::chat::{spawn_completion, ChatConfig, ChatEvent};
use crate::session::SessionState;

/// Data-analysis chat backed by a streaming completion endpoint.  The
/// worker thread feeds events through a channel; we drain it every frame.
pub fn chat_panel(ui: &mut Ui, state: &mut SessionState) {
    pump_events(state);
    let chat = &mut state.chat;

    let Some(config) = chat.config.clone() else {
        ui.heading("Analysis assistant");
        ui.label("Enter an API key to start chatting (or set DEEPSEEK_API_KEY).");
        ui.horizontal(|ui| {
            ui.add(
                TextEdit::singleline(&mut chat.api_key_input)
                    .password(true)
                    .hint_text("API key"),
            );
            if ui.button("Connect").clicked() && !chat.api_key_input.trim().is_empty() {
                chat.config = Some(ChatConfig::new(chat.api_key_input.trim()));
                chat.api_key_input.clear();
                chat.error = None;
            }
        });
        if let Some(err) = &chat.error {
            ui.colored_label(Color32::RED, err);
        }
        return;
    };

    let streaming = chat.reply.is_some();

    // Input row pinned to the bottom, transcript filling the rest.
    ui.with_layout(Layout::bottom_up(Align::Min), |ui| {
        ui.add_space(4.0);
        let mut send = false;
        ui.horizontal(|ui| {
            let edit = ui.add_enabled(
                !streaming,
                TextEdit::singleline(&mut chat.input)
                    .desired_width(ui.available_width() - 80.0)
                    .hint_text("Ask about the loaded data…"),
            );
            if edit.lost_focus() && ui.input(|i| i.key_pressed(Key::Enter)) {
                send = true;
            }
            if streaming {
                if ui.button("Cancel").clicked() {
                    if let Some(reply) = &chat.reply {
                        reply.cancel.store(true, Ordering::Relaxed);
                    }
                }
            } else if ui.button("Send").clicked() {
                send = true;
            }
        });
        if let Some(err) = &chat.error {
            ui.colored_label(Color32::RED, err);
        }
        ui.separator();

        if send && !streaming && !chat.input.trim().is_empty() {
            let prompt = std::mem::take(&mut chat.input);
            chat.history.push_user(prompt.trim());
            chat.error = None;
            match spawn_completion(config.clone(), &chat.history) {
                Ok(reply) => chat.reply = Some(reply),
                Err(err) => {
                    chat.history.rollback_user_turn();
                    chat.error = Some(err.to_string());
                }
            }
        }

        ui.with_layout(Layout::top_down(Align::Min), |ui| {
            ScrollArea::vertical()
                .stick_to_bottom(true)
                .auto_shrink([false, false])
                .show(ui, |ui| {
                    for message in chat.history.visible() {
                        message_bubble(ui, &message.role, &message.content);
                    }
                    if let Some(reply) = &chat.reply {
                        message_bubble(ui, "assistant", &format!("{}▌", reply.partial));
                    }
                });
        });
    });
}

fn message_bubble(ui: &mut Ui, role: &str, content: &str) {
    let (prefix, color) = if role == "user" {
        ("You", Color32::LIGHT_BLUE)
    } else {
        ("Assistant", Color32::LIGHT_GREEN)
    };
    ui.label(RichText::new(prefix).strong().color(color));
    ui.label(content);
    ui.add_space(8.0);
}

/// Drain pending stream events.  A finished or cancelled stream commits the
/// accumulated content as an assistant turn; an error rolls back the user
/// turn so a retry does not duplicate it.
fn pump_events(state: &mut SessionState) {
    let chat = &mut state.chat;
    let Some(mut reply) = chat.reply.take() else {
        return;
    };

    loop {
        match reply.events.try_recv() {
            Ok(ChatEvent::Delta(text)) => reply.partial.push_str(&text),
            Ok(ChatEvent::Done) | Ok(ChatEvent::Cancelled) => {
                if !reply.partial.is_empty() {
                    chat.history.push_assistant(reply.partial);
                }
                return;
            }
            Ok(ChatEvent::Error(message)) => {
                log::error!("chat stream failed: {message}");
                chat.history.rollback_user_turn();
                chat.error = Some(message);
                return;
            }
            Err(TryRecvError::Empty) => {
                chat.reply = Some(reply);
                return;
            }
            Err(TryRecvError::Disconnected) => {
                // Worker died without a terminal event; treat as an error.
                chat.history.rollback_user_turn();
                chat.error = Some("chat worker disconnected".into());
                return;
            }
        }
    }
}
