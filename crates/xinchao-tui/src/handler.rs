use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};

use crate::app::{App, InputMode};
use crate::tui::AppEvent;
use xinchao_core::ChatMessage;

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

pub fn handle_event(app: &mut App, event: AppEvent) {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Mouse(mouse) => handle_mouse(app, mouse),
        AppEvent::Resize(_, _) => {}
        AppEvent::Tick => {
            app.tick_animation();
        }
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // Global keys that work in any mode
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    match app.input_mode {
        InputMode::Normal => handle_normal_mode(app, key),
        InputMode::Editing => handle_editing_mode(app, key),
    }
}

fn handle_normal_mode(app: &mut App, key: KeyEvent) {
    if !app.panel_open {
        match key.code {
            KeyCode::Char('q') => app.should_quit = true,
            // Open the chat panel
            KeyCode::Char('o') | KeyCode::Enter => app.panel_open = true,
            // Open and jump straight into the input box
            KeyCode::Char('i') => {
                app.panel_open = true;
                if app.input_enabled() {
                    app.input_mode = InputMode::Editing;
                }
            }
            _ => {}
        }
        return;
    }

    match key.code {
        KeyCode::Char('q') => app.should_quit = true,

        // Close the panel; the conversation stays for when it reopens
        KeyCode::Char('o') | KeyCode::Esc => app.panel_open = false,

        // Focus the input box
        KeyCode::Char('i') | KeyCode::Tab => {
            if app.input_enabled() {
                app.input_mode = InputMode::Editing;
                app.cursor = app.input.chars().count();
            }
        }

        // Chat scrolling
        KeyCode::Char('j') | KeyCode::Down => app.scroll_down(),
        KeyCode::Char('k') | KeyCode::Up => app.scroll_up(),
        KeyCode::Char('g') => app.scroll_to_top(),
        KeyCode::Char('G') => app.scroll_to_bottom(),

        _ => {}
    }
}

fn handle_editing_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.input_mode = InputMode::Normal;
        }
        KeyCode::Enter => {
            submit_question(app);
        }
        KeyCode::Backspace => {
            if app.cursor > 0 {
                app.cursor -= 1;
                let byte_pos = char_to_byte_index(&app.input, app.cursor);
                app.input.remove(byte_pos);
            }
        }
        KeyCode::Delete => {
            let char_count = app.input.chars().count();
            if app.cursor < char_count {
                let byte_pos = char_to_byte_index(&app.input, app.cursor);
                app.input.remove(byte_pos);
            }
        }
        KeyCode::Left => {
            app.cursor = app.cursor.saturating_sub(1);
        }
        KeyCode::Right => {
            let char_count = app.input.chars().count();
            app.cursor = (app.cursor + 1).min(char_count);
        }
        KeyCode::Home => {
            app.cursor = 0;
        }
        KeyCode::End => {
            app.cursor = app.input.chars().count();
        }
        KeyCode::Char(c) => {
            let byte_pos = char_to_byte_index(&app.input, app.cursor);
            app.input.insert(byte_pos, c);
            app.cursor += 1;
        }
        _ => {}
    }
}

/// Send the typed question to the assistant. Does nothing for blank input,
/// while an answer is outstanding, or before the runtime is ready.
pub fn submit_question(app: &mut App) {
    if app.input.trim().is_empty() || app.answer_task.is_some() || !app.ready {
        return;
    }

    let question = app.input.trim().to_string();
    app.input.clear();
    app.cursor = 0;
    app.input_mode = InputMode::Normal;

    app.push_message(ChatMessage::user(question.clone()));
    app.loading = true;
    app.scroll_to_bottom();

    let assistant = app.assistant.clone();
    let ready = app.ready;
    app.answer_task = Some(tokio::spawn(async move {
        assistant.answer(&question, ready).await
    }));
}

/// Fold a finished answer back into the conversation. `None` means the
/// assistant decided to stay silent.
pub fn finish_answer(app: &mut App, reply: Option<String>) {
    app.loading = false;
    if let Some(text) = reply {
        app.push_message(ChatMessage::assistant(text));
    }
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    if !app.panel_open {
        return;
    }

    match mouse.kind {
        MouseEventKind::ScrollDown => {
            app.chat_scroll = app.chat_scroll.saturating_add(3);
        }
        MouseEventKind::ScrollUp => {
            app.chat_scroll = app.chat_scroll.saturating_sub(3);
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::sync::Arc;
    use xinchao_core::fault::AssistError;
    use xinchao_core::{ChatRole, ChatRuntime, InvokeOptions, RuntimeLauncher};

    struct CannedRuntime {
        reply: Value,
    }

    #[async_trait]
    impl ChatRuntime for CannedRuntime {
        async fn is_available(&self) -> bool {
            true
        }

        async fn invoke(
            &self,
            _prompt: &str,
            _options: &InvokeOptions,
        ) -> Result<Value, AssistError> {
            Ok(self.reply.clone())
        }
    }

    struct NoopLauncher;

    impl RuntimeLauncher for NoopLauncher {
        fn launch(&self) -> anyhow::Result<()> {
            Ok(())
        }
    }

    fn ready_app(reply: Value) -> App {
        let mut app = App::with_runtime(
            Arc::new(CannedRuntime { reply }),
            Arc::new(NoopLauncher),
            "test-model",
        );
        app.ready = true;
        app.panel_open = true;
        app
    }

    fn press(code: KeyCode) -> AppEvent {
        AppEvent::Key(KeyEvent::from(code))
    }

    async fn settle(app: &mut App) {
        if let Some(task) = app.answer_task.take() {
            let reply = task.await.unwrap();
            finish_answer(app, reply);
        }
    }

    #[tokio::test]
    async fn test_submit_appends_question_and_one_reply() {
        let mut app = ready_app(json!("Ghé chợ Bến Thành."));
        app.input = "Sài Gòn có gì vui?".to_string();

        submit_question(&mut app);
        assert_eq!(app.messages.len(), 1);
        assert_eq!(app.messages[0].role, ChatRole::User);
        assert!(app.loading);
        assert!(app.input.is_empty());

        settle(&mut app).await;
        assert_eq!(app.messages.len(), 2);
        assert_eq!(app.messages[1].role, ChatRole::Assistant);
        assert_eq!(app.messages[1].content, "Ghé chợ Bến Thành.");
        assert!(!app.loading);
    }

    #[tokio::test]
    async fn test_blank_input_is_not_submitted() {
        let mut app = ready_app(json!("không bao giờ"));
        app.input = "   ".to_string();

        submit_question(&mut app);
        assert!(app.messages.is_empty());
        assert!(app.answer_task.is_none());
        assert!(!app.loading);
    }

    #[tokio::test]
    async fn test_submit_ignored_while_answer_outstanding() {
        let mut app = ready_app(json!("trả lời"));
        app.input = "câu thứ nhất".to_string();
        submit_question(&mut app);

        app.input = "câu thứ hai".to_string();
        submit_question(&mut app);
        // Second question neither appended nor sent
        assert_eq!(app.messages.len(), 1);
        assert_eq!(app.input, "câu thứ hai");

        settle(&mut app).await;
        assert_eq!(app.messages.len(), 2);
    }

    #[tokio::test]
    async fn test_submit_blocked_until_ready() {
        let mut app = ready_app(json!("trả lời"));
        app.ready = false;
        app.input = "chưa sẵn sàng".to_string();

        submit_question(&mut app);
        assert!(app.messages.is_empty());
        assert!(app.answer_task.is_none());
    }

    #[tokio::test]
    async fn test_editing_mode_gated_on_readiness() {
        let mut app = ready_app(json!("trả lời"));
        app.ready = false;

        handle_event(&mut app, press(KeyCode::Char('i')));
        assert_eq!(app.input_mode, InputMode::Normal);

        app.ready = true;
        handle_event(&mut app, press(KeyCode::Char('i')));
        assert_eq!(app.input_mode, InputMode::Editing);
    }

    #[tokio::test]
    async fn test_panel_toggle_keeps_conversation() {
        let mut app = ready_app(json!("trả lời"));
        app.push_message(ChatMessage::assistant("còn đây".to_string()));

        handle_event(&mut app, press(KeyCode::Char('o')));
        assert!(!app.panel_open);
        handle_event(&mut app, press(KeyCode::Char('o')));
        assert!(app.panel_open);
        assert_eq!(app.messages.len(), 1);
    }

    #[tokio::test]
    async fn test_ctrl_c_quits_from_any_mode() {
        let mut app = ready_app(json!("trả lời"));
        app.input_mode = InputMode::Editing;

        let key = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        handle_event(&mut app, AppEvent::Key(key));
        assert!(app.should_quit);
    }

    #[tokio::test]
    async fn test_multibyte_editing_keeps_cursor_consistent() {
        let mut app = ready_app(json!("trả lời"));
        app.input_mode = InputMode::Editing;

        for c in "Phở".chars() {
            handle_event(&mut app, press(KeyCode::Char(c)));
        }
        assert_eq!(app.input, "Phở");
        assert_eq!(app.cursor, 3);

        handle_event(&mut app, press(KeyCode::Left));
        handle_event(&mut app, press(KeyCode::Backspace));
        assert_eq!(app.input, "Pở");
        assert_eq!(app.cursor, 1);
    }

    #[test]
    fn test_char_to_byte_index_multibyte() {
        assert_eq!(char_to_byte_index("Phở", 0), 0);
        assert_eq!(char_to_byte_index("Phở", 2), 2);
        // "ở" is three bytes, so the end lands past it
        assert_eq!(char_to_byte_index("Phở", 3), 5);
    }
}
