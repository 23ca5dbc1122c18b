use std::sync::Arc;

use xinchao_core::config::{default_serve_command, DEFAULT_BASE_URL, DEFAULT_MODEL};
use xinchao_core::{
    Assistant, ChatMessage, ChatRuntime, Config, GatewayClient, ReadyMonitor, RuntimeLauncher,
    ServeCommand,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

pub struct App {
    // Core state
    pub should_quit: bool,
    pub input_mode: InputMode,
    /// Whether the chat panel is open; closed shows only the call-to-action
    pub panel_open: bool,

    // Conversation state
    pub messages: Vec<ChatMessage>,
    pub input: String,
    pub cursor: usize, // cursor position in input, counted in characters
    pub loading: bool,
    pub ready: bool,
    pub answer_task: Option<tokio::task::JoinHandle<Option<String>>>,

    // Chat viewport
    pub chat_scroll: u16,
    pub chat_height: u16, // set during render, used for scroll calculations
    pub chat_width: u16,  // set during render, used for wrap calculations

    // Animation state
    pub animation_frame: u8, // 0-2 for ellipsis animation

    // Backend
    pub assistant: Arc<Assistant>,
    pub monitor: ReadyMonitor,
    pub model: String,
}

impl App {
    /// Build the app against the configured gateway, falling back to the
    /// stock Ollama setup for anything the config leaves out. Spawns the
    /// readiness monitor, so this must run inside the runtime.
    pub fn new(config: &Config) -> Self {
        let base_url = config
            .base_url
            .clone()
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let model = config
            .model
            .clone()
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());
        let serve_command = config
            .serve_command
            .clone()
            .unwrap_or_else(default_serve_command);

        let runtime = Arc::new(GatewayClient::new(&base_url));
        let launcher = Arc::new(ServeCommand::new(serve_command));
        Self::with_runtime(runtime, launcher, &model)
    }

    pub fn with_runtime(
        runtime: Arc<dyn ChatRuntime>,
        launcher: Arc<dyn RuntimeLauncher>,
        model: &str,
    ) -> Self {
        let monitor = ReadyMonitor::spawn(runtime.clone(), launcher);
        let assistant = Arc::new(Assistant::new(runtime, model));

        Self {
            should_quit: false,
            input_mode: InputMode::Normal,
            panel_open: false,

            messages: Vec::new(),
            input: String::new(),
            cursor: 0,
            loading: false,
            ready: false,
            answer_task: None,

            chat_scroll: 0,
            chat_height: 0,
            chat_width: 0,

            animation_frame: 0,

            assistant,
            monitor,
            model: model.to_string(),
        }
    }

    /// Pull the monitor's latest readiness state into the UI
    pub fn refresh_ready(&mut self) {
        self.ready = self.monitor.is_ready();
    }

    /// Whether the input box accepts a new question right now
    pub fn input_enabled(&self) -> bool {
        self.ready && !self.loading
    }

    pub fn push_message(&mut self, message: ChatMessage) {
        self.messages.push(message);
        self.scroll_to_bottom();
    }

    /// Tick animation frame (called by Tick event)
    pub fn tick_animation(&mut self) {
        if self.loading {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }

    /// Scroll the chat so the newest message (or the thinking indicator)
    /// is visible
    pub fn scroll_to_bottom(&mut self) {
        // Use actual chat width for wrap calculation, default to 50 if not set
        let wrap_width = if self.chat_width > 0 {
            self.chat_width as usize
        } else {
            50
        };

        let mut total_lines: u16 = 0;

        for msg in &self.messages {
            total_lines += 1; // Role line ("Bạn:" or "Trợ lý:")
            for line in msg.content.lines() {
                // Character count, not byte length; Vietnamese is multibyte
                let char_count = line.chars().count();
                if char_count == 0 {
                    total_lines += 1;
                } else {
                    total_lines += ((char_count / wrap_width) + 1) as u16;
                }
            }
            total_lines += 1; // Blank line after message
        }

        if self.loading {
            total_lines += 2; // Role line + thinking indicator
        }

        let visible_height = if self.chat_height > 0 {
            self.chat_height
        } else {
            20
        };

        if total_lines > visible_height {
            self.chat_scroll = total_lines.saturating_sub(visible_height);
        }
    }

    pub fn scroll_up(&mut self) {
        self.chat_scroll = self.chat_scroll.saturating_sub(1);
    }

    pub fn scroll_down(&mut self) {
        self.chat_scroll = self.chat_scroll.saturating_add(1);
    }

    pub fn scroll_to_top(&mut self) {
        self.chat_scroll = 0;
    }
}
