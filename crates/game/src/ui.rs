use engine::{TimerId, TimerQueue};
use tracing::debug;

use crate::catalog::{FoodType, KeyType};

pub const DEFAULT_MESSAGE_DURATION_SECONDS: f32 = 3.0;

/// Push notifications from gameplay to whatever draws the interface.
pub trait UiSink {
    fn show_message(&mut self, text: &str);
    fn show_prompt(&mut self, text: &str);
    fn hide_prompt(&mut self);
    fn refresh_score(&mut self, score: i64);
    fn refresh_keys(&mut self, keys: &[KeyType]);
    fn refresh_food(&mut self, food: &[FoodType]);
    fn refresh_item_count(&mut self, count: usize);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HudTimer {
    HideMessage,
}

#[derive(Debug)]
pub struct Hud {
    message: Option<String>,
    prompt: Option<String>,
    score: i64,
    keys: Vec<KeyType>,
    food: Vec<FoodType>,
    item_count: usize,
    inventory_open: bool,
    message_duration: f32,
    timers: TimerQueue<HudTimer>,
    hide_timer: Option<TimerId>,
}

impl Default for Hud {
    fn default() -> Self {
        Self::new(DEFAULT_MESSAGE_DURATION_SECONDS)
    }
}

impl Hud {
    pub fn new(message_duration: f32) -> Self {
        Self {
            message: None,
            prompt: None,
            score: 0,
            keys: Vec::new(),
            food: Vec::new(),
            item_count: 0,
            inventory_open: false,
            message_duration,
            timers: TimerQueue::new(),
            hide_timer: None,
        }
    }

    pub fn tick(&mut self, dt_seconds: f32) {
        for timer in self.timers.advance(dt_seconds) {
            match timer {
                HudTimer::HideMessage => {
                    self.message = None;
                    self.hide_timer = None;
                }
            }
        }
    }

    pub fn toggle_inventory(&mut self) -> bool {
        self.inventory_open = !self.inventory_open;
        debug!(visible = self.inventory_open, "inventory_panel_toggled");
        self.inventory_open
    }

    pub fn reset(&mut self) {
        self.message = None;
        self.prompt = None;
        self.score = 0;
        self.keys.clear();
        self.food.clear();
        self.item_count = 0;
        self.timers.clear();
        self.hide_timer = None;
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn prompt(&self) -> Option<&str> {
        self.prompt.as_deref()
    }

    pub fn score(&self) -> i64 {
        self.score
    }

    pub fn keys(&self) -> &[KeyType] {
        &self.keys
    }

    pub fn food(&self) -> &[FoodType] {
        &self.food
    }

    pub fn item_count(&self) -> usize {
        self.item_count
    }

    pub fn inventory_open(&self) -> bool {
        self.inventory_open
    }

    pub fn score_text(&self) -> String {
        format!("Score: {}", self.score)
    }

    pub fn key_count_text(&self) -> String {
        format!("Keys: {}", self.keys.len())
    }

    pub fn item_count_text(&self) -> String {
        format!("Items: {}", self.item_count)
    }

    pub fn inventory_lines(&self) -> Vec<String> {
        let mut lines = Vec::with_capacity(self.keys.len() + self.food.len() + 1);
        lines.extend(self.keys.iter().map(|key| format!("key: {key}")));
        lines.extend(self.food.iter().map(|food| format!("food: {food}")));
        lines.push(self.item_count_text());
        lines
    }
}

impl UiSink for Hud {
    fn show_message(&mut self, text: &str) {
        self.prompt = None;
        if let Some(previous) = self.hide_timer.take() {
            self.timers.cancel(previous);
        }
        self.message = Some(text.to_string());
        let timer = self.timers.schedule(self.message_duration, HudTimer::HideMessage);
        self.hide_timer = Some(timer);
    }

    fn show_prompt(&mut self, text: &str) {
        self.prompt = Some(text.to_string());
    }

    fn hide_prompt(&mut self) {
        self.prompt = None;
    }

    fn refresh_score(&mut self, score: i64) {
        self.score = score;
    }

    fn refresh_keys(&mut self, keys: &[KeyType]) {
        self.keys = keys.to_vec();
    }

    fn refresh_food(&mut self, food: &[FoodType]) {
        self.food = food.to_vec();
    }

    fn refresh_item_count(&mut self, count: usize) {
        self.item_count = count;
    }
}
