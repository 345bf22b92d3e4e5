pub mod chat_panel;
pub mod panels;
pub mod plot;
