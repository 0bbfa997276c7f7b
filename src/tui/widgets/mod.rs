// TUI widget modules for each dashboard panel.

pub mod comparison;
pub mod help_bar;
pub mod insight;
pub mod quit_confirm;
pub mod radar;
pub mod selection_banner;
pub mod sources;
pub mod status_bar;
pub mod teams;
