//! UI screens and widgets for DocFlow

pub mod blocks;
pub mod dashboard;
pub mod dialogs;
pub mod editor;
pub mod settings;
pub mod toast;
pub mod welcome;
