pub mod replay;
pub mod settings;
