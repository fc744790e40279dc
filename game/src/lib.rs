pub mod audio;
pub mod context;
pub mod difficulty;
pub mod effects;
pub mod governor;
pub mod nav;
pub mod settings;
pub mod sfx;
pub mod shake;
pub mod view;
