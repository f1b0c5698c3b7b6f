pub mod bgm;
pub mod sfx;
