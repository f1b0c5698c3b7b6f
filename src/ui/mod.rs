pub mod energy_bar;
pub mod fader;
pub mod prompt;
