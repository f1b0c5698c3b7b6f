pub mod charge_floor;
pub mod energy;
pub mod level_exit;
pub mod movement;
pub mod push;
pub mod spawn;
