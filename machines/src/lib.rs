pub mod simplez80;

pub use simplez80::{SimpleBus, SimpleZ80System};
