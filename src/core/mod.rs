pub mod clock;

pub use clock::TickClock;
