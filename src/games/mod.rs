//! Mini-games wired to the console
//!
//! Each adapter owns its simulation state, maps [`FrameInput`] onto the
//! game's own controls and builds its playfield scene.
//!
//! [`FrameInput`]: crate::input::FrameInput

pub mod maze;
pub mod penalty;
pub mod shooter;

pub use maze::MazeGame;
pub use penalty::PenaltyGame;
pub use shooter::ShooterGame;
