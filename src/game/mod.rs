pub mod dice;
pub mod economy;
pub mod engine;
pub mod events;
pub mod motion;
pub mod presentation;
pub mod scheduler;
pub mod session;
pub mod simulation;
pub mod types;

pub use dice::DiceRoller;
pub use engine::{EngineHandle, EngineOptions, TurnEngine};
pub use events::{EventBus, GameEvent};
pub use motion::{MotionDetector, MotionEvent, MotionSample};
pub use presentation::{
    OverlayPresentation, PresentationPolicy, SettlementDisplay, SnackbarPresentation,
};
pub use scheduler::{SchedulerMode, StagePause, TurnScheduler};
pub use session::Session;
pub use types::*;
