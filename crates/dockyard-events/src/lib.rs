// ABOUTME: Messaging layer shared by every dockyard crate above the data types
// ABOUTME: Provides the message bus, UI-thread executor and typed notification emitters

pub mod bus;
pub mod emitter;
pub mod error;
pub mod executor;
pub mod message;
pub mod notifications;

pub use bus::{Affinity, MessageBus, MessageHandler};
pub use emitter::{EmitReport, EventEmitter, Listener};
pub use error::{BusError, EmitterError, HandlerError};
pub use executor::{UiExecutor, UiQueue, UiTask};
pub use message::{Message, MessageType};
pub use notifications::{
    CancelReason, FactoryRegistered, LayoutChanged, SurfaceEvent, ThemeChanged,
};
