// Purpose: audio voice lifecycle
// One voice per press; teardowns are scheduled and idempotent

mod manager;
mod scheduler;
mod voice;

pub use manager::VoiceManager;
pub use scheduler::{ScheduledTask, Scheduler, TaskKind};
pub use voice::{VoiceHandle, VoiceId, VoiceStatus};
