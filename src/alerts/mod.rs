mod dispatcher;
mod voice;

pub use dispatcher::AlertDispatcher;
pub use voice::VoiceChannel;
