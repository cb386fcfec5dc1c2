mod error;
mod event;
mod opt;
mod path_read;
pub mod process;
mod stage;

pub use error::Error;
pub use event::Event;
pub use opt::Opt;
pub use path_read::PathRead;
pub use stage::Stage;
