pub mod config;
mod init;
pub mod loaders;
pub mod mods;
mod retarget;
pub mod services;
pub mod sources;
mod update;
mod version;

pub use init::init;
pub use retarget::retarget;
pub use update::update;
pub use version::version;
