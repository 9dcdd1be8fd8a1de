pub mod health;
pub use self::health::health;

pub mod recover;
pub use self::recover::recover;

pub mod reset;
pub use self::reset::reset;

pub mod state;
pub use self::state::RecoveryConfig;

pub mod types;

mod utils;
