pub mod model;
pub mod store;

pub use model::{FirewallAction, FirewallRule, PolicyDocument, SshDirective};
pub use store::PolicyStore;
