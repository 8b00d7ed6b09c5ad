//! Generic Ruby base adapter
//!
//! Root of the specialization chain. It is never selected on its own; it
//! only contributes defaults every Ruby application shares.

use super::{AdapterDescriptor, AdapterId};

pub fn descriptor() -> AdapterDescriptor {
    AdapterDescriptor::new(AdapterId::Ruby)
        .config_var("LANG", "en_US.UTF-8")
        .process_type("rake", "bundle exec rake")
        .process_type("console", "bundle exec irb")
}
